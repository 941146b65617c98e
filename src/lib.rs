//! Interaction engine for the call-flow diagram canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns
//! pan/zoom viewport state, screen↔canvas coordinate math, grid snapping,
//! and the pointer/touch/wheel gesture state machine that disambiguates
//! clicks from node drags and canvas pans and turns two-finger touches into
//! anchored pinch zoom. The host layer renders nodes and edges from the
//! viewport state and applies the [`engine::Action`]s the engine emits; it
//! never mutates viewport state directly.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture dispatcher and testable [`engine::EngineCore`] |
//! | [`viewport`] | Pan/zoom state, anchored zoom, coordinate conversions |
//! | [`grid`] | Snapping canvas coordinates to grid intersections |
//! | [`node`] | Host-synced mirror of diagram node positions and sizes |
//! | [`input`] | Neutral event records and the gesture state machine types |
//! | [`web`] | Browser binding and window-listener lifecycle |
//! | [`consts`] | Shared numeric constants (thresholds, zoom bounds, etc.) |

pub mod consts;
pub mod engine;
pub mod grid;
pub mod input;
pub mod node;
pub mod viewport;
pub mod web;
