//! Node mirror: the position/size subset of the host's diagram model.
//!
//! The engine never owns the diagram — nodes and edges live in the host's
//! data store. What it keeps is a read mirror of the fields drag math and
//! fit-to-view need: id, position, and optional size. The mirror is written
//! only by the host sync calls ([`NodeStore::load_snapshot`],
//! [`NodeStore::upsert`], [`NodeStore::remove`]); gesture handling reads it
//! and reports new positions back through actions, never writing here.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use crate::viewport::Point;

/// Unique identifier for a diagram node.
pub type NodeId = Uuid;

/// A diagram node as mirrored from the host model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Left edge of the node in canvas coordinates.
    pub x: f64,
    /// Top edge of the node in canvas coordinates.
    pub y: f64,
    /// Width in canvas units; hosts that let the renderer size nodes omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height in canvas units; hosts that let the renderer size nodes omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl CanvasNode {
    /// Node at a position with no explicit size.
    #[must_use]
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self { id, x, y, width: None, height: None }
    }

    /// Top-left corner in canvas coordinates.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `(x, y, width, height)` with defaults filled in for missing sizes.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let width = self.width.filter(|w| w.is_finite()).unwrap_or(DEFAULT_NODE_WIDTH);
        let height = self.height.filter(|h| h.is_finite()).unwrap_or(DEFAULT_NODE_HEIGHT);
        (self.x, self.y, width, height)
    }
}

/// Host-synced mirror of the diagram's nodes.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: HashMap<NodeId, CanvasNode>,
}

impl NodeStore {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: HashMap::new() }
    }

    /// Replace the whole mirror with a fresh snapshot from the host.
    pub fn load_snapshot(&mut self, nodes: Vec<CanvasNode>) {
        self.nodes.clear();
        for node in nodes {
            self.nodes.insert(node.id, node);
        }
    }

    /// Insert or replace a single node.
    pub fn upsert(&mut self, node: CanvasNode) {
        self.nodes.insert(node.id, node);
    }

    /// Remove a node, returning it if it was present.
    pub fn remove(&mut self, id: &NodeId) -> Option<CanvasNode> {
        self.nodes.remove(id)
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id is present.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All mirrored nodes, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<CanvasNode> {
        self.nodes.values().copied().collect()
    }

    /// Number of mirrored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the mirror holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
