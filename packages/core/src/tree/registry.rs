//! Node Registry
//!
//! Side index from [`NodeId`] to the live [`SchemaNode`]s of one tree. The
//! registry is owned by its [`SchemaTree`](crate::tree::SchemaTree); there is
//! no process-wide store. A node is registered when it is inserted into the
//! tree and deregistered when it is removed, at which point ownership moves
//! back to the caller.

use crate::models::{NodeId, SchemaNode};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, SchemaNode>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a node, returning any node previously stored under its id
    pub fn register_node(&mut self, node: SchemaNode) -> Option<SchemaNode> {
        self.nodes.insert(node.id(), node)
    }

    /// Remove bookkeeping for a node that is no longer part of the tree
    pub fn deregister_node(&mut self, id: NodeId) -> Option<SchemaNode> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut SchemaNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All registered nodes in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.values()
    }
}
