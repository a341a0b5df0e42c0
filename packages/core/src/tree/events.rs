//! Change Events for SchemaTree
//!
//! Every successful mutation of a [`SchemaTree`](crate::tree::SchemaTree) is
//! announced to the listeners registered with `subscribe`. Listeners run
//! synchronously, in registration order, after the mutation has completed, so
//! the tree they observe through their own handle is already consistent.
//!
//! Registration bookkeeping is reported alongside the structural change:
//! removing a property with two nested fields produces three
//! `NodeDeregistered` events followed by one `PropertyDeleted`.

use crate::models::NodeId;
use serde::{Deserialize, Serialize};

/// Events emitted by SchemaTree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeEvent {
    /// A node entered the registry
    #[serde(rename_all = "camelCase")]
    NodeRegistered { id: NodeId },

    /// A node left the registry
    #[serde(rename_all = "camelCase")]
    NodeDeregistered { id: NodeId },

    /// A child was detached without touching the parent's schema data
    #[serde(rename_all = "camelCase")]
    ChildRemoved { parent_id: NodeId, child_id: NodeId },

    #[serde(rename_all = "camelCase")]
    PropertyAdded {
        parent_id: NodeId,
        child_id: NodeId,
        name: String,
    },

    /// A fragment was written into `properties` without attaching a node
    #[serde(rename_all = "camelCase")]
    PropertyWritten { parent_id: NodeId, name: String },

    #[serde(rename_all = "camelCase")]
    PropertyDeleted { parent_id: NodeId, name: String },

    #[serde(rename_all = "camelCase")]
    PropertyRenamed {
        parent_id: NodeId,
        old_name: String,
        new_name: String,
    },

    #[serde(rename_all = "camelCase")]
    RequiredChanged {
        parent_id: NodeId,
        name: String,
        required: bool,
    },

    #[serde(rename_all = "camelCase")]
    PropertyMoved {
        parent_id: NodeId,
        name: String,
        index: usize,
    },

    /// A node's fragment was replaced wholesale
    #[serde(rename_all = "camelCase")]
    SchemaReplaced { id: NodeId },
}

impl TreeEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            TreeEvent::NodeRegistered { .. } => "node:registered",
            TreeEvent::NodeDeregistered { .. } => "node:deregistered",
            TreeEvent::ChildRemoved { .. } => "child:removed",
            TreeEvent::PropertyAdded { .. } => "property:added",
            TreeEvent::PropertyWritten { .. } => "property:written",
            TreeEvent::PropertyDeleted { .. } => "property:deleted",
            TreeEvent::PropertyRenamed { .. } => "property:renamed",
            TreeEvent::RequiredChanged { .. } => "property:required",
            TreeEvent::PropertyMoved { .. } => "property:moved",
            TreeEvent::SchemaReplaced { .. } => "schema:replaced",
        }
    }

    /// Registry bookkeeping events, as opposed to changes a view re-renders for
    pub fn is_registry_event(&self) -> bool {
        matches!(
            self,
            TreeEvent::NodeRegistered { .. } | TreeEvent::NodeDeregistered { .. }
        )
    }
}

/// Callback invoked after each mutation
pub type ChangeListener = Box<dyn FnMut(&TreeEvent) + Send>;
