//! Schema Tree Nodes
//!
//! A [`SchemaNode`] is one editable position in a schema tree: the root
//! fragment, a property of an object, or the `items` of an array.
//!
//! Nodes built with [`SchemaNode::new`] are detached: they have no parent and
//! are not registered anywhere until inserted through
//! [`SchemaTree`](crate::tree::SchemaTree). Parent and children are stored as
//! ids; the tree owns every node, a child only points back at its parent.
//!
//! # Examples
//!
//! ```rust
//! use apicat_schema::models::{SchemaNode, SchemaType};
//!
//! let node = SchemaNode::with_type("age", SchemaType::Integer);
//! assert_eq!(node.name(), "age");
//! assert!(node.parent().is_none());
//! assert!(node.children().is_empty());
//! ```

use crate::models::schema::{Schema, SchemaType};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name given to the single child node of an array
pub const ITEMS_NODE_NAME: &str = "items";

/// Stable identity of a node for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    id: NodeId,
    pub(crate) name: String,
    pub(crate) schema: Schema,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SchemaNode {
    /// Create a detached node around an existing fragment
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            schema,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a detached node seeded with the type's default fragment
    pub fn with_type(name: impl Into<String>, schema_type: SchemaType) -> Self {
        Self::new(name, Schema::default_for(schema_type))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's fragment; for objects and arrays it includes all descendants
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema.schema_type()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attached children in insertion order (not display order)
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.children.clear();
    }
}
