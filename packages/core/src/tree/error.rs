//! Error types for schema tree operations
//!
//! Idempotent operations (removing a child that is not attached, deleting a
//! property that does not exist) are not errors and never produce one of these.

use crate::models::{NodeId, SchemaError, SchemaType};
use thiserror::Error;

/// Errors that can occur while editing a schema tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaTreeError {
    /// Referenced node is not registered in this tree
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// Property operations need an object node
    #[error("Node {id} is not an object schema (found '{found}')")]
    NotAnObject { id: NodeId, found: SchemaType },

    #[error("Property '{name}' not found on node {parent_id}")]
    PropertyNotFound { parent_id: NodeId, name: String },

    /// Sibling names must be unique
    #[error("Property '{name}' already exists on node {parent_id}")]
    DuplicateProperty { parent_id: NodeId, name: String },

    #[error("Invalid property name: {0:?}")]
    InvalidPropertyName(String),

    /// A node with this id is already part of the tree
    #[error("Node {id} is already registered")]
    AlreadyRegistered { id: NodeId },

    #[error("Schema nesting exceeds the maximum depth of {max_depth}")]
    TooDeep { max_depth: usize },

    /// Properties, required, orders and children disagree
    #[error("Tree inconsistency at '{path}': {reason}")]
    Inconsistent { path: String, reason: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SchemaTreeError {
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    pub fn property_not_found(parent_id: NodeId, name: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            parent_id,
            name: name.into(),
        }
    }

    pub fn duplicate_property(parent_id: NodeId, name: impl Into<String>) -> Self {
        Self::DuplicateProperty {
            parent_id,
            name: name.into(),
        }
    }

    pub fn inconsistent(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaTreeError>;
