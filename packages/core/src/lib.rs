//! APICat Schema Editor Core
//!
//! This crate provides the data layer of APICat's interactive JSON Schema
//! editor: typed schema fragments and an editable tree of schema nodes that
//! keeps each object's `properties`, `required` list and `x-apicat-orders`
//! display order in agreement with its child nodes.
//!
//! # Architecture
//!
//! - **Typed fragments**: one enum variant per JSON Schema `type`, converted
//!   losslessly to and from `serde_json::Value`
//! - **Tree-owned registry**: nodes live in a side index owned by the tree,
//!   no ambient shared store
//! - **Explicit notification**: listeners receive a `TreeEvent` after every
//!   mutation
//!
//! # Modules
//!
//! - [`models`] - Schema fragments and schema nodes
//! - [`tree`] - SchemaTree, NodeRegistry, TreeEvent and tree errors
//! - [`config`] - Editor configuration

pub mod config;
pub mod models;
pub mod tree;

// Re-export commonly used types
pub use config::EditorConfig;
pub use models::*;
pub use tree::{NodeRegistry, SchemaTree, SchemaTreeError, TreeEvent};
