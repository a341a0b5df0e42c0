//! Data Models
//!
//! - `Schema` - typed JSON-Schema fragment with lossless JSON conversion
//! - `ObjectSchema` - properties / required / display-order bookkeeping
//! - `SchemaNode` - one node of an editable schema tree

pub mod schema;
mod schema_node;

pub use schema::{
    ArraySchema, NumericSchema, ObjectSchema, Schema, SchemaError, SchemaKind, SchemaType,
    StringSchema, ORDERS_KEY,
};
pub use schema_node::{NodeId, SchemaNode, ITEMS_NODE_NAME};

#[cfg(test)]
mod schema_test;
