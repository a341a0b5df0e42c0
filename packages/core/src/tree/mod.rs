//! Schema Tree
//!
//! [`SchemaTree`] owns every node of one editable schema and keeps three views
//! of the same data in agreement:
//!
//! - the node structure (`parent` / `children` links),
//! - the [`NodeRegistry`] side index,
//! - each object or array node's materialized fragment.
//!
//! # Write-through
//!
//! A node's fragment includes its descendants. Every mutation writes the
//! changed node's fragment into its parent's `properties` (or `items`) and so
//! on up to the root, so `tree.to_schema()` is always the current document and
//! a parent never holds a stale copy of a child.
//!
//! # Examples
//!
//! ```rust
//! use apicat_schema::models::{SchemaNode, SchemaType};
//! use apicat_schema::tree::SchemaTree;
//! use serde_json::json;
//!
//! let mut tree = SchemaTree::new(SchemaType::Object);
//! let root = tree.root();
//! tree.insert_property(root, SchemaNode::with_type("age", SchemaType::Integer), true)
//!     .unwrap();
//!
//! assert_eq!(
//!     tree.to_json(),
//!     json!({
//!         "type": "object",
//!         "properties": { "age": { "type": "integer" } },
//!         "required": ["age"],
//!         "x-apicat-orders": ["age"]
//!     })
//! );
//! ```

mod error;
mod events;
mod object;
mod registry;

pub use error::{Result, SchemaTreeError};
pub use events::{ChangeListener, TreeEvent};
pub use registry::NodeRegistry;

use crate::config::EditorConfig;
use crate::models::{NodeId, Schema, SchemaKind, SchemaNode, SchemaType, ITEMS_NODE_NAME};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

pub struct SchemaTree {
    registry: NodeRegistry,
    root: NodeId,
    config: EditorConfig,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for SchemaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTree")
            .field("root", &self.root)
            .field("nodes", &self.registry.len())
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SchemaTree {
    /// Create a tree whose root holds the default fragment for `root_type`
    pub fn new(root_type: SchemaType) -> Self {
        Self::build(
            SchemaNode::with_type("", root_type),
            EditorConfig::default(),
        )
    }

    /// Build a tree from an existing fragment with the default configuration
    pub fn from_schema(schema: Schema) -> Result<Self> {
        Self::with_config(schema, EditorConfig::default())
    }

    /// Build a tree from an existing fragment
    ///
    /// Object children are created in display order.
    pub fn with_config(schema: Schema, config: EditorConfig) -> Result<Self> {
        config.validate().map_err(SchemaTreeError::Config)?;
        check_depth(schema.depth(), config.max_depth)?;
        Ok(Self::build(SchemaNode::new("", schema), config))
    }

    pub fn from_json(value: Value) -> Result<Self> {
        Self::from_schema(Schema::try_from(value)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| SchemaTreeError::InvalidJson(e.to_string()))?;
        Self::from_json(value)
    }

    fn build(root: SchemaNode, config: EditorConfig) -> Self {
        let mut tree = Self {
            registry: NodeRegistry::new(),
            root: root.id(),
            config,
            listeners: Vec::new(),
        };
        tree.attach_subtree(root, None);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.registry.get(id)
    }

    /// Number of nodes currently in the tree
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Attached children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> Vec<&SchemaNode> {
        self.registry
            .get(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.registry.get(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn child_by_name(&self, parent_id: NodeId, name: &str) -> Option<&SchemaNode> {
        self.children(parent_id)
            .into_iter()
            .find(|child| child.name == name)
    }

    /// Dotted location of a node, `$` for the root (e.g. `$.user.age`)
    pub fn path(&self, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.registry.get(id)?;
        while let Some(parent_id) = current.parent {
            names.push(current.name.as_str());
            current = self.registry.get(parent_id)?;
        }

        let mut path = String::from("$");
        for name in names.iter().rev() {
            path.push('.');
            path.push_str(name);
        }
        Some(path)
    }

    /// Depth of a node, the root being at depth 1
    fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 1;
        let mut current = self.registry.get(id).and_then(|node| node.parent);
        while let Some(parent_id) = current {
            depth += 1;
            current = self.registry.get(parent_id).and_then(|node| node.parent);
        }
        depth
    }

    /// The whole document
    pub fn to_schema(&self) -> Schema {
        self.registry
            .get(self.root)
            .map(|root| root.schema.clone())
            .unwrap_or_else(|| Schema::default_for(SchemaType::Any))
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.to_schema())
    }

    /// Register a listener invoked synchronously after every mutation
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&TreeEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: TreeEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Replace a node's fragment, rebuilding its subtree from the new fragment
    pub fn update_schema(&mut self, id: NodeId, schema: Schema) -> Result<()> {
        let node = self
            .registry
            .get(id)
            .ok_or_else(|| SchemaTreeError::node_not_found(id))?;
        check_depth(self.depth_of(id) - 1 + schema.depth(), self.config.max_depth)?;

        for child in node.children.clone() {
            self.deregister_subtree(child);
        }
        if let Some(node) = self.registry.get_mut(id) {
            node.schema = schema;
            node.children.clear();
        }
        self.build_children(id);
        self.sync_ancestors(id);

        tracing::debug!("Replaced schema of node {}", id);
        self.emit(TreeEvent::SchemaReplaced { id });
        Ok(())
    }

    /// Verify that children, properties, required and orders agree everywhere
    pub fn check_consistency(&self) -> Result<()> {
        let mut pending = vec![self.root];
        let mut reachable = 0usize;

        while let Some(id) = pending.pop() {
            let node = self
                .registry
                .get(id)
                .ok_or_else(|| SchemaTreeError::node_not_found(id))?;
            reachable += 1;
            let path = self.path(id).unwrap_or_default();

            let mut children = Vec::with_capacity(node.children.len());
            for child_id in &node.children {
                let child = self.registry.get(*child_id).ok_or_else(|| {
                    SchemaTreeError::inconsistent(&path, format!("child {} is not registered", child_id))
                })?;
                if child.parent != Some(id) {
                    return Err(SchemaTreeError::inconsistent(
                        &path,
                        format!("child '{}' does not point back to its parent", child.name),
                    ));
                }
                children.push(child);
            }

            match &node.schema.kind {
                SchemaKind::Object(object) => {
                    if children.len() != object.properties.len() {
                        return Err(SchemaTreeError::inconsistent(
                            &path,
                            format!(
                                "{} properties but {} child nodes",
                                object.properties.len(),
                                children.len()
                            ),
                        ));
                    }
                    let mut seen = HashSet::new();
                    for child in &children {
                        if !seen.insert(child.name.as_str()) {
                            return Err(SchemaTreeError::inconsistent(
                                &path,
                                format!("duplicate child name '{}'", child.name),
                            ));
                        }
                        if object.properties.get(&child.name) != Some(&child.schema) {
                            return Err(SchemaTreeError::inconsistent(
                                &path,
                                format!("property '{}' differs from its child node", child.name),
                            ));
                        }
                    }
                    if let Some(name) = object.dangling_names().first() {
                        return Err(SchemaTreeError::inconsistent(
                            &path,
                            format!("'{}' is listed in required or orders but is not a property", name),
                        ));
                    }
                }
                SchemaKind::Array(array) => {
                    let items_match = matches!(
                        children.as_slice(),
                        [child] if child.name == ITEMS_NODE_NAME && child.schema == *array.items
                    );
                    if !items_match {
                        return Err(SchemaTreeError::inconsistent(
                            &path,
                            "array items differ from its items node",
                        ));
                    }
                }
                _ => {
                    if !children.is_empty() {
                        return Err(SchemaTreeError::inconsistent(
                            &path,
                            format!("{} node has child nodes", node.schema.schema_type()),
                        ));
                    }
                }
            }

            pending.extend(node.children.iter().copied());
        }

        if reachable != self.registry.len() {
            return Err(SchemaTreeError::inconsistent(
                "$",
                format!(
                    "{} registered nodes but {} reachable from the root",
                    self.registry.len(),
                    reachable
                ),
            ));
        }
        Ok(())
    }

    /// Register `node` under `parent` and create nodes for its nested fragments
    fn attach_subtree(&mut self, mut node: SchemaNode, parent: Option<NodeId>) -> NodeId {
        let id = node.id();
        node.parent = parent;
        node.children.clear();
        self.registry.register_node(node);
        self.emit(TreeEvent::NodeRegistered { id });
        self.build_children(id);
        id
    }

    fn build_children(&mut self, id: NodeId) {
        let children: Vec<SchemaNode> = match self.registry.get(id).map(|node| &node.schema.kind) {
            Some(SchemaKind::Object(object)) => object
                .ordered_names()
                .into_iter()
                .filter_map(|name| {
                    object
                        .properties
                        .get(name)
                        .map(|schema| SchemaNode::new(name, schema.clone()))
                })
                .collect(),
            Some(SchemaKind::Array(array)) => {
                vec![SchemaNode::new(ITEMS_NODE_NAME, (*array.items).clone())]
            }
            _ => Vec::new(),
        };

        if let Some(node) = self.registry.get_mut(id) {
            node.children = children.iter().map(SchemaNode::id).collect();
        }
        for child in children {
            self.attach_subtree(child, Some(id));
        }
    }

    /// Deregister a node and its descendants, returning the node detached
    fn deregister_subtree(&mut self, id: NodeId) -> Option<SchemaNode> {
        let mut removed = self.registry.deregister_node(id)?;
        self.emit(TreeEvent::NodeDeregistered { id });

        let mut pending = removed.children.clone();
        while let Some(next) = pending.pop() {
            if let Some(node) = self.registry.deregister_node(next) {
                self.emit(TreeEvent::NodeDeregistered { id: next });
                pending.extend(node.children.iter().copied());
            }
        }

        removed.detach();
        Some(removed)
    }

    /// Write a node's fragment into each ancestor up to the root
    fn sync_ancestors(&mut self, id: NodeId) {
        let mut current = id;
        loop {
            let Some(node) = self.registry.get(current) else {
                break;
            };
            let Some(parent_id) = node.parent else {
                break;
            };
            let name = node.name.clone();
            let schema = node.schema.clone();

            let Some(parent) = self.registry.get_mut(parent_id) else {
                break;
            };
            match &mut parent.schema.kind {
                SchemaKind::Object(object) => object.add_property(name, schema),
                SchemaKind::Array(array) => *array.items = schema,
                _ => {}
            }
            current = parent_id;
        }
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        tracing::warn!(
            "Rejected schema of depth {} (maximum {})",
            depth,
            max_depth
        );
        return Err(SchemaTreeError::TooDeep { max_depth });
    }
    Ok(())
}
