//! Property operations on object nodes
//!
//! Two layers are exposed:
//!
//! - data-only operations:
//!   [`SchemaTree::add_property`] writes a fragment into `properties` and
//!   [`SchemaTree::remove_child`] detaches a child node. Neither touches the
//!   other half of the bookkeeping.
//! - transactional operations that keep nodes, `properties`, `required` and
//!   `x-apicat-orders` in agreement: [`SchemaTree::insert_property`],
//!   [`SchemaTree::delete_property`], [`SchemaTree::update_property_name`],
//!   [`SchemaTree::set_required`] and [`SchemaTree::move_property`].

use super::{check_depth, Result, SchemaTree, SchemaTreeError, TreeEvent};
use crate::models::{NodeId, ObjectSchema, SchemaError, SchemaNode};

impl SchemaTree {
    fn object(&self, id: NodeId) -> Result<&ObjectSchema> {
        let node = self
            .registry
            .get(id)
            .ok_or_else(|| SchemaTreeError::node_not_found(id))?;
        node.schema.as_object().ok_or(SchemaTreeError::NotAnObject {
            id,
            found: node.schema.schema_type(),
        })
    }

    fn object_mut(&mut self, id: NodeId) -> Result<&mut ObjectSchema> {
        let node = self
            .registry
            .get_mut(id)
            .ok_or_else(|| SchemaTreeError::node_not_found(id))?;
        let found = node.schema.schema_type();
        node.schema
            .as_object_mut()
            .ok_or(SchemaTreeError::NotAnObject { id, found })
    }

    fn child_id_by_name(&self, parent_id: NodeId, name: &str) -> Option<NodeId> {
        self.child_by_name(parent_id, name).map(SchemaNode::id)
    }

    /// Insert a detached node as a new property of an object node
    ///
    /// Registers the node and nodes for its nested fragment, appends it to the
    /// parent's children, writes its fragment into `properties`, tracks its
    /// name in `x-apicat-orders` (unless disabled in the config) and marks it
    /// required when asked to.
    pub fn insert_property(
        &mut self,
        parent_id: NodeId,
        node: SchemaNode,
        required: bool,
    ) -> Result<NodeId> {
        let name = node.name.clone();
        if name.is_empty() {
            return Err(SchemaTreeError::InvalidPropertyName(name));
        }

        let object = self.object(parent_id)?;
        if object.properties.contains_key(&name) || self.child_id_by_name(parent_id, &name).is_some()
        {
            tracing::warn!(
                "Rejected duplicate property '{}' on node {}",
                name,
                parent_id
            );
            return Err(SchemaTreeError::duplicate_property(parent_id, name));
        }
        if self.registry.contains(node.id()) {
            return Err(SchemaTreeError::AlreadyRegistered { id: node.id() });
        }
        check_depth(
            self.depth_of(parent_id) + node.schema.depth(),
            self.config.max_depth,
        )?;

        let child_id = self.attach_subtree(node, Some(parent_id));
        let schema = match self.registry.get(child_id) {
            Some(child) => child.schema.clone(),
            None => return Err(SchemaTreeError::node_not_found(child_id)),
        };
        if let Some(parent) = self.registry.get_mut(parent_id) {
            parent.children.push(child_id);
        }

        let track_orders = self.config.track_orders_on_insert;
        let object = self.object_mut(parent_id)?;
        object.add_property(name.clone(), schema);
        if track_orders {
            object.track_order(&name);
        }
        if required {
            object.set_required(&name, true)?;
        }
        self.sync_ancestors(parent_id);

        tracing::debug!("Inserted property '{}' under node {}", name, parent_id);
        self.emit(TreeEvent::PropertyAdded {
            parent_id,
            child_id,
            name,
        });
        Ok(child_id)
    }

    /// Write `child`'s fragment into the object's `properties` under its name
    ///
    /// Does nothing when `child` is `None`. Leaves `required`, the display
    /// order and the parent's children untouched; use
    /// [`insert_property`](Self::insert_property) to attach a node.
    pub fn add_property(&mut self, parent_id: NodeId, child: Option<&SchemaNode>) -> Result<()> {
        let Some(child) = child else {
            return Ok(());
        };

        self.object_mut(parent_id)?
            .add_property(child.name.clone(), child.schema.clone());
        self.sync_ancestors(parent_id);

        tracing::debug!("Wrote property '{}' on node {}", child.name, parent_id);
        self.emit(TreeEvent::PropertyWritten {
            parent_id,
            name: child.name.clone(),
        });
        Ok(())
    }

    /// Detach a child node and deregister it with its subtree
    ///
    /// Returns the detached node, or `None` without side effects when
    /// `child_id` is not a child of `parent_id` or the parent is not an object
    /// (an array's `items` node cannot be removed). The parent's `properties`,
    /// `required` and display order are left as they are; use
    /// [`delete_property`](Self::delete_property) to remove both at once.
    pub fn remove_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Option<SchemaNode> {
        self.object(parent_id).ok()?;
        let child = self.detach_child(parent_id, child_id)?;
        self.emit(TreeEvent::ChildRemoved {
            parent_id,
            child_id,
        });
        Some(child)
    }

    fn detach_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Option<SchemaNode> {
        let parent = self.registry.get_mut(parent_id)?;
        let index = parent.children.iter().position(|id| *id == child_id)?;
        parent.children.remove(index);

        let child = self.deregister_subtree(child_id);
        tracing::debug!("Detached node {} from node {}", child_id, parent_id);
        child
    }

    /// Remove a property: its node, its `properties` entry and every mention
    /// of its name in `required` and `x-apicat-orders`
    ///
    /// Returns the removed property as a detached node, or `None` when the
    /// object has no trace of `name` (deleting twice is harmless).
    pub fn delete_property(&mut self, parent_id: NodeId, name: &str) -> Result<Option<SchemaNode>> {
        self.object(parent_id)?;

        let detached = match self.child_id_by_name(parent_id, name) {
            Some(child_id) => self.detach_child(parent_id, child_id),
            None => None,
        };

        let object = self.object_mut(parent_id)?;
        let mentioned = object.is_required(name) || object.orders.iter().any(|one| one == name);
        let removed = object.delete_property(name);
        if detached.is_none() && removed.is_none() && !mentioned {
            return Ok(None);
        }
        self.sync_ancestors(parent_id);

        tracing::debug!("Deleted property '{}' from node {}", name, parent_id);
        self.emit(TreeEvent::PropertyDeleted {
            parent_id,
            name: name.to_string(),
        });
        Ok(detached.or_else(|| removed.map(|schema| SchemaNode::new(name, schema))))
    }

    /// Rename a property, keeping its fragment and its positions in
    /// `properties`, `required` and `x-apicat-orders`
    pub fn update_property_name(
        &mut self,
        parent_id: NodeId,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        if new_name.is_empty() {
            return Err(SchemaTreeError::InvalidPropertyName(new_name.to_string()));
        }
        let object = self.object(parent_id)?;
        if old_name == new_name {
            return Ok(());
        }
        if !object.properties.contains_key(old_name) {
            return Err(SchemaTreeError::property_not_found(parent_id, old_name));
        }
        if object.properties.contains_key(new_name)
            || self.child_id_by_name(parent_id, new_name).is_some()
        {
            tracing::warn!(
                "Rejected rename of '{}' to existing property '{}' on node {}",
                old_name,
                new_name,
                parent_id
            );
            return Err(SchemaTreeError::duplicate_property(parent_id, new_name));
        }

        let child_id = self.child_id_by_name(parent_id, old_name);
        self.object_mut(parent_id)?
            .rename_property(old_name, new_name)
            .map_err(|e| property_error(parent_id, e))?;
        if let Some(child) = child_id.and_then(|id| self.registry.get_mut(id)) {
            child.name = new_name.to_string();
        }
        self.sync_ancestors(parent_id);

        tracing::debug!(
            "Renamed property '{}' to '{}' on node {}",
            old_name,
            new_name,
            parent_id
        );
        self.emit(TreeEvent::PropertyRenamed {
            parent_id,
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    /// Mark a property as required or optional; returns whether anything changed
    pub fn set_required(&mut self, parent_id: NodeId, name: &str, required: bool) -> Result<bool> {
        let changed = self
            .object_mut(parent_id)?
            .set_required(name, required)
            .map_err(|e| property_error(parent_id, e))?;
        if !changed {
            return Ok(false);
        }
        self.sync_ancestors(parent_id);

        self.emit(TreeEvent::RequiredChanged {
            parent_id,
            name: name.to_string(),
            required,
        });
        Ok(true)
    }

    /// Move a property to `index` in the display order (clamped to the end)
    pub fn move_property(&mut self, parent_id: NodeId, name: &str, index: usize) -> Result<()> {
        let object = self.object_mut(parent_id)?;
        object
            .move_property(name, index)
            .map_err(|e| property_error(parent_id, e))?;
        let index = object
            .orders
            .iter()
            .position(|one| one == name)
            .unwrap_or_default();
        self.sync_ancestors(parent_id);

        self.emit(TreeEvent::PropertyMoved {
            parent_id,
            name: name.to_string(),
            index,
        });
        Ok(())
    }
}

fn property_error(parent_id: NodeId, error: SchemaError) -> SchemaTreeError {
    match error {
        SchemaError::PropertyNotFound(name) => SchemaTreeError::property_not_found(parent_id, name),
        SchemaError::DuplicateProperty(name) => SchemaTreeError::duplicate_property(parent_id, name),
        SchemaError::EmptyPropertyName => SchemaTreeError::InvalidPropertyName(String::new()),
        other => SchemaTreeError::Schema(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::models::{Schema, SchemaType};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recorded(tree: &mut SchemaTree) -> Arc<Mutex<Vec<TreeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        tree.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_insert_property_updates_all_bookkeeping() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();

        let id = tree
            .insert_property(root, SchemaNode::with_type("age", SchemaType::Integer), true)
            .unwrap();

        let child = tree.node(id).unwrap();
        assert_eq!(child.parent(), Some(root));
        assert_eq!(tree.node(root).unwrap().children(), &[id]);

        let object = tree.node(root).unwrap().schema().as_object().unwrap();
        assert_eq!(object.properties["age"], *child.schema());
        assert_eq!(object.required, vec!["age"]);
        assert_eq!(object.orders, vec!["age"]);
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_without_order_tracking() {
        let config = EditorConfig {
            track_orders_on_insert: false,
            ..EditorConfig::default()
        };
        let mut tree =
            SchemaTree::with_config(Schema::default_for(SchemaType::Object), config).unwrap();
        let root = tree.root();

        tree.insert_property(root, SchemaNode::with_type("a", SchemaType::String), false)
            .unwrap();

        let object = tree.node(root).unwrap().schema().as_object().unwrap();
        assert!(object.orders.is_empty());
        assert!(object.required.is_empty());
    }

    #[test]
    fn test_insert_rejects_bad_input() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        tree.insert_property(root, SchemaNode::with_type("a", SchemaType::String), false)
            .unwrap();

        assert!(matches!(
            tree.insert_property(root, SchemaNode::with_type("a", SchemaType::Integer), false),
            Err(SchemaTreeError::DuplicateProperty { .. })
        ));
        assert!(matches!(
            tree.insert_property(root, SchemaNode::with_type("", SchemaType::Integer), false),
            Err(SchemaTreeError::InvalidPropertyName(_))
        ));
        assert!(matches!(
            tree.insert_property(NodeId::new(), SchemaNode::with_type("b", SchemaType::Integer), false),
            Err(SchemaTreeError::NodeNotFound { .. })
        ));

        let a = tree.child_by_name(root, "a").unwrap().id();
        assert_eq!(
            tree.insert_property(a, SchemaNode::with_type("b", SchemaType::Integer), false),
            Err(SchemaTreeError::NotAnObject {
                id: a,
                found: SchemaType::String
            })
        );
    }

    #[test]
    fn test_insert_nested_object_registers_descendants() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let address = Schema::from_value(json!({
            "type": "object",
            "properties": { "city": { "type": "string" }, "zip": { "type": "string" } }
        }))
        .unwrap();

        let id = tree
            .insert_property(root, SchemaNode::new("address", address), false)
            .unwrap();

        assert_eq!(tree.children(id).len(), 2);
        assert_eq!(tree.len(), 4);
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_edit_in_nested_object_reaches_root() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let user = tree
            .insert_property(root, SchemaNode::with_type("user", SchemaType::Object), false)
            .unwrap();

        tree.insert_property(user, SchemaNode::with_type("email", SchemaType::String), true)
            .unwrap();

        assert_eq!(
            tree.to_json()["properties"]["user"],
            json!({
                "type": "object",
                "properties": { "email": { "type": "string" } },
                "required": ["email"],
                "x-apicat-orders": ["email"]
            })
        );
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_add_property_none_is_noop() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let before = tree.to_json();

        let events = recorded(&mut tree);

        tree.add_property(root, None).unwrap();

        assert_eq!(tree.to_json(), before);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_add_property_notifies_listeners() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let events = recorded(&mut tree);
        let age = SchemaNode::with_type("age", SchemaType::Integer);

        tree.add_property(root, Some(&age)).unwrap();

        assert_eq!(
            tree.to_json()["properties"],
            json!({ "age": { "type": "integer" } })
        );
        assert_eq!(
            *events.lock().unwrap(),
            vec![TreeEvent::PropertyWritten {
                parent_id: root,
                name: "age".to_string(),
            }]
        );
    }

    #[test]
    fn test_insert_past_max_depth_changes_nothing() {
        let config = EditorConfig {
            max_depth: 2,
            ..EditorConfig::default()
        };
        let mut tree =
            SchemaTree::with_config(Schema::default_for(SchemaType::Object), config).unwrap();
        let root = tree.root();
        let events = recorded(&mut tree);
        let before = tree.to_json();

        let result = tree.insert_property(
            root,
            SchemaNode::with_type("tags", SchemaType::Array),
            false,
        );

        assert_eq!(result, Err(SchemaTreeError::TooDeep { max_depth: 2 }));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.to_json(), before);
        assert!(events.lock().unwrap().is_empty());

        tree.insert_property(root, SchemaNode::with_type("name", SchemaType::String), false)
            .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_remove_child_ignores_array_items() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let tags = tree
            .insert_property(root, SchemaNode::with_type("tags", SchemaType::Array), false)
            .unwrap();
        let items = tree.children(tags)[0].id();
        let events = recorded(&mut tree);

        assert!(tree.remove_child(tags, items).is_none());

        assert!(tree.node(items).is_some());
        assert!(events.lock().unwrap().is_empty());
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_child_leaves_schema_data() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let id = tree
            .insert_property(root, SchemaNode::with_type("a", SchemaType::String), true)
            .unwrap();

        let detached = tree.remove_child(root, id).unwrap();

        assert_eq!(detached.id(), id);
        assert!(detached.parent().is_none());
        let object = tree.node(root).unwrap().schema().as_object().unwrap();
        assert!(object.properties.contains_key("a"));
        assert!(tree.check_consistency().is_err());
    }

    #[test]
    fn test_delete_property_is_transactional() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let id = tree
            .insert_property(root, SchemaNode::with_type("a", SchemaType::String), true)
            .unwrap();
        let events = recorded(&mut tree);

        let detached = tree.delete_property(root, "a").unwrap().unwrap();

        assert_eq!(detached.id(), id);
        assert!(detached.parent().is_none());
        assert!(!tree.registry().contains(id));
        assert_eq!(
            tree.to_json(),
            json!({ "type": "object", "properties": {}, "required": [], "x-apicat-orders": [] })
        );
        tree.check_consistency().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                TreeEvent::NodeDeregistered { id },
                TreeEvent::PropertyDeleted {
                    parent_id: root,
                    name: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_delete_property_after_remove_child_cleans_data() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let id = tree
            .insert_property(root, SchemaNode::with_type("a", SchemaType::String), true)
            .unwrap();
        tree.remove_child(root, id);

        let removed = tree.delete_property(root, "a").unwrap().unwrap();

        assert_eq!(removed.name(), "a");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_delete_missing_property_is_silent() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        let events = recorded(&mut tree);

        assert!(tree.delete_property(root, "ghost").unwrap().is_none());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rename_property_keeps_node_identity() {
        let mut tree = SchemaTree::from_json(json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } },
            "required": ["b"],
            "x-apicat-orders": ["b", "a"]
        }))
        .unwrap();
        let root = tree.root();
        let b = tree.child_by_name(root, "b").unwrap().id();

        tree.update_property_name(root, "b", "count").unwrap();

        assert_eq!(tree.node(b).unwrap().name(), "count");
        let object = tree.node(root).unwrap().schema().as_object().unwrap();
        let keys: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "count"]);
        assert_eq!(object.required, vec!["count"]);
        assert_eq!(object.orders, vec!["count", "a"]);
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_rename_errors() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        tree.insert_property(root, SchemaNode::with_type("a", SchemaType::String), false)
            .unwrap();
        tree.insert_property(root, SchemaNode::with_type("b", SchemaType::String), false)
            .unwrap();

        assert!(matches!(
            tree.update_property_name(root, "a", "b"),
            Err(SchemaTreeError::DuplicateProperty { .. })
        ));
        assert!(matches!(
            tree.update_property_name(root, "ghost", "c"),
            Err(SchemaTreeError::PropertyNotFound { .. })
        ));
        assert!(matches!(
            tree.update_property_name(root, "a", ""),
            Err(SchemaTreeError::InvalidPropertyName(_))
        ));
        tree.update_property_name(root, "a", "a").unwrap();
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_set_required_and_move_emit_events() {
        let mut tree = SchemaTree::new(SchemaType::Object);
        let root = tree.root();
        for name in ["a", "b", "c"] {
            tree.insert_property(root, SchemaNode::with_type(name, SchemaType::String), false)
                .unwrap();
        }
        let events = recorded(&mut tree);

        assert!(tree.set_required(root, "b", true).unwrap());
        assert!(!tree.set_required(root, "b", true).unwrap());
        tree.move_property(root, "c", 0).unwrap();

        let object = tree.node(root).unwrap().schema().as_object().unwrap();
        assert_eq!(object.required, vec!["b"]);
        assert_eq!(object.orders, vec!["c", "a", "b"]);

        let types: Vec<&str> = events
            .lock()
            .unwrap()
            .iter()
            .map(TreeEvent::event_type)
            .collect();
        assert_eq!(types, vec!["property:required", "property:moved"]);

        assert!(matches!(
            tree.move_property(root, "ghost", 0),
            Err(SchemaTreeError::PropertyNotFound { .. })
        ));
    }
}
