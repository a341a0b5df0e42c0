//! Tests for schema fragments and object bookkeeping

#[cfg(test)]
mod tests {
    use crate::models::{ObjectSchema, Schema, SchemaError, SchemaKind, SchemaType};
    use serde_json::json;

    fn user_schema() -> Schema {
        Schema::from_value(json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "age": { "type": "integer" }
            },
            "required": ["id", "age"],
            "x-apicat-orders": ["name", "age", "id"]
        }))
        .unwrap()
    }

    #[test]
    fn test_default_object_schema_is_empty() {
        let schema = Schema::default_for(SchemaType::Object);
        let object = schema.as_object().unwrap();

        assert!(object.properties.is_empty());
        assert!(object.required.is_empty());
        assert!(object.orders.is_empty());
        assert_eq!(
            schema.to_value(),
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "x-apicat-orders": []
            })
        );
    }

    #[test]
    fn test_default_for_every_type() {
        for schema_type in [
            SchemaType::Object,
            SchemaType::Array,
            SchemaType::String,
            SchemaType::Number,
            SchemaType::Integer,
            SchemaType::Boolean,
            SchemaType::Null,
            SchemaType::Any,
        ] {
            assert_eq!(Schema::default_for(schema_type).schema_type(), schema_type);
        }
    }

    #[test]
    fn test_add_property_inserts_fragment() {
        let mut schema = Schema::default_for(SchemaType::Object);
        let object = schema.as_object_mut().unwrap();
        object.add_property("age", Schema::default_for(SchemaType::Integer));

        assert_eq!(
            schema.to_value()["properties"],
            json!({ "age": { "type": "integer" } })
        );
        // Only properties are touched
        assert!(schema.as_object().unwrap().required.is_empty());
        assert!(schema.as_object().unwrap().orders.is_empty());
    }

    #[test]
    fn test_delete_property_clears_all_three_collections() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        let removed = object.delete_property("age");

        assert_eq!(removed, Some(Schema::default_for(SchemaType::Integer)));
        assert!(!object.properties.contains_key("age"));
        assert_eq!(object.required, vec!["id"]);
        assert_eq!(object.orders, vec!["name", "id"]);
    }

    #[test]
    fn test_delete_property_twice_is_a_noop() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        object.delete_property("age");
        let after_first = object.clone();
        assert!(object.delete_property("age").is_none());
        assert_eq!(*object, after_first);
    }

    #[test]
    fn test_delete_property_on_empty_object() {
        let mut schema = Schema::default_for(SchemaType::Object);
        let object = schema.as_object_mut().unwrap();
        assert!(object.delete_property("missing").is_none());
        assert!(object.properties.is_empty());
    }

    #[test]
    fn test_rename_preserves_positions() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        object.rename_property("age", "years").unwrap();

        let keys: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "years"]);
        assert_eq!(object.required, vec!["id", "years"]);
        assert_eq!(object.orders, vec!["name", "years", "id"]);
        assert_eq!(
            object.properties["years"],
            Schema::default_for(SchemaType::Integer)
        );
    }

    #[test]
    fn test_rename_keeps_middle_position() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        object.rename_property("name", "full_name").unwrap();

        let keys: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "full_name", "age"]);
        assert_eq!(object.orders[0], "full_name");
    }

    #[test]
    fn test_rename_errors() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        assert_eq!(
            object.rename_property("missing", "other"),
            Err(SchemaError::PropertyNotFound("missing".to_string()))
        );
        assert_eq!(
            object.rename_property("age", "id"),
            Err(SchemaError::DuplicateProperty("id".to_string()))
        );
        assert_eq!(
            object.rename_property("age", ""),
            Err(SchemaError::EmptyPropertyName)
        );
        // Same name is accepted and changes nothing
        let before = object.clone();
        object.rename_property("age", "age").unwrap();
        assert_eq!(*object, before);
    }

    #[test]
    fn test_set_required_has_set_semantics() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        assert!(!object.set_required("id", true).unwrap());
        assert!(object.set_required("name", true).unwrap());
        assert_eq!(object.required, vec!["id", "age", "name"]);

        assert!(object.set_required("id", false).unwrap());
        assert!(!object.set_required("id", false).unwrap());
        assert_eq!(object.required, vec!["age", "name"]);

        assert!(object.set_required("ghost", true).is_err());
    }

    #[test]
    fn test_move_property_clamps_index() {
        let mut schema = user_schema();
        let object = schema.as_object_mut().unwrap();

        object.move_property("id", 0).unwrap();
        assert_eq!(object.orders, vec!["id", "name", "age"]);

        object.move_property("id", 99).unwrap();
        assert_eq!(object.orders, vec!["name", "age", "id"]);

        assert!(object.move_property("ghost", 0).is_err());
    }

    #[test]
    fn test_ordered_names_puts_untracked_last() {
        let schema = Schema::from_value(json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" },
                "c": { "type": "string" }
            },
            "x-apicat-orders": ["c", "stale", "a"]
        }))
        .unwrap();

        let object = schema.as_object().unwrap();
        assert_eq!(object.ordered_names(), vec!["c", "a", "b"]);
        assert_eq!(object.dangling_names(), vec!["stale"]);
    }

    #[test]
    fn test_ordered_names_on_wide_object() {
        let mut object = ObjectSchema::new();
        for i in 0..2000 {
            object.add_property(format!("field_{}", i), Schema::default_for(SchemaType::String));
        }
        object.orders = (1000..2000).rev().map(|i| format!("field_{}", i)).collect();
        object.orders.push("field_1999".to_string());
        object.orders.push("ghost".to_string());

        let names = object.ordered_names();

        assert_eq!(names.len(), 2000);
        assert_eq!(names[0], "field_1999");
        assert_eq!(names[999], "field_1000");
        assert_eq!(names[1000], "field_0");
        assert_eq!(names[1999], "field_999");
    }

    #[test]
    fn test_import_normalizes_missing_lists() {
        let schema = Schema::from_value(json!({ "type": "object" })).unwrap();
        assert_eq!(
            schema.to_value(),
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "x-apicat-orders": []
            })
        );
    }

    #[test]
    fn test_import_drops_duplicate_required_names() {
        let schema = Schema::from_value(json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a", "a"]
        }))
        .unwrap();
        assert_eq!(schema.as_object().unwrap().required, vec!["a"]);
    }

    #[test]
    fn test_unknown_keywords_survive_round_trip() {
        let value = json!({
            "type": "string",
            "description": "user email",
            "format": "email",
            "x-apicat-mock": "email",
            "enum": ["a@b.c"]
        });

        let schema = Schema::from_value(value.clone()).unwrap();
        assert_eq!(schema.description.as_deref(), Some("user email"));
        assert!(schema.extra.contains_key("x-apicat-mock"));
        assert_eq!(schema.to_value(), value);
    }

    #[test]
    fn test_untyped_fragment_is_any() {
        let schema = Schema::from_value(json!({ "$ref": "#/definitions/schemas/1" })).unwrap();
        assert_eq!(schema.schema_type(), SchemaType::Any);
        assert_eq!(schema.to_value(), json!({ "$ref": "#/definitions/schemas/1" }));
    }

    #[test]
    fn test_array_without_items_defaults_to_any() {
        let schema = Schema::from_value(json!({ "type": "array", "minItems": 1 })).unwrap();
        let array = schema.as_array().unwrap();
        assert_eq!(array.items.schema_type(), SchemaType::Any);
        assert_eq!(array.min_items, Some(1));
    }

    #[test]
    fn test_type_union_is_kept_as_any() {
        let value = json!({
            "type": "object",
            "properties": {
                "nickname": { "type": ["string", "null"], "maxLength": 20 }
            },
            "required": [],
            "x-apicat-orders": ["nickname"]
        });

        let schema = Schema::from_value(value.clone()).unwrap();

        let nickname = &schema.as_object().unwrap().properties["nickname"];
        assert_eq!(nickname.schema_type(), SchemaType::Any);
        assert_eq!(nickname.extra["type"], json!(["string", "null"]));
        assert_eq!(schema.to_value(), value);
    }

    #[test]
    fn test_tuple_items_are_kept_as_any() {
        let value = json!({
            "type": "array",
            "items": [{ "type": "string" }, { "type": "integer" }],
            "minItems": 2
        });

        let schema = Schema::from_value(value.clone()).unwrap();

        assert_eq!(schema.schema_type(), SchemaType::Any);
        assert!(schema.as_array().is_none());
        assert_eq!(schema.depth(), 1);
        let written = schema.to_value();
        assert_eq!(written, value);
        let keys: Vec<&str> = written.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys[0], "type");
    }

    #[test]
    fn test_explicit_any_tag_survives_round_trip() {
        let value = json!({ "type": "any", "description": "free form" });

        let schema = Schema::from_value(value.clone()).unwrap();

        assert_eq!(schema.schema_type(), SchemaType::Any);
        assert_eq!(schema.to_value(), value);
        assert_eq!(Schema::default_for(SchemaType::Any).to_value(), json!({}));
    }

    #[test]
    fn test_conversion_errors() {
        assert!(matches!(
            Schema::from_value(json!("object")),
            Err(SchemaError::NotAnObject(_))
        ));
        assert_eq!(
            Schema::from_value(json!({ "type": "decimal" })),
            Err(SchemaError::UnknownType("decimal".to_string()))
        );
        assert!(matches!(
            Schema::from_value(json!({ "type": "object", "required": [1] })),
            Err(SchemaError::InvalidField { .. })
        ));
        assert!(matches!(
            Schema::from_value(json!({ "type": "string", "minLength": -1 })),
            Err(SchemaError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_serde_goes_through_wire_format() {
        let json = r#"{"type":"object","properties":{"b":{"type":"boolean"},"a":{"type":"null"}}}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();

        let object = schema.as_object().unwrap();
        let keys: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(matches!(object.properties["a"].kind, SchemaKind::Null));

        let written = serde_json::to_string(&schema).unwrap();
        assert_eq!(
            written,
            r#"{"type":"object","properties":{"b":{"type":"boolean"},"a":{"type":"null"}},"required":[],"x-apicat-orders":[]}"#
        );
    }

    #[test]
    fn test_depth() {
        assert_eq!(Schema::default_for(SchemaType::String).depth(), 1);
        assert_eq!(user_schema().depth(), 2);

        let nested = Schema::from_value(json!({
            "type": "array",
            "items": { "type": "object", "properties": { "x": { "type": "array" } } }
        }))
        .unwrap();
        assert_eq!(nested.depth(), 4);
    }
}
