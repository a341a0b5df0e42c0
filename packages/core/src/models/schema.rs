//! Typed Schema Fragments
//!
//! A [`Schema`] is one JSON-Schema-shaped fragment. The `type` keyword selects a
//! [`SchemaKind`] variant, and each variant carries only the keywords that are
//! meaningful for it. Keywords the editor does not model are kept verbatim in
//! [`Schema::extra`] so a fragment survives an import/export cycle unchanged.
//!
//! # Wire Format
//!
//! Object fragments are always written with all three bookkeeping keys:
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": { "age": { "type": "integer" } },
//!   "required": ["age"],
//!   "x-apicat-orders": ["age"]
//! }
//! ```
//!
//! A fragment without a `type` keyword is the "any" schema.
//!
//! # Examples
//!
//! ```rust
//! use apicat_schema::models::{Schema, SchemaType};
//! use serde_json::json;
//!
//! let mut schema = Schema::default_for(SchemaType::Object);
//! let object = schema.as_object_mut().unwrap();
//! object.add_property("age", Schema::default_for(SchemaType::Integer));
//!
//! assert_eq!(
//!     schema.to_value(),
//!     json!({
//!         "type": "object",
//!         "properties": { "age": { "type": "integer" } },
//!         "required": [],
//!         "x-apicat-orders": []
//!     })
//! );
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Vendor extension key holding the display order of an object's properties
pub const ORDERS_KEY: &str = "x-apicat-orders";

/// Errors raised while reading or editing a schema fragment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Expected a JSON object for a schema fragment, got {0}")]
    NotAnObject(String),

    #[error("Unknown schema type: {0}")]
    UnknownType(String),

    #[error("Invalid '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Property already exists: {0}")]
    DuplicateProperty(String),

    #[error("Property name cannot be empty")]
    EmptyPropertyName,
}

impl SchemaError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// The `type` keyword of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Any,
}

impl SchemaType {
    /// Wire value of the `type` keyword, `None` for the untyped "any" schema
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            SchemaType::Object => Some("object"),
            SchemaType::Array => Some("array"),
            SchemaType::String => Some("string"),
            SchemaType::Number => Some("number"),
            SchemaType::Integer => Some("integer"),
            SchemaType::Boolean => Some("boolean"),
            SchemaType::Null => Some("null"),
            SchemaType::Any => None,
        }
    }

    pub fn parse(value: &str) -> Result<Self, SchemaError> {
        match value {
            "object" => Ok(SchemaType::Object),
            "array" => Ok(SchemaType::Array),
            "string" => Ok(SchemaType::String),
            "number" => Ok(SchemaType::Number),
            "integer" => Ok(SchemaType::Integer),
            "boolean" => Ok(SchemaType::Boolean),
            "null" => Ok(SchemaType::Null),
            "any" => Ok(SchemaType::Any),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("any"))
    }
}

/// Payload of an `object` fragment
///
/// `properties` keeps insertion order. `orders` is the user-facing display
/// order and is independent of it. `required` has set semantics: names are
/// never added twice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub orders: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `properties[name]`
    ///
    /// Leaves `required` and `orders` untouched. Overwriting keeps the
    /// property's position in the insertion order.
    pub fn add_property(&mut self, name: impl Into<String>, schema: Schema) {
        self.properties.insert(name.into(), schema);
    }

    /// Remove a property and every reference to its name
    ///
    /// Returns the removed fragment. Removing a name that is not present is a
    /// no-op apart from dropping stray `required` / `orders` entries.
    pub fn delete_property(&mut self, name: &str) -> Option<Schema> {
        let removed = self.properties.shift_remove(name);
        self.required.retain(|one| one != name);
        self.orders.retain(|one| one != name);
        removed
    }

    /// Rename a property in place across `properties`, `required` and `orders`
    pub fn rename_property(&mut self, old_name: &str, new_name: &str) -> Result<(), SchemaError> {
        if new_name.is_empty() {
            return Err(SchemaError::EmptyPropertyName);
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.properties.contains_key(new_name) {
            return Err(SchemaError::DuplicateProperty(new_name.to_string()));
        }

        let (index, _, schema) = self
            .properties
            .shift_remove_full(old_name)
            .ok_or_else(|| SchemaError::PropertyNotFound(old_name.to_string()))?;
        self.properties.shift_insert(index, new_name.to_string(), schema);

        for name in self.required.iter_mut().chain(self.orders.iter_mut()) {
            if name == old_name {
                *name = new_name.to_string();
            }
        }
        Ok(())
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|one| one == name)
    }

    /// Add or remove `name` from `required`, returning whether anything changed
    pub fn set_required(&mut self, name: &str, required: bool) -> Result<bool, SchemaError> {
        if !self.properties.contains_key(name) {
            return Err(SchemaError::PropertyNotFound(name.to_string()));
        }

        let present = self.is_required(name);
        match (present, required) {
            (false, true) => self.required.push(name.to_string()),
            (true, false) => self.required.retain(|one| one != name),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Append `name` to the display order if it is not tracked yet
    pub fn track_order(&mut self, name: &str) {
        if !self.orders.iter().any(|one| one == name) {
            self.orders.push(name.to_string());
        }
    }

    /// Move `name` to `index` in the display order (index is clamped)
    pub fn move_property(&mut self, name: &str, index: usize) -> Result<(), SchemaError> {
        if !self.properties.contains_key(name) {
            return Err(SchemaError::PropertyNotFound(name.to_string()));
        }

        self.orders.retain(|one| one != name);
        let index = index.min(self.orders.len());
        self.orders.insert(index, name.to_string());
        Ok(())
    }

    /// Property names in display order
    ///
    /// Names listed in `orders` come first, followed by any remaining
    /// properties in insertion order. Stale `orders` entries are skipped.
    pub fn ordered_names(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.properties.len());
        let mut names = Vec::with_capacity(self.properties.len());
        let tracked = self
            .orders
            .iter()
            .filter(|name| self.properties.contains_key(name.as_str()));

        for name in tracked.chain(self.properties.keys()) {
            if seen.insert(name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }

    /// Names in `required` or `orders` that have no matching property
    pub fn dangling_names(&self) -> Vec<&str> {
        self.required
            .iter()
            .chain(self.orders.iter())
            .filter(|name| !self.properties.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    fn take_from(map: &mut Map<String, Value>) -> Result<Self, SchemaError> {
        let properties = match map.remove("properties") {
            None | Some(Value::Null) => IndexMap::new(),
            Some(Value::Object(entries)) => entries
                .into_iter()
                .map(|(name, value)| Schema::try_from(value).map(|schema| (name, schema)))
                .collect::<Result<IndexMap<_, _>, SchemaError>>()?,
            Some(other) => {
                return Err(SchemaError::invalid_field(
                    "properties",
                    format!("expected an object, got {}", describe(&other)),
                ))
            }
        };

        Ok(Self {
            properties,
            required: take_name_list(map, "required")?,
            orders: take_name_list(map, ORDERS_KEY)?,
        })
    }

    fn write_into(self, map: &mut Map<String, Value>) {
        let properties: Map<String, Value> = self
            .properties
            .into_iter()
            .map(|(name, schema)| (name, Value::from(schema)))
            .collect();
        map.insert("properties".to_string(), Value::Object(properties));
        map.insert("required".to_string(), string_list(self.required));
        map.insert(ORDERS_KEY.to_string(), string_list(self.orders));
    }
}

/// Payload of an `array` fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl Default for ArraySchema {
    fn default() -> Self {
        Self {
            items: Box::new(Schema::default_for(SchemaType::String)),
            min_items: None,
            max_items: None,
        }
    }
}

/// Payload of a `string` fragment
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

/// Payload shared by `number` and `integer` fragments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSchema {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Number(NumericSchema),
    Integer(NumericSchema),
    Boolean,
    Null,
    Any,
}

impl SchemaKind {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaKind::Object(_) => SchemaType::Object,
            SchemaKind::Array(_) => SchemaType::Array,
            SchemaKind::String(_) => SchemaType::String,
            SchemaKind::Number(_) => SchemaType::Number,
            SchemaKind::Integer(_) => SchemaType::Integer,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::Null => SchemaType::Null,
            SchemaKind::Any => SchemaType::Any,
        }
    }
}

/// One JSON-Schema fragment
///
/// Converts to and from `serde_json::Value`; serde goes through that
/// conversion, so `serde_json::from_str::<Schema>` and `to_string` read and
/// write the wire format directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Schema {
    pub kind: SchemaKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    /// Keywords not modeled above, preserved verbatim
    pub extra: Map<String, Value>,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            title: None,
            description: None,
            example: None,
            default: None,
            extra: Map::new(),
        }
    }

    /// Default fragment for a type
    ///
    /// Objects start with empty `properties`, `required` and `x-apicat-orders`.
    /// Arrays start with `string` items.
    pub fn default_for(schema_type: SchemaType) -> Self {
        let kind = match schema_type {
            SchemaType::Object => SchemaKind::Object(ObjectSchema::default()),
            SchemaType::Array => SchemaKind::Array(ArraySchema::default()),
            SchemaType::String => SchemaKind::String(StringSchema::default()),
            SchemaType::Number => SchemaKind::Number(NumericSchema::default()),
            SchemaType::Integer => SchemaKind::Integer(NumericSchema::default()),
            SchemaType::Boolean => SchemaKind::Boolean,
            SchemaType::Null => SchemaKind::Null,
            SchemaType::Any => SchemaKind::Any,
        };
        Self::new(kind)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn schema_type(&self) -> SchemaType {
        self.kind.schema_type()
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectSchema> {
        match &mut self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        match &self.kind {
            SchemaKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArraySchema> {
        match &mut self.kind {
            SchemaKind::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Nesting depth: 1 for a leaf, 1 + deepest child for objects and arrays
    pub fn depth(&self) -> usize {
        let nested = match &self.kind {
            SchemaKind::Object(object) => object
                .properties
                .values()
                .map(Schema::depth)
                .max()
                .unwrap_or(0),
            SchemaKind::Array(array) => array.items.depth(),
            _ => 0,
        };
        1 + nested
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        Self::try_from(value)
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(SchemaError::NotAnObject(describe(&other))),
        };

        // Fragments the typed model cannot represent (type unions, an explicit
        // "any", tuple items) are kept as Any with their raw keys in `extra`.
        let schema_type = match map.get("type") {
            None | Some(Value::Null) => {
                map.remove("type");
                SchemaType::Any
            }
            Some(Value::String(name)) => {
                let parsed = SchemaType::parse(name)?;
                if parsed == SchemaType::Any || has_tuple_items(&map, parsed) {
                    SchemaType::Any
                } else {
                    map.remove("type");
                    parsed
                }
            }
            Some(_) => SchemaType::Any,
        };

        let title = take_string(&mut map, "title")?;
        let description = take_string(&mut map, "description")?;
        let example = map.remove("example");
        let default = map.remove("default");

        let kind = match schema_type {
            SchemaType::Object => SchemaKind::Object(ObjectSchema::take_from(&mut map)?),
            SchemaType::Array => {
                let items = match map.remove("items") {
                    None | Some(Value::Null) => Schema::default_for(SchemaType::Any),
                    Some(items) => Schema::try_from(items)?,
                };
                SchemaKind::Array(ArraySchema {
                    items: Box::new(items),
                    min_items: take_u64(&mut map, "minItems")?,
                    max_items: take_u64(&mut map, "maxItems")?,
                })
            }
            SchemaType::String => SchemaKind::String(StringSchema {
                format: take_string(&mut map, "format")?,
                pattern: take_string(&mut map, "pattern")?,
                min_length: take_u64(&mut map, "minLength")?,
                max_length: take_u64(&mut map, "maxLength")?,
            }),
            SchemaType::Number => SchemaKind::Number(NumericSchema::take_from(&mut map)?),
            SchemaType::Integer => SchemaKind::Integer(NumericSchema::take_from(&mut map)?),
            SchemaType::Boolean => SchemaKind::Boolean,
            SchemaType::Null => SchemaKind::Null,
            SchemaType::Any => SchemaKind::Any,
        };

        Ok(Self {
            kind,
            title,
            description,
            example,
            default,
            extra: map,
        })
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        let mut map = Map::new();
        match schema.kind.schema_type().as_str() {
            Some(name) => {
                map.insert("type".to_string(), Value::String(name.to_string()));
            }
            None => {
                if let Some(raw) = schema.extra.get("type") {
                    map.insert("type".to_string(), raw.clone());
                }
            }
        }
        insert_opt(&mut map, "title", schema.title.map(Value::String));
        insert_opt(&mut map, "description", schema.description.map(Value::String));

        match schema.kind {
            SchemaKind::Object(object) => object.write_into(&mut map),
            SchemaKind::Array(array) => {
                map.insert("items".to_string(), Value::from(*array.items));
                insert_opt(&mut map, "minItems", array.min_items.map(Value::from));
                insert_opt(&mut map, "maxItems", array.max_items.map(Value::from));
            }
            SchemaKind::String(string) => {
                insert_opt(&mut map, "format", string.format.map(Value::String));
                insert_opt(&mut map, "pattern", string.pattern.map(Value::String));
                insert_opt(&mut map, "minLength", string.min_length.map(Value::from));
                insert_opt(&mut map, "maxLength", string.max_length.map(Value::from));
            }
            SchemaKind::Number(numeric) | SchemaKind::Integer(numeric) => {
                insert_opt(&mut map, "minimum", numeric.minimum.map(Value::Number));
                insert_opt(&mut map, "maximum", numeric.maximum.map(Value::Number));
            }
            SchemaKind::Boolean | SchemaKind::Null | SchemaKind::Any => {}
        }

        insert_opt(&mut map, "example", schema.example);
        insert_opt(&mut map, "default", schema.default);

        for (key, value) in schema.extra {
            map.entry(key).or_insert(value);
        }
        Value::Object(map)
    }
}

impl NumericSchema {
    fn take_from(map: &mut Map<String, Value>) -> Result<Self, SchemaError> {
        Ok(Self {
            minimum: take_number(map, "minimum")?,
            maximum: take_number(map, "maximum")?,
        })
    }
}

fn has_tuple_items(map: &Map<String, Value>, schema_type: SchemaType) -> bool {
    schema_type == SchemaType::Array
        && map
            .get("items")
            .is_some_and(|items| !items.is_object() && !items.is_null())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn string_list(names: Vec<String>) -> Value {
    Value::Array(names.into_iter().map(Value::String).collect())
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, SchemaError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(SchemaError::invalid_field(
            key,
            format!("expected a string, got {}", describe(&other)),
        )),
    }
}

fn take_u64(map: &mut Map<String, Value>, key: &str) -> Result<Option<u64>, SchemaError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number.as_u64().map(Some).ok_or_else(|| {
            SchemaError::invalid_field(key, format!("expected a non-negative integer, got {}", number))
        }),
        Some(other) => Err(SchemaError::invalid_field(
            key,
            format!("expected a number, got {}", describe(&other)),
        )),
    }
}

fn take_number(map: &mut Map<String, Value>, key: &str) -> Result<Option<Number>, SchemaError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number)),
        Some(other) => Err(SchemaError::invalid_field(
            key,
            format!("expected a number, got {}", describe(&other)),
        )),
    }
}

/// Read a list of property names, dropping duplicates but keeping first positions
fn take_name_list(map: &mut Map<String, Value>, key: &str) -> Result<Vec<String>, SchemaError> {
    let items = match map.remove(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(SchemaError::invalid_field(
                key,
                format!("expected an array, got {}", describe(&other)),
            ))
        }
    };

    let mut names: IndexSet<String> = IndexSet::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(name) => {
                names.insert(name);
            }
            other => {
                return Err(SchemaError::invalid_field(
                    key,
                    format!("expected property names, got {}", describe(&other)),
                ))
            }
        }
    }
    Ok(names.into_iter().collect())
}
