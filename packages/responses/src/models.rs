//! Common Response Models
//!
//! Wire shapes exchanged with the response API and the list entries the view
//! renders. A `ResponseParamItem` is a `CommonResponse` plus view state; it
//! serializes flat, matching what the view layer consumes:
//!
//! ```json
//! { "id": "12", "code": 200, "description": "ok",
//!   "isLocal": false, "expand": false, "isLoaded": false, "isLoading": false }
//! ```

use apicat_schema::{Schema, SchemaType};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Full content of a response template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetail {
    pub name: String,
    pub code: u16,
    pub description: String,
    /// Body schema; always an object fragment for new templates
    #[serde(default = "default_body_schema")]
    pub schema: Schema,
}

fn default_body_schema() -> Schema {
    Schema::default_for(SchemaType::Object)
}

impl ResponseDetail {
    /// New template with an empty object body
    pub fn new(name: impl Into<String>, code: u16, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code,
            description: description.into(),
            schema: default_body_schema(),
        }
    }
}

/// A named response template as listed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonResponse {
    /// Server id; numeric ids are read as their decimal string
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub code: u16,
    #[serde(default)]
    pub description: String,
    /// Only present once the full template has been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ResponseDetail>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid response id: {}", other))),
    }
}

/// One row of the response-parameter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseParamItem {
    #[serde(flatten)]
    pub response: CommonResponse,

    /// Created in the view and not yet saved to the server
    pub is_local: bool,
    pub expand: bool,
    /// Full detail has been fetched (or was created locally)
    pub is_loaded: bool,
    /// Detail fetch in flight
    pub is_loading: bool,
}

impl ResponseParamItem {
    /// Wrap a server entry; keeps its id or generates one when it has none
    pub fn remote(mut response: CommonResponse) -> Self {
        if response.id.is_empty() {
            response.id = Uuid::new_v4().to_string();
        }
        Self {
            response,
            is_local: false,
            expand: false,
            is_loaded: false,
            is_loading: false,
        }
    }

    /// New unsaved entry, expanded and ready for editing
    pub fn local(detail: ResponseDetail) -> Self {
        Self {
            response: CommonResponse {
                id: Uuid::new_v4().to_string(),
                code: detail.code,
                description: detail.description.clone(),
                detail: Some(detail),
            },
            is_local: true,
            expand: true,
            is_loaded: true,
            is_loading: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.response.id
    }
}
