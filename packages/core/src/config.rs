/// Configuration for schema tree editing
use serde::{Deserialize, Serialize};

/// Hard ceiling for `max_depth`; deeper trees are rejected outright
const MAX_SUPPORTED_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Append newly inserted property names to `x-apicat-orders`
    pub track_orders_on_insert: bool,

    /// Maximum nesting depth accepted when building or editing a tree
    pub max_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            track_orders_on_insert: true,
            max_depth: 64,
        }
    }
}

impl EditorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be greater than 0".to_string());
        }

        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(format!(
                "max_depth cannot exceed {}",
                MAX_SUPPORTED_DEPTH
            ));
        }

        Ok(())
    }
}
