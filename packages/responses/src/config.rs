/// Configuration for the response-parameter list
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseListConfig {
    /// Name given to templates created with "add" (already localized by the caller)
    pub default_model_name: String,

    pub default_code: u16,

    pub default_description: String,
}

impl Default for ResponseListConfig {
    fn default() -> Self {
        Self {
            default_model_name: "Response Name".to_string(),
            default_code: 200,
            default_description: "success".to_string(),
        }
    }
}

impl ResponseListConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_model_name.trim().is_empty() {
            return Err("default_model_name cannot be empty".to_string());
        }

        if !(100..=599).contains(&self.default_code) {
            return Err(format!(
                "default_code must be a valid HTTP status code, got {}",
                self.default_code
            ));
        }

        Ok(())
    }
}
