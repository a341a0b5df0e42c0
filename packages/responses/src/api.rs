//! Remote response API
//!
//! The transport (HTTP client, auth) lives outside this crate; the list
//! view-model only sees this trait.

use crate::models::{CommonResponse, ResponseDetail};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseApiError {
    #[error("Common response not found: {id}")]
    NotFound { id: String },

    #[error("Server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Project-scoped CRUD over common response templates
#[async_trait]
pub trait CommonResponseApi: Send + Sync {
    /// Summaries of every template in the project
    async fn list(&self, project_id: &str) -> Result<Vec<CommonResponse>, ResponseApiError>;

    /// One template including its detail
    async fn get(&self, project_id: &str, id: &str) -> Result<CommonResponse, ResponseApiError>;

    /// Persist a new template, returning the server copy with its id
    async fn create(
        &self,
        project_id: &str,
        detail: &ResponseDetail,
    ) -> Result<CommonResponse, ResponseApiError>;

    /// Delete a template; with `unref` the server also inlines it where it was referenced
    async fn delete(&self, project_id: &str, id: &str, unref: bool)
        -> Result<(), ResponseApiError>;
}
