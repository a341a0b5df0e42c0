//! Error types for the response-parameter list

use crate::api::ResponseApiError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseListError {
    /// No row at the given index
    #[error("No response parameter at index {index}")]
    ItemNotFound { index: usize },

    /// Save was requested for a row the server already has
    #[error("Response parameter {id} is already saved")]
    NotLocal { id: String },

    #[error("Remote API error: {0}")]
    Remote(#[from] ResponseApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ResponseListError>;
