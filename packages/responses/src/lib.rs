//! APICat common responses
//!
//! View-model for the project's list of reusable response templates. Each
//! template carries a body schema edited with `apicat-schema`.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod param_list;

pub use api::{CommonResponseApi, ResponseApiError};
pub use config::ResponseListConfig;
pub use error::ResponseListError;
pub use models::{CommonResponse, ResponseDetail, ResponseParamItem};
pub use param_list::ResponseParamList;
