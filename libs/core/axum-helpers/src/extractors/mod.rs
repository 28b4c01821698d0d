//! Extractors whose rejections are rendered as [`ErrorResponse`](crate::errors::ErrorResponse)
//! bodies with status 400, instead of axum's plain-text 400/415/422 mix.

pub mod json_body;
pub mod query_params;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use query_params::QueryParams;
pub use uuid_path::UuidPath;
