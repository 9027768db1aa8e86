//! HTTP REST API
//!
//! - `common`: error bodies and the validating JSON extractor
//! - `modules`: handlers and DTOs per resource, plus middleware
//! - `router`: route table and OpenAPI document

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
