//! HTTP API layer.
//!
//! - `handlers` - endpoint implementations
//! - `models` - request types and their decoding

pub mod handlers;
pub mod models;
