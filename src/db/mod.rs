//! Database layer.
//!
//! ```text
//! api::handlers --> db::handlers (repositories) --> PostgreSQL
//!                   db::models   (row types)
//! ```
//!
//! Connections are pooled in [`AppState`](crate::AppState). A request
//! acquires one at handler entry and holds it only for its single
//! statement; the guard returns it to the pool on every exit path.

pub mod errors;
pub mod handlers;
pub mod models;
