//! HTTP request handlers.

pub mod playthroughs;
