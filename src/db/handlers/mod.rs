//! Database repositories.
//!
//! Repositories borrow `&mut PgConnection` so the caller decides where the
//! connection comes from and how long it lives.

pub mod playthroughs;

pub use playthroughs::Playthroughs;
