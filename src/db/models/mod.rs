//! Database row models.

pub mod playthroughs;

pub use playthroughs::Playthrough;
