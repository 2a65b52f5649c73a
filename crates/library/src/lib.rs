pub mod error;
mod store;

pub use crate::store::{PARTIAL_SUFFIX, Presence, ScoreStore, sanitize_segment};
