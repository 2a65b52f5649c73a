pub mod error;
mod models;
mod resolver;
mod walker;

pub use imslip_extract::RelationKind;

pub use crate::models::{Composer, LeafEntry, Score, Work};
pub use crate::walker::{CATALOG_ROOT, Catalog};
