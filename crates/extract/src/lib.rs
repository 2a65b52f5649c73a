mod blob;
mod composers;
mod consts;
pub mod error;
mod interstitial;
mod models;
mod scores;
mod works;

pub use crate::blob::{script_payload, script_payloads};
pub use crate::composers::composer_names;
pub use crate::interstitial::{Interstitial, classify, looks_like_markup};
pub use crate::models::RelationKind;
pub use crate::scores::{ScoreEntry, score_entries};
pub use crate::works::works_by_relation;
