//! imslip: a strictly sequential crawler for the IMSLP catalog hierarchy.
//!
//! The binary walks composers, their works, and each work's score candidates,
//! downloading every reachable artifact into `out/<Composer>/<Work>/` exactly
//! once. See the member crates for the layers: `imslip-fetch` (transport and
//! page cache), `imslip-extract` (HTML and embedded-payload parsing),
//! `imslip-catalog` (traversal and score resolution), `imslip-library`
//! (the on-disk score tree), and `imslip-config` (layered configuration).

pub mod cli;
pub mod coordinator;
pub mod error;

pub use crate::cli::Cli;
pub use crate::coordinator::{Coordinator, Summary};
