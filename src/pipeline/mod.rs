//! Pipeline entry points.
//!
//! - `Pipeline::plan`: fetch, filter and diff without side effects
//! - `Pipeline::run`: the full pass, committing seen ids and sending the digest

pub mod diff;
pub mod run;

pub use diff::{Delta, calculate_delta};
pub use run::{Pipeline, Plan, RunOutcome, RunReport};
