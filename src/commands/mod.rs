//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `build.rs` — validate/graph/plan/record/reset.
//! - `release.rs` — analyze/coverage/permsets/check.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod build;
pub mod release;

pub use build::handle_build_commands;
pub use release::handle_release_commands;
