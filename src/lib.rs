//! Approval gateway — library crate for integration testing.
//!
//! Re-exports modules needed by integration tests in `tests/`.

pub mod api;
pub mod config;
pub mod errors;
pub mod llm;
pub mod models;
pub mod workflow;

pub use api::AppState;
