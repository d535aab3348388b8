//! Milestone test harness
//!
//! Drives a client/server application through scripted test cases grouped
//! by development milestone.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::{select, RunResult, Selection};
