//! Milestone test harness
//!
//! Runs numbered client scripts against a long-lived server, restarting the
//! server only after a script shut it down, and optionally checks the
//! client's output against the expected output byte for byte.

pub mod build;
pub mod corpus;
pub mod executor;
pub mod orchestrator;
mod process;
pub mod report;
pub mod selector;
pub mod server;
pub mod verifier;

pub use corpus::{test_label, TestCase, TestPaths};
pub use executor::{ClientRunner, Execution};
pub use orchestrator::{Orchestrator, RunOptions, RunResult};
pub use report::Summary;
pub use selector::{select, Selection, SelectionWarning};
pub use server::{ProcessLauncher, ServerLauncher, ServerSession, ServerState};
