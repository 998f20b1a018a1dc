//! Scenario tests for sshdeploy.
//!
//! Each scenario drives the orchestrator end to end against the in-memory
//! remote, the way an operator would use the tool across several runs.
//!
//! Run with: `cargo test --test scenarios`

mod common;

#[path = "scenarios/first_push.rs"]
mod first_push;

#[path = "scenarios/redeploy.rs"]
mod redeploy;

#[path = "scenarios/failure_recovery.rs"]
mod failure_recovery;
