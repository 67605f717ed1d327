//! AWS-oriented adapters and handlers for snapshot lifecycle maintenance.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! RDS snapshot store seam) and exposes a single runtime module boundary for
//! configuration, model, naming, and retention primitives.
//! See `crates/snapshot_shield_lambda/README.md` for ownership boundaries.

pub mod adapters;
pub mod handlers;
pub mod runtime;
