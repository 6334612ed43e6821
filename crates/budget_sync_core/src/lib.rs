//! Shared budget propagation domain primitives.
//!
//! This crate owns the change-stream record model, budget field extraction
//! and the per-event outcome vocabulary. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod error;
pub mod extract;
pub mod outcome;
pub mod stream;
