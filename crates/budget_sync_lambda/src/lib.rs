//! AWS-oriented adapters and handlers for budget propagation.
//!
//! This crate owns runtime integration details (the stream handler, adapter
//! seams for cross-account credentials and the spoke parameter store, start-up
//! configuration and logging) on top of the AWS-free `budget_sync_core` crate.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
