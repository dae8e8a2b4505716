//! CLI module
//!
//! Command-line interface driving a configured connector.
//!
//! # Commands
//!
//! - `providers` - List registered providers
//! - `objects` - Capabilities and declared objects of the configured connector
//! - `metadata` - Object metadata
//! - `read` - Read records, one JSON message per page
//! - `write` - Create or update a record
//! - `delete` - Delete a record
//! - `verify-webhook` - Check a webhook delivery signature

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
