// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Solidafy Connectors
//!
//! One read/write/delete/subscribe/metadata interface over many SaaS APIs.
//! Each provider adapter hides its API's authentication, pagination,
//! response envelopes, naming conventions and schema discovery behind the
//! same capability traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_connectors::adapters::new_connector;
//! use solidafy_connectors::config::load_config;
//! use solidafy_connectors::connector::{dispatch, ReadParams};
//!
//! #[tokio::main]
//! async fn main() -> solidafy_connectors::Result<()> {
//!     let connector = new_connector(&load_config("hubspot.yaml")?)?;
//!
//!     let mut params = ReadParams::new("contacts", ["email", "firstname"]);
//!     loop {
//!         let page = dispatch::read(connector.as_ref(), &params).await?;
//!         println!("{} rows", page.rows);
//!         if page.done {
//!             break;
//!         }
//!         params = params.next_page(page.next_page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector + capabilities                     │
//! │  read  write  delete  batch_write  subscribe  verify  metadata   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Schema   │  Subscribe  │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ API Key  │ JSON      │ Cursor        │ Embedded  │ Event plan  │
//! │ OAuth2   │ Retry     │ Offset        │ Endpoints │ HMAC verify │
//! │ Basic    │ Rate Limit│ Next URL      │ Inference │             │
//! │ Bearer   │ Errors    │ Link Header   │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Dotted-path and JSONPath queries over JSON trees
pub mod jsonquery;

/// Raw-preserving JSON, decorated records, form encoding
pub mod codec;

/// URL construction
pub mod urlbuilder;

/// Identifier casing and pluralization
pub mod naming;

/// Bounded, ordered, fail-fast parallelism
pub mod simultaneously;

/// Template interpolation
pub mod template;

/// HTTP client with error classification, retry and rate limiting
pub mod http;

/// Authentication and client construction
pub mod auth;

/// Provider registry
pub mod providers;

/// Static schemas, endpoint support and metadata inference
pub mod schema;

/// Pagination strategies
pub mod pagination;

/// Webhook subscriptions and signature verification
pub mod subscribe;

/// Connector and capability traits
pub mod connector;

/// Read pipeline
pub mod read;

/// Write pipeline
pub mod write;

/// Declarative connector assembly
pub mod components;

/// Provider adapters
pub mod adapters;

/// Connector configuration files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

pub use adapters::new_connector;
pub use config::{load_config, ConnectorConfig};
pub use connector::Connector;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
