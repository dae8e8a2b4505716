//! CLI commands and argument parsing

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy connectors CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-connectors")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connector config file (YAML, or JSON with a `.json` extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered providers and whether an adapter exists for them
    Providers,

    /// Show the configured connector's capabilities and declared objects
    Objects,

    /// Fetch object metadata
    Metadata {
        /// Object names (comma-separated or repeated)
        #[arg(required = true, value_delimiter = ',')]
        objects: Vec<String>,
    },

    /// Read records of one object
    Read {
        /// Object name
        object: String,

        /// Fields to return (comma-separated, `*` for all)
        #[arg(long, value_delimiter = ',', default_value = "*")]
        fields: Vec<String>,

        /// Only records updated at or after this time (RFC 3339)
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only records updated before this time (RFC 3339)
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Associated objects to attach to each row (comma-separated)
        #[arg(long, value_delimiter = ',')]
        associations: Vec<String>,

        /// Continuation token from a previous page
        #[arg(long)]
        next_page: Option<String>,

        #[arg(long)]
        page_size: Option<u32>,

        /// Keep reading until the last page
        #[arg(long)]
        all: bool,

        /// Stop after this many pages (with --all)
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Create a record, or update one when --id is given
    Write {
        /// Object name
        object: String,

        /// Record id to update
        #[arg(long)]
        id: Option<String>,

        /// Record JSON
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<String>,

        /// File holding the record JSON (`-` for stdin)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a record
    Delete {
        /// Object name
        object: String,

        /// Record id
        id: String,
    },

    /// Check a webhook delivery's signature
    VerifyWebhook {
        /// Signing secret
        #[arg(long, env = "WEBHOOK_SECRET")]
        secret: String,

        /// Delivery header as `Name: value` (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,

        /// File holding the raw delivery body (`-` for stdin)
        #[arg(long)]
        body: PathBuf,
    },
}
