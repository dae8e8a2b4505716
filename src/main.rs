//! Solidafy connectors CLI
//!
//! Command-line interface for running connectors

use clap::Parser;
use solidafy_connectors::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
