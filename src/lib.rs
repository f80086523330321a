// Allow non-snake_case names for JSON serialization compatibility with the editor extension
#![allow(non_snake_case)]

pub mod cli;
pub mod commands;
pub mod mcp;
pub mod models;
pub mod remote;
pub mod server;
pub mod storage;
pub mod sync;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so the stdio MCP transport keeps stdout to itself
fn initTracing(defaultLevel: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(defaultLevel));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Servers log at info; one-shot commands only surface warnings so their output stays readable
fn defaultLogLevel(command: &cli::Command) -> &'static str {
    if command.isLongRunning() { "info" } else { "warn" }
}

pub async fn run() -> Result<(), String> {
    let cli = cli::Cli::parse();
    initTracing(defaultLogLevel(&cli.command));
    cli::execute(cli).await
}
