//! tileinspect CLI
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: The config file has violations
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 10: Internal error

use clap::Parser;
use tileinspect_cli::{run_cli, TileInspectCli};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = TileInspectCli::parse();

    // RUST_LOG wins over --debug when set
    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
