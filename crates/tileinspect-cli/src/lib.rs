//! tileinspect command-line tool
//!
//! Reads a tile (a `.pivotal` archive or its metadata YAML) and:
//!
//! - checks a config file against the tile's property blueprints
//! - generates a starter config file that passes that check
//! - dumps the tile metadata or its stemcell requirement
//!
//! ## CLI Usage
//!
//! ```bash
//! tileinspect check-config --tile product.pivotal --config config.yml
//! tileinspect make-config --tile product.pivotal --format yaml --set .properties.network=UDP
//! tileinspect metadata --tile product.pivotal --format json
//! tileinspect stemcell --tile product.pivotal
//! ```

pub mod cli;
pub mod error;

pub use cli::{ExitCode, FileFormat, OutputFormat, TileInspectCli, TileInspectCommands};
pub use error::CliError;

/// Run the CLI application against stdout
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use tileinspect_cli::{run_cli, TileInspectCli};
///
/// fn main() {
///     let cli = TileInspectCli::parse();
///     let exit_code = run_cli(cli);
///     std::process::exit(exit_code.into());
/// }
/// ```
pub fn run_cli(cli: TileInspectCli) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli::run(cli, &mut out) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}
