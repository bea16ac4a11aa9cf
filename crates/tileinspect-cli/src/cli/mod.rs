//! CLI module for tileinspect
//!
//! Commands write their results to the given output stream; logs and errors
//! go to stderr.

pub mod commands;
pub mod output;

pub use commands::{TileInspectCli, TileInspectCommands};
pub use output::{FileFormat, OutputFormat, ValidationOutput};

use std::io::Write;

use crate::error::CliError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// The config file has violations
    ValidationFailed = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: TileInspectCli, out: &mut dyn Write) -> Result<ExitCode, CliError> {
    match cli.command {
        TileInspectCommands::CheckConfig {
            tile,
            config,
            format,
        } => commands::execute_check_config(&tile, &config, format, out),
        TileInspectCommands::MakeConfig {
            tile,
            format,
            overrides,
        } => commands::execute_make_config(&tile, format, overrides, out),
        TileInspectCommands::Metadata { tile, format } => {
            commands::execute_metadata(&tile, format, out)
        }
        TileInspectCommands::Stemcell { tile } => commands::execute_stemcell(&tile, out),
        TileInspectCommands::Version => commands::execute_version(out),
    }
}
