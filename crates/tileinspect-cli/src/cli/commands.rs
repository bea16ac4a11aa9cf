//! CLI command definitions for tileinspect
//!
//! Each command loads the tile through [`TileArchive::open_any`], so `--tile`
//! accepts either a `.pivotal` archive or a bare metadata YAML file.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use tileinspect_core::{
    stemcell_criteria, validate, BlueprintTree, ConfigFile, Generator, MetadataSourceExt,
    TileArchive,
};

use super::output::{FileFormat, OutputFormat, ValidationOutput};
use super::ExitCode;
use crate::error::CliError;

/// Inspect tiles and their configuration files
#[derive(Parser, Debug)]
#[command(name = "tileinspect")]
#[command(about = "Check tile config files, generate starter configs, dump tile metadata", long_about = None)]
#[command(version)]
pub struct TileInspectCli {
    /// Outputs more info than usual
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: TileInspectCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum TileInspectCommands {
    /// Check a config file against the tile's property blueprints
    CheckConfig {
        /// Path to the product file
        #[arg(short, long, env = "TILEINSPECT_TILE")]
        tile: PathBuf,

        /// Path to the config file
        #[arg(short, long, env = "TILEINSPECT_CONFIG")]
        config: PathBuf,

        /// Output format for check results
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Output a starter config file
    ///
    /// Every configurable property gets its default, its first option, or a
    /// sample value. Use --set to pin a value, e.g. to pick a selector branch.
    MakeConfig {
        /// Path to the product file
        #[arg(short, long, env = "TILEINSPECT_TILE")]
        tile: PathBuf,

        /// Output file type
        #[arg(short, long, value_enum, default_value = "json")]
        format: FileFormat,

        /// Pin a property value (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, String)>,
    },

    /// Dump tile metadata to stdout
    Metadata {
        /// Path to the product file
        #[arg(short, long, env = "TILEINSPECT_TILE")]
        tile: PathBuf,

        /// Output file type
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: FileFormat,
    },

    /// Dump stemcell requirement to stdout
    Stemcell {
        /// Path to the product file
        #[arg(short, long, env = "TILEINSPECT_TILE")]
        tile: PathBuf,
    },

    /// Print tileinspect version
    Version,
}

/// Parse a `--set PATH=VALUE` argument
pub fn parse_override(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((path, value)) if !path.is_empty() => Ok((path.to_string(), value.to_string())),
        _ => Err(format!("expected PATH=VALUE, got {}", arg)),
    }
}

fn load_tile(tile: &Path) -> Result<BlueprintTree, CliError> {
    Ok(TileArchive::open_any(tile).load_blueprint_tree()?)
}

/// Execute the check-config command
pub fn execute_check_config(
    tile: &Path,
    config: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<ExitCode, CliError> {
    let file = ConfigFile::load(config)?;
    let configuration = file.properties()?;
    let tree = load_tile(tile)?;

    let violations = validate(&tree, configuration);
    ValidationOutput::from_violations(&violations).render(format, out)?;

    if violations.is_empty() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::ValidationFailed)
    }
}

/// Execute the make-config command
pub fn execute_make_config(
    tile: &Path,
    format: FileFormat,
    overrides: Vec<(String, String)>,
    out: &mut dyn Write,
) -> Result<ExitCode, CliError> {
    let tree = load_tile(tile)?;
    let file = Generator::new(&tree).with_overrides(overrides).config_file()?;

    for violation in validate(&tree, file.properties()?) {
        tracing::warn!(
            code = violation.code(),
            path = violation.path(),
            "generated config does not validate: {}",
            violation
        );
    }

    let text = match format {
        FileFormat::Json => file.to_json()?,
        FileFormat::Yaml => file.to_yaml()?,
    };
    writeln!(out, "{}", text.trim_end())?;
    Ok(ExitCode::Success)
}

/// Execute the metadata command
pub fn execute_metadata(
    tile: &Path,
    format: FileFormat,
    out: &mut dyn Write,
) -> Result<ExitCode, CliError> {
    TileArchive::open_any(tile).write_metadata(out, format.into())?;
    Ok(ExitCode::Success)
}

/// Execute the stemcell command
pub fn execute_stemcell(tile: &Path, out: &mut dyn Write) -> Result<ExitCode, CliError> {
    let tree = load_tile(tile)?;
    let criteria = stemcell_criteria(&tree)?;
    let json = serde_json::to_string(&criteria).map_err(|e| CliError::Output(e.to_string()))?;
    writeln!(out, "{}", json)?;
    Ok(ExitCode::Success)
}

/// Execute the version command
pub fn execute_version(out: &mut dyn Write) -> Result<ExitCode, CliError> {
    writeln!(out, "tileinspect version: {}", env!("CARGO_PKG_VERSION"))?;
    Ok(ExitCode::Success)
}
