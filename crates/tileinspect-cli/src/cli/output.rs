//! Output formatting for the tileinspect CLI
//!
//! Config check results render as JSON, YAML, or a human-readable table with
//! colored markers. Generated configs and metadata use [`FileFormat`].

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;

use tileinspect_core::{MetadataFormat, Violation};

use crate::error::CliError;

/// Message printed when a config file has no violations
pub const VALID_CONFIG_MESSAGE: &str = "The config file appears to be valid";

/// Output format for config check results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Format for generated config files and dumped metadata
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl From<FileFormat> for MetadataFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Json => MetadataFormat::Json,
            FileFormat::Yaml => MetadataFormat::Yaml,
        }
    }
}

/// Config check result for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutput {
    /// Whether the config file passed every check
    pub valid: bool,
    /// Number of violations found
    pub violation_count: usize,
    /// Violations in report order
    pub violations: Vec<ViolationOutput>,
    /// Summary message
    pub summary: String,
}

/// One violation, flattened for output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationOutput {
    pub code: String,
    pub message: String,
    pub path: String,
    pub suggestion: String,
}

impl ValidationOutput {
    /// Create output from the validator's violations
    pub fn from_violations(violations: &[Violation]) -> Self {
        let valid = violations.is_empty();
        let summary = if valid {
            VALID_CONFIG_MESSAGE.to_string()
        } else {
            format!("The config file has {} problem(s)", violations.len())
        };

        Self {
            valid,
            violation_count: violations.len(),
            violations: violations.iter().map(ViolationOutput::from_violation).collect(),
            summary,
        }
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(self)
                    .map_err(|e| CliError::Output(e.to_string()))?;
                writeln!(out, "{}", json)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(self)
                    .map_err(|e| CliError::Output(e.to_string()))?;
                write!(out, "{}", yaml)?;
            }
            OutputFormat::Table => self.render_table(out)?,
        }
        Ok(())
    }

    fn render_table(&self, out: &mut dyn Write) -> Result<(), CliError> {
        if self.valid {
            writeln!(out, "{} {}", "+".green(), self.summary)?;
            return Ok(());
        }

        writeln!(out, "{}", "Config Check Results".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "{} {}", "x".red(), self.summary)?;

        for (index, violation) in self.violations.iter().enumerate() {
            violation.render_table_row(out, index + 1)?;
        }
        Ok(())
    }
}

impl ViolationOutput {
    pub fn from_violation(violation: &Violation) -> Self {
        Self {
            code: violation.code().to_string(),
            message: violation.to_string(),
            path: violation.path().to_string(),
            suggestion: violation.suggestion(),
        }
    }

    fn render_table_row(&self, out: &mut dyn Write, index: usize) -> Result<(), CliError> {
        writeln!(out)?;
        writeln!(
            out,
            "{}. [{}] {}",
            index,
            self.code.dimmed(),
            self.message
        )?;
        writeln!(out, "   {} {}", "Path:".dimmed(), self.path.cyan())?;
        writeln!(out, "   {} {}", "Fix:".dimmed(), self.suggestion.green())?;
        Ok(())
    }
}
