//! Error types for the tileinspect CLI

use thiserror::Error;
use tileinspect_core::TileError;

use crate::cli::ExitCode;

/// Main error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Loading, decoding or generation failed in the core
    #[error(transparent)]
    Tile(#[from] TileError),

    /// Writing to the output stream failed
    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        match self {
            CliError::Tile(err) => err.is_user_error(),
            CliError::Output(_) => false,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Tile(
                TileError::ConfigFileRead { .. }
                | TileError::Io(_)
                | TileError::Archive(_)
                | TileError::MetadataNotFound,
            ) => ExitCode::FileError,
            err if err.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_errors_display_unchanged() {
        let err = CliError::from(TileError::MissingProductProperties);
        assert_eq!(
            err.to_string(),
            "the config file is missing a \"product-properties\" section"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(TileError::MetadataNotFound).exit_code(),
            ExitCode::FileError
        );
        assert_eq!(
            CliError::from(TileError::ConfigFileDecode("bad".to_string())).exit_code(),
            ExitCode::InvalidInput
        );
        assert_eq!(
            CliError::from(TileError::invalid_override(".properties.port", "not a number"))
                .exit_code(),
            ExitCode::InvalidInput
        );
        assert_eq!(
            CliError::from(TileError::Encode("boom".to_string())).exit_code(),
            ExitCode::InternalError
        );
        assert_eq!(
            CliError::Output("broken pipe".to_string()).exit_code(),
            ExitCode::InternalError
        );
    }
}
