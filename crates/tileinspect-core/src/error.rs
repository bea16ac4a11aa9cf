//! Error types for tile inspection
//!
//! These cover the collaborators around the conformance engine: reading tile
//! archives, decoding metadata and config files, and coercing overrides.
//! Conformance findings themselves are [`crate::Violation`] values, not errors.

use thiserror::Error;

/// Main error type for tile inspection operations
#[derive(Error, Debug)]
pub enum TileError {
    /// The tile archive holds no `metadata/*.yml` entry
    #[error("metadata file not found")]
    MetadataNotFound,

    /// The tile archive could not be opened or read
    #[error("{0}")]
    Archive(String),

    /// File access or I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Tile metadata could not be decoded into a blueprint tree
    #[error("failed to decode tile metadata: {0}")]
    MetadataDecode(String),

    /// The config file could not be read from disk
    #[error("failed to read the config file: {path}: {reason}")]
    ConfigFileRead { path: String, reason: String },

    /// The config file is neither JSON nor YAML
    #[error("the config file does not contain valid JSON or YAML: {0}")]
    ConfigFileDecode(String),

    /// The config file has no `product-properties` section
    #[error("the config file is missing a \"product-properties\" section")]
    MissingProductProperties,

    /// A generator override could not be applied
    #[error("invalid value for {key}: {reason}")]
    InvalidOverride { key: String, reason: String },

    /// Stemcell criteria are absent or malformed
    #[error("{0}")]
    StemcellCriteria(String),

    /// Output encoding failed
    #[error("failed to encode output: {0}")]
    Encode(String),
}

impl TileError {
    /// Create an archive error
    pub fn archive(msg: impl Into<String>) -> Self {
        TileError::Archive(msg.into())
    }

    /// Create a metadata decode error
    pub fn metadata_decode(msg: impl Into<String>) -> Self {
        TileError::MetadataDecode(msg.into())
    }

    /// Create an override error for the given property path
    pub fn invalid_override(key: impl Into<String>, reason: impl Into<String>) -> Self {
        TileError::InvalidOverride {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is caused by user input (vs an internal failure)
    pub fn is_user_error(&self) -> bool {
        !matches!(self, TileError::Encode(_))
    }
}

impl From<std::io::Error> for TileError {
    fn from(err: std::io::Error) -> Self {
        TileError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TileError {
    fn from(err: serde_json::Error) -> Self {
        TileError::Encode(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for TileError {
    fn from(err: serde_yaml::Error) -> Self {
        TileError::Encode(format!("YAML error: {}", err))
    }
}

impl From<zip::result::ZipError> for TileError {
    fn from(err: zip::result::ZipError) -> Self {
        TileError::Archive(err.to_string())
    }
}

/// Result type alias for tile inspection operations
pub type Result<T> = std::result::Result<T, TileError>;
