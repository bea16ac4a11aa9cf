//! Tile metadata sources
//!
//! A tile ships as a `.pivotal` zip archive carrying one `metadata/*.yml`
//! entry. Sources hand back the raw YAML bytes; decoding into a
//! [`BlueprintTree`] and format conversion are shared through
//! [`MetadataSourceExt`].

use regex::Regex;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::blueprint::BlueprintTree;
use crate::error::{Result, TileError};

const METADATA_ENTRY_PATTERN: &str = r"metadata/.*\.yml";

/// Output format for raw metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataFormat {
    /// The metadata bytes exactly as stored in the tile
    #[default]
    Yaml,
    /// The metadata converted to pretty-printed JSON
    Json,
}

/// Something that can produce a tile's raw metadata document
#[cfg_attr(test, mockall::automock)]
pub trait MetadataSource {
    /// Human-readable name of the source, for logs
    fn describe(&self) -> String;

    /// Raw metadata YAML
    fn read_metadata(&self) -> Result<Vec<u8>>;
}

/// Operations shared by every metadata source
pub trait MetadataSourceExt: MetadataSource {
    /// Decode the metadata into a blueprint tree
    fn load_blueprint_tree(&self) -> Result<BlueprintTree> {
        let bytes = self.read_metadata()?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| TileError::metadata_decode(e.to_string()))?;
        let tree = BlueprintTree::from_yaml(text)?;
        tracing::info!(
            source = %self.describe(),
            product = %tree.name,
            properties = tree.property_blueprints.len(),
            jobs = tree.job_types.len(),
            "loaded tile metadata"
        );
        Ok(tree)
    }

    /// Write the metadata to `out` in the requested format
    fn write_metadata(&self, out: &mut dyn Write, format: MetadataFormat) -> Result<()> {
        let bytes = self.read_metadata()?;
        match format {
            MetadataFormat::Yaml => out.write_all(&bytes)?,
            MetadataFormat::Json => {
                let document: serde_json::Value = serde_yaml::from_slice(&bytes)
                    .map_err(|e| TileError::metadata_decode(e.to_string()))?;
                serde_json::to_writer_pretty(&mut *out, &document)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

impl<T: MetadataSource + ?Sized> MetadataSourceExt for T {}

/// A `.pivotal` tile archive on disk
#[derive(Debug, Clone)]
pub struct TileArchive {
    path: PathBuf,
}

impl TileArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source for `path`: a bare metadata file for `.yml`/`.yaml`, else an archive
    pub fn open_any(path: impl AsRef<Path>) -> Box<dyn MetadataSource> {
        let path = path.as_ref();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
        if is_yaml {
            Box::new(MetadataFile::new(path))
        } else {
            Box::new(TileArchive::new(path))
        }
    }

    fn unzip_error(&self, err: impl std::fmt::Display) -> TileError {
        TileError::archive(format!("could not unzip {}: {}", self.path.display(), err))
    }
}

impl MetadataSource for TileArchive {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_metadata(&self) -> Result<Vec<u8>> {
        let file = File::open(&self.path).map_err(|e| self.unzip_error(e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| self.unzip_error(e))?;
        let pattern = Regex::new(METADATA_ENTRY_PATTERN).map_err(|e| TileError::archive(e.to_string()))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| self.unzip_error(e))?;
            if !pattern.is_match(entry.name()) {
                continue;
            }

            let name = entry.name().to_string();
            tracing::debug!(entry = %name, tile = %self.path.display(), "found metadata entry");
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).map_err(|e| {
                TileError::archive(format!(
                    "could not read from {} (found inside {}): {}",
                    name,
                    self.path.display(),
                    e
                ))
            })?;
            return Ok(contents);
        }

        Err(TileError::MetadataNotFound)
    }
}

/// A bare metadata YAML file
#[derive(Debug, Clone)]
pub struct MetadataFile {
    path: PathBuf,
}

impl MetadataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for MetadataFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_metadata(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| {
            TileError::Io(format!("could not read {}: {}", self.path.display(), e))
        })
    }
}

/// Metadata held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadata {
    yaml: String,
}

impl InMemoryMetadata {
    pub fn new(yaml: impl Into<String>) -> Self {
        Self { yaml: yaml.into() }
    }
}

impl MetadataSource for InMemoryMetadata {
    fn describe(&self) -> String {
        "in-memory metadata".to_string()
    }

    fn read_metadata(&self) -> Result<Vec<u8>> {
        Ok(self.yaml.clone().into_bytes())
    }
}
