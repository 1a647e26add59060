//! Region document persistence
//!
//! A region graph is stored as JSON or YAML; the format follows the file
//! extension. Checkpoints are written next to the source document.

use crate::error::{GraphError, Result};
use crate::model::RegionConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Serialization format of a region document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(GraphError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn parse(&self, content: &str) -> Result<RegionConfig> {
        match self {
            Self::Json => Ok(serde_json::from_str(content)?),
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }

    pub fn render(&self, region: &RegionConfig) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(region)?),
            Self::Yaml => Ok(serde_yaml::to_string(region)?),
        }
    }
}

/// Load a region document
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_region(path: &Path) -> Result<RegionConfig> {
    let format = DocumentFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let region = format.parse(&content)?;
    debug!(
        region = %region.name,
        vpcs = region.vpcs.len(),
        "Loaded region document"
    );
    Ok(region)
}

/// Save a region document.
///
/// An existing file is first renamed to `<file>.backup` so an interrupted
/// write always leaves the previous version on disk.
pub fn save_region(path: &Path, region: &RegionConfig) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let content = format.render(region)?;
    let io_err = |source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    if path.exists() {
        let backup = backup_path(path);
        fs::rename(path, &backup).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)?;

    debug!(path = %path.display(), "Saved region document");
    Ok(())
}

/// Checkpoint suffix written while provisioning
pub const CREATED_SUFFIX: &str = "created";

/// Checkpoint suffix written while decommissioning
pub const REMOVED_SUFFIX: &str = "removed";

/// Sibling path `<stem>.<suffix>.<ext>` used for checkpoints, e.g.
/// `region.json` → `region.created.json`. A source that is itself a
/// checkpoint maps onto the same base name (`region.created.json` →
/// `region.removed.json`).
pub fn checkpoint_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("region");
    let stem = [CREATED_SUFFIX, REMOVED_SUFFIX]
        .iter()
        .find_map(|known| stem.strip_suffix(format!(".{}", known).as_str()))
        .unwrap_or(stem);
    let file_name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}.{}", stem, suffix, ext),
        None => format!("{}.{}", stem, suffix),
    };
    source.with_file_name(file_name)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".backup");
    path.with_file_name(name)
}
