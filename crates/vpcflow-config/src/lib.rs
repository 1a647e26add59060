pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the region document directly
pub const REGION_PATH_ENV: &str = "VPCFLOW_REGION_PATH";

/// File names tried in each search directory, in priority order
pub const CANDIDATES: [&str; 6] = [
    "region.local.json",
    "region.local.yaml",
    "region.local.yml",
    "region.json",
    "region.yaml",
    "region.yml",
];

/// vpcflow's user configuration directory, created on first use
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("vpcflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Pick the region document to work on.
///
/// An explicit path wins and must exist. Otherwise the search order is:
/// 1. `VPCFLOW_REGION_PATH`
/// 2. the current directory ([`CANDIDATES`] in order)
/// 3. `./.vpcflow/`
/// 4. the user configuration directory (`~/.config/vpcflow/`)
pub fn resolve_region_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }
    find_region_file()
}

/// Search for a region document without an explicit path
pub fn find_region_file() -> Result<PathBuf> {
    if let Ok(configured) = std::env::var(REGION_PATH_ENV) {
        debug!(path = %configured, "Using {}", REGION_PATH_ENV);
        return existing(PathBuf::from(configured));
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    let local_dir = current_dir.join(".vpcflow");
    if local_dir.is_dir() {
        if let Some(path) = find_in(&local_dir) {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_in(&config_dir.join("vpcflow")) {
            return Ok(path);
        }
    }

    Err(ConfigError::RegionFileNotFound)
}

/// First of [`CANDIDATES`] present in `dir`
pub fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::RegionFileMissing(path))
    }
}
