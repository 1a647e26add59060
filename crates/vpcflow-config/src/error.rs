use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Region document not found. Looked for:\n\
        - current directory: region.local.{{json,yaml,yml}}, region.{{json,yaml,yml}}\n\
        - ./.vpcflow/ directory\n\
        - ~/.config/vpcflow/\n\
        Pass --file or set VPCFLOW_REGION_PATH to point at one"
    )]
    RegionFileNotFound,

    #[error("Region document does not exist: {}", .0.display())]
    RegionFileMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
