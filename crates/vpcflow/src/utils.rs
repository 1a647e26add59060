use anyhow::Context;
use colored::Colorize;
use std::path::{Path, PathBuf};
use vpcflow_cloud_aws::AwsNetworkProvider;
use vpcflow_core::RegionConfig;

/// Locate and load the region document
pub fn load_document(file: Option<PathBuf>) -> anyhow::Result<(PathBuf, RegionConfig)> {
    let path = vpcflow_config::resolve_region_file(file.as_deref())?;
    let region = load_from(&path)?;
    Ok((path, region))
}

pub fn load_from(path: &Path) -> anyhow::Result<RegionConfig> {
    vpcflow_core::load_region(path)
        .with_context(|| format!("Failed to load region document {}", path.display()))
}

pub fn print_loaded_file(path: &Path) {
    println!("📄 Region document: {}", path.display().to_string().cyan());
}

/// Connect to the provider for the document's region, or `region_override`
pub async fn connect(
    region: &RegionConfig,
    region_override: Option<String>,
    profile: Option<String>,
) -> anyhow::Result<AwsNetworkProvider> {
    let code = region_override
        .or_else(|| Some(region.region.clone()).filter(|r| !r.is_empty()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Region document '{}' has no region code; pass --region",
                region.name
            )
        })?;

    println!(
        "{}",
        format!(
            "Connecting to AWS ({}{})...",
            code,
            profile
                .as_deref()
                .map(|p| format!(", profile {}", p))
                .unwrap_or_default()
        )
        .blue()
    );
    Ok(AwsNetworkProvider::connect(code, profile.as_deref()).await)
}

/// One-line summary of how much of the graph exists
pub fn print_progress(region: &RegionConfig) {
    let total = region.entities().len();
    let created = region.created_entities().len();
    println!("  {} of {} entities hold identifiers", created, total);
}
