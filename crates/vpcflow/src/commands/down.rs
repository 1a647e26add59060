use crate::utils;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use vpcflow_cloud::{Decommissioner, FileCheckpoint, WaitConfig};
use vpcflow_core::{CREATED_SUFFIX, REMOVED_SUFFIX, checkpoint_path};

pub async fn handle(
    file: Option<PathBuf>,
    region_override: Option<String>,
    profile: Option<String>,
    nat_timeout: u64,
    resume: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let source = vpcflow_config::resolve_region_file(file.as_deref())?;
    let created_path = checkpoint_path(&source, CREATED_SUFFIX);
    let removed_path = checkpoint_path(&source, REMOVED_SUFFIX);
    let load_path = if resume {
        removed_path.clone()
    } else {
        created_path.clone()
    };

    if !load_path.exists() {
        let hint = if resume {
            "nothing was interrupted"
        } else {
            "run `vpcflow up` first"
        };
        anyhow::bail!("{} does not exist; {}", load_path.display(), hint);
    }

    let mut region = utils::load_from(&load_path)?;
    utils::print_loaded_file(&load_path);

    let targets: Vec<String> = region
        .created_entities()
        .iter()
        .map(|e| format!("{} {} ({})", e.kind, e.name.cyan(), e.id.unwrap_or_default()))
        .collect();
    if targets.is_empty() {
        println!("{}", "Nothing to delete".green());
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!("Resources to delete ({}):", targets.len()).bold()
    );
    for target in &targets {
        println!("  • {}", target);
    }

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: these resources will be deleted permanently.".yellow()
        );
        println!("Re-run with --yes to delete them");
        return Ok(());
    }

    let provider = utils::connect(&region, region_override, profile).await?;
    let wait = WaitConfig::default().with_timeout(Some(Duration::from_secs(nat_timeout)));
    let mut checkpoint = FileCheckpoint::new(&removed_path);

    println!();
    println!(
        "{}",
        format!("Decommissioning {}...", region.name).yellow().bold()
    );
    let result = Decommissioner::new(&provider)
        .with_wait_config(wait)
        .with_announcer(|message: String| println!("  {}", message))
        .decommission(&mut region, &mut checkpoint)
        .await;

    match result {
        Ok(()) => {
            // the created checkpoint no longer describes anything that exists
            vpcflow_core::save_region(&created_path, &region)?;
            println!();
            println!("{}", "✓ Region decommissioned".green().bold());
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{}", "✗ Decommissioning stopped".red().bold());
            utils::print_progress(&region);
            if checkpoint.writes() > 0 {
                println!(
                    "  Continue with: vpcflow down --file {} --resume --yes",
                    source.display()
                );
            }
            Err(e.into())
        }
    }
}
