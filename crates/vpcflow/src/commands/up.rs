use crate::utils;
use colored::Colorize;
use std::path::PathBuf;
use vpcflow_cloud::{FileCheckpoint, Provisioner};
use vpcflow_core::{CREATED_SUFFIX, checkpoint_path};

pub async fn handle(
    file: Option<PathBuf>,
    region_override: Option<String>,
    profile: Option<String>,
    resume: bool,
) -> anyhow::Result<()> {
    let source = vpcflow_config::resolve_region_file(file.as_deref())?;
    let created_path = checkpoint_path(&source, CREATED_SUFFIX);

    let load_path = if resume {
        if !created_path.exists() {
            anyhow::bail!(
                "No checkpoint to resume from: {} does not exist",
                created_path.display()
            );
        }
        created_path.clone()
    } else {
        // refuse to overwrite the only record of live resources
        if created_path.exists() && created_path != source {
            let previous = utils::load_from(&created_path)?;
            if !previous.created_entities().is_empty() {
                anyhow::bail!(
                    "{} still records {} created resources; run `vpcflow down` or `vpcflow up --resume` first",
                    created_path.display(),
                    previous.created_entities().len()
                );
            }
        }
        source.clone()
    };

    let mut region = utils::load_from(&load_path)?;
    utils::print_loaded_file(&load_path);
    vpcflow_core::validate(&region, !resume)?;

    let provider = utils::connect(&region, region_override, profile).await?;
    let mut checkpoint = FileCheckpoint::new(&created_path);

    println!();
    if resume {
        println!("{}", format!("Resuming {}...", region.name).yellow().bold());
        utils::print_progress(&region);
    } else {
        println!("{}", format!("Provisioning {}...", region.name).yellow().bold());
    }

    let provisioner = Provisioner::new(&provider);
    let result = if resume {
        provisioner.resume(&mut region, &mut checkpoint).await
    } else {
        provisioner.provision(&mut region, &mut checkpoint).await
    };

    match result {
        Ok(()) => {
            println!();
            println!("{}", "✓ Region provisioned".green().bold());
            utils::print_progress(&region);
            println!(
                "  Identifiers recorded in {}",
                created_path.display().to_string().cyan()
            );
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{}", "✗ Provisioning stopped".red().bold());
            utils::print_progress(&region);
            if checkpoint.writes() > 0 {
                println!(
                    "  Progress saved to {}",
                    created_path.display().to_string().cyan()
                );
                println!(
                    "  Continue with: vpcflow up --file {} --resume",
                    source.display()
                );
            }
            Err(e.into())
        }
    }
}
