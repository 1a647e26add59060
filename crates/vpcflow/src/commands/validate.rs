use crate::utils;
use anyhow::Context;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(file: Option<PathBuf>, fresh: bool) -> anyhow::Result<()> {
    println!("{}", "Validating region document...".blue());

    let (path, region) = utils::load_document(file)?;
    utils::print_loaded_file(&path);

    vpcflow_core::validate(&region, fresh).context("Region document is invalid")?;

    println!("{}", "✓ Region document is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Region: {} ({})", region.name.cyan(), region.region);
    println!("  Internet gateways: {}", region.internet_gateways.len());
    println!("  Elastic IPs: {}", region.elastic_ips.len());
    println!("  VPCs: {}", region.vpcs.len());
    for vpc in &region.vpcs {
        println!(
            "    - {} ({}): {} subnets, {} route tables, {} network ACLs, {} security groups, {} NAT gateways",
            vpc.name.cyan(),
            vpc.cidr_block,
            vpc.subnets.len(),
            vpc.route_tables.len(),
            vpc.network_acls.len(),
            vpc.security_groups.len(),
            vpc.nat_gateways.len()
        );
    }
    utils::print_progress(&region);
    Ok(())
}
