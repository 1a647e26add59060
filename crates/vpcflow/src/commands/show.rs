use crate::utils;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(file: Option<PathBuf>) -> anyhow::Result<()> {
    let (path, region) = utils::load_document(file)?;
    utils::print_loaded_file(&path);

    println!();
    println!("{} ({})", region.name.bold(), region.region);
    for gateway in &region.internet_gateways {
        entity(1, "internet gateway", &gateway.name, None, &gateway.id);
    }
    for eip in &region.elastic_ips {
        entity(
            1,
            "elastic ip",
            &eip.name,
            eip.public_ip.as_deref(),
            &eip.allocation_id,
        );
    }

    for vpc in &region.vpcs {
        entity(1, "vpc", &vpc.name, Some(&vpc.cidr_block), &vpc.id);
        if let Some(gateway) = &vpc.internet_gateway {
            println!("{}via {}", indent(2), gateway.cyan());
        }
        for table in &vpc.route_tables {
            entity(2, "route table", &table.name, default_note(table.default), &table.id);
            for route in &table.routes {
                println!("{}{} → {}", indent(3), route.destination, route.target.cyan());
            }
        }
        for subnet in &vpc.subnets {
            entity(2, "subnet", &subnet.name, Some(&subnet.cidr_block), &subnet.id);
        }
        for acl in &vpc.network_acls {
            entity(2, "network acl", &acl.name, default_note(acl.default), &acl.id);
            let subnets = acl.subnet_names();
            if !subnets.is_empty() {
                println!("{}subnets: {}", indent(3), subnets.join(", "));
            }
            println!(
                "{}{} inbound, {} outbound rules",
                indent(3),
                acl.inbound_rules.len(),
                acl.outbound_rules.len()
            );
        }
        for group in &vpc.security_groups {
            entity(2, "security group", &group.name, default_note(group.default), &group.id);
            println!(
                "{}{} inbound, {} outbound rules",
                indent(3),
                group.inbound_rules.len(),
                group.outbound_rules.len()
            );
        }
        for nat in &vpc.nat_gateways {
            let placement = format!("in {} with {}", nat.subnet, nat.elastic_ip);
            entity(2, "nat gateway", &nat.name, Some(&placement), &nat.id);
        }
    }

    println!();
    utils::print_progress(&region);
    Ok(())
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn default_note(default: bool) -> Option<&'static str> {
    default.then_some("(default)")
}

fn entity(depth: usize, kind: &str, name: &str, detail: Option<&str>, id: &Option<String>) {
    let mark = match id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => format!("✓ {}", id).green().to_string(),
        None => "·".dimmed().to_string(),
    };
    let detail = detail
        .map(|d| format!(" {}", d.dimmed()))
        .unwrap_or_default();
    println!("{}{} {}{}  {}", indent(depth), kind, name.cyan(), detail, mark);
}
