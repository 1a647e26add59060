//! Pre-flight invariant checks on a region graph
//!
//! Checks run before any provider call. Nothing here mutates the graph.

use crate::error::{GraphError, Result};
use crate::model::{EntityKind, RegionConfig, Vpc};
use std::collections::BTreeMap;
use tracing::debug;

/// Validate a region graph.
///
/// With `require_no_identifiers` set (fresh provisioning) any entity already
/// holding an identifier is a [`GraphError::PreconditionViolation`]. Names
/// must be unique across the whole graph in every mode, since references are
/// resolved by name.
pub fn validate(region: &RegionConfig, require_no_identifiers: bool) -> Result<()> {
    let entities = region.entities();

    if require_no_identifiers {
        let created: Vec<String> = entities
            .iter()
            .filter(|e| e.is_created())
            .map(|e| format!("{} '{}'", e.kind, e.name))
            .collect();
        if !created.is_empty() {
            return Err(GraphError::PreconditionViolation(format!(
                "expected no identifiers, found some on: {}",
                created.join(", ")
            )));
        }
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entity in &entities {
        *counts.entry(entity.name).or_default() += 1;
    }
    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    if !duplicates.is_empty() {
        return Err(GraphError::NameCollision(duplicates));
    }

    for vpc in &region.vpcs {
        check_single_default(vpc)?;
    }

    debug!(
        region = %region.name,
        entities = entities.len(),
        "Region graph validated"
    );
    Ok(())
}

/// A VPC has one pre-created route table, ACL and security group each.
/// Declaring none of a kind is fine; declaring two is not.
fn check_single_default(vpc: &Vpc) -> Result<()> {
    let defaults = [
        (
            EntityKind::RouteTable,
            vpc.route_tables.iter().filter(|r| r.default).count(),
        ),
        (
            EntityKind::NetworkAcl,
            vpc.network_acls.iter().filter(|a| a.default).count(),
        ),
        (
            EntityKind::SecurityGroup,
            vpc.security_groups.iter().filter(|g| g.default).count(),
        ),
    ];
    for (kind, count) in defaults {
        if count > 1 {
            return Err(GraphError::PreconditionViolation(format!(
                "vpc '{}' declares {} default {}s, at most one is allowed",
                vpc.name, count, kind
            )));
        }
    }
    Ok(())
}
