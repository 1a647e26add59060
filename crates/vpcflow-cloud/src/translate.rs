//! Rule and route translation
//!
//! Turns declarative rules and routes into the values the provider API
//! expects. Pure functions; the only failure mode is an error.

use crate::error::{CloudError, Result};
use crate::provider::{
    AclEntry, PortRange, RouteEntry, SecurityGroupPermission, TCP_PROTOCOL, TrafficDirection,
    UDP_PROTOCOL, WILDCARD_PROTOCOL,
};
use crate::resolver::NameResolver;
use vpcflow_core::{NetworkAcl, Route, RouteTable, Rule, RuleAction, RuleDirection, SecurityGroup};

/// Normalize a protocol: `ALL` becomes the wildcard, `TCP`/`UDP` their
/// protocol numbers, anything else passes through (numeric codes).
pub fn protocol(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        WILDCARD_PROTOCOL.to_string()
    } else if trimmed.eq_ignore_ascii_case("tcp") {
        TCP_PROTOCOL.to_string()
    } else if trimmed.eq_ignore_ascii_case("udp") {
        UDP_PROTOCOL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalize a port range: `ALL`, `from-to`, or a single port
pub fn port_range(value: &str) -> Result<PortRange> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok(PortRange::ALL);
    }
    match trimmed.split_once('-') {
        Some((from, to)) => {
            let range = PortRange {
                from: parse_port(from, value)?,
                to: parse_port(to, value)?,
            };
            if range.from > range.to {
                return Err(CloudError::format(value, "range start exceeds range end"));
            }
            Ok(range)
        }
        None => Ok(PortRange::single(parse_port(trimmed, value)?)),
    }
}

fn parse_port(part: &str, whole: &str) -> Result<i32> {
    part.trim()
        .parse::<u16>()
        .map(i32::from)
        .map_err(|e| CloudError::format(whole, format!("not a port number: {}", e)))
}

/// Protocol and port range implied by a console-style traffic type
pub fn traffic_type_preset(traffic_type: &str) -> Option<(&'static str, &'static str)> {
    let preset = match traffic_type.trim().to_ascii_lowercase().as_str() {
        "all traffic" | "all" => ("ALL", "ALL"),
        "ssh" => ("TCP", "22"),
        "http" => ("TCP", "80"),
        "https" => ("TCP", "443"),
        "rdp" => ("TCP", "3389"),
        "mysql/aurora" | "mysql" => ("TCP", "3306"),
        "postgresql" => ("TCP", "5432"),
        "dns (udp)" | "dns" => ("UDP", "53"),
        _ => return None,
    };
    Some(preset)
}

/// Provider direction of a rule. The rule's declared direction, when given,
/// must agree with the list it was declared in.
pub fn direction(rule: &Rule<'_>) -> Result<TrafficDirection> {
    let placement = rule.placement();
    let effective = match rule.declared_direction() {
        None => placement,
        Some(declared) if declared == placement => declared,
        Some(_) => {
            return Err(CloudError::InvalidDirection {
                rule: rule.describe(),
            });
        }
    };
    match effective {
        RuleDirection::Inbound => Ok(TrafficDirection::Ingress),
        RuleDirection::Outbound => Ok(TrafficDirection::Egress),
        RuleDirection::Invalid => Err(CloudError::InvalidDirection {
            rule: rule.describe(),
        }),
    }
}

/// Translate one rule of either kind
pub fn translate_rule(
    rule: Rule<'_>,
    owner: &str,
    resolver: &NameResolver,
) -> Result<TranslatedRule> {
    let direction = direction(&rule)?;
    let referrer = format!("{} {}", owner, rule.describe());
    let cidr_block = resolver.cidr(rule.peer(), &referrer)?;

    match rule {
        Rule::Acl { rule: acl_rule, .. } => {
            let (raw_protocol, raw_ports) = match (&acl_rule.protocol, &acl_rule.port_range) {
                (Some(p), Some(r)) => (p.as_str(), r.as_str()),
                (p, r) => {
                    let traffic_type = acl_rule.traffic_type.as_deref().unwrap_or_default();
                    let (preset_protocol, preset_ports) = traffic_type_preset(traffic_type)
                        .ok_or_else(|| {
                            CloudError::format(
                                traffic_type,
                                format!(
                                    "{} has no protocol/port range and an unknown traffic type",
                                    referrer
                                ),
                            )
                        })?;
                    (
                        p.as_deref().unwrap_or(preset_protocol),
                        r.as_deref().unwrap_or(preset_ports),
                    )
                }
            };
            Ok(TranslatedRule::Acl(AclEntry {
                rule_number: acl_rule.rule_number,
                protocol: protocol(raw_protocol),
                port_range: port_range(raw_ports)?,
                cidr_block,
                allow: acl_rule.action == RuleAction::Allow,
                direction,
            }))
        }
        Rule::SecurityGroup { rule: sg_rule, .. } => Ok(TranslatedRule::SecurityGroup {
            direction,
            permission: SecurityGroupPermission {
                protocol: protocol(&sg_rule.protocol),
                port_range: port_range(&sg_rule.port_range)?,
                cidr_block,
            },
        }),
    }
}

/// Output of [`translate_rule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatedRule {
    Acl(AclEntry),
    SecurityGroup {
        direction: TrafficDirection,
        permission: SecurityGroupPermission,
    },
}

/// Every entry of a network ACL, inbound first
pub fn acl_entries(acl: &NetworkAcl, resolver: &NameResolver) -> Result<Vec<AclEntry>> {
    let owner = format!("network acl '{}'", acl.name);
    let mut entries = Vec::new();
    for rule in acl.rules() {
        if let TranslatedRule::Acl(entry) = translate_rule(rule, &owner, resolver)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Security group permissions split into (ingress, egress)
pub fn security_group_permissions(
    group: &SecurityGroup,
    resolver: &NameResolver,
) -> Result<(Vec<SecurityGroupPermission>, Vec<SecurityGroupPermission>)> {
    let owner = format!("security group '{}'", group.name);
    let mut ingress = Vec::new();
    let mut egress = Vec::new();
    for rule in group.rules() {
        if let TranslatedRule::SecurityGroup {
            direction,
            permission,
        } = translate_rule(rule, &owner, resolver)?
        {
            match direction {
                TrafficDirection::Ingress => ingress.push(permission),
                TrafficDirection::Egress => egress.push(permission),
            }
        }
    }
    Ok((ingress, egress))
}

/// Resolve a route's destination CIDR and target gateway
pub fn route_entry(
    table: &RouteTable,
    route: &Route,
    resolver: &NameResolver,
) -> Result<RouteEntry> {
    let referrer = format!(
        "route table '{}' route {} -> {}",
        table.name, route.destination, route.target
    );
    Ok(RouteEntry {
        destination_cidr: resolver.cidr(&route.destination, &referrer)?,
        target: resolver.route_target(&route.target, &referrer)?,
    })
}

/// Every route of a table; fails before returning anything if one is unresolved
pub fn route_entries(table: &RouteTable, resolver: &NameResolver) -> Result<Vec<RouteEntry>> {
    table
        .routes
        .iter()
        .map(|route| route_entry(table, route, resolver))
        .collect()
}
