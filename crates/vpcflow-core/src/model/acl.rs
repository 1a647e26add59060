//! Network ACL definition

use super::rule::{AclRule, Rule, RuleDirection};
use serde::{Deserialize, Serialize};

/// Stateless, numbered rule set applied at the subnet boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAcl {
    pub name: String,

    /// Stands for the VPC's pre-created ACL; never created or deleted
    #[serde(default)]
    pub default: bool,

    /// Comma-separated subnet names to associate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnets: Option<String>,

    #[serde(default)]
    pub inbound_rules: Vec<AclRule>,

    #[serde(default)]
    pub outbound_rules: Vec<AclRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NetworkAcl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Subnet names from the comma-separated list, blanks dropped
    pub fn subnet_names(&self) -> Vec<&str> {
        self.subnets
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Inbound rules first, then outbound, each in declaration order
    pub fn rules(&self) -> impl Iterator<Item = Rule<'_>> {
        let inbound = self.inbound_rules.iter().map(|rule| Rule::Acl {
            placement: RuleDirection::Inbound,
            rule,
        });
        let outbound = self.outbound_rules.iter().map(|rule| Rule::Acl {
            placement: RuleDirection::Outbound,
            rule,
        });
        inbound.chain(outbound)
    }
}
