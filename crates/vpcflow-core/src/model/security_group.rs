//! Security group definition

use super::rule::{Rule, RuleDirection, SecurityGroupRule};
use serde::{Deserialize, Serialize};

/// Stateful, unordered rule set applied at the interface boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub name: String,

    /// Stands for the VPC's pre-created group; never created or deleted
    #[serde(default)]
    pub default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub inbound_rules: Vec<SecurityGroupRule>,

    #[serde(default)]
    pub outbound_rules: Vec<SecurityGroupRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SecurityGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Description sent to the provider, which requires a non-empty one
    pub fn description_or_name(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn rules(&self) -> impl Iterator<Item = Rule<'_>> {
        let inbound = self.inbound_rules.iter().map(|rule| Rule::SecurityGroup {
            placement: RuleDirection::Inbound,
            rule,
        });
        let outbound = self.outbound_rules.iter().map(|rule| Rule::SecurityGroup {
            placement: RuleDirection::Outbound,
            rule,
        });
        inbound.chain(outbound)
    }
}
