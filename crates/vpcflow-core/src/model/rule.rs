//! Rule definitions shared by network ACLs and security groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic direction of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Inbound,
    Outbound,
    /// Anything else found in a document
    #[serde(other)]
    Invalid,
}

impl RuleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for RuleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network ACL rule action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    Deny,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Numbered, ordered network ACL rule. Lower numbers evaluate first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub rule_number: i32,

    /// Console-style traffic label (`ALL Traffic`, `SSH`, `HTTP`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_type: Option<String>,

    /// `ALL`, `TCP`, `UDP` or a numeric protocol code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// `ALL`, a single port, or `from-to`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<String>,

    /// Literal CIDR or the name of a CIDR-bearing entity
    #[serde(alias = "cidr", alias = "source", alias = "destination")]
    pub peer: String,

    #[serde(default)]
    pub action: RuleAction,

    /// Explicit direction; defaults to the list the rule is declared in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RuleDirection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AclRule {
    pub fn new(rule_number: i32, protocol: &str, port_range: &str, peer: &str) -> Self {
        Self {
            rule_number,
            protocol: Some(protocol.to_string()),
            port_range: Some(port_range.to_string()),
            peer: peer.to_string(),
            ..Default::default()
        }
    }

    pub fn deny(mut self) -> Self {
        self.action = RuleAction::Deny;
        self
    }
}

/// Unordered security group rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub protocol: String,

    pub port_range: String,

    /// Literal CIDR or the name of a CIDR-bearing entity
    #[serde(alias = "cidr", alias = "source", alias = "destination")]
    pub peer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RuleDirection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SecurityGroupRule {
    pub fn new(protocol: &str, port_range: &str, peer: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            port_range: port_range.to_string(),
            peer: peer.to_string(),
            ..Default::default()
        }
    }
}

/// A rule together with the list it was declared in
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    Acl {
        placement: RuleDirection,
        rule: &'a AclRule,
    },
    SecurityGroup {
        placement: RuleDirection,
        rule: &'a SecurityGroupRule,
    },
}

impl<'a> Rule<'a> {
    /// Direction implied by the declaring list
    pub fn placement(&self) -> RuleDirection {
        match self {
            Rule::Acl { placement, .. } | Rule::SecurityGroup { placement, .. } => *placement,
        }
    }

    /// Direction written on the rule itself, if any
    pub fn declared_direction(&self) -> Option<RuleDirection> {
        match self {
            Rule::Acl { rule, .. } => rule.direction,
            Rule::SecurityGroup { rule, .. } => rule.direction,
        }
    }

    pub fn peer(&self) -> &'a str {
        match self {
            Rule::Acl { rule, .. } => &rule.peer,
            Rule::SecurityGroup { rule, .. } => &rule.peer,
        }
    }

    /// Human-readable identification used in error messages
    pub fn describe(&self) -> String {
        let comment = match self {
            Rule::Acl { rule, .. } => rule.comment.as_deref(),
            Rule::SecurityGroup { rule, .. } => rule.comment.as_deref(),
        };
        match (self, comment) {
            (_, Some(comment)) => comment.to_string(),
            (Rule::Acl { placement, rule }, None) => {
                format!("{} acl rule #{}", placement, rule.rule_number)
            }
            (Rule::SecurityGroup { placement, rule }, None) => format!(
                "{} security group rule {}/{} {}",
                placement, rule.protocol, rule.port_range, rule.peer
            ),
        }
    }
}
