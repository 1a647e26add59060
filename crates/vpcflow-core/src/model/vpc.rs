//! VPC definition

use super::acl::NetworkAcl;
use super::gateway::NatGateway;
use super::route::RouteTable;
use super::security_group::SecurityGroup;
use super::subnet::Subnet;
use serde::{Deserialize, Serialize};

/// Instance tenancy of a VPC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenancy {
    #[default]
    Default,
    Dedicated,
    Host,
}

impl Tenancy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dedicated => "dedicated",
            Self::Host => "host",
        }
    }
}

/// Isolated virtual network and everything nested in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub name: String,

    pub cidr_block: String,

    #[serde(default)]
    pub tenancy: Tenancy,

    /// Name of the internet gateway to attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_gateway: Option<String>,

    #[serde(default)]
    pub route_tables: Vec<RouteTable>,

    #[serde(default)]
    pub subnets: Vec<Subnet>,

    #[serde(default)]
    pub network_acls: Vec<NetworkAcl>,

    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,

    #[serde(default)]
    pub nat_gateways: Vec<NatGateway>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Vpc {
    pub fn new(name: impl Into<String>, cidr_block: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr_block: cidr_block.into(),
            ..Default::default()
        }
    }

    pub fn with_internet_gateway(mut self, name: impl Into<String>) -> Self {
        self.internet_gateway = Some(name.into());
        self
    }

    pub fn find_subnet(&self, name: &str) -> Option<&Subnet> {
        self.subnets.iter().find(|s| s.name == name)
    }

    pub fn find_route_table(&self, name: &str) -> Option<&RouteTable> {
        self.route_tables.iter().find(|r| r.name == name)
    }
}
