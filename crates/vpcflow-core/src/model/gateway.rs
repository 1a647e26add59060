//! Region-level gateways and addresses, plus the VPC-scoped NAT gateway

use serde::{Deserialize, Serialize};

/// Internet gateway, attachable to one VPC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGateway {
    pub name: String,

    /// Provider-assigned identifier (e.g. `igw-0a1b2c`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl InternetGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

/// Reserved public address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticIp {
    pub name: String,

    /// Allocation identifier, the handle used for release and NAT attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_id: Option<String>,

    /// The allocated public address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
}

impl ElasticIp {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allocation_id: None,
            public_ip: None,
        }
    }
}

/// NAT gateway placed in a subnet and fronted by an elastic address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatGateway {
    pub name: String,

    /// Name of the subnet the gateway lives in
    pub subnet: String,

    /// Name of the elastic address the gateway uses
    pub elastic_ip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NatGateway {
    pub fn new(
        name: impl Into<String>,
        subnet: impl Into<String>,
        elastic_ip: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subnet: subnet.into(),
            elastic_ip: elastic_ip.into(),
            id: None,
        }
    }
}
