//! Subnet definition

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,

    pub cidr_block: String,

    /// Availability zone (e.g. `ap-northeast-1a`); provider picks one when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,

    /// Name of the route table to associate with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Subnet {
    pub fn new(name: impl Into<String>, cidr_block: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr_block: cidr_block.into(),
            ..Default::default()
        }
    }

    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.availability_zone = Some(zone.into());
        self
    }

    pub fn with_route_table(mut self, route_table: impl Into<String>) -> Self {
        self.route_table = Some(route_table.into());
        self
    }
}
