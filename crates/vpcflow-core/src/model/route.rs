//! Route table definition

use serde::{Deserialize, Serialize};

/// Route table
///
/// The provider pre-creates exactly one main route table per VPC. A table
/// flagged `default` stands for that one: it is never created or deleted,
/// only its routes are replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub name: String,

    #[serde(default)]
    pub default: bool,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RouteTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn default_table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: true,
            ..Default::default()
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }
}

/// A single route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Name of a CIDR-bearing entity, the all-traffic pseudo-name, or a literal CIDR
    pub destination: String,

    /// Name of an internet gateway or NAT gateway
    pub target: String,
}

impl Route {
    pub fn new(destination: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            target: target.into(),
        }
    }
}
