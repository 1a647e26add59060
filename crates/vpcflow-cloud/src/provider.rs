//! Cloud network provider capability
//!
//! The orchestrators only talk to the provider through [`NetworkProvider`].
//! Every method is one blocking round-trip to the provider API; failures are
//! reported as [`CloudError::ProviderCallFailed`](crate::CloudError) carrying
//! the request and response for diagnosis. Retrying is the implementation's
//! business, not the orchestrator's.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use vpcflow_core::{SecurityGroup, Subnet, Vpc};

/// Provider value meaning "any protocol"
pub const WILDCARD_PROTOCOL: &str = "-1";

/// Protocol number for TCP
pub const TCP_PROTOCOL: &str = "6";

/// Protocol number for UDP
pub const UDP_PROTOCOL: &str = "17";

/// Rule number of the fixed fall-through deny entry every network ACL
/// carries. It cannot be removed.
pub const ACL_FALLTHROUGH_RULE_NUMBER: i32 = 32767;

/// Cloud network provider abstraction
///
/// One method per resource kind and operation. Implementations are bound to
/// a single region and a single set of credentials.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// Region code this provider operates in
    fn region(&self) -> &str;

    async fn create_internet_gateway(&self, name: &str) -> Result<String>;
    /// Succeeds when the gateway is already attached to `vpc_id`
    async fn attach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()>;
    /// Detaching a gateway that is no longer attached succeeds
    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()>;
    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()>;

    async fn allocate_address(&self, name: &str) -> Result<AllocatedAddress>;
    async fn release_address(&self, allocation_id: &str) -> Result<()>;

    async fn create_vpc(&self, vpc: &Vpc) -> Result<String>;
    async fn delete_vpc(&self, vpc_id: &str) -> Result<()>;

    async fn create_route_table(&self, vpc_id: &str, name: &str) -> Result<String>;
    /// The route table the provider created together with the VPC
    async fn main_route_table(&self, vpc_id: &str) -> Result<String>;
    /// Points the subnet at `route_table_id`, replacing any explicit
    /// association it already has
    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<()>;
    async fn list_routes(&self, route_table_id: &str) -> Result<Vec<RouteEntry>>;
    async fn create_route(&self, route_table_id: &str, route: &RouteEntry) -> Result<()>;
    async fn delete_route(&self, route_table_id: &str, destination_cidr: &str) -> Result<()>;
    async fn delete_route_table(&self, route_table_id: &str) -> Result<()>;

    async fn create_subnet(&self, vpc_id: &str, subnet: &Subnet) -> Result<String>;
    async fn delete_subnet(&self, subnet_id: &str) -> Result<()>;

    async fn create_network_acl(&self, vpc_id: &str, name: &str) -> Result<String>;
    /// The network ACL the provider created together with the VPC
    async fn default_network_acl(&self, vpc_id: &str) -> Result<String>;
    /// Move the subnet's ACL association to `acl_id`
    async fn associate_network_acl(&self, acl_id: &str, subnet_id: &str) -> Result<()>;
    async fn list_network_acl_entries(&self, acl_id: &str) -> Result<Vec<AclEntryKey>>;
    async fn create_network_acl_entry(&self, acl_id: &str, entry: &AclEntry) -> Result<()>;
    async fn delete_network_acl_entry(&self, acl_id: &str, key: AclEntryKey) -> Result<()>;
    async fn delete_network_acl(&self, acl_id: &str) -> Result<()>;

    async fn create_security_group(&self, vpc_id: &str, group: &SecurityGroup)
    -> Result<String>;
    /// The security group the provider created together with the VPC
    async fn default_security_group(&self, vpc_id: &str) -> Result<String>;
    async fn list_security_group_rules(&self, group_id: &str)
    -> Result<Vec<SecurityGroupRuleRef>>;
    async fn revoke_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        rule_ids: &[String],
    ) -> Result<()>;
    async fn authorize_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        permissions: &[SecurityGroupPermission],
    ) -> Result<()>;
    async fn delete_security_group(&self, group_id: &str) -> Result<()>;

    async fn create_nat_gateway(
        &self,
        name: &str,
        subnet_id: &str,
        allocation_id: &str,
    ) -> Result<String>;
    /// Deletion is asynchronous; poll [`describe_nat_gateway`](Self::describe_nat_gateway)
    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()>;
    /// A gateway the provider no longer knows about reports `Deleted`
    async fn describe_nat_gateway(&self, nat_gateway_id: &str) -> Result<NatGatewayState>;
}

/// Result of an address allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedAddress {
    pub allocation_id: String,
    pub public_ip: String,
}

/// Ingress or egress, as the provider API sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficDirection {
    Ingress,
    Egress,
}

impl TrafficDirection {
    pub fn is_egress(&self) -> bool {
        matches!(self, Self::Egress)
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => write!(f, "ingress"),
            Self::Egress => write!(f, "egress"),
        }
    }
}

/// Inclusive port range; `-1..-1` means every port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub from: i32,
    pub to: i32,
}

impl PortRange {
    pub const ALL: PortRange = PortRange { from: -1, to: -1 };

    pub fn single(port: i32) -> Self {
        Self {
            from: port,
            to: port,
        }
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

/// A network ACL entry ready to send to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub rule_number: i32,
    pub protocol: String,
    pub port_range: PortRange,
    pub cidr_block: String,
    pub allow: bool,
    pub direction: TrafficDirection,
}

impl AclEntry {
    pub fn key(&self) -> AclEntryKey {
        AclEntryKey {
            rule_number: self.rule_number,
            direction: self.direction,
        }
    }
}

/// Identity of an existing ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AclEntryKey {
    pub rule_number: i32,
    pub direction: TrafficDirection,
}

impl AclEntryKey {
    pub fn is_fallthrough(&self) -> bool {
        self.rule_number == ACL_FALLTHROUGH_RULE_NUMBER
    }
}

/// A security group permission ready to send to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupPermission {
    pub protocol: String,
    pub port_range: PortRange,
    pub cidr_block: String,
}

/// An existing security group rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRuleRef {
    pub rule_id: String,
    pub direction: TrafficDirection,
}

/// Where a route sends traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    InternetGateway(String),
    NatGateway(String),
    /// The VPC-local route the provider maintains itself
    Local,
    /// Any other target kind, reported by the provider but never created here
    Other(String),
}

/// A route, as listed by or sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub destination_cidr: String,
    pub target: RouteTarget,
}

impl RouteEntry {
    /// Whether the orchestrator may delete this route
    pub fn is_removable(&self) -> bool {
        !matches!(self.target, RouteTarget::Local)
    }
}

/// NAT gateway lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NatGatewayState {
    Pending,
    Available,
    Deleting,
    Deleted,
    Failed,
    Unknown(String),
}

impl NatGatewayState {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for NatGatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Available => write!(f, "available"),
            Self::Deleting => write!(f, "deleting"),
            Self::Deleted => write!(f, "deleted"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}
