//! Region configuration, the root of the graph

use super::gateway::{ElasticIp, InternetGateway};
use super::vpc::Vpc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root entity: one provider region and everything provisioned in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,

    /// Provider region code (e.g. `ap-northeast-1`)
    pub region: String,

    #[serde(default)]
    pub internet_gateways: Vec<InternetGateway>,

    #[serde(default)]
    pub elastic_ips: Vec<ElasticIp>,

    #[serde(default)]
    pub vpcs: Vec<Vpc>,
}

/// Kind of a graph entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    InternetGateway,
    ElasticIp,
    Vpc,
    RouteTable,
    Subnet,
    NetworkAcl,
    SecurityGroup,
    NatGateway,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::InternetGateway => "internet gateway",
            EntityKind::ElasticIp => "elastic ip",
            EntityKind::Vpc => "vpc",
            EntityKind::RouteTable => "route table",
            EntityKind::Subnet => "subnet",
            EntityKind::NetworkAcl => "network acl",
            EntityKind::SecurityGroup => "security group",
            EntityKind::NatGateway => "nat gateway",
        };
        f.write_str(s)
    }
}

/// Borrowed view of one entity's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef<'a> {
    pub kind: EntityKind,
    pub name: &'a str,
    pub id: Option<&'a str>,
}

impl EntityRef<'_> {
    /// Whether the provider identifier is present and non-empty
    pub fn is_created(&self) -> bool {
        self.id.is_some_and(|id| !id.is_empty())
    }
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// Every entity in document order: region-level resources first, then
    /// each VPC followed by its nested resources
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        let mut out = Vec::new();
        for igw in &self.internet_gateways {
            out.push(EntityRef {
                kind: EntityKind::InternetGateway,
                name: &igw.name,
                id: igw.id.as_deref(),
            });
        }
        for eip in &self.elastic_ips {
            out.push(EntityRef {
                kind: EntityKind::ElasticIp,
                name: &eip.name,
                id: eip.allocation_id.as_deref(),
            });
        }
        for vpc in &self.vpcs {
            out.push(EntityRef {
                kind: EntityKind::Vpc,
                name: &vpc.name,
                id: vpc.id.as_deref(),
            });
            for rt in &vpc.route_tables {
                out.push(EntityRef {
                    kind: EntityKind::RouteTable,
                    name: &rt.name,
                    id: rt.id.as_deref(),
                });
            }
            for subnet in &vpc.subnets {
                out.push(EntityRef {
                    kind: EntityKind::Subnet,
                    name: &subnet.name,
                    id: subnet.id.as_deref(),
                });
            }
            for acl in &vpc.network_acls {
                out.push(EntityRef {
                    kind: EntityKind::NetworkAcl,
                    name: &acl.name,
                    id: acl.id.as_deref(),
                });
            }
            for sg in &vpc.security_groups {
                out.push(EntityRef {
                    kind: EntityKind::SecurityGroup,
                    name: &sg.name,
                    id: sg.id.as_deref(),
                });
            }
            for nat in &vpc.nat_gateways {
                out.push(EntityRef {
                    kind: EntityKind::NatGateway,
                    name: &nat.name,
                    id: nat.id.as_deref(),
                });
            }
        }
        out
    }

    /// Entities currently holding a provider identifier
    pub fn created_entities(&self) -> Vec<EntityRef<'_>> {
        self.entities()
            .into_iter()
            .filter(EntityRef::is_created)
            .collect()
    }

    /// True once every entity holds an identifier
    pub fn is_fully_provisioned(&self) -> bool {
        self.entities().iter().all(EntityRef::is_created)
    }

    /// True when no entity holds an identifier or allocated address
    pub fn is_pristine(&self) -> bool {
        self.created_entities().is_empty()
            && self.elastic_ips.iter().all(|e| e.public_ip.is_none())
    }

    /// Drop every provider-assigned value, keeping the desired state
    pub fn clear_identifiers(&mut self) {
        for igw in &mut self.internet_gateways {
            igw.id = None;
        }
        for eip in &mut self.elastic_ips {
            eip.allocation_id = None;
            eip.public_ip = None;
        }
        for vpc in &mut self.vpcs {
            vpc.id = None;
            vpc.route_tables.iter_mut().for_each(|r| r.id = None);
            vpc.subnets.iter_mut().for_each(|s| s.id = None);
            vpc.network_acls.iter_mut().for_each(|a| a.id = None);
            vpc.security_groups.iter_mut().for_each(|g| g.id = None);
            vpc.nat_gateways.iter_mut().for_each(|n| n.id = None);
        }
    }

    pub fn find_internet_gateway(&self, name: &str) -> Option<&InternetGateway> {
        self.internet_gateways.iter().find(|g| g.name == name)
    }

    pub fn find_elastic_ip(&self, name: &str) -> Option<&ElasticIp> {
        self.elastic_ips.iter().find(|e| e.name == name)
    }
}
