//! Name resolution
//!
//! Maps symbolic entity names to values that only exist once the entity has
//! been created: CIDR blocks, internet gateway ids and NAT gateway ids. The
//! maps live for a single provisioning run. On resume they are rebuilt from
//! the identifiers already recorded in the graph.

use crate::error::{CloudError, Result};
use crate::provider::RouteTarget;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::net::Ipv4Addr;
use tracing::debug;
use vpcflow_core::RegionConfig;

/// Pseudo-name that resolves to every address
pub const ALL_TRAFFIC: &str = "all-traffic";

/// CIDR the all-traffic pseudo-name resolves to
pub const ALL_TRAFFIC_CIDR: &str = "0.0.0.0/0";

#[derive(Debug, Clone)]
pub struct NameResolver {
    cidrs: HashMap<String, String>,
    internet_gateways: HashMap<String, String>,
    nat_gateways: HashMap<String, String>,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver {
    /// Empty resolver, seeded with the all-traffic CIDR
    pub fn new() -> Self {
        let mut cidrs = HashMap::new();
        cidrs.insert(ALL_TRAFFIC.to_string(), ALL_TRAFFIC_CIDR.to_string());
        Self {
            cidrs,
            internet_gateways: HashMap::new(),
            nat_gateways: HashMap::new(),
        }
    }

    /// Replay the identifiers already present in a partially provisioned graph
    pub fn from_region(region: &RegionConfig) -> Self {
        let mut resolver = Self::new();
        for igw in &region.internet_gateways {
            if let Some(id) = created(&igw.id) {
                resolver.insert_internet_gateway(&igw.name, id);
            }
        }
        for vpc in &region.vpcs {
            if created(&vpc.id).is_some() {
                resolver.insert_cidr(&vpc.name, &vpc.cidr_block);
            }
            for subnet in &vpc.subnets {
                if created(&subnet.id).is_some() {
                    resolver.insert_cidr(&subnet.name, &subnet.cidr_block);
                }
            }
            for nat in &vpc.nat_gateways {
                if let Some(id) = created(&nat.id) {
                    resolver.insert_nat_gateway(&nat.name, id);
                }
            }
        }
        debug!(
            cidrs = resolver.cidrs.len(),
            internet_gateways = resolver.internet_gateways.len(),
            nat_gateways = resolver.nat_gateways.len(),
            "Rebuilt name resolver from region graph"
        );
        resolver
    }

    /// Record a CIDR. Returns false if the name was already bound; the first
    /// binding is kept.
    pub fn insert_cidr(&mut self, name: &str, cidr: &str) -> bool {
        write_once(&mut self.cidrs, name, cidr)
    }

    pub fn insert_internet_gateway(&mut self, name: &str, id: &str) -> bool {
        write_once(&mut self.internet_gateways, name, id)
    }

    pub fn insert_nat_gateway(&mut self, name: &str, id: &str) -> bool {
        write_once(&mut self.nat_gateways, name, id)
    }

    /// Resolve a rule or route peer to a CIDR. A literal IPv4 CIDR is
    /// returned unchanged.
    pub fn cidr(&self, name: &str, referrer: &str) -> Result<String> {
        if is_ipv4_cidr(name) {
            return Ok(name.to_string());
        }
        self.cidrs
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::dangling(name, referrer))
    }

    pub fn internet_gateway(&self, name: &str) -> Option<&str> {
        self.internet_gateways.get(name).map(String::as_str)
    }

    pub fn nat_gateway(&self, name: &str) -> Option<&str> {
        self.nat_gateways.get(name).map(String::as_str)
    }

    /// Resolve a route target. Internet gateways are looked up first, then
    /// NAT gateways.
    pub fn route_target(&self, name: &str, referrer: &str) -> Result<RouteTarget> {
        if let Some(id) = self.internet_gateway(name) {
            return Ok(RouteTarget::InternetGateway(id.to_string()));
        }
        if let Some(id) = self.nat_gateway(name) {
            return Ok(RouteTarget::NatGateway(id.to_string()));
        }
        Err(CloudError::dangling(name, referrer))
    }
}

fn write_once(map: &mut HashMap<String, String>, name: &str, value: &str) -> bool {
    match map.entry(name.to_string()) {
        Entry::Occupied(existing) => {
            debug!(
                name,
                kept = %existing.get(),
                ignored = value,
                "Name already resolved, keeping first binding"
            );
            false
        }
        Entry::Vacant(slot) => {
            slot.insert(value.to_string());
            true
        }
    }
}

fn created(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.is_empty())
}

/// `a.b.c.d/n` with a valid address and `n <= 32`
pub fn is_ipv4_cidr(value: &str) -> bool {
    match value.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
        }
        None => false,
    }
}
