//! In-memory network provider and region fixtures shared by the
//! orchestration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use vpcflow_cloud::{
    ACL_FALLTHROUGH_RULE_NUMBER, AclEntry, AclEntryKey, AllocatedAddress, CloudError,
    NatGatewayState, NetworkProvider, Result, RouteEntry, RouteTarget, SecurityGroupPermission,
    SecurityGroupRuleRef, TrafficDirection, WaitConfig,
};
use vpcflow_core::{
    AclRule, ElasticIp, InternetGateway, NatGateway, NetworkAcl, RegionConfig, Route, RouteTable,
    SecurityGroup, SecurityGroupRule, Subnet, Vpc,
};

#[derive(Default)]
struct State {
    next_id: u32,
    calls: Vec<String>,
    live: HashSet<String>,
    vpc_defaults: HashMap<String, (String, String, String)>,
    attachments: HashMap<String, String>,
    subnet_route_tables: HashMap<String, String>,
    routes: HashMap<String, Vec<RouteEntry>>,
    acl_entries: HashMap<String, Vec<AclEntryKey>>,
    sg_rules: HashMap<String, Vec<SecurityGroupRuleRef>>,
    nat_polls_left: HashMap<String, u32>,
    fail_on: Option<String>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }

    fn record(&mut self, op: &str, detail: impl AsRef<str>) -> Result<()> {
        self.calls.push(format!("{} {}", op, detail.as_ref()));
        if self.fail_on.as_deref() == Some(op) {
            return Err(CloudError::provider(
                op,
                detail.as_ref(),
                "InjectedFailure: provider refused the call",
            ));
        }
        Ok(())
    }

    fn require_live(&self, op: &str, id: &str) -> Result<()> {
        if self.live.contains(id) {
            Ok(())
        } else {
            Err(CloudError::provider(op, id, "NotFound: no such resource"))
        }
    }

    fn remove(&mut self, op: &str, id: &str) -> Result<()> {
        self.require_live(op, id)?;
        self.live.remove(id);
        Ok(())
    }
}

/// Recording fake that behaves like a small provider: it hands out
/// sequential identifiers, pre-populates the default rule sets a real
/// provider creates, and drains NAT gateways over several polls.
pub struct FakeProvider {
    state: Mutex<State>,
    nat_polls_before_deleted: u32,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_nat_polls(2)
    }

    /// NAT gateways report `deleting` this many times before `deleted`
    pub fn with_nat_polls(polls: u32) -> Self {
        Self {
            state: Mutex::new(State::default()),
            nat_polls_before_deleted: polls,
        }
    }

    pub fn fail_on(&self, op: &str) {
        self.state.lock().unwrap().fail_on = Some(op.to_string());
    }

    pub fn clear_failure(&self) {
        self.state.lock().unwrap().fail_on = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Calls whose operation name equals `op`
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .collect()
    }

    /// Index of the first call to `op`
    pub fn first(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .position(|c| c.split(' ').next() == Some(op))
            .unwrap_or_else(|| panic!("{} was never called", op))
    }

    /// Index of the last call to `op`
    pub fn last(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .rposition(|c| c.split(' ').next() == Some(op))
            .unwrap_or_else(|| panic!("{} was never called", op))
    }

    /// Resources that exist on the fake provider right now
    pub fn live_resources(&self) -> HashSet<String> {
        self.state.lock().unwrap().live.clone()
    }

    pub fn routes(&self, route_table_id: &str) -> Vec<RouteEntry> {
        self.state.lock().unwrap().routes[route_table_id].clone()
    }

    pub fn acl_entries(&self, acl_id: &str) -> Vec<AclEntryKey> {
        self.state.lock().unwrap().acl_entries[acl_id].clone()
    }

    pub fn sg_rule_count(&self, group_id: &str, direction: TrafficDirection) -> usize {
        self.state.lock().unwrap().sg_rules[group_id]
            .iter()
            .filter(|r| r.direction == direction)
            .count()
    }

    pub fn attachment(&self, gateway_id: &str) -> Option<String> {
        self.state.lock().unwrap().attachments.get(gateway_id).cloned()
    }

    /// Route table explicitly associated with the subnet, if any
    pub fn subnet_route_table(&self, subnet_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .subnet_route_tables
            .get(subnet_id)
            .cloned()
    }
}

fn allow_all_entries() -> Vec<AclEntryKey> {
    let mut entries = Vec::new();
    for direction in [TrafficDirection::Ingress, TrafficDirection::Egress] {
        entries.push(AclEntryKey {
            rule_number: 100,
            direction,
        });
        entries.push(AclEntryKey {
            rule_number: ACL_FALLTHROUGH_RULE_NUMBER,
            direction,
        });
    }
    entries
}

fn fallthrough_entries() -> Vec<AclEntryKey> {
    [TrafficDirection::Ingress, TrafficDirection::Egress]
        .into_iter()
        .map(|direction| AclEntryKey {
            rule_number: ACL_FALLTHROUGH_RULE_NUMBER,
            direction,
        })
        .collect()
}

#[async_trait]
impl NetworkProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn region(&self) -> &str {
        "test-region-1"
    }

    async fn create_internet_gateway(&self, name: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_internet_gateway", name)?;
        let id = s.id("igw");
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn attach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("attach_internet_gateway", format!("{} {}", gateway_id, vpc_id))?;
        s.require_live("attach_internet_gateway", gateway_id)?;
        s.require_live("attach_internet_gateway", vpc_id)?;
        match s.attachments.get(gateway_id) {
            Some(attached) if attached != vpc_id => Err(CloudError::provider(
                "attach_internet_gateway",
                gateway_id,
                "Resource.AlreadyAssociated: gateway is attached to another VPC",
            )),
            _ => {
                s.attachments
                    .insert(gateway_id.to_string(), vpc_id.to_string());
                Ok(())
            }
        }
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("detach_internet_gateway", format!("{} {}", gateway_id, vpc_id))?;
        s.attachments.remove(gateway_id);
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_internet_gateway", gateway_id)?;
        if s.attachments.contains_key(gateway_id) {
            return Err(CloudError::provider(
                "delete_internet_gateway",
                gateway_id,
                "DependencyViolation: gateway is still attached",
            ));
        }
        s.remove("delete_internet_gateway", gateway_id)
    }

    async fn allocate_address(&self, name: &str) -> Result<AllocatedAddress> {
        let mut s = self.state.lock().unwrap();
        s.record("allocate_address", name)?;
        let allocation_id = s.id("eipalloc");
        s.live.insert(allocation_id.clone());
        let public_ip = format!("203.0.113.{}", s.next_id);
        Ok(AllocatedAddress {
            allocation_id,
            public_ip,
        })
    }

    async fn release_address(&self, allocation_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("release_address", allocation_id)?;
        s.remove("release_address", allocation_id)
    }

    async fn create_vpc(&self, vpc: &Vpc) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_vpc", &vpc.name)?;
        let id = s.id("vpc");
        let main_rt = s.id("rtb");
        let default_acl = s.id("acl");
        let default_sg = s.id("sg");

        s.routes.insert(
            main_rt.clone(),
            vec![RouteEntry {
                destination_cidr: vpc.cidr_block.clone(),
                target: RouteTarget::Local,
            }],
        );
        s.acl_entries.insert(default_acl.clone(), allow_all_entries());
        let ingress_rule = s.id("sgr");
        let egress_rule = s.id("sgr");
        s.sg_rules.insert(
            default_sg.clone(),
            vec![
                SecurityGroupRuleRef {
                    rule_id: ingress_rule,
                    direction: TrafficDirection::Ingress,
                },
                SecurityGroupRuleRef {
                    rule_id: egress_rule,
                    direction: TrafficDirection::Egress,
                },
            ],
        );
        for default_id in [&id, &main_rt, &default_acl, &default_sg] {
            s.live.insert(default_id.clone());
        }
        s.vpc_defaults
            .insert(id.clone(), (main_rt, default_acl, default_sg));
        Ok(id)
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_vpc", vpc_id)?;
        if s.attachments.values().any(|v| v == vpc_id) {
            return Err(CloudError::provider(
                "delete_vpc",
                vpc_id,
                "DependencyViolation: internet gateway still attached",
            ));
        }
        s.remove("delete_vpc", vpc_id)?;
        if let Some((rt, acl, sg)) = s.vpc_defaults.remove(vpc_id) {
            for id in [rt, acl, sg] {
                s.live.remove(&id);
            }
        }
        Ok(())
    }

    async fn create_route_table(&self, vpc_id: &str, name: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_route_table", name)?;
        s.require_live("create_route_table", vpc_id)?;
        let id = s.id("rtb");
        s.routes.insert(id.clone(), Vec::new());
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn main_route_table(&self, vpc_id: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("main_route_table", vpc_id)?;
        Ok(s.vpc_defaults[vpc_id].0.clone())
    }

    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "associate_route_table",
            format!("{} {}", route_table_id, subnet_id),
        )?;
        s.require_live("associate_route_table", route_table_id)?;
        s.require_live("associate_route_table", subnet_id)?;
        s.subnet_route_tables
            .insert(subnet_id.to_string(), route_table_id.to_string());
        Ok(())
    }

    async fn list_routes(&self, route_table_id: &str) -> Result<Vec<RouteEntry>> {
        let mut s = self.state.lock().unwrap();
        s.record("list_routes", route_table_id)?;
        Ok(s.routes.get(route_table_id).cloned().unwrap_or_default())
    }

    async fn create_route(&self, route_table_id: &str, route: &RouteEntry) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "create_route",
            format!("{} {}", route_table_id, route.destination_cidr),
        )?;
        let target_id = match &route.target {
            RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => id.clone(),
            other => {
                return Err(CloudError::provider(
                    "create_route",
                    format!("{:?}", other),
                    "InvalidParameter: unsupported target",
                ));
            }
        };
        s.require_live("create_route", &target_id)?;
        s.routes
            .entry(route_table_id.to_string())
            .or_default()
            .push(route.clone());
        Ok(())
    }

    async fn delete_route(&self, route_table_id: &str, destination_cidr: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "delete_route",
            format!("{} {}", route_table_id, destination_cidr),
        )?;
        if let Some(routes) = s.routes.get_mut(route_table_id) {
            routes.retain(|r| r.destination_cidr != destination_cidr);
        }
        Ok(())
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_route_table", route_table_id)?;
        s.remove("delete_route_table", route_table_id)
    }

    async fn create_subnet(&self, vpc_id: &str, subnet: &Subnet) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_subnet", &subnet.name)?;
        s.require_live("create_subnet", vpc_id)?;
        let id = s.id("subnet");
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_subnet", subnet_id)?;
        s.remove("delete_subnet", subnet_id)
    }

    async fn create_network_acl(&self, vpc_id: &str, name: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_network_acl", name)?;
        s.require_live("create_network_acl", vpc_id)?;
        let id = s.id("acl");
        s.acl_entries.insert(id.clone(), fallthrough_entries());
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn default_network_acl(&self, vpc_id: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("default_network_acl", vpc_id)?;
        Ok(s.vpc_defaults[vpc_id].1.clone())
    }

    async fn associate_network_acl(&self, acl_id: &str, subnet_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("associate_network_acl", format!("{} {}", acl_id, subnet_id))?;
        s.require_live("associate_network_acl", acl_id)?;
        s.require_live("associate_network_acl", subnet_id)
    }

    async fn list_network_acl_entries(&self, acl_id: &str) -> Result<Vec<AclEntryKey>> {
        let mut s = self.state.lock().unwrap();
        s.record("list_network_acl_entries", acl_id)?;
        Ok(s.acl_entries.get(acl_id).cloned().unwrap_or_default())
    }

    async fn create_network_acl_entry(&self, acl_id: &str, entry: &AclEntry) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "create_network_acl_entry",
            format!("{} {} {}", acl_id, entry.direction, entry.rule_number),
        )?;
        let entries = s.acl_entries.entry(acl_id.to_string()).or_default();
        if entries.contains(&entry.key()) {
            return Err(CloudError::provider(
                "create_network_acl_entry",
                format!("{:?}", entry),
                "NetworkAclEntryAlreadyExists",
            ));
        }
        entries.push(entry.key());
        Ok(())
    }

    async fn delete_network_acl_entry(&self, acl_id: &str, key: AclEntryKey) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "delete_network_acl_entry",
            format!("{} {} {}", acl_id, key.direction, key.rule_number),
        )?;
        if key.is_fallthrough() {
            return Err(CloudError::provider(
                "delete_network_acl_entry",
                format!("{:?}", key),
                "InvalidParameter: the default entry cannot be removed",
            ));
        }
        if let Some(entries) = s.acl_entries.get_mut(acl_id) {
            entries.retain(|k| *k != key);
        }
        Ok(())
    }

    async fn delete_network_acl(&self, acl_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_network_acl", acl_id)?;
        s.remove("delete_network_acl", acl_id)
    }

    async fn create_security_group(&self, vpc_id: &str, group: &SecurityGroup) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_security_group", &group.name)?;
        s.require_live("create_security_group", vpc_id)?;
        let id = s.id("sg");
        let egress_rule = s.id("sgr");
        s.sg_rules.insert(
            id.clone(),
            vec![SecurityGroupRuleRef {
                rule_id: egress_rule,
                direction: TrafficDirection::Egress,
            }],
        );
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn default_security_group(&self, vpc_id: &str) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("default_security_group", vpc_id)?;
        Ok(s.vpc_defaults[vpc_id].2.clone())
    }

    async fn list_security_group_rules(
        &self,
        group_id: &str,
    ) -> Result<Vec<SecurityGroupRuleRef>> {
        let mut s = self.state.lock().unwrap();
        s.record("list_security_group_rules", group_id)?;
        Ok(s.sg_rules.get(group_id).cloned().unwrap_or_default())
    }

    async fn revoke_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        rule_ids: &[String],
    ) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "revoke_security_group_rules",
            format!("{} {} {}", group_id, direction, rule_ids.len()),
        )?;
        if let Some(rules) = s.sg_rules.get_mut(group_id) {
            rules.retain(|r| !(r.direction == direction && rule_ids.contains(&r.rule_id)));
        }
        Ok(())
    }

    async fn authorize_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        permissions: &[SecurityGroupPermission],
    ) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record(
            "authorize_security_group_rules",
            format!("{} {} {}", group_id, direction, permissions.len()),
        )?;
        let mut added = Vec::new();
        for _ in permissions {
            added.push(SecurityGroupRuleRef {
                rule_id: s.id("sgr"),
                direction,
            });
        }
        s.sg_rules
            .entry(group_id.to_string())
            .or_default()
            .extend(added);
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_security_group", group_id)?;
        s.remove("delete_security_group", group_id)
    }

    async fn create_nat_gateway(
        &self,
        name: &str,
        subnet_id: &str,
        allocation_id: &str,
    ) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.record("create_nat_gateway", name)?;
        s.require_live("create_nat_gateway", subnet_id)?;
        s.require_live("create_nat_gateway", allocation_id)?;
        let id = s.id("nat");
        s.live.insert(id.clone());
        Ok(id)
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.record("delete_nat_gateway", nat_gateway_id)?;
        s.remove("delete_nat_gateway", nat_gateway_id)?;
        s.nat_polls_left
            .insert(nat_gateway_id.to_string(), self.nat_polls_before_deleted);
        Ok(())
    }

    async fn describe_nat_gateway(&self, nat_gateway_id: &str) -> Result<NatGatewayState> {
        let mut s = self.state.lock().unwrap();
        s.record("describe_nat_gateway", nat_gateway_id)?;
        if s.live.contains(nat_gateway_id) {
            return Ok(NatGatewayState::Available);
        }
        match s.nat_polls_left.get_mut(nat_gateway_id) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Ok(NatGatewayState::Deleting)
            }
            _ => Ok(NatGatewayState::Deleted),
        }
    }
}

/// Fast polling for tests
pub fn quick_wait() -> WaitConfig {
    WaitConfig {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        multiplier: 2.0,
        timeout: None,
    }
}

/// A small but complete region: public and private subnets, a NAT gateway,
/// default and custom rule sets
pub fn sample_region() -> RegionConfig {
    let mut region = RegionConfig::new("staging", "test-region-1");
    region
        .internet_gateways
        .push(InternetGateway::new("main-igw"));
    region.elastic_ips.push(ElasticIp::new("nat-eip"));

    let mut vpc = Vpc::new("main-vpc", "10.0.0.0/16").with_internet_gateway("main-igw");

    vpc.route_tables.push(RouteTable::default_table("main-rt"));
    vpc.route_tables
        .push(RouteTable::new("public-rt").with_route(Route::new("all-traffic", "main-igw")));
    vpc.route_tables
        .push(RouteTable::new("private-rt").with_route(Route::new("all-traffic", "nat-gw")));

    vpc.subnets.push(
        Subnet::new("public-a", "10.0.1.0/24")
            .in_zone("test-region-1a")
            .with_route_table("public-rt"),
    );
    vpc.subnets.push(
        Subnet::new("private-a", "10.0.2.0/24")
            .in_zone("test-region-1a")
            .with_route_table("private-rt"),
    );

    let mut default_acl = NetworkAcl::new("default-acl");
    default_acl.default = true;
    default_acl
        .inbound_rules
        .push(AclRule::new(100, "ALL", "ALL", "main-vpc"));
    default_acl
        .outbound_rules
        .push(AclRule::new(100, "ALL", "ALL", "all-traffic"));
    vpc.network_acls.push(default_acl);

    let mut public_acl = NetworkAcl::new("public-acl");
    public_acl.subnets = Some("public-a".to_string());
    public_acl.inbound_rules.push(AclRule {
        rule_number: 100,
        traffic_type: Some("HTTPS".to_string()),
        peer: "all-traffic".to_string(),
        ..Default::default()
    });
    public_acl
        .inbound_rules
        .push(AclRule::new(110, "TCP", "22", "main-vpc"));
    public_acl
        .inbound_rules
        .push(AclRule::new(120, "TCP", "1024-65535", "all-traffic"));
    public_acl
        .outbound_rules
        .push(AclRule::new(100, "ALL", "ALL", "all-traffic"));
    vpc.network_acls.push(public_acl);

    let mut default_sg = SecurityGroup::new("default-sg");
    default_sg.default = true;
    default_sg
        .inbound_rules
        .push(SecurityGroupRule::new("ALL", "ALL", "main-vpc"));
    vpc.security_groups.push(default_sg);

    let mut web_sg = SecurityGroup::new("web-sg");
    web_sg.description = Some("public web servers".to_string());
    web_sg
        .inbound_rules
        .push(SecurityGroupRule::new("TCP", "80", "all-traffic"));
    web_sg
        .inbound_rules
        .push(SecurityGroupRule::new("TCP", "443", "all-traffic"));
    web_sg
        .outbound_rules
        .push(SecurityGroupRule::new("ALL", "ALL", "all-traffic"));
    vpc.security_groups.push(web_sg);

    vpc.nat_gateways
        .push(NatGateway::new("nat-gw", "public-a", "nat-eip"));

    region.vpcs.push(vpc);
    region
}

/// Number of entities in [`sample_region`]
pub const SAMPLE_ENTITY_COUNT: usize = 13;

/// Network ACLs plus security groups in [`sample_region`], each of which gets
/// its rule set replaced on every run
pub const SAMPLE_RULE_SET_COUNT: usize = 4;
