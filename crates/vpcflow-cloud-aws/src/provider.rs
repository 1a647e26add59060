//! EC2 implementation of the network provider

use crate::convert::{filter, name_tag, nat_state, route_target, wire_ports};
use crate::error::AwsError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::{
    DomainType, IpPermission, IpRange, PortRange as Ec2PortRange, ResourceType, RuleAction,
    Tenancy,
};
use tracing::debug;
use vpcflow_cloud::{
    AclEntry, AclEntryKey, AllocatedAddress, NatGatewayState, NetworkProvider, Result,
    RouteEntry, RouteTarget, SecurityGroupPermission, SecurityGroupRuleRef, TrafficDirection,
};
use vpcflow_core::{SecurityGroup, Subnet, Vpc};

/// Error code EC2 returns when detaching a gateway that is not attached
const GATEWAY_NOT_ATTACHED: &str = "Gateway.NotAttached";

/// Error code EC2 returns when attaching a gateway that is already attached
const RESOURCE_ALREADY_ASSOCIATED: &str = "Resource.AlreadyAssociated";

/// Error code EC2 returns for a NAT gateway it no longer knows
const NAT_GATEWAY_NOT_FOUND: &str = "NatGatewayNotFound";

/// AWS EC2 network provider, bound to one region and one credential set
pub struct AwsNetworkProvider {
    client: Client,
    region: String,
}

impl AwsNetworkProvider {
    /// Load credentials from the default chain, or from `profile` when given
    pub async fn connect(region: impl Into<String>, profile: Option<&str>) -> Self {
        let region = region.into();
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.clone()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        debug!(region = %region, profile = ?profile, "Loaded AWS configuration");

        Self {
            client: Client::new(&config),
            region,
        }
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// VPC the internet gateway is currently attached to
    async fn attached_vpc(&self, gateway_id: &str) -> Result<Option<String>> {
        let request = format!("internet_gateway_id={}", gateway_id);
        let output = self
            .client
            .describe_internet_gateways()
            .internet_gateway_ids(gateway_id)
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeInternetGateways", &request, &e))?;

        Ok(output
            .internet_gateways()
            .first()
            .and_then(|g| g.attachments().first())
            .and_then(|a| a.vpc_id())
            .map(str::to_string))
    }
}

#[async_trait]
impl NetworkProvider for AwsNetworkProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn create_internet_gateway(&self, name: &str) -> Result<String> {
        let request = format!("name={}", name);
        let output = self
            .client
            .create_internet_gateway()
            .tag_specifications(name_tag(ResourceType::InternetGateway, name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateInternetGateway", &request, &e))?;

        let id = output
            .internet_gateway()
            .and_then(|g| g.internet_gateway_id())
            .ok_or_else(|| {
                AwsError::missing("CreateInternetGateway", &request, "InternetGatewayId")
            })?;
        debug!(name, id, "CreateInternetGateway");
        Ok(id.to_string())
    }

    async fn attach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        let request = format!("internet_gateway_id={} vpc_id={}", gateway_id, vpc_id);
        match self
            .client
            .attach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(RESOURCE_ALREADY_ASSOCIATED) => {
                if self.attached_vpc(gateway_id).await?.as_deref() == Some(vpc_id) {
                    debug!(gateway_id, vpc_id, "Internet gateway already attached");
                    Ok(())
                } else {
                    Err(AwsError::api("AttachInternetGateway", &request, &e).into())
                }
            }
            Err(e) => Err(AwsError::api("AttachInternetGateway", &request, &e).into()),
        }
    }

    async fn detach_internet_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<()> {
        match self
            .client
            .detach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(GATEWAY_NOT_ATTACHED) => {
                debug!(gateway_id, vpc_id, "Internet gateway already detached");
                Ok(())
            }
            Err(e) => Err(AwsError::api(
                "DetachInternetGateway",
                format!("internet_gateway_id={} vpc_id={}", gateway_id, vpc_id),
                &e,
            )
            .into()),
        }
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<()> {
        self.client
            .delete_internet_gateway()
            .internet_gateway_id(gateway_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "DeleteInternetGateway",
                    format!("internet_gateway_id={}", gateway_id),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn allocate_address(&self, name: &str) -> Result<AllocatedAddress> {
        let request = format!("domain=vpc name={}", name);
        let output = self
            .client
            .allocate_address()
            .domain(DomainType::Vpc)
            .tag_specifications(name_tag(ResourceType::ElasticIp, name))
            .send()
            .await
            .map_err(|e| AwsError::api("AllocateAddress", &request, &e))?;

        let allocation_id = output
            .allocation_id()
            .ok_or_else(|| AwsError::missing("AllocateAddress", &request, "AllocationId"))?;
        let public_ip = output
            .public_ip()
            .ok_or_else(|| AwsError::missing("AllocateAddress", &request, "PublicIp"))?;
        debug!(name, allocation_id, public_ip, "AllocateAddress");
        Ok(AllocatedAddress {
            allocation_id: allocation_id.to_string(),
            public_ip: public_ip.to_string(),
        })
    }

    async fn release_address(&self, allocation_id: &str) -> Result<()> {
        self.client
            .release_address()
            .allocation_id(allocation_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "ReleaseAddress",
                    format!("allocation_id={}", allocation_id),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn create_vpc(&self, vpc: &Vpc) -> Result<String> {
        let request = format!(
            "cidr_block={} instance_tenancy={} name={}",
            vpc.cidr_block,
            vpc.tenancy.as_str(),
            vpc.name
        );
        let output = self
            .client
            .create_vpc()
            .cidr_block(&vpc.cidr_block)
            .instance_tenancy(Tenancy::from(vpc.tenancy.as_str()))
            .tag_specifications(name_tag(ResourceType::Vpc, &vpc.name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateVpc", &request, &e))?;

        let id = output
            .vpc()
            .and_then(|v| v.vpc_id())
            .ok_or_else(|| AwsError::missing("CreateVpc", &request, "VpcId"))?;
        debug!(name = %vpc.name, id, "CreateVpc");
        Ok(id.to_string())
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        self.client
            .delete_vpc()
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(|e| AwsError::api("DeleteVpc", format!("vpc_id={}", vpc_id), &e))?;
        Ok(())
    }

    async fn create_route_table(&self, vpc_id: &str, name: &str) -> Result<String> {
        let request = format!("vpc_id={} name={}", vpc_id, name);
        let output = self
            .client
            .create_route_table()
            .vpc_id(vpc_id)
            .tag_specifications(name_tag(ResourceType::RouteTable, name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateRouteTable", &request, &e))?;

        let id = output
            .route_table()
            .and_then(|t| t.route_table_id())
            .ok_or_else(|| AwsError::missing("CreateRouteTable", &request, "RouteTableId"))?;
        debug!(name, id, "CreateRouteTable");
        Ok(id.to_string())
    }

    async fn main_route_table(&self, vpc_id: &str) -> Result<String> {
        let request = format!("vpc-id={} association.main=true", vpc_id);
        let output = self
            .client
            .describe_route_tables()
            .filters(filter("vpc-id", vpc_id))
            .filters(filter("association.main", "true"))
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeRouteTables", &request, &e))?;

        let id = output
            .route_tables()
            .first()
            .and_then(|t| t.route_table_id())
            .ok_or_else(|| AwsError::missing("DescribeRouteTables", &request, "RouteTableId"))?;
        Ok(id.to_string())
    }

    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<()> {
        let request = format!("association.subnet-id={}", subnet_id);
        let output = self
            .client
            .describe_route_tables()
            .filters(filter("association.subnet-id", subnet_id))
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeRouteTables", &request, &e))?;

        let existing = output.route_tables().iter().find_map(|table| {
            table
                .associations()
                .iter()
                .find(|a| a.subnet_id() == Some(subnet_id))
                .map(|a| (table.route_table_id(), a.route_table_association_id()))
        });

        match existing {
            Some((Some(current), _)) if current == route_table_id => {
                debug!(route_table_id, subnet_id, "Route table already associated");
            }
            Some((_, Some(association_id))) => {
                self.client
                    .replace_route_table_association()
                    .association_id(association_id)
                    .route_table_id(route_table_id)
                    .send()
                    .await
                    .map_err(|e| {
                        AwsError::api(
                            "ReplaceRouteTableAssociation",
                            format!(
                                "association_id={} route_table_id={}",
                                association_id, route_table_id
                            ),
                            &e,
                        )
                    })?;
            }
            _ => {
                self.client
                    .associate_route_table()
                    .route_table_id(route_table_id)
                    .subnet_id(subnet_id)
                    .send()
                    .await
                    .map_err(|e| {
                        AwsError::api(
                            "AssociateRouteTable",
                            format!("route_table_id={} subnet_id={}", route_table_id, subnet_id),
                            &e,
                        )
                    })?;
            }
        }
        Ok(())
    }

    async fn list_routes(&self, route_table_id: &str) -> Result<Vec<RouteEntry>> {
        let request = format!("route_table_id={}", route_table_id);
        let output = self
            .client
            .describe_route_tables()
            .route_table_ids(route_table_id)
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeRouteTables", &request, &e))?;

        let table = output
            .route_tables()
            .first()
            .ok_or_else(|| AwsError::missing("DescribeRouteTables", &request, "RouteTables"))?;
        Ok(table
            .routes()
            .iter()
            .filter_map(|route| {
                route.destination_cidr_block().map(|cidr| RouteEntry {
                    destination_cidr: cidr.to_string(),
                    target: route_target(route),
                })
            })
            .collect())
    }

    async fn create_route(&self, route_table_id: &str, route: &RouteEntry) -> Result<()> {
        let request = format!(
            "route_table_id={} destination={} target={:?}",
            route_table_id, route.destination_cidr, route.target
        );
        let builder = self
            .client
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(&route.destination_cidr);
        let builder = match &route.target {
            RouteTarget::InternetGateway(id) => builder.gateway_id(id),
            RouteTarget::NatGateway(id) => builder.nat_gateway_id(id),
            RouteTarget::Local | RouteTarget::Other(_) => {
                return Err(AwsError::Api {
                    operation: "CreateRoute",
                    request,
                    message: "only internet and NAT gateway targets can be created".to_string(),
                }
                .into());
            }
        };
        builder
            .send()
            .await
            .map_err(|e| AwsError::api("CreateRoute", &request, &e))?;
        Ok(())
    }

    async fn delete_route(&self, route_table_id: &str, destination_cidr: &str) -> Result<()> {
        self.client
            .delete_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "DeleteRoute",
                    format!(
                        "route_table_id={} destination={}",
                        route_table_id, destination_cidr
                    ),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<()> {
        self.client
            .delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "DeleteRouteTable",
                    format!("route_table_id={}", route_table_id),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn create_subnet(&self, vpc_id: &str, subnet: &Subnet) -> Result<String> {
        let request = format!(
            "vpc_id={} cidr_block={} availability_zone={:?} name={}",
            vpc_id, subnet.cidr_block, subnet.availability_zone, subnet.name
        );
        let output = self
            .client
            .create_subnet()
            .vpc_id(vpc_id)
            .cidr_block(&subnet.cidr_block)
            .set_availability_zone(subnet.availability_zone.clone())
            .tag_specifications(name_tag(ResourceType::Subnet, &subnet.name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateSubnet", &request, &e))?;

        let id = output
            .subnet()
            .and_then(|s| s.subnet_id())
            .ok_or_else(|| AwsError::missing("CreateSubnet", &request, "SubnetId"))?;
        debug!(name = %subnet.name, id, "CreateSubnet");
        Ok(id.to_string())
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        self.client
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(|e| AwsError::api("DeleteSubnet", format!("subnet_id={}", subnet_id), &e))?;
        Ok(())
    }

    async fn create_network_acl(&self, vpc_id: &str, name: &str) -> Result<String> {
        let request = format!("vpc_id={} name={}", vpc_id, name);
        let output = self
            .client
            .create_network_acl()
            .vpc_id(vpc_id)
            .tag_specifications(name_tag(ResourceType::NetworkAcl, name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateNetworkAcl", &request, &e))?;

        let id = output
            .network_acl()
            .and_then(|a| a.network_acl_id())
            .ok_or_else(|| AwsError::missing("CreateNetworkAcl", &request, "NetworkAclId"))?;
        debug!(name, id, "CreateNetworkAcl");
        Ok(id.to_string())
    }

    async fn default_network_acl(&self, vpc_id: &str) -> Result<String> {
        let request = format!("vpc-id={} default=true", vpc_id);
        let output = self
            .client
            .describe_network_acls()
            .filters(filter("vpc-id", vpc_id))
            .filters(filter("default", "true"))
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeNetworkAcls", &request, &e))?;

        let id = output
            .network_acls()
            .first()
            .and_then(|a| a.network_acl_id())
            .ok_or_else(|| AwsError::missing("DescribeNetworkAcls", &request, "NetworkAclId"))?;
        Ok(id.to_string())
    }

    async fn associate_network_acl(&self, acl_id: &str, subnet_id: &str) -> Result<()> {
        // every subnet is always associated with some ACL; move that association
        let request = format!("association.subnet-id={}", subnet_id);
        let output = self
            .client
            .describe_network_acls()
            .filters(filter("association.subnet-id", subnet_id))
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeNetworkAcls", &request, &e))?;

        let association_id = output
            .network_acls()
            .iter()
            .flat_map(|acl| acl.associations())
            .find(|a| a.subnet_id() == Some(subnet_id))
            .and_then(|a| a.network_acl_association_id())
            .ok_or_else(|| {
                AwsError::missing("DescribeNetworkAcls", &request, "NetworkAclAssociationId")
            })?;

        self.client
            .replace_network_acl_association()
            .association_id(association_id)
            .network_acl_id(acl_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "ReplaceNetworkAclAssociation",
                    format!("association_id={} network_acl_id={}", association_id, acl_id),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn list_network_acl_entries(&self, acl_id: &str) -> Result<Vec<AclEntryKey>> {
        let request = format!("network_acl_id={}", acl_id);
        let output = self
            .client
            .describe_network_acls()
            .network_acl_ids(acl_id)
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeNetworkAcls", &request, &e))?;

        let acl = output
            .network_acls()
            .first()
            .ok_or_else(|| AwsError::missing("DescribeNetworkAcls", &request, "NetworkAcls"))?;
        Ok(acl
            .entries()
            .iter()
            .filter_map(|entry| {
                let rule_number = entry.rule_number()?;
                let direction = if entry.egress().unwrap_or(false) {
                    TrafficDirection::Egress
                } else {
                    TrafficDirection::Ingress
                };
                Some(AclEntryKey {
                    rule_number,
                    direction,
                })
            })
            .collect())
    }

    async fn create_network_acl_entry(&self, acl_id: &str, entry: &AclEntry) -> Result<()> {
        let request = format!("network_acl_id={} entry={:?}", acl_id, entry);
        let action = if entry.allow {
            RuleAction::Allow
        } else {
            RuleAction::Deny
        };
        let port_range = wire_ports(&entry.protocol, entry.port_range)
            .map(|(from, to)| Ec2PortRange::builder().from(from).to(to).build());

        self.client
            .create_network_acl_entry()
            .network_acl_id(acl_id)
            .rule_number(entry.rule_number)
            .protocol(&entry.protocol)
            .rule_action(action)
            .egress(entry.direction.is_egress())
            .cidr_block(&entry.cidr_block)
            .set_port_range(port_range)
            .send()
            .await
            .map_err(|e| AwsError::api("CreateNetworkAclEntry", &request, &e))?;
        Ok(())
    }

    async fn delete_network_acl_entry(&self, acl_id: &str, key: AclEntryKey) -> Result<()> {
        self.client
            .delete_network_acl_entry()
            .network_acl_id(acl_id)
            .rule_number(key.rule_number)
            .egress(key.direction.is_egress())
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "DeleteNetworkAclEntry",
                    format!("network_acl_id={} key={:?}", acl_id, key),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn delete_network_acl(&self, acl_id: &str) -> Result<()> {
        self.client
            .delete_network_acl()
            .network_acl_id(acl_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api("DeleteNetworkAcl", format!("network_acl_id={}", acl_id), &e)
            })?;
        Ok(())
    }

    async fn create_security_group(&self, vpc_id: &str, group: &SecurityGroup) -> Result<String> {
        let request = format!("vpc_id={} group_name={}", vpc_id, group.name);
        let output = self
            .client
            .create_security_group()
            .vpc_id(vpc_id)
            .group_name(&group.name)
            .description(group.description_or_name())
            .tag_specifications(name_tag(ResourceType::SecurityGroup, &group.name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateSecurityGroup", &request, &e))?;

        let id = output
            .group_id()
            .ok_or_else(|| AwsError::missing("CreateSecurityGroup", &request, "GroupId"))?;
        debug!(name = %group.name, id, "CreateSecurityGroup");
        Ok(id.to_string())
    }

    async fn default_security_group(&self, vpc_id: &str) -> Result<String> {
        let request = format!("vpc-id={} group-name=default", vpc_id);
        let output = self
            .client
            .describe_security_groups()
            .filters(filter("vpc-id", vpc_id))
            .filters(filter("group-name", "default"))
            .send()
            .await
            .map_err(|e| AwsError::api("DescribeSecurityGroups", &request, &e))?;

        let id = output
            .security_groups()
            .first()
            .and_then(|g| g.group_id())
            .ok_or_else(|| AwsError::missing("DescribeSecurityGroups", &request, "GroupId"))?;
        Ok(id.to_string())
    }

    async fn list_security_group_rules(
        &self,
        group_id: &str,
    ) -> Result<Vec<SecurityGroupRuleRef>> {
        let request = format!("group-id={}", group_id);
        let mut rules = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_security_group_rules()
                .filters(filter("group-id", group_id))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::api("DescribeSecurityGroupRules", &request, &e))?;

            rules.extend(output.security_group_rules().iter().filter_map(|rule| {
                let direction = if rule.is_egress().unwrap_or(false) {
                    TrafficDirection::Egress
                } else {
                    TrafficDirection::Ingress
                };
                rule.security_group_rule_id().map(|id| SecurityGroupRuleRef {
                    rule_id: id.to_string(),
                    direction,
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(rules)
    }

    async fn revoke_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        rule_ids: &[String],
    ) -> Result<()> {
        let request = format!("group_id={} rule_ids={:?}", group_id, rule_ids);
        match direction {
            TrafficDirection::Ingress => {
                self.client
                    .revoke_security_group_ingress()
                    .group_id(group_id)
                    .set_security_group_rule_ids(Some(rule_ids.to_vec()))
                    .send()
                    .await
                    .map_err(|e| AwsError::api("RevokeSecurityGroupIngress", &request, &e))?;
            }
            TrafficDirection::Egress => {
                self.client
                    .revoke_security_group_egress()
                    .group_id(group_id)
                    .set_security_group_rule_ids(Some(rule_ids.to_vec()))
                    .send()
                    .await
                    .map_err(|e| AwsError::api("RevokeSecurityGroupEgress", &request, &e))?;
            }
        }
        Ok(())
    }

    async fn authorize_security_group_rules(
        &self,
        group_id: &str,
        direction: TrafficDirection,
        permissions: &[SecurityGroupPermission],
    ) -> Result<()> {
        let request = format!("group_id={} permissions={:?}", group_id, permissions);
        let ip_permissions: Vec<IpPermission> = permissions
            .iter()
            .map(|p| {
                let ports = wire_ports(&p.protocol, p.port_range);
                IpPermission::builder()
                    .ip_protocol(&p.protocol)
                    .set_from_port(ports.map(|(from, _)| from))
                    .set_to_port(ports.map(|(_, to)| to))
                    .ip_ranges(IpRange::builder().cidr_ip(&p.cidr_block).build())
                    .build()
            })
            .collect();

        match direction {
            TrafficDirection::Ingress => {
                self.client
                    .authorize_security_group_ingress()
                    .group_id(group_id)
                    .set_ip_permissions(Some(ip_permissions))
                    .send()
                    .await
                    .map_err(|e| AwsError::api("AuthorizeSecurityGroupIngress", &request, &e))?;
            }
            TrafficDirection::Egress => {
                self.client
                    .authorize_security_group_egress()
                    .group_id(group_id)
                    .set_ip_permissions(Some(ip_permissions))
                    .send()
                    .await
                    .map_err(|e| AwsError::api("AuthorizeSecurityGroupEgress", &request, &e))?;
            }
        }
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        self.client
            .delete_security_group()
            .group_id(group_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api("DeleteSecurityGroup", format!("group_id={}", group_id), &e)
            })?;
        Ok(())
    }

    async fn create_nat_gateway(
        &self,
        name: &str,
        subnet_id: &str,
        allocation_id: &str,
    ) -> Result<String> {
        let request = format!(
            "subnet_id={} allocation_id={} name={}",
            subnet_id, allocation_id, name
        );
        let output = self
            .client
            .create_nat_gateway()
            .subnet_id(subnet_id)
            .allocation_id(allocation_id)
            .tag_specifications(name_tag(ResourceType::Natgateway, name))
            .send()
            .await
            .map_err(|e| AwsError::api("CreateNatGateway", &request, &e))?;

        let id = output
            .nat_gateway()
            .and_then(|n| n.nat_gateway_id())
            .ok_or_else(|| AwsError::missing("CreateNatGateway", &request, "NatGatewayId"))?;
        debug!(name, id, "CreateNatGateway");
        Ok(id.to_string())
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> Result<()> {
        self.client
            .delete_nat_gateway()
            .nat_gateway_id(nat_gateway_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::api(
                    "DeleteNatGateway",
                    format!("nat_gateway_id={}", nat_gateway_id),
                    &e,
                )
            })?;
        Ok(())
    }

    async fn describe_nat_gateway(&self, nat_gateway_id: &str) -> Result<NatGatewayState> {
        let output = match self
            .client
            .describe_nat_gateways()
            .nat_gateway_ids(nat_gateway_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.code() == Some(NAT_GATEWAY_NOT_FOUND) => {
                return Ok(NatGatewayState::Deleted);
            }
            Err(e) => {
                return Err(AwsError::api(
                    "DescribeNatGateways",
                    format!("nat_gateway_id={}", nat_gateway_id),
                    &e,
                )
                .into());
            }
        };

        Ok(match output.nat_gateways().first() {
            Some(gateway) => nat_state(gateway.state()),
            None => NatGatewayState::Deleted,
        })
    }
}
