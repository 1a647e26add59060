//! Forward orchestration: create a region graph in dependency order
//!
//! Order of work:
//!
//! 1. internet gateways
//! 2. elastic addresses
//! 3. per VPC, in document order: the VPC itself, route table shells,
//!    subnets, network ACLs, security groups, NAT gateways, and finally the
//!    routes of every route table
//!
//! Every identifier written into the graph is followed by a checkpoint, and
//! so is every network ACL and security group whose rule set was replaced.
//! Internet gateway attachment and subnet route table association are
//! repeated on resume for entities that already hold an identifier.
//! Failures abort the run and leave already-created resources in place; the
//! partially populated graph is the recovery record and can be fed to
//! [`Provisioner::resume`].

use crate::error::{CloudError, Result};
use crate::hooks::Checkpoint;
use crate::provider::{NetworkProvider, TrafficDirection};
use crate::resolver::NameResolver;
use crate::translate;
use tracing::{debug, info, instrument, warn};
use vpcflow_core::{RegionConfig, Vpc, validate};

pub struct Provisioner<'a, P: NetworkProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: NetworkProvider + ?Sized> Provisioner<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Provision a pristine graph. Any identifier already present is a
    /// precondition violation.
    #[instrument(skip_all, fields(region = %region.name, provider = self.provider.name()))]
    pub async fn provision(
        &self,
        region: &mut RegionConfig,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        validate(region, true)?;
        info!("Provisioning region graph");
        let mut run = Run {
            provider: self.provider,
            resolver: NameResolver::new(),
            checkpoint,
        };
        run.execute(region).await
    }

    /// Continue a run that stopped part-way. Entities that already hold an
    /// identifier are not created again. Rule sets and routes are replaced
    /// wholesale, and gateway attachment and route table association are
    /// idempotent, so all of them are re-applied.
    #[instrument(skip_all, fields(region = %region.name, provider = self.provider.name()))]
    pub async fn resume(
        &self,
        region: &mut RegionConfig,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        validate(region, false)?;
        info!(
            already_created = region.created_entities().len(),
            "Resuming region graph provisioning"
        );
        let mut run = Run {
            provider: self.provider,
            resolver: NameResolver::from_region(region),
            checkpoint,
        };
        run.execute(region).await
    }
}

/// State of one provisioning run
struct Run<'a, 'c, P: NetworkProvider + ?Sized> {
    provider: &'a P,
    resolver: NameResolver,
    checkpoint: &'c mut dyn Checkpoint,
}

impl<P: NetworkProvider + ?Sized> Run<'_, '_, P> {
    async fn execute(&mut self, region: &mut RegionConfig) -> Result<()> {
        self.internet_gateways(region).await?;
        self.elastic_ips(region).await?;
        for v in 0..region.vpcs.len() {
            self.vpc(region, v).await?;
            self.route_table_shells(region, v).await?;
            self.subnets(region, v).await?;
            self.network_acls(region, v).await?;
            self.security_groups(region, v).await?;
            self.nat_gateways(region, v).await?;
            self.routes(region, v).await?;
            info!(vpc = %region.vpcs[v].name, "VPC provisioned");
        }
        info!("Region graph provisioned");
        Ok(())
    }

    fn checkpoint(&mut self, region: &RegionConfig) -> Result<()> {
        self.checkpoint.on_graph_updated(region)
    }

    async fn internet_gateways(&mut self, region: &mut RegionConfig) -> Result<()> {
        for i in 0..region.internet_gateways.len() {
            if has_id(&region.internet_gateways[i].id) {
                continue;
            }
            let name = region.internet_gateways[i].name.clone();
            let id = self.provider.create_internet_gateway(&name).await?;
            info!(name = %name, id = %id, "Created internet gateway");
            self.resolver.insert_internet_gateway(&name, &id);
            region.internet_gateways[i].id = Some(id);
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn elastic_ips(&mut self, region: &mut RegionConfig) -> Result<()> {
        for i in 0..region.elastic_ips.len() {
            if has_id(&region.elastic_ips[i].allocation_id) {
                continue;
            }
            let name = region.elastic_ips[i].name.clone();
            let address = self.provider.allocate_address(&name).await?;
            info!(
                name = %name,
                allocation_id = %address.allocation_id,
                public_ip = %address.public_ip,
                "Allocated elastic ip"
            );
            let eip = &mut region.elastic_ips[i];
            eip.allocation_id = Some(address.allocation_id);
            eip.public_ip = Some(address.public_ip);
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn vpc(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        let vpc = region.vpcs[v].clone();
        let vpc_id = match created(&vpc.id) {
            Some(id) => id.to_string(),
            None => {
                let id = self.provider.create_vpc(&vpc).await?;
                info!(name = %vpc.name, id = %id, cidr = %vpc.cidr_block, "Created VPC");
                self.resolver.insert_cidr(&vpc.name, &vpc.cidr_block);
                region.vpcs[v].id = Some(id.clone());
                self.checkpoint(region)?;
                id
            }
        };

        // attaching is idempotent, so a resumed run repeats it for a VPC
        // whose previous run stopped between create and attach
        if let Some(gateway) = &vpc.internet_gateway {
            let gateway_id = self.resolver.internet_gateway(gateway).ok_or_else(|| {
                CloudError::dangling(gateway, format!("vpc '{}' internet gateway", vpc.name))
            })?;
            self.provider
                .attach_internet_gateway(gateway_id, &vpc_id)
                .await?;
            info!(vpc = %vpc.name, gateway = %gateway, "Attached internet gateway");
        }
        Ok(())
    }

    async fn route_table_shells(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        let vpc_id = vpc_id(&region.vpcs[v])?;
        for r in 0..region.vpcs[v].route_tables.len() {
            let table = &region.vpcs[v].route_tables[r];
            if has_id(&table.id) {
                continue;
            }
            let name = table.name.clone();
            let id = if table.default {
                let id = self.provider.main_route_table(&vpc_id).await?;
                debug!(name = %name, id = %id, "Adopted main route table");
                id
            } else {
                let id = self.provider.create_route_table(&vpc_id, &name).await?;
                info!(name = %name, id = %id, "Created route table");
                id
            };
            region.vpcs[v].route_tables[r].id = Some(id);
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn subnets(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        let vpc_id = vpc_id(&region.vpcs[v])?;
        for s in 0..region.vpcs[v].subnets.len() {
            let subnet = region.vpcs[v].subnets[s].clone();
            let subnet_id = match created(&subnet.id) {
                Some(id) => id.to_string(),
                None => {
                    let id = self.provider.create_subnet(&vpc_id, &subnet).await?;
                    info!(
                        name = %subnet.name,
                        id = %id,
                        cidr = %subnet.cidr_block,
                        "Created subnet"
                    );
                    self.resolver.insert_cidr(&subnet.name, &subnet.cidr_block);
                    region.vpcs[v].subnets[s].id = Some(id.clone());
                    self.checkpoint(region)?;
                    id
                }
            };

            let Some(table) = &subnet.route_table else {
                continue;
            };
            let route_table_id = region.vpcs[v]
                .find_route_table(table)
                .and_then(|t| created(&t.id))
                .map(str::to_string);
            match route_table_id {
                Some(route_table_id) => {
                    self.provider
                        .associate_route_table(&route_table_id, &subnet_id)
                        .await?;
                    debug!(
                        subnet = %subnet.name,
                        route_table = %route_table_id,
                        "Associated route table"
                    );
                }
                None => warn!(
                    subnet = %subnet.name,
                    route_table = %table,
                    "Route table does not resolve, subnet stays on the main route table"
                ),
            }
        }
        Ok(())
    }

    async fn network_acls(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        let vpc_id = vpc_id(&region.vpcs[v])?;
        for a in 0..region.vpcs[v].network_acls.len() {
            let acl = region.vpcs[v].network_acls[a].clone();
            let acl_id = match created(&acl.id) {
                Some(id) => id.to_string(),
                None => {
                    let id = if acl.default {
                        self.provider.default_network_acl(&vpc_id).await?
                    } else {
                        let id = self.provider.create_network_acl(&vpc_id, &acl.name).await?;
                        info!(name = %acl.name, id = %id, "Created network ACL");
                        id
                    };
                    region.vpcs[v].network_acls[a].id = Some(id.clone());
                    self.checkpoint(region)?;
                    id
                }
            };

            for subnet_name in acl.subnet_names() {
                let subnet_id = region.vpcs[v]
                    .find_subnet(subnet_name)
                    .and_then(|s| created(&s.id))
                    .ok_or_else(|| {
                        CloudError::dangling(
                            subnet_name,
                            format!("network acl '{}' subnets", acl.name),
                        )
                    })?;
                self.provider
                    .associate_network_acl(&acl_id, subnet_id)
                    .await?;
            }

            let entries = translate::acl_entries(&acl, &self.resolver)?;

            let existing = self.provider.list_network_acl_entries(&acl_id).await?;
            let mut cleared = 0;
            for key in existing.into_iter().filter(|k| !k.is_fallthrough()) {
                self.provider.delete_network_acl_entry(&acl_id, key).await?;
                cleared += 1;
            }

            for entry in &entries {
                self.provider.create_network_acl_entry(&acl_id, entry).await?;
            }
            info!(
                name = %acl.name,
                cleared,
                added = entries.len(),
                "Replaced network ACL entries"
            );
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn security_groups(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        let vpc_id = vpc_id(&region.vpcs[v])?;
        for g in 0..region.vpcs[v].security_groups.len() {
            let group = region.vpcs[v].security_groups[g].clone();
            let group_id = match created(&group.id) {
                Some(id) => id.to_string(),
                None => {
                    let id = if group.default {
                        self.provider.default_security_group(&vpc_id).await?
                    } else {
                        let id = self
                            .provider
                            .create_security_group(&vpc_id, &group)
                            .await?;
                        info!(name = %group.name, id = %id, "Created security group");
                        id
                    };
                    region.vpcs[v].security_groups[g].id = Some(id.clone());
                    self.checkpoint(region)?;
                    id
                }
            };

            let (ingress, egress) = translate::security_group_permissions(&group, &self.resolver)?;

            let existing = self.provider.list_security_group_rules(&group_id).await?;
            for direction in [TrafficDirection::Ingress, TrafficDirection::Egress] {
                let rule_ids: Vec<String> = existing
                    .iter()
                    .filter(|r| r.direction == direction)
                    .map(|r| r.rule_id.clone())
                    .collect();
                if !rule_ids.is_empty() {
                    self.provider
                        .revoke_security_group_rules(&group_id, direction, &rule_ids)
                        .await?;
                }
            }

            if !ingress.is_empty() {
                self.provider
                    .authorize_security_group_rules(&group_id, TrafficDirection::Ingress, &ingress)
                    .await?;
            }
            if !egress.is_empty() {
                self.provider
                    .authorize_security_group_rules(&group_id, TrafficDirection::Egress, &egress)
                    .await?;
            }
            info!(
                name = %group.name,
                cleared = existing.len(),
                ingress = ingress.len(),
                egress = egress.len(),
                "Replaced security group rules"
            );
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn nat_gateways(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        for n in 0..region.vpcs[v].nat_gateways.len() {
            let nat = region.vpcs[v].nat_gateways[n].clone();
            if has_id(&nat.id) {
                continue;
            }
            let subnet_id = region.vpcs[v]
                .find_subnet(&nat.subnet)
                .and_then(|s| created(&s.id))
                .map(str::to_string)
                .ok_or_else(|| {
                    CloudError::dangling(&nat.subnet, format!("nat gateway '{}' subnet", nat.name))
                })?;
            let allocation_id = region
                .find_elastic_ip(&nat.elastic_ip)
                .and_then(|e| created(&e.allocation_id))
                .map(str::to_string)
                .ok_or_else(|| {
                    CloudError::dangling(
                        &nat.elastic_ip,
                        format!("nat gateway '{}' elastic ip", nat.name),
                    )
                })?;

            let id = self
                .provider
                .create_nat_gateway(&nat.name, &subnet_id, &allocation_id)
                .await?;
            info!(name = %nat.name, id = %id, "Created NAT gateway");
            self.resolver.insert_nat_gateway(&nat.name, &id);
            region.vpcs[v].nat_gateways[n].id = Some(id);
            self.checkpoint(region)?;
        }
        Ok(())
    }

    async fn routes(&mut self, region: &mut RegionConfig, v: usize) -> Result<()> {
        for table in &region.vpcs[v].route_tables {
            let Some(table_id) = created(&table.id) else {
                continue;
            };
            let wanted = translate::route_entries(table, &self.resolver)?;

            let existing = self.provider.list_routes(table_id).await?;
            let mut cleared = 0;
            for route in existing.iter().filter(|r| r.is_removable()) {
                self.provider
                    .delete_route(table_id, &route.destination_cidr)
                    .await?;
                cleared += 1;
            }
            for route in &wanted {
                self.provider.create_route(table_id, route).await?;
            }
            info!(
                name = %table.name,
                cleared,
                added = wanted.len(),
                "Replaced routes"
            );
        }
        Ok(())
    }
}

fn created(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.is_empty())
}

fn has_id(id: &Option<String>) -> bool {
    created(id).is_some()
}

fn vpc_id(vpc: &Vpc) -> Result<String> {
    created(&vpc.id)
        .map(str::to_string)
        .ok_or_else(|| CloudError::dangling(&vpc.name, "vpc identifier"))
}
