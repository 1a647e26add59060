//! Reverse orchestration: tear a region graph down
//!
//! Per VPC (document order) the resource kinds go in the reverse of creation
//! order: NAT gateways, subnets, network ACLs, security groups, route tables,
//! then the VPC itself. Elastic addresses and internet gateways follow once
//! every VPC is gone. Entities without an identifier count as never created
//! and are skipped, so an interrupted teardown can simply be run again.

use crate::error::Result;
use crate::hooks::{Announcer, Checkpoint, NoAnnounce};
use crate::provider::NetworkProvider;
use crate::waiter::{WaitConfig, WaitOutcome, wait_for_nat_gateway_deletion};
use tracing::{info, instrument, warn};
use vpcflow_core::{RegionConfig, validate};

pub struct Decommissioner<'a, P: NetworkProvider + ?Sized> {
    provider: &'a P,
    wait: WaitConfig,
    announcer: Box<dyn Announcer + 'a>,
}

impl<'a, P: NetworkProvider + ?Sized> Decommissioner<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            wait: WaitConfig::default(),
            announcer: Box::new(NoAnnounce),
        }
    }

    /// Polling schedule for NAT gateway deletion
    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_announcer(mut self, announcer: impl Announcer + 'a) -> Self {
        self.announcer = Box::new(announcer);
        self
    }

    #[instrument(skip_all, fields(region = %region.name, provider = self.provider.name()))]
    pub async fn decommission(
        &mut self,
        region: &mut RegionConfig,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        validate(region, false)?;
        info!(
            created = region.created_entities().len(),
            "Decommissioning region graph"
        );

        for v in 0..region.vpcs.len() {
            self.nat_gateways(region, v, checkpoint).await?;
            self.subnets(region, v, checkpoint).await?;
            self.network_acls(region, v, checkpoint).await?;
            self.security_groups(region, v, checkpoint).await?;
            self.route_tables(region, v, checkpoint).await?;
            self.vpc(region, v, checkpoint).await?;
        }
        self.elastic_ips(region, checkpoint).await?;
        self.internet_gateways(region, checkpoint).await?;

        info!("Region graph decommissioned");
        Ok(())
    }

    fn announce(&mut self, message: &dyn Fn() -> String) {
        self.announcer.announce(message);
    }

    async fn nat_gateways(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for n in 0..region.vpcs[v].nat_gateways.len() {
            let nat = &region.vpcs[v].nat_gateways[n];
            let Some(id) = created(&nat.id) else {
                continue;
            };
            let (name, id) = (nat.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting NAT gateway {} ({})", name, id));
            self.provider.delete_nat_gateway(&id).await?;
            region.vpcs[v].nat_gateways[n].id = None;
            checkpoint.on_graph_updated(region)?;

            self.announce(&|| format!("Waiting for NAT gateway {} to finish deleting", name));
            match wait_for_nat_gateway_deletion(self.provider, &id, &self.wait).await? {
                WaitOutcome::Deleted { polls } => {
                    info!(name = %name, id = %id, polls, "Deleted NAT gateway");
                    self.announce(&|| format!("Deleted NAT gateway {}", name));
                }
                WaitOutcome::TimedOut { polls, last_state } => {
                    warn!(
                        name = %name,
                        id = %id,
                        polls,
                        state = %last_state,
                        "Timed out waiting for NAT gateway deletion, continuing"
                    );
                    self.announce(&|| {
                        format!(
                            "Timed out waiting for NAT gateway {} (last state: {}), continuing",
                            name, last_state
                        )
                    });
                }
            }
        }
        Ok(())
    }

    async fn subnets(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for s in 0..region.vpcs[v].subnets.len() {
            let subnet = &region.vpcs[v].subnets[s];
            let Some(id) = created(&subnet.id) else {
                continue;
            };
            let (name, id) = (subnet.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting subnet {} ({})", name, id));
            self.provider.delete_subnet(&id).await?;
            region.vpcs[v].subnets[s].id = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %id, "Deleted subnet");
            self.announce(&|| format!("Deleted subnet {}", name));
        }
        Ok(())
    }

    async fn network_acls(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for a in 0..region.vpcs[v].network_acls.len() {
            let acl = &region.vpcs[v].network_acls[a];
            if acl.default {
                continue;
            }
            let Some(id) = created(&acl.id) else {
                continue;
            };
            let (name, id) = (acl.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting network ACL {} ({})", name, id));
            self.provider.delete_network_acl(&id).await?;
            region.vpcs[v].network_acls[a].id = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %id, "Deleted network ACL");
            self.announce(&|| format!("Deleted network ACL {}", name));
        }
        Ok(())
    }

    async fn security_groups(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for g in 0..region.vpcs[v].security_groups.len() {
            let group = &region.vpcs[v].security_groups[g];
            if group.default {
                continue;
            }
            let Some(id) = created(&group.id) else {
                continue;
            };
            let (name, id) = (group.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting security group {} ({})", name, id));
            self.provider.delete_security_group(&id).await?;
            region.vpcs[v].security_groups[g].id = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %id, "Deleted security group");
            self.announce(&|| format!("Deleted security group {}", name));
        }
        Ok(())
    }

    async fn route_tables(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for r in 0..region.vpcs[v].route_tables.len() {
            let table = &region.vpcs[v].route_tables[r];
            if table.default {
                continue;
            }
            let Some(id) = created(&table.id) else {
                continue;
            };
            let (name, id) = (table.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting route table {} ({})", name, id));
            self.provider.delete_route_table(&id).await?;
            region.vpcs[v].route_tables[r].id = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %id, "Deleted route table");
            self.announce(&|| format!("Deleted route table {}", name));
        }
        Ok(())
    }

    /// Detach the gateway, delete the VPC, and forget the identifiers of the
    /// default entities that went away with it
    async fn vpc(
        &mut self,
        region: &mut RegionConfig,
        v: usize,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        let vpc = &region.vpcs[v];
        let name = vpc.name.clone();

        if let Some(vpc_id) = created(&vpc.id).map(str::to_string) {
            let gateway = vpc
                .internet_gateway
                .as_deref()
                .and_then(|g| region.find_internet_gateway(g))
                .and_then(|g| created(&g.id).map(|id| (g.name.clone(), id.to_string())));

            if let Some((gateway_name, gateway_id)) = gateway {
                self.announce(&|| {
                    format!("Detaching internet gateway {} from VPC {}", gateway_name, name)
                });
                self.provider
                    .detach_internet_gateway(&gateway_id, &vpc_id)
                    .await?;
                info!(vpc = %name, gateway = %gateway_name, "Detached internet gateway");
            }

            self.announce(&|| format!("Deleting VPC {} ({})", name, vpc_id));
            self.provider.delete_vpc(&vpc_id).await?;
            clear_vpc(region, v);
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %vpc_id, "Deleted VPC");
            self.announce(&|| format!("Deleted VPC {}", name));
        } else if has_default_ids(region, v) {
            clear_vpc(region, v);
            checkpoint.on_graph_updated(region)?;
        }
        Ok(())
    }

    async fn elastic_ips(
        &mut self,
        region: &mut RegionConfig,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for i in 0..region.elastic_ips.len() {
            let eip = &region.elastic_ips[i];
            let Some(id) = created(&eip.allocation_id) else {
                continue;
            };
            let (name, id) = (eip.name.clone(), id.to_string());

            self.announce(&|| format!("Releasing elastic ip {} ({})", name, id));
            self.provider.release_address(&id).await?;
            let eip = &mut region.elastic_ips[i];
            eip.allocation_id = None;
            eip.public_ip = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, allocation_id = %id, "Released elastic ip");
            self.announce(&|| format!("Released elastic ip {}", name));
        }
        Ok(())
    }

    async fn internet_gateways(
        &mut self,
        region: &mut RegionConfig,
        checkpoint: &mut dyn Checkpoint,
    ) -> Result<()> {
        for i in 0..region.internet_gateways.len() {
            let gateway = &region.internet_gateways[i];
            let Some(id) = created(&gateway.id) else {
                continue;
            };
            let (name, id) = (gateway.name.clone(), id.to_string());

            self.announce(&|| format!("Deleting internet gateway {} ({})", name, id));
            self.provider.delete_internet_gateway(&id).await?;
            region.internet_gateways[i].id = None;
            checkpoint.on_graph_updated(region)?;
            info!(name = %name, id = %id, "Deleted internet gateway");
            self.announce(&|| format!("Deleted internet gateway {}", name));
        }
        Ok(())
    }
}

fn created(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.is_empty())
}

fn has_default_ids(region: &RegionConfig, v: usize) -> bool {
    let vpc = &region.vpcs[v];
    vpc.route_tables.iter().any(|t| t.default && t.id.is_some())
        || vpc.network_acls.iter().any(|a| a.default && a.id.is_some())
        || vpc.security_groups.iter().any(|g| g.default && g.id.is_some())
}

fn clear_vpc(region: &mut RegionConfig, v: usize) {
    let vpc = &mut region.vpcs[v];
    vpc.id = None;
    for table in vpc.route_tables.iter_mut().filter(|t| t.default) {
        table.id = None;
    }
    for acl in vpc.network_acls.iter_mut().filter(|a| a.default) {
        acl.id = None;
    }
    for group in vpc.security_groups.iter_mut().filter(|g| g.default) {
        group.id = None;
    }
}
