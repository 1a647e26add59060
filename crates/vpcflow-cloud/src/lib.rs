//! vpcflow cloud orchestration
//!
//! Creates and tears down a region graph (see `vpcflow-core`) through a
//! [`NetworkProvider`], resolving name references as identifiers become
//! available and checkpointing the graph after every mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   vpcflow CLI                    │
//! │                 (vpcflow up/down)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │  RegionConfig + Checkpoint
//! ┌─────────────────▼───────────────────────────────┐
//! │                 vpcflow-cloud                    │
//! │  ┌─────────────┐          ┌────────────────┐    │
//! │  │ Provisioner │          │ Decommissioner │    │
//! │  └──────┬──────┘          └───────┬────────┘    │
//! │  ┌──────▼──────┐ ┌───────────┐    │             │
//! │  │NameResolver │ │ translate │    │             │
//! │  └─────────────┘ └───────────┘    │             │
//! │  ┌────────────────────────────────▼──────────┐  │
//! │  │     trait NetworkProvider { ... }         │  │
//! │  └───────────────────────────────────────────┘  │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ vpcflow-cloud │
//! │     -aws      │
//! └───────────────┘
//! ```

pub mod decommissioner;
pub mod error;
pub mod hooks;
pub mod provider;
pub mod provisioner;
pub mod resolver;
pub mod translate;
pub mod waiter;

// Re-exports
pub use decommissioner::Decommissioner;
pub use error::{CloudError, Result};
pub use hooks::{Announcer, Checkpoint, FileCheckpoint, NoAnnounce, NoCheckpoint, TracingAnnouncer};
pub use provider::{
    ACL_FALLTHROUGH_RULE_NUMBER, AclEntry, AclEntryKey, AllocatedAddress, NatGatewayState,
    NetworkProvider, PortRange, RouteEntry, RouteTarget, SecurityGroupPermission,
    SecurityGroupRuleRef, TCP_PROTOCOL, TrafficDirection, UDP_PROTOCOL, WILDCARD_PROTOCOL,
};
pub use provisioner::Provisioner;
pub use resolver::{ALL_TRAFFIC, ALL_TRAFFIC_CIDR, NameResolver};
pub use waiter::{WaitConfig, WaitOutcome};
