//! AWS provider for vpcflow
//!
//! Implements [`NetworkProvider`](vpcflow_cloud::NetworkProvider) on top of
//! the EC2 API, so region graphs can be provisioned into and torn down from a
//! real AWS account.
//!
//! # Requirements
//!
//! - Credentials resolvable through the AWS default chain (environment,
//!   shared config/credentials files, SSO, instance metadata), or a named
//!   profile passed to [`AwsNetworkProvider::connect`]
//! - IAM permissions for the EC2 VPC, subnet, route table, network ACL,
//!   security group, internet gateway, NAT gateway and address APIs
//!
//! # Example
//!
//! ```ignore
//! use vpcflow_cloud::{NoCheckpoint, Provisioner};
//! use vpcflow_cloud_aws::AwsNetworkProvider;
//!
//! let provider = AwsNetworkProvider::connect("ap-northeast-1", Some("staging")).await;
//! let mut region = vpcflow_core::load_region("region.yaml".as_ref())?;
//! Provisioner::new(&provider).provision(&mut region, &mut NoCheckpoint).await?;
//! ```

mod convert;
pub mod error;
pub mod provider;

pub use error::{AwsError, Result};
pub use provider::AwsNetworkProvider;
