mod common;

use common::{FakeProvider, quick_wait, sample_region};
use std::time::Duration;
use vpcflow_cloud::{CloudError, Decommissioner, NoCheckpoint, Provisioner};
use vpcflow_core::RegionConfig;

async fn provisioned(provider: &FakeProvider, mut region: RegionConfig) -> RegionConfig {
    Provisioner::new(provider)
        .provision(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();
    provider.clear_calls();
    region
}

#[tokio::test]
async fn test_decommission_restores_the_pristine_graph() {
    let provider = FakeProvider::new();
    let original = sample_region();
    let mut region = provisioned(&provider, original.clone()).await;

    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert_eq!(region, original);
    assert!(region.is_pristine());
    assert!(provider.live_resources().is_empty());
}

#[tokio::test]
async fn test_decommission_order_ignores_document_order() {
    let provider = FakeProvider::new();
    let mut declared = sample_region();
    declared.vpcs[0].subnets.reverse();
    declared.vpcs[0].route_tables.reverse();
    let mut region = provisioned(&provider, declared).await;

    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert!(provider.last("describe_nat_gateway") < provider.first("delete_subnet"));
    assert!(provider.first("delete_nat_gateway") < provider.first("delete_subnet"));
    assert!(provider.last("delete_subnet") < provider.first("delete_network_acl"));
    assert!(provider.first("delete_network_acl") < provider.first("delete_security_group"));
    assert!(provider.first("delete_security_group") < provider.first("delete_route_table"));
    assert!(provider.last("delete_route_table") < provider.first("delete_vpc"));
    assert!(provider.first("detach_internet_gateway") < provider.first("delete_vpc"));
    assert!(provider.first("delete_vpc") < provider.first("release_address"));
    assert!(provider.first("release_address") < provider.first("delete_internet_gateway"));
}

#[tokio::test]
async fn test_default_entities_are_never_deleted() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;
    let main_rt = region.vpcs[0].route_tables[0].id.clone().unwrap();
    let default_acl = region.vpcs[0].network_acls[0].id.clone().unwrap();
    let default_sg = region.vpcs[0].security_groups[0].id.clone().unwrap();

    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert_eq!(provider.calls_to("delete_route_table").len(), 2);
    assert_eq!(provider.calls_to("delete_network_acl").len(), 1);
    assert_eq!(provider.calls_to("delete_security_group").len(), 1);
    for id in [&main_rt, &default_acl, &default_sg] {
        assert!(
            provider.calls().iter().all(|c| !c.starts_with("delete_") || !c.contains(id.as_str())),
            "{} was deleted explicitly",
            id
        );
    }
    // they disappear with the VPC and their identifiers are forgotten
    assert!(region.vpcs[0].route_tables[0].id.is_none());
    assert!(region.vpcs[0].network_acls[0].id.is_none());
    assert!(region.vpcs[0].security_groups[0].id.is_none());
}

#[tokio::test]
async fn test_second_decommission_is_a_no_op() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;
    let mut decommissioner = Decommissioner::new(&provider).with_wait_config(quick_wait());

    decommissioner
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();
    provider.clear_calls();

    decommissioner
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_interrupted_decommission_can_be_rerun() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;
    provider.fail_on("delete_vpc");

    let result = Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await;

    assert!(matches!(
        result,
        Err(CloudError::ProviderCallFailed { ref operation, .. }) if operation == "delete_vpc"
    ));
    let vpc = &region.vpcs[0];
    assert!(vpc.id.is_some());
    assert!(vpc.subnets.iter().all(|s| s.id.is_none()));
    assert!(vpc.nat_gateways[0].id.is_none());
    assert!(region.internet_gateways[0].id.is_some());

    provider.clear_failure();
    provider.clear_calls();
    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert!(region.is_pristine());
    assert!(provider.live_resources().is_empty());
    assert!(provider.calls_to("delete_subnet").is_empty());
    assert!(provider.calls_to("delete_nat_gateway").is_empty());
}

#[tokio::test]
async fn test_partially_provisioned_graph_is_torn_down() {
    let provider = FakeProvider::new();
    provider.fail_on("create_nat_gateway");
    let mut region = sample_region();
    let _ = Provisioner::new(&provider)
        .provision(&mut region, &mut NoCheckpoint)
        .await;
    provider.clear_failure();
    provider.clear_calls();

    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert!(provider.calls_to("delete_nat_gateway").is_empty());
    assert!(region.is_pristine());
    assert!(provider.live_resources().is_empty());
}

#[tokio::test]
async fn test_nat_deletion_is_awaited() {
    let provider = FakeProvider::with_nat_polls(3);
    let mut region = provisioned(&provider, sample_region()).await;

    let mut messages = Vec::new();
    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .with_announcer(|message: String| messages.push(message))
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert_eq!(provider.calls_to("describe_nat_gateway").len(), 4);
    assert!(messages.iter().any(|m| m.starts_with("Waiting for NAT gateway nat-gw")));
    assert!(messages.iter().any(|m| m == "Deleted NAT gateway nat-gw"));
}

#[tokio::test]
async fn test_nat_wait_timeout_continues_teardown() {
    let provider = FakeProvider::with_nat_polls(u32::MAX);
    let mut region = provisioned(&provider, sample_region()).await;

    let mut messages = Vec::new();
    Decommissioner::new(&provider)
        .with_wait_config(quick_wait().with_timeout(Some(Duration::from_millis(20))))
        .with_announcer(|message: String| messages.push(message))
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    assert!(
        messages
            .iter()
            .any(|m| m.starts_with("Timed out waiting for NAT gateway nat-gw"))
    );
    assert_eq!(provider.calls_to("delete_subnet").len(), 2);
    assert_eq!(provider.calls_to("delete_vpc").len(), 1);
    assert!(region.is_pristine());
}

#[tokio::test]
async fn test_nat_describe_failure_aborts() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;
    provider.fail_on("describe_nat_gateway");

    let result = Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut NoCheckpoint)
        .await;

    assert!(matches!(result, Err(CloudError::ProviderCallFailed { .. })));
    // the delete was issued, so the identifier is already gone
    assert!(region.vpcs[0].nat_gateways[0].id.is_none());
    assert!(provider.calls_to("delete_subnet").is_empty());
}

#[tokio::test]
async fn test_announcements_bracket_each_deletion() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;
    let subnet_id = region.vpcs[0].subnets[0].id.clone().unwrap();

    let mut messages = Vec::new();
    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .with_announcer(|message: String| messages.push(message))
        .decommission(&mut region, &mut NoCheckpoint)
        .await
        .unwrap();

    let before = messages
        .iter()
        .position(|m| *m == format!("Deleting subnet public-a ({})", subnet_id))
        .unwrap();
    let after = messages
        .iter()
        .position(|m| m == "Deleted subnet public-a")
        .unwrap();
    assert!(before < after);
    assert!(messages.iter().any(|m| m.starts_with("Detaching internet gateway main-igw")));
    assert_eq!(messages.last().unwrap(), "Deleted internet gateway main-igw");
}

#[tokio::test]
async fn test_checkpoint_follows_every_removal() {
    let provider = FakeProvider::new();
    let mut region = provisioned(&provider, sample_region()).await;

    let mut remaining = Vec::new();
    let mut checkpoint = |graph: &RegionConfig| {
        remaining.push(graph.created_entities().len());
        Ok::<(), CloudError>(())
    };
    Decommissioner::new(&provider)
        .with_wait_config(quick_wait())
        .decommission(&mut region, &mut checkpoint)
        .await
        .unwrap();

    assert!(remaining.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(remaining.last(), Some(&0));
}
