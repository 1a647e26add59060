//! Mapping between vpcflow's provider types and EC2 shapes

use aws_sdk_ec2::types::{
    Filter, NatGatewayState as Ec2NatGatewayState, ResourceType, Route, Tag, TagSpecification,
};
use vpcflow_cloud::{
    NatGatewayState, PortRange, RouteTarget, TCP_PROTOCOL, UDP_PROTOCOL, WILDCARD_PROTOCOL,
};

pub(crate) fn filter(name: &str, value: &str) -> Filter {
    Filter::builder().name(name).values(value).build()
}

/// `Name=<name>` tag applied at creation
pub(crate) fn name_tag(resource_type: ResourceType, name: &str) -> TagSpecification {
    TagSpecification::builder()
        .resource_type(resource_type)
        .tags(Tag::builder().key("Name").value(name).build())
        .build()
}

/// Ports as EC2 expects them. Wildcard-protocol rules carry no ports; TCP
/// and UDP need an explicit `0-65535` for "every port".
pub(crate) fn wire_ports(protocol: &str, ports: PortRange) -> Option<(i32, i32)> {
    if protocol == WILDCARD_PROTOCOL {
        return None;
    }
    if ports.is_all() {
        if protocol == TCP_PROTOCOL || protocol == UDP_PROTOCOL {
            return Some((0, 65535));
        }
        return Some((-1, -1));
    }
    Some((ports.from, ports.to))
}

pub(crate) fn route_target(route: &Route) -> RouteTarget {
    match (route.gateway_id(), route.nat_gateway_id()) {
        (Some("local"), _) => RouteTarget::Local,
        (Some(id), _) if id.starts_with("igw-") => RouteTarget::InternetGateway(id.to_string()),
        (_, Some(id)) => RouteTarget::NatGateway(id.to_string()),
        (Some(other), _) => RouteTarget::Other(other.to_string()),
        (None, None) => RouteTarget::Other(
            route
                .transit_gateway_id()
                .or(route.vpc_peering_connection_id())
                .or(route.network_interface_id())
                .or(route.instance_id())
                .unwrap_or("unknown")
                .to_string(),
        ),
    }
}

pub(crate) fn nat_state(state: Option<&Ec2NatGatewayState>) -> NatGatewayState {
    match state {
        Some(Ec2NatGatewayState::Pending) => NatGatewayState::Pending,
        Some(Ec2NatGatewayState::Available) => NatGatewayState::Available,
        Some(Ec2NatGatewayState::Deleting) => NatGatewayState::Deleting,
        Some(Ec2NatGatewayState::Deleted) => NatGatewayState::Deleted,
        Some(Ec2NatGatewayState::Failed) => NatGatewayState::Failed,
        Some(other) => NatGatewayState::Unknown(other.as_str().to_string()),
        None => NatGatewayState::Unknown("unknown".to_string()),
    }
}
