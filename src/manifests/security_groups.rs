// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Security groups of an IBM Cloud VPC cluster.
//!
//! Five groups are always produced, in this order:
//!
//! | Group | Purpose |
//! |-------|---------|
//! | `<infra>-sg-cluster-wide` | SSH, ICMP and overlay traffic between every node |
//! | `<infra>-sg-openshift-net` | OpenShift host services, IPsec and node ports |
//! | `<infra>-sg-kube-api-lb` | Kubernetes API and machine-config load balancers |
//! | `<infra>-sg-control-plane` | Traffic into the control plane |
//! | `<infra>-sg-cp-internal` | etcd between control plane nodes |
//!
//! Every rule names its remote (a subnet or another group) instead of
//! referencing it, so each group is built by an independent function.

use crate::constants::{
    CONTROL_PLANE_COMPONENT_PORT_MAX, CONTROL_PLANE_COMPONENT_PORT_MIN, ETCD_PORT_MAX,
    ETCD_PORT_MIN, GENEVE_PORT, IKE_NAT_T_PORT, IKE_PORT, INTERNAL_SERVICES_PORT_MAX,
    INTERNAL_SERVICES_PORT_MIN, KUBELET_PORT, KUBE_API_PORT, MACHINE_CONFIG_PORT, NODE_PORT_MAX,
    NODE_PORT_MIN, SG_CLUSTER_WIDE_SUFFIX, SG_CONTROL_PLANE_INTERNAL_SUFFIX,
    SG_CONTROL_PLANE_SUFFIX, SG_KUBE_API_LB_SUFFIX, SG_OPENSHIFT_NET_SUFFIX, SSH_PORT, VXLAN_PORT,
};
use crate::manifests::types::{
    RemoteType, RuleAction, RuleDirection, RuleProtocol, VPCSecurityGroup, VPCSecurityGroupPortRange,
    VPCSecurityGroupRule, VPCSecurityGroupRulePrototype, VPCSecurityGroupRuleRemote,
};
use crate::subnets::Subnet;

/// Name of a cluster security group: `<infra>-<suffix>`.
#[must_use]
pub fn security_group_name(infra_id: &str, suffix: &str) -> String {
    format!("{infra_id}-{suffix}")
}

/// Names of the five cluster security groups, in build order.
#[must_use]
pub fn security_group_names(infra_id: &str) -> Vec<String> {
    [
        SG_CLUSTER_WIDE_SUFFIX,
        SG_OPENSHIFT_NET_SUFFIX,
        SG_KUBE_API_LB_SUFFIX,
        SG_CONTROL_PLANE_SUFFIX,
        SG_CONTROL_PLANE_INTERNAL_SUFFIX,
    ]
    .iter()
    .map(|suffix| security_group_name(infra_id, suffix))
    .collect()
}

/// Build the cluster security groups for the given subnets.
#[must_use]
pub fn build_security_groups(infra_id: &str, all_subnets: &[Subnet]) -> Vec<VPCSecurityGroup> {
    let names: Vec<String> = all_subnets.iter().map(|s| s.name.clone()).collect();
    build_security_groups_for_subnet_names(infra_id, &names)
}

/// Build the cluster security groups from subnet names alone.
///
/// Used when the installer creates the subnets itself and only their names
/// are known.
#[must_use]
pub fn build_security_groups_for_subnet_names(
    infra_id: &str,
    subnet_names: &[String],
) -> Vec<VPCSecurityGroup> {
    vec![
        build_cluster_wide_sg(infra_id, subnet_names),
        build_openshift_net_sg(infra_id, subnet_names),
        build_kube_api_lb_sg(infra_id),
        build_control_plane_sg(infra_id),
        build_cp_internal_sg(infra_id),
    ]
}

fn build_cluster_wide_sg(infra_id: &str, subnet_names: &[String]) -> VPCSecurityGroup {
    let name = security_group_name(infra_id, SG_CLUSTER_WIDE_SUFFIX);
    let mut rules = Vec::new();

    if !subnet_names.is_empty() {
        rules.push(inbound(
            RuleProtocol::Tcp,
            Some(port(SSH_PORT)),
            subnet_cidrs(subnet_names),
        ));
    }
    rules.push(inbound(RuleProtocol::Icmp, None, vec![sg(&name)]));
    rules.push(inbound(RuleProtocol::Udp, Some(port(VXLAN_PORT)), vec![sg(&name)]));
    rules.push(inbound(RuleProtocol::Udp, Some(port(GENEVE_PORT)), vec![sg(&name)]));
    rules.push(outbound(RuleProtocol::All, None, vec![any()]));

    VPCSecurityGroup { name, rules }
}

fn build_openshift_net_sg(infra_id: &str, subnet_names: &[String]) -> VPCSecurityGroup {
    let name = security_group_name(infra_id, SG_OPENSHIFT_NET_SUFFIX);
    let internal = ports(INTERNAL_SERVICES_PORT_MIN, INTERNAL_SERVICES_PORT_MAX);

    let mut rules = vec![
        inbound(RuleProtocol::Tcp, Some(internal), vec![sg(&name)]),
        inbound(RuleProtocol::Udp, Some(internal), vec![sg(&name)]),
        inbound(RuleProtocol::Tcp, Some(port(KUBELET_PORT)), vec![sg(&name)]),
        inbound(RuleProtocol::Udp, Some(port(IKE_PORT)), vec![sg(&name)]),
        inbound(RuleProtocol::Udp, Some(port(IKE_NAT_T_PORT)), vec![sg(&name)]),
    ];

    // Load balancer health checks reach node ports from the subnets.
    if !subnet_names.is_empty() {
        let node_ports = ports(NODE_PORT_MIN, NODE_PORT_MAX);
        rules.push(inbound(
            RuleProtocol::Tcp,
            Some(node_ports),
            subnet_cidrs(subnet_names),
        ));
        rules.push(inbound(
            RuleProtocol::Udp,
            Some(node_ports),
            subnet_cidrs(subnet_names),
        ));
    }

    VPCSecurityGroup { name, rules }
}

fn build_kube_api_lb_sg(infra_id: &str) -> VPCSecurityGroup {
    let cluster_wide = security_group_name(infra_id, SG_CLUSTER_WIDE_SUFFIX);
    let control_plane = security_group_name(infra_id, SG_CONTROL_PLANE_SUFFIX);

    VPCSecurityGroup {
        name: security_group_name(infra_id, SG_KUBE_API_LB_SUFFIX),
        rules: vec![
            inbound(RuleProtocol::Tcp, Some(port(KUBE_API_PORT)), vec![any()]),
            outbound(
                RuleProtocol::Tcp,
                Some(port(KUBE_API_PORT)),
                vec![sg(&control_plane)],
            ),
            inbound(
                RuleProtocol::Tcp,
                Some(port(MACHINE_CONFIG_PORT)),
                vec![sg(&cluster_wide)],
            ),
            outbound(
                RuleProtocol::Tcp,
                Some(port(MACHINE_CONFIG_PORT)),
                vec![sg(&control_plane)],
            ),
        ],
    }
}

fn build_control_plane_sg(infra_id: &str) -> VPCSecurityGroup {
    let cluster_wide = security_group_name(infra_id, SG_CLUSTER_WIDE_SUFFIX);
    let kube_api_lb = security_group_name(infra_id, SG_KUBE_API_LB_SUFFIX);

    VPCSecurityGroup {
        name: security_group_name(infra_id, SG_CONTROL_PLANE_SUFFIX),
        rules: vec![
            inbound(
                RuleProtocol::Tcp,
                Some(port(KUBE_API_PORT)),
                vec![sg(&cluster_wide), sg(&kube_api_lb)],
            ),
            inbound(
                RuleProtocol::Tcp,
                Some(port(MACHINE_CONFIG_PORT)),
                vec![sg(&kube_api_lb)],
            ),
            inbound(
                RuleProtocol::Tcp,
                Some(ports(
                    CONTROL_PLANE_COMPONENT_PORT_MIN,
                    CONTROL_PLANE_COMPONENT_PORT_MAX,
                )),
                vec![sg(&cluster_wide)],
            ),
        ],
    }
}

fn build_cp_internal_sg(infra_id: &str) -> VPCSecurityGroup {
    let name = security_group_name(infra_id, SG_CONTROL_PLANE_INTERNAL_SUFFIX);
    let rules = vec![inbound(
        RuleProtocol::Tcp,
        Some(ports(ETCD_PORT_MIN, ETCD_PORT_MAX)),
        vec![sg(&name)],
    )];
    VPCSecurityGroup { name, rules }
}

// ============================================================================
// Rule helpers
// ============================================================================

fn inbound(
    protocol: RuleProtocol,
    port_range: Option<VPCSecurityGroupPortRange>,
    remotes: Vec<VPCSecurityGroupRuleRemote>,
) -> VPCSecurityGroupRule {
    VPCSecurityGroupRule {
        action: RuleAction::Allow,
        direction: RuleDirection::Inbound,
        source: Some(VPCSecurityGroupRulePrototype {
            protocol,
            port_range,
            remotes,
        }),
        destination: None,
    }
}

fn outbound(
    protocol: RuleProtocol,
    port_range: Option<VPCSecurityGroupPortRange>,
    remotes: Vec<VPCSecurityGroupRuleRemote>,
) -> VPCSecurityGroupRule {
    VPCSecurityGroupRule {
        action: RuleAction::Allow,
        direction: RuleDirection::Outbound,
        source: None,
        destination: Some(VPCSecurityGroupRulePrototype {
            protocol,
            port_range,
            remotes,
        }),
    }
}

fn port(p: u16) -> VPCSecurityGroupPortRange {
    ports(p, p)
}

fn ports(minimum_port: u16, maximum_port: u16) -> VPCSecurityGroupPortRange {
    VPCSecurityGroupPortRange {
        minimum_port,
        maximum_port,
    }
}

fn any() -> VPCSecurityGroupRuleRemote {
    VPCSecurityGroupRuleRemote {
        remote_type: RemoteType::Any,
        cidr_subnet_name: None,
        security_group_name: None,
    }
}

fn sg(name: &str) -> VPCSecurityGroupRuleRemote {
    VPCSecurityGroupRuleRemote {
        remote_type: RemoteType::Sg,
        cidr_subnet_name: None,
        security_group_name: Some(name.to_string()),
    }
}

fn subnet_cidrs(subnet_names: &[String]) -> Vec<VPCSecurityGroupRuleRemote> {
    subnet_names
        .iter()
        .map(|name| VPCSecurityGroupRuleRemote {
            remote_type: RemoteType::Cidr,
            cidr_subnet_name: Some(name.clone()),
            security_group_name: None,
        })
        .collect()
}
