// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster API object types rendered for IBM Cloud.
//!
//! The `IBMVPCCluster` and `IBMVPCMachine` types mirror the IBM Cloud Cluster
//! API provider (`infrastructure.cluster.x-k8s.io/v1beta2`); `Machine` mirrors
//! core Cluster API (`cluster.x-k8s.io/v1beta1`). Only the fields the installer
//! sets are modelled.
//!
//! Security groups and load balancers reference each other, subnets and
//! security groups by name only.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Security Groups
// ============================================================================

/// A named set of allow rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSecurityGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<VPCSecurityGroupRule>,
}

/// Whether a rule allows or denies traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    Deny,
}

/// Direction of traffic a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Inbound,
    Outbound,
}

/// IP protocol a rule matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleProtocol {
    All,
    Icmp,
    Tcp,
    Udp,
}

/// Kind of remote a rule matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RemoteType {
    /// Any address
    Any,
    /// The CIDR of a named subnet
    Cidr,
    /// Members of a named security group
    Sg,
}

/// One security group rule. Inbound rules carry a `source`, outbound rules a
/// `destination`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSecurityGroupRule {
    pub action: RuleAction,
    pub direction: RuleDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<VPCSecurityGroupRulePrototype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<VPCSecurityGroupRulePrototype>,
}

impl VPCSecurityGroupRule {
    /// The prototype on the side the rule matches.
    #[must_use]
    pub fn prototype(&self) -> Option<&VPCSecurityGroupRulePrototype> {
        match self.direction {
            RuleDirection::Inbound => self.source.as_ref(),
            RuleDirection::Outbound => self.destination.as_ref(),
        }
    }
}

/// Protocol, ports and remotes of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSecurityGroupRulePrototype {
    pub protocol: RuleProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<VPCSecurityGroupPortRange>,
    pub remotes: Vec<VPCSecurityGroupRuleRemote>,
}

/// Inclusive port range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSecurityGroupPortRange {
    pub minimum_port: u16,
    pub maximum_port: u16,
}

/// Remote end of a rule, referenced by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSecurityGroupRuleRemote {
    pub remote_type: RemoteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_subnet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_name: Option<String>,
}

// ============================================================================
// Load Balancers
// ============================================================================

/// A VPC load balancer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerSpec {
    pub name: String,
    pub public: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_listeners: Vec<AdditionalListenerSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_pools: Vec<VPCLoadBalancerBackendPoolSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<VPCResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<VPCResource>,
}

/// Listener forwarding a port to a backend pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalListenerSpec {
    pub default_pool_name: String,
    pub port: u16,
    pub protocol: ListenerProtocol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListenerProtocol {
    Http,
    Https,
    Tcp,
    Udp,
}

/// Pool of backend members behind a listener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerBackendPoolSpec {
    pub name: String,
    pub algorithm: PoolAlgorithm,
    pub protocol: PoolProtocol,
    pub health_monitor: VPCLoadBalancerHealthMonitorSpec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolAlgorithm {
    LeastConnections,
    RoundRobin,
    WeightedRoundRobin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PoolProtocol {
    Http,
    Https,
    Tcp,
    Udp,
}

/// Health check of a backend pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerHealthMonitorSpec {
    /// Seconds between checks
    pub delay: i64,
    /// Failed checks before a member is marked unhealthy
    pub retries: i64,
    /// Seconds before a check times out
    pub timeout: i64,
    #[serde(rename = "type")]
    pub monitor_type: HealthMonitorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthMonitorType {
    Http,
    Https,
    Tcp,
}

/// Reference to a VPC resource by ID or name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VPCResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl VPCResource {
    /// Reference by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

// ============================================================================
// IBMVPCCluster
// ============================================================================

/// Infrastructure of an OpenShift cluster on IBM Cloud VPC.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "IBMVPCCluster",
    namespaced,
    doc = "IBMVPCCluster describes the VPC, subnets, security groups and load balancers of a cluster."
)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterSpec {
    pub region: String,
    pub resource_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<APIEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<VPCResource>,
    pub network: VPCNetworkSpec,
}

/// Host and port of the Kubernetes API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct APIEndpoint {
    pub host: String,
    pub port: u16,
}

/// Network layout of the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCNetworkSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VPCResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<VPCResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_subnets: Vec<SubnetSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worker_subnets: Vec<SubnetSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<VPCSecurityGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancers: Vec<VPCLoadBalancerSpec>,
}

/// Subnet of the cluster network, existing or to be created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_cidr_block: Option<String>,
}

// ============================================================================
// IBMVPCMachine
// ============================================================================

/// A virtual server instance of the cluster.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "IBMVPCMachine",
    namespaced,
    doc = "IBMVPCMachine describes one virtual server instance of a cluster."
)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCMachineSpec {
    pub name: String,
    pub zone: String,
    pub profile: String,
    pub image: VPCResource,
    pub boot_volume: VPCVolume,
    pub primary_network_interface: NetworkInterface,
}

/// Boot volume of a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCVolume {
    pub delete_volume_on_instance_delete: bool,
    #[serde(rename = "sizeGiB")]
    pub size_gib: i64,
    #[serde(default, rename = "encryptionKeyCRN", skip_serializing_if = "Option::is_none")]
    pub encryption_key_crn: Option<String>,
}

/// Primary network interface of a machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub subnet: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<VPCResource>,
}

// ============================================================================
// Machine
// ============================================================================

/// Cluster API machine tying an `IBMVPCMachine` to its bootstrap data.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Machine",
    namespaced,
    doc = "Machine binds infrastructure and bootstrap data for one node."
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    pub cluster_name: String,
    pub bootstrap: MachineBootstrap,
    pub infrastructure_ref: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_domain: Option<String>,
}

/// Bootstrap data of a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineBootstrap {
    pub data_secret_name: String,
}
