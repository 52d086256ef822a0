// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Install-config types for the IBM Cloud platform.
//!
//! The install-config is the YAML document a user writes to describe the cluster.
//! Only the parts the IBM Cloud platform layer reads are modelled here.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: v1
//! metadata:
//!   name: mycluster
//! baseDomain: example.com
//! publish: External
//! platform:
//!   ibmcloud:
//!     region: us-south
//!     resourceGroupName: my-rg
//!     networkResourceGroupName: my-network-rg
//!     vpc: my-vpc
//!     controlPlaneSubnets: [cp-1, cp-2, cp-3]
//!     computeSubnets: [w-1, w-2, w-3]
//! controlPlane:
//!   name: master
//!   replicas: 3
//!   platform:
//!     ibmcloud:
//!       type: bx2-4x16
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Service names that may be overridden via `platform.ibmcloud.serviceEndpoints`.
pub const SUPPORTED_SERVICE_ENDPOINT_NAMES: &[&str] = &[
    "CIS",
    "COS",
    "COSConfig",
    "DNSServices",
    "GlobalCatalog",
    "GlobalSearch",
    "GlobalTagging",
    "HyperProtect",
    "IAM",
    "KeyProtect",
    "ResourceController",
    "ResourceManager",
    "VPC",
];

/// How the cluster's API endpoints are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum PublishingStrategy {
    /// Public endpoints in a CIS zone
    #[default]
    External,
    /// Private endpoints in a DNS Services zone
    Internal,
}

impl fmt::Display for PublishingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishingStrategy::External => f.write_str("External"),
            PublishingStrategy::Internal => f.write_str("Internal"),
        }
    }
}

/// Root of the install-config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub metadata: ConfigMetadata,

    /// Base DNS domain of the cluster; cluster records live below it
    pub base_domain: String,

    #[serde(default)]
    pub publish: PublishingStrategy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,

    pub platform: Platform,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<MachinePool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compute: Vec<MachinePool>,
}

impl InstallConfig {
    /// Parse an install-config from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or does not match the schema.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Read and parse an install-config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read install-config {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse install-config {}", path.display()))
    }

    /// Cluster name from `metadata.name`.
    #[must_use]
    pub fn cluster_name(&self) -> &str {
        &self.metadata.name
    }

    /// Shortcut to `platform.ibmcloud`.
    #[must_use]
    pub fn ibmcloud(&self) -> &IbmCloudPlatform {
        &self.platform.ibmcloud
    }
}

/// `metadata` block of the install-config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigMetadata {
    pub name: String,
}

/// `networking` block of the install-config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    #[serde(default)]
    pub machine_network: Vec<MachineNetworkEntry>,
}

/// One machine network CIDR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MachineNetworkEntry {
    pub cidr: String,
}

/// `platform` block of the install-config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Platform {
    pub ibmcloud: IbmCloudPlatform,
}

/// IBM Cloud platform settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IbmCloudPlatform {
    /// IBM Cloud region, e.g. `us-south`
    pub region: String,

    /// Resource group for cluster resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,

    /// Resource group holding a pre-existing VPC and its subnets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_resource_group_name: Option<String>,

    /// Pre-existing VPC to install into
    #[serde(default, alias = "vpcName", skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_subnets: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compute_subnets: Vec<String>,

    /// Overrides of IBM Cloud service endpoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_endpoints: Vec<ServiceEndpoint>,
}

impl IbmCloudPlatform {
    /// Resource group of the network resources, falling back to the cluster resource group.
    #[must_use]
    pub fn network_resource_group(&self) -> Option<&str> {
        self.network_resource_group_name
            .as_deref()
            .or(self.resource_group_name.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Whether the cluster is installed into a pre-existing VPC.
    #[must_use]
    pub fn uses_existing_vpc(&self) -> bool {
        self.vpc.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Override of a single IBM Cloud service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceEndpoint {
    /// Service name, one of [`SUPPORTED_SERVICE_ENDPOINT_NAMES`]
    pub name: String,
    /// Absolute URL of the endpoint
    pub url: String,
}

/// A control plane or compute machine pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachinePool {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,

    #[serde(default)]
    pub platform: MachinePoolPlatform,
}

impl MachinePool {
    /// IBM Cloud settings of the pool, if any.
    #[must_use]
    pub fn ibmcloud(&self) -> Option<&MachinePlatform> {
        self.platform.ibmcloud.as_ref()
    }
}

/// Platform section of a machine pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MachinePoolPlatform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibmcloud: Option<MachinePlatform>,
}

/// IBM Cloud settings of a machine pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachinePlatform {
    /// VSI profile name, e.g. `bx2-4x16`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Availability zones the pool spreads across
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_volume: Option<BootVolume>,
}

/// Boot volume settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootVolume {
    /// CRN of a Key Protect or Hyper Protect root key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}
