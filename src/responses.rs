// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Response models for the IBM Cloud REST services.
//!
//! Only the fields the installer reads are modelled. Nearly every field is
//! optional because the services omit fields freely; callers that require a
//! field check for it and report a malformed response.

use serde::{Deserialize, Serialize};

/// Reference to another resource, as embedded in VPC responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub crn: Option<String>,
}

/// Reference to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneReference {
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// VPC
// ============================================================================

/// A VPC subnet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VpcSubnet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub crn: Option<String>,
    #[serde(default)]
    pub ipv4_cidr_block: Option<String>,
    #[serde(default)]
    pub vpc: Option<ResourceReference>,
    #[serde(default)]
    pub zone: Option<ZoneReference>,
    #[serde(default)]
    pub resource_group: Option<ResourceReference>,
}

/// A VPC.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vpc {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub crn: Option<String>,
    #[serde(default)]
    pub resource_group: Option<ResourceReference>,
}

/// A VPC region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A zone inside a VPC region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A virtual server instance profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub name: String,
    #[serde(default)]
    pub family: Option<String>,
}

/// Link to the next page of a VPC collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubnetCollection {
    #[serde(default)]
    pub subnets: Vec<VpcSubnet>,
    #[serde(default)]
    pub next: Option<PageLink>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VpcCollection {
    #[serde(default)]
    pub vpcs: Vec<Vpc>,
    #[serde(default)]
    pub next: Option<PageLink>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegionCollection {
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ZoneCollection {
    #[serde(default)]
    pub zones: Vec<Zone>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InstanceProfileCollection {
    #[serde(default)]
    pub profiles: Vec<InstanceProfile>,
}

// ============================================================================
// IAM, Resource Manager, Resource Controller
// ============================================================================

/// Details of the API key used for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiKeyDetails {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iam_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IamToken {
    pub access_token: String,
    /// Expiry as seconds since the epoch
    pub expiration: i64,
}

/// A resource group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceGroupCollection {
    #[serde(default)]
    pub resources: Vec<ResourceGroup>,
}

/// A service instance from the Resource Controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub crn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource_group_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceInstanceCollection {
    #[serde(default)]
    pub resources: Vec<ResourceInstance>,
    #[serde(default)]
    pub next_url: Option<String>,
}

// ============================================================================
// DNS (CIS and DNS Services)
// ============================================================================

/// A DNS zone candidate for the cluster's base domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZoneResponse {
    /// Zone name, e.g. `example.com`
    pub name: String,
    /// Zone ID within its instance
    pub id: String,
    /// GUID of the CIS or DNS Services instance
    pub instance_id: String,
    /// CRN of the CIS or DNS Services instance
    pub instance_crn: String,
    pub instance_name: String,
    pub resource_group_id: String,
}

/// A DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CisResultInfo {
    #[serde(default)]
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CisZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CisZoneCollection {
    #[serde(default)]
    pub result: Vec<CisZone>,
    #[serde(default)]
    pub result_info: Option<CisResultInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CisDnsRecordCollection {
    #[serde(default)]
    pub result: Vec<DnsRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DnsServicesZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DnsServicesZoneCollection {
    #[serde(default)]
    pub dnszones: Vec<DnsServicesZone>,
}

/// A network permitted to resolve a DNS Services zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermittedNetwork {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub network_type: Option<String>,
    #[serde(default)]
    pub permitted_network: Option<PermittedNetworkVpc>,
    #[serde(default)]
    pub state: Option<String>,
}

/// VPC identity of a permitted network.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermittedNetworkVpc {
    #[serde(default)]
    pub vpc_crn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PermittedNetworkCollection {
    #[serde(default)]
    pub permitted_networks: Vec<PermittedNetwork>,
}

// ============================================================================
// Key Protect / Hyper Protect
// ============================================================================

/// A root key as described by Key Protect or Hyper Protect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncryptionKeyResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub crn: Option<String>,
    /// 1 = active; anything else means the key cannot be used
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub deleted: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EncryptionKeyCollection {
    #[serde(default)]
    pub resources: Vec<EncryptionKeyResponse>,
}
