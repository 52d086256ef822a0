// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IBM Cloud API client.
//!
//! Every cloud call the installer makes goes through the [`Api`] trait. The
//! [`Client`] type implements it over the IBM Cloud REST services:
//!
//! - [`http`] - request execution, IAM token handling, service endpoints
//! - [`vpc`] - regions, zones, VPCs, subnets, instance profiles
//! - [`dns`] - CIS and DNS Services zones and records
//! - [`resources`] - resource groups, service instances, API key details
//! - [`keys`] - Key Protect and Hyper Protect root keys
//!
//! Credentials and endpoint overrides are passed in through [`ClientConfig`];
//! nothing in this module reads the environment.

pub mod dns;
pub mod http;
pub mod keys;
pub mod resources;
pub mod vpc;

#[cfg(test)]
mod http_tests;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::errors::ApiError;
use crate::install_config::{PublishingStrategy, ServiceEndpoint};
use crate::responses::{
    ApiKeyDetails, DnsRecord, DnsZoneResponse, EncryptionKeyResponse, InstanceProfile,
    ResourceGroup, ResourceInstance, Vpc, VpcSubnet,
};

pub use http::Endpoints;

/// Operations the installer performs against IBM Cloud.
///
/// Region-scoped operations take the region explicitly. Lookups report a
/// missing resource as [`ApiError::NotFound`] so callers can tell it apart
/// from any other failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Api: Send + Sync {
    /// Describe the API key the client authenticates with.
    async fn get_authenticator_api_key_details(&self) -> Result<ApiKeyDetails, ApiError>;

    /// Fetch a CIS instance by CRN.
    async fn get_cis_instance(&self, crn: &str) -> Result<ResourceInstance, ApiError>;

    /// Fetch a DNS Services instance by CRN.
    async fn get_dns_instance(&self, crn: &str) -> Result<ResourceInstance, ApiError>;

    /// VPC CRNs permitted to resolve a DNS Services zone.
    async fn get_dns_instance_permitted_networks(
        &self,
        dns_id: &str,
        dns_zone: &str,
    ) -> Result<Vec<String>, ApiError>;

    /// Records with an exact name in a CIS zone.
    async fn get_dns_records_by_name(
        &self,
        crn: &str,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<DnsRecord>, ApiError>;

    /// ID of the zone named `name` for a publishing strategy.
    async fn get_dns_zone_id_by_name(
        &self,
        name: &str,
        publish: PublishingStrategy,
    ) -> Result<String, ApiError>;

    /// Every usable DNS zone for a publishing strategy.
    ///
    /// External publishing lists CIS zones, Internal lists DNS Services zones.
    async fn get_dns_zones(
        &self,
        publish: PublishingStrategy,
    ) -> Result<Vec<DnsZoneResponse>, ApiError>;

    /// Fetch a Key Protect or Hyper Protect root key by CRN.
    async fn get_encryption_key(&self, key_crn: &str) -> Result<EncryptionKeyResponse, ApiError>;

    /// Find a resource group by name or ID.
    async fn get_resource_group(&self, name_or_id: &str) -> Result<ResourceGroup, ApiError>;

    /// Every resource group of the account.
    async fn get_resource_groups(&self) -> Result<Vec<ResourceGroup>, ApiError>;

    /// Fetch a subnet by ID.
    async fn get_subnet(&self, region: &str, id: &str) -> Result<VpcSubnet, ApiError>;

    /// Find a subnet by name.
    async fn get_subnet_by_name(&self, name: &str, region: &str) -> Result<VpcSubnet, ApiError>;

    /// Virtual server instance profiles offered in a region.
    async fn get_vsi_profiles(&self, region: &str) -> Result<Vec<InstanceProfile>, ApiError>;

    /// Fetch a VPC by ID, searching every region.
    async fn get_vpc(&self, vpc_id: &str) -> Result<Vpc, ApiError>;

    /// Every VPC in a region.
    async fn get_vpcs(&self, region: &str) -> Result<Vec<Vpc>, ApiError>;

    /// Find a VPC by name, searching every region.
    async fn get_vpc_by_name(&self, name: &str) -> Result<Vpc, ApiError>;

    /// Zone names of a region.
    async fn get_vpc_zones_for_region(&self, region: &str) -> Result<Vec<String>, ApiError>;

    /// Create a CNAME record in a CIS zone.
    async fn create_cis_dns_record(
        &self,
        crn: &str,
        zone_id: &str,
        record_name: &str,
        target: &str,
    ) -> Result<(), ApiError>;

    /// Create a CNAME record in a DNS Services zone.
    async fn create_dns_services_dns_record(
        &self,
        instance_id: &str,
        zone_id: &str,
        record_name: &str,
        target: &str,
    ) -> Result<(), ApiError>;
}

/// Explicit configuration for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// IBM Cloud API key
    pub api_key: String,
    /// Service endpoint overrides from the install-config
    pub service_endpoints: Vec<ServiceEndpoint>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with default endpoints and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            service_endpoints: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override service endpoints.
    #[must_use]
    pub fn with_service_endpoints(mut self, endpoints: Vec<ServiceEndpoint>) -> Self {
        self.service_endpoints = endpoints;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`Api`] implementation over the IBM Cloud REST services.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    endpoints: Endpoints,
    token: Mutex<Option<http::BearerToken>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if an endpoint override is not a valid
    /// URL, or [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let endpoints = Endpoints::from_overrides(&config.service_endpoints)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_key: config.api_key,
            endpoints,
            token: Mutex::new(None),
        })
    }

    /// Endpoints this client talks to.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl Api for Client {
    async fn get_authenticator_api_key_details(&self) -> Result<ApiKeyDetails, ApiError> {
        resources::get_api_key_details(self).await
    }

    async fn get_cis_instance(&self, crn: &str) -> Result<ResourceInstance, ApiError> {
        resources::get_resource_instance(self, crn).await
    }

    async fn get_dns_instance(&self, crn: &str) -> Result<ResourceInstance, ApiError> {
        resources::get_resource_instance(self, crn).await
    }

    async fn get_dns_instance_permitted_networks(
        &self,
        dns_id: &str,
        dns_zone: &str,
    ) -> Result<Vec<String>, ApiError> {
        dns::list_permitted_networks(self, dns_id, dns_zone).await
    }

    async fn get_dns_records_by_name(
        &self,
        crn: &str,
        zone_id: &str,
        record_name: &str,
    ) -> Result<Vec<DnsRecord>, ApiError> {
        dns::list_cis_records_by_name(self, crn, zone_id, record_name).await
    }

    async fn get_dns_zone_id_by_name(
        &self,
        name: &str,
        publish: PublishingStrategy,
    ) -> Result<String, ApiError> {
        dns::find_zone_id_by_name(self, name, publish).await
    }

    async fn get_dns_zones(
        &self,
        publish: PublishingStrategy,
    ) -> Result<Vec<DnsZoneResponse>, ApiError> {
        dns::list_zones(self, publish).await
    }

    async fn get_encryption_key(&self, key_crn: &str) -> Result<EncryptionKeyResponse, ApiError> {
        keys::get_encryption_key(self, key_crn).await
    }

    async fn get_resource_group(&self, name_or_id: &str) -> Result<ResourceGroup, ApiError> {
        resources::find_resource_group(self, name_or_id).await
    }

    async fn get_resource_groups(&self) -> Result<Vec<ResourceGroup>, ApiError> {
        resources::list_resource_groups(self).await
    }

    async fn get_subnet(&self, region: &str, id: &str) -> Result<VpcSubnet, ApiError> {
        vpc::get_subnet(self, region, id).await
    }

    async fn get_subnet_by_name(&self, name: &str, region: &str) -> Result<VpcSubnet, ApiError> {
        vpc::find_subnet_by_name(self, name, region).await
    }

    async fn get_vsi_profiles(&self, region: &str) -> Result<Vec<InstanceProfile>, ApiError> {
        vpc::list_instance_profiles(self, region).await
    }

    async fn get_vpc(&self, vpc_id: &str) -> Result<Vpc, ApiError> {
        vpc::find_vpc_by_id(self, vpc_id).await
    }

    async fn get_vpcs(&self, region: &str) -> Result<Vec<Vpc>, ApiError> {
        vpc::list_vpcs(self, region).await
    }

    async fn get_vpc_by_name(&self, name: &str) -> Result<Vpc, ApiError> {
        vpc::find_vpc_by_name(self, name).await
    }

    async fn get_vpc_zones_for_region(&self, region: &str) -> Result<Vec<String>, ApiError> {
        vpc::list_zone_names(self, region).await
    }

    async fn create_cis_dns_record(
        &self,
        crn: &str,
        zone_id: &str,
        record_name: &str,
        target: &str,
    ) -> Result<(), ApiError> {
        dns::create_cis_cname(self, crn, zone_id, record_name, target).await
    }

    async fn create_dns_services_dns_record(
        &self,
        instance_id: &str,
        zone_id: &str,
        record_name: &str,
        target: &str,
    ) -> Result<(), ApiError> {
        dns::create_dns_services_cname(self, instance_id, zone_id, record_name, target).await
    }
}
