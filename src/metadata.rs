// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lazily resolved install-time metadata.
//!
//! [`Metadata`] is built once per install-config. Each accessor resolves its
//! value on first use and memoizes it; later calls return the memoized value
//! without touching the network. A failed resolution is not memoized, so the
//! next call tries again from scratch.
//!
//! One mutex guards every lazy field and is held across the network calls of
//! a resolution. Concurrent callers of any accessor wait for the resolution in
//! progress, which also means a value is never fetched twice.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::client::{Api, Client, ClientConfig};
use crate::dns_zones::{find_cis_instance_crn, find_dns_instance, DnsInstance};
use crate::errors::{ApiError, ResolveError};
use crate::install_config::{InstallConfig, PublishingStrategy};
use crate::subnets::{resolve_subnets, Subnet};

#[derive(Debug, Default)]
struct LazyFields {
    account_id: Option<String>,
    cis_instance_crn: Option<String>,
    dns_instance: Option<DnsInstance>,
    compute_subnets: Option<BTreeMap<String, Subnet>>,
    control_plane_subnets: Option<BTreeMap<String, Subnet>>,
}

/// Install-time metadata cache for one install-config.
pub struct Metadata {
    base_domain: String,
    region: String,
    publish_strategy: PublishingStrategy,
    compute_subnet_names: Vec<String>,
    control_plane_subnet_names: Vec<String>,
    client_config: Option<ClientConfig>,
    client: OnceCell<Arc<dyn Api>>,
    fields: Mutex<LazyFields>,
}

impl std::fmt::Debug for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metadata")
            .field("base_domain", &self.base_domain)
            .field("region", &self.region)
            .field("publish_strategy", &self.publish_strategy)
            .finish_non_exhaustive()
    }
}

impl Metadata {
    /// Metadata for an install-config, with no client configured yet.
    #[must_use]
    pub fn new(config: &InstallConfig) -> Self {
        let platform = config.ibmcloud();
        Self {
            base_domain: config.base_domain.clone(),
            region: platform.region.clone(),
            publish_strategy: config.publish,
            compute_subnet_names: platform.compute_subnets.clone(),
            control_plane_subnet_names: platform.control_plane_subnets.clone(),
            client_config: None,
            client: OnceCell::new(),
            fields: Mutex::new(LazyFields::default()),
        }
    }

    /// Build the real client from this configuration on first use.
    #[must_use]
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = Some(config);
        self
    }

    /// Use an already constructed client.
    #[must_use]
    pub fn with_client(self, client: Arc<dyn Api>) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
            ..self
        }
    }

    #[must_use]
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn publish_strategy(&self) -> PublishingStrategy {
        self.publish_strategy
    }

    /// The cloud API client, constructed once and shared afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if no client was injected and no configuration was
    /// given, or if the client cannot be built.
    pub async fn client(&self) -> Result<Arc<dyn Api>, ResolveError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let config = self.client_config.clone().ok_or_else(|| {
                    ResolveError::Missing("no IBM Cloud client configuration".to_string())
                })?;
                debug!("Creating IBM Cloud API client");
                let client: Arc<dyn Api> = Arc::new(Client::new(config)?);
                Ok::<_, ResolveError>(client)
            })
            .await?;
        Ok(Arc::clone(client))
    }

    /// Account owning the API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be described or carries no account.
    pub async fn account_id(&self) -> Result<String, ResolveError> {
        let mut fields = self.fields.lock().await;
        if let Some(account_id) = &fields.account_id {
            return Ok(account_id.clone());
        }

        let client = self.client().await?;
        let details = client.get_authenticator_api_key_details().await?;
        let account_id = details
            .account_id
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::malformed("api key", "details", "account_id"))?;

        debug!(account_id = %account_id, "Resolved account ID");
        fields.account_id = Some(account_id.clone());
        Ok(account_id)
    }

    /// CRN of the CIS instance managing the base domain.
    ///
    /// Only resolved for External publishing; otherwise the value set with
    /// [`Metadata::set_cis_instance_crn`] (or an empty string) is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if zones cannot be listed or none matches the base domain.
    pub async fn cis_instance_crn(&self) -> Result<String, ResolveError> {
        let mut fields = self.fields.lock().await;
        if let Some(crn) = &fields.cis_instance_crn {
            return Ok(crn.clone());
        }
        if self.publish_strategy != PublishingStrategy::External {
            return Ok(String::new());
        }

        let client = self.client().await?;
        let zones = client.get_dns_zones(PublishingStrategy::External).await?;
        let crn = find_cis_instance_crn(&zones, &self.base_domain)?;

        debug!(base_domain = %self.base_domain, crn = %crn, "Resolved CIS instance");
        fields.cis_instance_crn = Some(crn.clone());
        Ok(crn)
    }

    /// Record a CIS instance CRN determined elsewhere.
    pub async fn set_cis_instance_crn(&self, crn: impl Into<String>) {
        self.fields.lock().await.cis_instance_crn = Some(crn.into());
    }

    /// DNS Services instance managing the base domain.
    ///
    /// Only resolved for Internal publishing; otherwise an empty instance is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if zones cannot be listed, none matches the base domain,
    /// or the match lacks its instance ID or CRN.
    pub async fn dns_instance(&self) -> Result<DnsInstance, ResolveError> {
        let mut fields = self.fields.lock().await;
        if let Some(instance) = &fields.dns_instance {
            return Ok(instance.clone());
        }
        if self.publish_strategy != PublishingStrategy::Internal {
            return Ok(DnsInstance::default());
        }

        let client = self.client().await?;
        let zones = client.get_dns_zones(PublishingStrategy::Internal).await?;
        let instance = find_dns_instance(&zones, &self.base_domain)?;

        debug!(base_domain = %self.base_domain, id = %instance.id, "Resolved DNS Services instance");
        fields.dns_instance = Some(instance.clone());
        Ok(instance)
    }

    /// Configured compute subnets, keyed by subnet ID.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured subnet cannot be resolved.
    pub async fn compute_subnets(&self) -> Result<BTreeMap<String, Subnet>, ResolveError> {
        let mut fields = self.fields.lock().await;
        if let Some(subnets) = &fields.compute_subnets {
            return Ok(subnets.clone());
        }
        if self.compute_subnet_names.is_empty() {
            return Ok(BTreeMap::new());
        }

        let client = self.client().await?;
        let subnets =
            resolve_subnets(client.as_ref(), &self.compute_subnet_names, &self.region).await?;
        fields.compute_subnets = Some(subnets.clone());
        Ok(subnets)
    }

    /// Configured control plane subnets, keyed by subnet ID.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured subnet cannot be resolved.
    pub async fn control_plane_subnets(&self) -> Result<BTreeMap<String, Subnet>, ResolveError> {
        let mut fields = self.fields.lock().await;
        if let Some(subnets) = &fields.control_plane_subnets {
            return Ok(subnets.clone());
        }
        if self.control_plane_subnet_names.is_empty() {
            return Ok(BTreeMap::new());
        }

        let client = self.client().await?;
        let subnets = resolve_subnets(
            client.as_ref(),
            &self.control_plane_subnet_names,
            &self.region,
        )
        .await?;
        fields.control_plane_subnets = Some(subnets.clone());
        Ok(subnets)
    }

    /// Whether a VPC may resolve the cluster's private DNS zone.
    ///
    /// Always `false` for External publishing.
    ///
    /// # Errors
    ///
    /// Returns an error if the DNS instance, zone, permitted networks or VPC
    /// cannot be looked up.
    pub async fn is_vpc_permitted_network(&self, vpc_name: &str) -> Result<bool, ResolveError> {
        if self.publish_strategy != PublishingStrategy::Internal {
            return Ok(false);
        }

        let instance = self.dns_instance().await?;
        let client = self.client().await?;
        let zone_id = client
            .get_dns_zone_id_by_name(&self.base_domain, self.publish_strategy)
            .await?;
        let networks = client
            .get_dns_instance_permitted_networks(&instance.id, &zone_id)
            .await?;
        if networks.is_empty() {
            return Ok(false);
        }

        let vpc = client.get_vpc_by_name(vpc_name).await?;
        let Some(vpc_crn) = vpc.crn else {
            return Err(ApiError::malformed("vpc", vpc_name, "crn").into());
        };
        Ok(networks.iter().any(|n| *n == vpc_crn))
    }
}
