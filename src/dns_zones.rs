// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS zone and DNS instance resolution.
//!
//! The base domain is matched against zone names with exact string equality.
//! A base domain of `cluster.example.com` does not match a zone named
//! `example.com`; zones are expected to be registered at the exact name.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::Api;
use crate::errors::ResolveError;
use crate::install_config::PublishingStrategy;
use crate::metadata::Metadata;
use crate::responses::DnsZoneResponse;

/// DNS Services instance managing the cluster's private zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DnsInstance {
    /// Instance GUID
    pub id: String,
    /// Instance CRN
    pub crn: String,
}

/// CIS instance CRN of the zone named exactly `base_domain`.
///
/// # Errors
///
/// Returns [`ResolveError::CisZoneNotFound`] when no zone matches.
pub fn find_cis_instance_crn(
    zones: &[DnsZoneResponse],
    base_domain: &str,
) -> Result<String, ResolveError> {
    zones
        .iter()
        .find(|z| z.name == base_domain)
        .map(|z| z.instance_crn.clone())
        .ok_or_else(|| ResolveError::CisZoneNotFound {
            domain: base_domain.to_string(),
        })
}

/// DNS Services instance of the zone named exactly `base_domain`.
///
/// # Errors
///
/// - [`ResolveError::DnsZoneNotFound`] when no zone matches
/// - [`ResolveError::UnknownDnsInstance`] when the match lacks its instance ID or CRN
pub fn find_dns_instance(
    zones: &[DnsZoneResponse],
    base_domain: &str,
) -> Result<DnsInstance, ResolveError> {
    let zone = zones
        .iter()
        .find(|z| z.name == base_domain)
        .ok_or_else(|| ResolveError::DnsZoneNotFound {
            domain: base_domain.to_string(),
        })?;

    if zone.instance_id.is_empty() || zone.instance_crn.is_empty() {
        return Err(ResolveError::UnknownDnsInstance {
            id: zone.instance_id.clone(),
            crn: zone.instance_crn.clone(),
        });
    }

    Ok(DnsInstance {
        id: zone.instance_id.clone(),
        crn: zone.instance_crn.clone(),
    })
}

/// Hostnames the cluster API records point at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiDnsTargets {
    /// Hostname of the public load balancer; required for External publishing
    pub public: Option<String>,
    /// Hostname of the private load balancer
    pub private: String,
}

/// `api.<cluster>.<baseDomain>`
#[must_use]
pub fn api_record_name(cluster_name: &str, base_domain: &str) -> String {
    format!("api.{cluster_name}.{base_domain}")
}

/// `api-int.<cluster>.<baseDomain>`
#[must_use]
pub fn api_int_record_name(cluster_name: &str, base_domain: &str) -> String {
    format!("api-int.{cluster_name}.{base_domain}")
}

/// Create the `api` and `api-int` CNAME records of a cluster.
///
/// External publishing writes both records into the CIS zone of the base
/// domain, `api` pointing at the public load balancer. Internal publishing
/// writes both into the DNS Services zone, pointing at the private one.
///
/// # Errors
///
/// Returns an error if the zone or instance cannot be resolved, if External
/// publishing has no public target, or if creating a record fails.
pub async fn create_api_dns_records(
    api: &dyn Api,
    metadata: &Metadata,
    cluster_name: &str,
    targets: &ApiDnsTargets,
) -> Result<(), ResolveError> {
    let base_domain = metadata.base_domain();
    let publish = metadata.publish_strategy();
    let api_name = api_record_name(cluster_name, base_domain);
    let api_int_name = api_int_record_name(cluster_name, base_domain);
    let zone_id = api.get_dns_zone_id_by_name(base_domain, publish).await?;

    match publish {
        PublishingStrategy::External => {
            let public = targets.public.as_deref().ok_or_else(|| {
                ResolveError::Missing(
                    "a public load balancer hostname is required for External publishing"
                        .to_string(),
                )
            })?;
            let crn = metadata.cis_instance_crn().await?;
            api.create_cis_dns_record(&crn, &zone_id, &api_name, public)
                .await?;
            api.create_cis_dns_record(&crn, &zone_id, &api_int_name, &targets.private)
                .await?;
        }
        PublishingStrategy::Internal => {
            let instance = metadata.dns_instance().await?;
            api.create_dns_services_dns_record(&instance.id, &zone_id, &api_name, &targets.private)
                .await?;
            api.create_dns_services_dns_record(
                &instance.id,
                &zone_id,
                &api_int_name,
                &targets.private,
            )
            .await?;
        }
    }

    info!(
        cluster = %cluster_name,
        publish = %publish,
        zone_id = %zone_id,
        "Created cluster API DNS records"
    );
    Ok(())
}
