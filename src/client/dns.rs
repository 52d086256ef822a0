// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CIS and DNS Services calls.
//!
//! External clusters publish into Cloud Internet Services (CIS) zones, internal
//! clusters into DNS Services zones. Zones are discovered by listing every
//! service instance of the matching catalog service visible to the account.

use serde_json::json;
use tracing::debug;

use super::http::endpoint_url;
use super::resources::list_resource_instances;
use super::Client;
use crate::constants::{
    CIS_SERVICE_ID, CIS_ZONE_STATUS_ACTIVE, DNS_RECORD_TYPE_CNAME, DNS_SERVICES_RECORD_TTL_SECS,
    DNS_SERVICE_ID, DNS_ZONE_STATE_ACTIVE, DNS_ZONE_STATE_PENDING_NETWORK_ADD,
};
use crate::errors::ApiError;
use crate::install_config::PublishingStrategy;
use crate::responses::{
    CisDnsRecordCollection, CisZoneCollection, DnsRecord, DnsServicesZoneCollection,
    DnsZoneResponse, PermittedNetworkCollection, ResourceInstance,
};

const CIS_API_PATH: &str = "v1";
const CIS_PAGE_SIZE: u32 = 50;

/// Whether a CIS zone status makes the zone usable.
#[must_use]
pub fn is_usable_cis_zone(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case(CIS_ZONE_STATUS_ACTIVE))
}

/// Whether a DNS Services zone state makes the zone usable.
#[must_use]
pub fn is_usable_dns_services_zone(state: Option<&str>) -> bool {
    state.is_some_and(|s| {
        s.eq_ignore_ascii_case(DNS_ZONE_STATE_ACTIVE)
            || s.eq_ignore_ascii_case(DNS_ZONE_STATE_PENDING_NETWORK_ADD)
    })
}

fn zone_response(instance: &ResourceInstance, id: String, name: String) -> DnsZoneResponse {
    DnsZoneResponse {
        name,
        id,
        instance_id: instance.guid.clone().unwrap_or_default(),
        instance_crn: instance.crn.clone().unwrap_or_default(),
        instance_name: instance.name.clone().unwrap_or_default(),
        resource_group_id: instance.resource_group_id.clone().unwrap_or_default(),
    }
}

pub(crate) async fn list_zones(
    client: &Client,
    publish: PublishingStrategy,
) -> Result<Vec<DnsZoneResponse>, ApiError> {
    match publish {
        PublishingStrategy::External => list_cis_zones(client).await,
        PublishingStrategy::Internal => list_dns_services_zones(client).await,
    }
}

async fn list_cis_zones(client: &Client) -> Result<Vec<DnsZoneResponse>, ApiError> {
    let mut zones = Vec::new();
    for instance in list_resource_instances(client, CIS_SERVICE_ID).await? {
        let Some(crn) = instance.crn.as_deref() else {
            debug!(instance = ?instance.name, "Skipping CIS instance without CRN");
            continue;
        };

        let mut page = 1;
        loop {
            let mut url = endpoint_url(&client.endpoints.cis, &[CIS_API_PATH, crn, "zones"])?;
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &CIS_PAGE_SIZE.to_string());
            let collection: CisZoneCollection = client.get_json(url, &[]).await?;

            for zone in collection.result {
                if is_usable_cis_zone(zone.status.as_deref()) {
                    zones.push(zone_response(&instance, zone.id, zone.name));
                }
            }

            let total_pages = collection.result_info.map_or(1, |info| info.total_pages);
            if page >= total_pages {
                break;
            }
            page += 1;
        }
    }
    Ok(zones)
}

async fn list_dns_services_zones(client: &Client) -> Result<Vec<DnsZoneResponse>, ApiError> {
    let mut zones = Vec::new();
    for instance in list_resource_instances(client, DNS_SERVICE_ID).await? {
        let Some(guid) = instance.guid.as_deref() else {
            debug!(instance = ?instance.name, "Skipping DNS Services instance without GUID");
            continue;
        };

        let url = endpoint_url(&client.endpoints.dns_services, &["instances", guid, "dnszones"])?;
        let collection: DnsServicesZoneCollection = client.get_json(url, &[]).await?;
        for zone in collection.dnszones {
            if is_usable_dns_services_zone(zone.state.as_deref()) {
                zones.push(zone_response(&instance, zone.id, zone.name));
            }
        }
    }
    Ok(zones)
}

pub(crate) async fn find_zone_id_by_name(
    client: &Client,
    name: &str,
    publish: PublishingStrategy,
) -> Result<String, ApiError> {
    let zones = list_zones(client, publish).await?;
    zones
        .into_iter()
        .find(|z| z.name == name)
        .map(|z| z.id)
        .ok_or_else(|| {
            debug!(zone = %name, publish = %publish, "DNS zone not found");
            ApiError::NotFound
        })
}

pub(crate) async fn list_cis_records_by_name(
    client: &Client,
    crn: &str,
    zone_id: &str,
    record_name: &str,
) -> Result<Vec<DnsRecord>, ApiError> {
    let mut url = endpoint_url(
        &client.endpoints.cis,
        &[CIS_API_PATH, crn, "zones", zone_id, "dns_records"],
    )?;
    url.query_pairs_mut().append_pair("name", record_name);
    let collection: CisDnsRecordCollection = client.get_json(url, &[]).await?;
    Ok(collection.result)
}

pub(crate) async fn create_cis_cname(
    client: &Client,
    crn: &str,
    zone_id: &str,
    record_name: &str,
    target: &str,
) -> Result<(), ApiError> {
    let url = endpoint_url(
        &client.endpoints.cis,
        &[CIS_API_PATH, crn, "zones", zone_id, "dns_records"],
    )?;
    let body = json!({
        "type": DNS_RECORD_TYPE_CNAME,
        "name": record_name,
        "content": target,
    });
    client.post_json(url, &[], body).await?;
    Ok(())
}

pub(crate) async fn create_dns_services_cname(
    client: &Client,
    instance_id: &str,
    zone_id: &str,
    record_name: &str,
    target: &str,
) -> Result<(), ApiError> {
    let url = endpoint_url(
        &client.endpoints.dns_services,
        &["instances", instance_id, "dnszones", zone_id, "resource_records"],
    )?;
    let body = json!({
        "type": DNS_RECORD_TYPE_CNAME,
        "name": record_name,
        "rdata": { "cname": target },
        "ttl": DNS_SERVICES_RECORD_TTL_SECS,
    });
    client.post_json(url, &[], body).await?;
    Ok(())
}

pub(crate) async fn list_permitted_networks(
    client: &Client,
    dns_id: &str,
    dns_zone: &str,
) -> Result<Vec<String>, ApiError> {
    let url = endpoint_url(
        &client.endpoints.dns_services,
        &["instances", dns_id, "dnszones", dns_zone, "permitted_networks"],
    )?;
    let collection: PermittedNetworkCollection = client.get_json(url, &[]).await?;
    Ok(collection
        .permitted_networks
        .into_iter()
        .filter_map(|n| n.permitted_network.and_then(|p| p.vpc_crn))
        .collect())
}
