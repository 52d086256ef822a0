// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! VPC service calls: regions, zones, VPCs, subnets and instance profiles.
//!
//! Every VPC request carries the `version` and `generation` query parameters.
//! Region-scoped calls resolve the regional endpoint first, unless the VPC
//! endpoint was overridden, in which case the override serves every region.

use tracing::{debug, warn};
use url::Url;

use super::http::{endpoint_url, parse_endpoint};
use super::Client;
use crate::constants::{VPC_API_GENERATION, VPC_API_PATH, VPC_API_VERSION, VPC_PAGE_LIMIT};
use crate::errors::ApiError;
use crate::responses::{
    InstanceProfile, InstanceProfileCollection, Region, RegionCollection, SubnetCollection, Vpc,
    VpcCollection, VpcSubnet, ZoneCollection,
};

/// Build a VPC request URL with the mandatory query parameters.
///
/// # Errors
///
/// Returns [`ApiError::InvalidEndpoint`] if the base cannot carry a path.
pub fn vpc_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = endpoint_url(base, segments)?;
    url.query_pairs_mut()
        .append_pair("version", VPC_API_VERSION)
        .append_pair("generation", VPC_API_GENERATION);
    Ok(url)
}

/// Turn a region's advertised endpoint into the base URL of its VPC API.
///
/// # Errors
///
/// Returns [`ApiError::InvalidEndpoint`] if the endpoint is not a valid URL.
pub fn regional_vpc_base(endpoint: &str) -> Result<Url, ApiError> {
    let base = parse_endpoint(endpoint)?;
    endpoint_url(&base, &[VPC_API_PATH])
}

// Follow a `next.href` link, keeping the mandatory query parameters.
fn next_page_url(href: &str) -> Result<Url, ApiError> {
    let mut url = parse_endpoint(href)?;
    let has_version = url.query_pairs().any(|(k, _)| k == "version");
    if !has_version {
        url.query_pairs_mut()
            .append_pair("version", VPC_API_VERSION)
            .append_pair("generation", VPC_API_GENERATION);
    }
    Ok(url)
}

async fn list_regions(client: &Client) -> Result<Vec<Region>, ApiError> {
    let url = vpc_url(&client.endpoints.vpc, &["regions"])?;
    let regions: RegionCollection = client.get_json(url, &[]).await?;
    Ok(regions.regions)
}

/// Base URL serving a region's VPC API.
pub(crate) async fn endpoint_for_region(client: &Client, region: &str) -> Result<Url, ApiError> {
    if client.endpoints.vpc_override {
        return Ok(client.endpoints.vpc.clone());
    }

    let url = vpc_url(&client.endpoints.vpc, &["regions", region])?;
    let found: Region = client.get_json(url, &[]).await?;
    let endpoint = found
        .endpoint
        .ok_or_else(|| ApiError::malformed("region", region, "endpoint"))?;
    regional_vpc_base(&endpoint)
}

// Regions to search for a VPC: every region, or just the override.
async fn search_bases(client: &Client) -> Result<Vec<(String, Url)>, ApiError> {
    if client.endpoints.vpc_override {
        return Ok(vec![(String::new(), client.endpoints.vpc.clone())]);
    }

    let mut bases = Vec::new();
    for region in list_regions(client).await? {
        let Some(endpoint) = region.endpoint.as_deref() else {
            debug!(region = %region.name, "Skipping region without endpoint");
            continue;
        };
        bases.push((region.name.clone(), regional_vpc_base(endpoint)?));
    }
    Ok(bases)
}

pub(crate) async fn list_zone_names(client: &Client, region: &str) -> Result<Vec<String>, ApiError> {
    let base = endpoint_for_region(client, region).await?;
    let url = vpc_url(&base, &["regions", region, "zones"])?;
    let zones: ZoneCollection = client.get_json(url, &[]).await?;
    Ok(zones.zones.into_iter().map(|z| z.name).collect())
}

pub(crate) async fn list_instance_profiles(
    client: &Client,
    region: &str,
) -> Result<Vec<InstanceProfile>, ApiError> {
    let base = endpoint_for_region(client, region).await?;
    let url = vpc_url(&base, &["instance", "profiles"])?;
    let profiles: InstanceProfileCollection = client.get_json(url, &[]).await?;
    Ok(profiles.profiles)
}

pub(crate) async fn get_subnet(client: &Client, region: &str, id: &str) -> Result<VpcSubnet, ApiError> {
    let base = endpoint_for_region(client, region).await?;
    let url = vpc_url(&base, &["subnets", id])?;
    client.get_json(url, &[]).await
}

/// Scan every page of a region's subnets for an exact name match.
pub(crate) async fn find_subnet_by_name(
    client: &Client,
    name: &str,
    region: &str,
) -> Result<VpcSubnet, ApiError> {
    let base = endpoint_for_region(client, region).await?;
    let mut url = vpc_url(&base, &["subnets"])?;
    url.query_pairs_mut()
        .append_pair("limit", &VPC_PAGE_LIMIT.to_string());

    loop {
        let page: SubnetCollection = client.get_json(url, &[]).await?;
        if let Some(subnet) = page
            .subnets
            .into_iter()
            .find(|s| s.name.as_deref() == Some(name))
        {
            return Ok(subnet);
        }
        match page.next {
            Some(next) => url = next_page_url(&next.href)?,
            None => break,
        }
    }

    debug!(subnet = %name, region = %region, "Subnet not found");
    Err(ApiError::NotFound)
}

pub(crate) async fn list_vpcs(client: &Client, region: &str) -> Result<Vec<Vpc>, ApiError> {
    let base = endpoint_for_region(client, region).await?;
    list_vpcs_at(client, &base).await
}

async fn list_vpcs_at(client: &Client, base: &Url) -> Result<Vec<Vpc>, ApiError> {
    let mut url = vpc_url(base, &["vpcs"])?;
    url.query_pairs_mut()
        .append_pair("limit", &VPC_PAGE_LIMIT.to_string());

    let mut vpcs = Vec::new();
    loop {
        let page: VpcCollection = client.get_json(url, &[]).await?;
        vpcs.extend(page.vpcs);
        match page.next {
            Some(next) => url = next_page_url(&next.href)?,
            None => break,
        }
    }
    Ok(vpcs)
}

/// Look a VPC up by ID in every region.
///
/// A 404 from a region moves on to the next one. Other failures are logged and
/// remembered; when no region has the VPC, the last such failure is returned,
/// or [`ApiError::NotFound`] if every region answered 404.
pub(crate) async fn find_vpc_by_id(client: &Client, vpc_id: &str) -> Result<Vpc, ApiError> {
    let mut last_error = None;
    for (region, base) in search_bases(client).await? {
        let url = vpc_url(&base, &["vpcs", vpc_id])?;
        match client.get_json::<Vpc>(url, &[]).await {
            Ok(vpc) => return Ok(vpc),
            Err(ApiError::NotFound) => continue,
            Err(e) => {
                warn!(region = %region, vpc = %vpc_id, error = %e, "Failed to get VPC in region");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(ApiError::NotFound))
}

/// Look a VPC up by name in every region.
pub(crate) async fn find_vpc_by_name(client: &Client, name: &str) -> Result<Vpc, ApiError> {
    let mut last_error = None;
    for (region, base) in search_bases(client).await? {
        match list_vpcs_at(client, &base).await {
            Ok(vpcs) => {
                if let Some(vpc) = vpcs.into_iter().find(|v| v.name.as_deref() == Some(name)) {
                    return Ok(vpc);
                }
            }
            Err(e) => {
                warn!(region = %region, vpc = %name, error = %e, "Failed to list VPCs in region");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(ApiError::NotFound))
}
