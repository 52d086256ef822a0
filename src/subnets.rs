// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Subnet resolution.
//!
//! Turns configured subnet names into fully populated [`Subnet`] values. A
//! subnet is only accepted when every attribute is present in the cloud
//! response; one incomplete subnet fails the whole resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::client::Api;
use crate::errors::ApiError;
use crate::responses::VpcSubnet;

/// A resolved subnet. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub cidr: String,
    pub crn: String,
    /// Name of the VPC the subnet belongs to
    pub vpc: String,
    /// Availability zone name
    pub zone: String,
}

fn required(value: Option<&String>, subnet: &str, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ApiError::malformed("subnet", subnet, field)),
    }
}

impl Subnet {
    /// Build a subnet from a cloud response.
    ///
    /// # Arguments
    ///
    /// * `requested` - The name that was looked up, used in error messages
    /// * `response` - The cloud response
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] naming the first missing field.
    pub fn from_response(requested: &str, response: &VpcSubnet) -> Result<Self, ApiError> {
        Ok(Self {
            id: required(response.id.as_ref(), requested, "id")?,
            cidr: required(response.ipv4_cidr_block.as_ref(), requested, "cidr")?,
            crn: required(response.crn.as_ref(), requested, "crn")?,
            name: required(response.name.as_ref(), requested, "name")?,
            vpc: required(
                response.vpc.as_ref().and_then(|v| v.name.as_ref()),
                requested,
                "vpc",
            )?,
            zone: required(
                response.zone.as_ref().and_then(|z| z.name.as_ref()),
                requested,
                "zone",
            )?,
        })
    }
}

/// Resolve subnet names in a region.
///
/// # Arguments
///
/// * `api` - Cloud API client
/// * `names` - Subnet names; empty yields an empty map
/// * `region` - Region the subnets live in
///
/// # Returns
///
/// A map from subnet ID to [`Subnet`].
///
/// # Errors
///
/// - [`ApiError::NotFound`] if a name does not exist
/// - [`ApiError::MalformedResponse`] if a response lacks a required field
/// - any other [`ApiError`] from the cloud call
pub async fn resolve_subnets(
    api: &dyn Api,
    names: &[String],
    region: &str,
) -> Result<BTreeMap<String, Subnet>, ApiError> {
    let mut subnets = BTreeMap::new();
    for name in names {
        let response = api.get_subnet_by_name(name, region).await?;
        let subnet = Subnet::from_response(name, &response)?;
        debug!(subnet = %subnet.name, id = %subnet.id, zone = %subnet.zone, "Resolved subnet");
        subnets.insert(subnet.id.clone(), subnet);
    }
    Ok(subnets)
}
