// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Install-config validation against IBM Cloud.
//!
//! Every check records its failures as [`FieldError`]s and moves on; the
//! caller receives all problems at once in an [`AggregateError`]. Cloud
//! lookups that return [`ApiError::NotFound`] become `Not found` errors, any
//! other failure becomes an `Internal error` at the same path.
//!
//! # Checks
//!
//! - resource groups named by `resourceGroupName` / `networkResourceGroupName` exist
//! - a pre-existing `vpc` exists in the region and its network resource group
//! - every configured subnet exists, belongs to that VPC and resource group,
//!   and sits in a zone of the region
//! - the zones covered by the subnets match each machine pool's zones
//! - machine pool instance types, zones and boot volume encryption keys

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::Api;
use crate::constants::ENCRYPTION_KEY_STATE_ACTIVE;
use crate::dns_zones::api_record_name;
use crate::errors::ApiError;
use crate::field::{to_aggregate, AggregateError, ErrorList, FieldError, FieldPath};
use crate::install_config::{
    InstallConfig, MachinePlatform, PublishingStrategy, ServiceEndpoint,
    SUPPORTED_SERVICE_ENDPOINT_NAMES,
};
use crate::metadata::Metadata;
use crate::responses::{ResourceGroup, ResourceReference, Vpc, VpcSubnet};

/// Failure of the pre-existing public DNS check.
#[derive(Debug, Error)]
pub enum PublicDnsError {
    /// The API record already exists in the CIS zone
    #[error("record {record} already exists in CIS zone ({zone_id}) and might be in use by another cluster, please remove it to continue")]
    RecordExists { record: String, zone_id: String },

    /// The check could not run
    #[error(transparent)]
    Field(#[from] AggregateError),
}

/// Values fetched once per validation pass.
struct Lookups<'a> {
    api: &'a dyn Api,
    region: &'a str,
    zones: Option<Vec<String>>,
    resource_groups: Option<Vec<ResourceGroup>>,
}

impl<'a> Lookups<'a> {
    fn new(api: &'a dyn Api, region: &'a str) -> Self {
        Self {
            api,
            region,
            zones: None,
            resource_groups: None,
        }
    }

    async fn region_zones(&mut self) -> Result<Vec<String>, ApiError> {
        if let Some(zones) = &self.zones {
            return Ok(zones.clone());
        }
        let zones = self.api.get_vpc_zones_for_region(self.region).await?;
        self.zones = Some(zones.clone());
        Ok(zones)
    }

    async fn resource_groups(&mut self) -> Result<Vec<ResourceGroup>, ApiError> {
        if let Some(groups) = &self.resource_groups {
            return Ok(groups.clone());
        }
        let groups = self.api.get_resource_groups().await?;
        self.resource_groups = Some(groups.clone());
        Ok(groups)
    }
}

/// Validate the IBM Cloud parts of an install-config.
///
/// # Errors
///
/// Returns an [`AggregateError`] holding every problem found.
pub async fn validate(api: &dyn Api, config: &InstallConfig) -> Result<(), AggregateError> {
    let platform = config.ibmcloud();
    let mut lookups = Lookups::new(api, &platform.region);
    let mut errors = ErrorList::new();

    info!(
        cluster = %config.cluster_name(),
        region = %platform.region,
        "Validating IBM Cloud install-config"
    );

    validate_platform(&mut lookups, config, &mut errors).await;

    if let Some(pool) = config.control_plane.as_ref().and_then(|p| p.ibmcloud()) {
        let path = FieldPath::new("controlPlane").child("platform").child("ibmcloud");
        validate_machine_pool(&mut lookups, pool, &path, &mut errors).await;
    }
    for (i, pool) in config.compute.iter().enumerate() {
        if let Some(machine) = pool.ibmcloud() {
            let path = FieldPath::new("compute")
                .index(i)
                .child("platform")
                .child("ibmcloud");
            validate_machine_pool(&mut lookups, machine, &path, &mut errors).await;
        }
    }

    if errors.is_empty() {
        debug!("IBM Cloud install-config is valid");
    } else {
        warn!(count = errors.len(), "IBM Cloud install-config has errors");
    }
    to_aggregate(errors)
}

async fn validate_platform(
    lookups: &mut Lookups<'_>,
    config: &InstallConfig,
    errors: &mut ErrorList,
) {
    let platform = config.ibmcloud();
    let path = FieldPath::new("platform").child("ibmcloud");

    if let Some(name) = platform.resource_group_name.as_deref().filter(|n| !n.is_empty()) {
        validate_resource_group(lookups, name, &path.child("resourceGroupName"), errors).await;
    }

    if !platform.uses_existing_vpc() {
        return;
    }
    let Some(vpc_name) = platform.vpc.as_deref() else {
        return;
    };
    validate_existing_vpc(lookups, config, vpc_name, &path, errors).await;
}

async fn validate_resource_group(
    lookups: &mut Lookups<'_>,
    name: &str,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    match lookups.resource_groups().await {
        Ok(groups) => {
            if !groups.iter().any(|g| g.name == name || g.id == name) {
                errors.push(FieldError::not_found(path, name));
            }
        }
        Err(e) => errors.push(FieldError::internal(path, e)),
    }
}

async fn validate_existing_vpc(
    lookups: &mut Lookups<'_>,
    config: &InstallConfig,
    vpc_name: &str,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    let platform = config.ibmcloud();

    let Some(network_rg) = platform
        .network_resource_group_name
        .as_deref()
        .filter(|n| !n.is_empty())
    else {
        errors.push(FieldError::invalid(
            &path.child("networkResourceGroupName"),
            "",
            format!("networkResourceGroupName cannot be empty when providing a vpc: {vpc_name}"),
        ));
        return;
    };

    validate_resource_group(lookups, network_rg, &path.child("networkResourceGroupName"), errors)
        .await;

    let vpc_path = path.child("vpc");
    let vpc = match find_vpc(lookups, vpc_name).await {
        Ok(vpc) => vpc,
        Err(e) if e.is_not_found() => {
            errors.push(FieldError::not_found(&vpc_path, vpc_name));
            return;
        }
        Err(e) => {
            errors.push(FieldError::internal(&vpc_path, e));
            return;
        }
    };

    if !in_resource_group(vpc.resource_group.as_ref(), network_rg) {
        errors.push(FieldError::invalid(
            &vpc_path,
            vpc_name,
            format!("vpc is not in provided Network ResourceGroup: {network_rg}"),
        ));
    }

    let vpc_id = vpc.id.clone().unwrap_or_default();
    let zones = match lookups.region_zones().await {
        Ok(zones) => Some(zones),
        Err(e) => {
            errors.push(FieldError::internal(&path.child("region"), e));
            None
        }
    };

    let control_plane_path = path.child("controlPlaneSubnets");
    if platform.control_plane_subnets.is_empty() {
        errors.push(FieldError::invalid(
            &control_plane_path,
            Vec::<String>::new(),
            format!("controlPlaneSubnets cannot be empty when providing a vpc: {vpc_name}"),
        ));
    } else {
        let check = SubnetCheck {
            field: "controlPlaneSubnets",
            region: &platform.region,
            path: &control_plane_path,
            vpc_id: &vpc_id,
            network_rg,
            region_zones: zones.as_deref(),
        };
        if let Some(covered) = check.run(lookups, &platform.control_plane_subnets, errors).await {
            let pool_zones = config
                .control_plane
                .as_ref()
                .and_then(|p| p.ibmcloud())
                .map(|p| p.zones.clone())
                .unwrap_or_default();
            check_zone_coverage(
                &check,
                &platform.control_plane_subnets,
                covered,
                &pool_zones,
                zones.as_deref(),
                "control plane",
                errors,
            );
        }
    }

    let compute_path = path.child("computeSubnets");
    if platform.compute_subnets.is_empty() {
        errors.push(FieldError::invalid(
            &compute_path,
            Vec::<String>::new(),
            format!("computeSubnets cannot be empty when providing a vpc: {vpc_name}"),
        ));
    } else {
        let check = SubnetCheck {
            field: "computeSubnets",
            region: &platform.region,
            path: &compute_path,
            vpc_id: &vpc_id,
            network_rg,
            region_zones: zones.as_deref(),
        };
        if let Some(covered) = check.run(lookups, &platform.compute_subnets, errors).await {
            for (i, pool) in config.compute.iter().enumerate() {
                let pool_zones = pool.ibmcloud().map(|p| p.zones.clone()).unwrap_or_default();
                check_zone_coverage(
                    &check,
                    &platform.compute_subnets,
                    covered,
                    &pool_zones,
                    zones.as_deref(),
                    &format!("compute[{i}]"),
                    errors,
                );
            }
        }
    }
}

async fn find_vpc(lookups: &mut Lookups<'_>, name: &str) -> Result<Vpc, ApiError> {
    let vpcs = lookups.api.get_vpcs(lookups.region).await?;
    vpcs.into_iter()
        .find(|v| v.name.as_deref() == Some(name))
        .ok_or(ApiError::NotFound)
}

fn in_resource_group(group: Option<&ResourceReference>, name_or_id: &str) -> bool {
    group.is_some_and(|g| {
        g.id.as_deref() == Some(name_or_id) || g.name.as_deref() == Some(name_or_id)
    })
}

/// Checks applied to each subnet of one subnet list.
struct SubnetCheck<'a> {
    field: &'a str,
    region: &'a str,
    path: &'a FieldPath,
    vpc_id: &'a str,
    network_rg: &'a str,
    region_zones: Option<&'a [String]>,
}

impl SubnetCheck<'_> {
    /// Validate every subnet, returning the number of distinct zones they
    /// cover when all of them could be fetched.
    async fn run(
        &self,
        lookups: &mut Lookups<'_>,
        names: &[String],
        errors: &mut ErrorList,
    ) -> Option<usize> {
        let mut zones = BTreeSet::new();
        let mut complete = true;

        for name in names {
            let subnet = match lookups.api.get_subnet_by_name(name, lookups.region).await {
                Ok(subnet) => subnet,
                Err(e) if e.is_not_found() => {
                    errors.push(FieldError::not_found(self.path, name.as_str()));
                    complete = false;
                    continue;
                }
                Err(e) => {
                    errors.push(FieldError::internal(self.path, e));
                    complete = false;
                    continue;
                }
            };
            self.check_subnet(name, &subnet, errors);
            if let Some(zone) = subnet.zone.and_then(|z| z.name) {
                zones.insert(zone);
            }
        }

        complete.then_some(zones.len())
    }

    fn check_subnet(&self, name: &str, subnet: &VpcSubnet, errors: &mut ErrorList) {
        let field = self.field;

        let subnet_vpc = subnet.vpc.as_ref().and_then(|v| v.id.as_deref());
        if subnet_vpc != Some(self.vpc_id) {
            errors.push(FieldError::invalid(
                self.path,
                name,
                format!(
                    "{field} contains subnet: {name}, not found in expected vpcID: {}",
                    self.vpc_id
                ),
            ));
        }

        if !in_resource_group(subnet.resource_group.as_ref(), self.network_rg) {
            errors.push(FieldError::invalid(
                self.path,
                name,
                format!(
                    "{field} contains subnet: {name}, not found in expected networkResourceGroupName: {}",
                    self.network_rg
                ),
            ));
        }

        if let (Some(region_zones), Some(zone)) = (
            self.region_zones,
            subnet.zone.as_ref().and_then(|z| z.name.as_deref()),
        ) {
            if !region_zones.iter().any(|z| z == zone) {
                errors.push(FieldError::invalid(
                    self.path,
                    name,
                    format!(
                        "{field} contains subnet: {name}, with zone: {zone} not found in region: {}",
                        self.region
                    ),
                ));
            }
        }
    }
}

fn check_zone_coverage(
    check: &SubnetCheck<'_>,
    names: &[String],
    covered: usize,
    pool_zones: &[String],
    region_zones: Option<&[String]>,
    pool: &str,
    errors: &mut ErrorList,
) {
    let expected = if pool_zones.is_empty() {
        match region_zones {
            Some(zones) => zones.len(),
            None => return,
        }
    } else {
        pool_zones.len()
    };

    if covered != expected {
        errors.push(FieldError::invalid(
            check.path,
            names.to_vec(),
            format!(
                "number of zones ({covered}) covered by {} does not match number of provided or default zones ({expected}) for {pool} in {}",
                check.field, check.region
            ),
        ));
    }
}

async fn validate_machine_pool(
    lookups: &mut Lookups<'_>,
    pool: &MachinePlatform,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    if let Some(instance_type) = pool.instance_type.as_deref().filter(|t| !t.is_empty()) {
        let type_path = path.child("type");
        match lookups.api.get_vsi_profiles(lookups.region).await {
            Ok(profiles) => {
                if !profiles.iter().any(|p| p.name == instance_type) {
                    errors.push(FieldError::not_found(&type_path, instance_type));
                }
            }
            Err(e) => errors.push(FieldError::internal(&type_path, e)),
        }
    }

    if !pool.zones.is_empty() {
        match lookups.region_zones().await {
            Ok(region_zones) => {
                let supported: Vec<&str> = region_zones.iter().map(String::as_str).collect();
                for (i, zone) in pool.zones.iter().enumerate() {
                    if !region_zones.contains(zone) {
                        errors.push(FieldError::not_supported(
                            &path.child("zones").index(i),
                            zone.as_str(),
                            &supported,
                        ));
                    }
                }
            }
            Err(e) => errors.push(FieldError::internal(&path.child("zones"), e)),
        }
    }

    if let Some(key) = pool
        .boot_volume
        .as_ref()
        .and_then(|b| b.encryption_key.as_deref())
        .filter(|k| !k.is_empty())
    {
        let key_path = path.child("bootVolume").child("encryptionKey");
        validate_encryption_key(lookups.api, key, &key_path, errors).await;
    }
}

async fn validate_encryption_key(
    api: &dyn Api,
    key_crn: &str,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    let key = match api.get_encryption_key(key_crn).await {
        Ok(key) => key,
        Err(e) if e.is_not_found() => {
            errors.push(FieldError::not_found(path, key_crn));
            return;
        }
        Err(e) => {
            errors.push(FieldError::internal(path, e));
            return;
        }
    };

    let found_crn = key.crn.unwrap_or_default();
    if found_crn != key_crn {
        errors.push(FieldError::invalid(
            path,
            key_crn,
            format!("key CRN does not match: {found_crn}"),
        ));
    } else if key.state != ENCRYPTION_KEY_STATE_ACTIVE {
        errors.push(FieldError::invalid(path, key_crn, "key is disabled"));
    } else if key.deleted == Some(true) {
        errors.push(FieldError::invalid(path, key_crn, "key has been deleted"));
    }
}

/// Ensure the cluster's public API record does not exist yet.
///
/// Only External publishing is checked.
///
/// # Errors
///
/// Returns [`PublicDnsError::RecordExists`] if the record is present, or a
/// field error at `baseDomain` if the zone or its records cannot be read.
pub async fn validate_pre_existing_public_dns(
    api: &dyn Api,
    config: &InstallConfig,
    metadata: &Metadata,
) -> Result<(), PublicDnsError> {
    if config.publish != PublishingStrategy::External {
        return Ok(());
    }

    let path = FieldPath::new("baseDomain");
    let internal = |e: &dyn std::fmt::Display| AggregateError(vec![FieldError::internal(&path, e)]);

    let record = api_record_name(config.cluster_name(), &config.base_domain);
    let zone_id = api
        .get_dns_zone_id_by_name(&config.base_domain, PublishingStrategy::External)
        .await
        .map_err(|e| internal(&e))?;
    let crn = metadata.cis_instance_crn().await.map_err(|e| internal(&e))?;
    let records = api
        .get_dns_records_by_name(&crn, &zone_id, &record)
        .await
        .map_err(|e| internal(&e))?;

    if records.is_empty() {
        debug!(record = %record, "No pre-existing public DNS record");
        return Ok(());
    }
    Err(PublicDnsError::RecordExists { record, zone_id })
}

/// Validate `platform.ibmcloud.serviceEndpoints`.
///
/// Each override must name a supported service at most once and carry an
/// absolute http(s) URL.
///
/// # Errors
///
/// Returns an [`AggregateError`] holding every invalid entry.
pub fn validate_service_endpoints(endpoints: &[ServiceEndpoint]) -> Result<(), AggregateError> {
    let path = FieldPath::new("platform")
        .child("ibmcloud")
        .child("serviceEndpoints");
    let mut errors = ErrorList::new();
    let mut seen = BTreeSet::new();

    for (i, endpoint) in endpoints.iter().enumerate() {
        let entry = path.index(i);
        let name_path = entry.child("name");

        if !SUPPORTED_SERVICE_ENDPOINT_NAMES.contains(&endpoint.name.as_str()) {
            errors.push(FieldError::invalid(
                &name_path,
                endpoint.name.as_str(),
                "not a supported override service",
            ));
        } else if !seen.insert(endpoint.name.as_str()) {
            errors.push(FieldError::duplicate(&name_path, endpoint.name.as_str()));
        }

        if let Err(reason) = check_endpoint_url(&endpoint.url) {
            errors.push(FieldError::invalid(
                &entry.child("url"),
                endpoint.url.as_str(),
                reason,
            ));
        }
    }

    to_aggregate(errors)
}

fn check_endpoint_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported protocol scheme {:?}", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
