// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `IBMVPCCluster` generation.

use crate::constants::{CAPI_GUESTS_NAMESPACE, KUBE_API_PORT, SG_KUBE_API_LB_SUFFIX};
use crate::dns_zones::api_int_record_name;
use crate::labels::cluster_labels;
use crate::manifests::load_balancers::build_load_balancers;
use crate::manifests::security_groups::{
    build_security_groups_for_subnet_names, security_group_name,
};
use crate::manifests::types::{
    APIEndpoint, IBMVPCCluster, IBMVPCClusterSpec, SubnetSpec, VPCNetworkSpec, VPCResource,
};
use crate::manifests::{ManifestError, ManifestInput};
use crate::subnets::Subnet;

/// Name of the RHCOS image imported for the cluster.
#[must_use]
pub fn image_name(infra_id: &str) -> String {
    format!("{infra_id}-rhcos")
}

/// Name of an installer-created control plane subnet.
#[must_use]
pub fn control_plane_subnet_name(infra_id: &str, zone: &str) -> String {
    format!("{infra_id}-subnet-control-plane-{zone}")
}

/// Name of an installer-created compute subnet.
#[must_use]
pub fn compute_subnet_name(infra_id: &str, zone: &str) -> String {
    format!("{infra_id}-subnet-compute-{zone}")
}

/// Build the `IBMVPCCluster` of a cluster.
///
/// Resolved subnets are referenced by ID and name; without them one subnet
/// per zone is named for the installer to create.
///
/// # Errors
///
/// Returns [`ManifestError::NoZones`] when neither the machine pools nor the
/// region provide a zone.
pub fn build_cluster(input: &ManifestInput<'_>) -> Result<IBMVPCCluster, ManifestError> {
    let infra_id = input.infra_id;
    let config = input.install_config;
    let platform = config.ibmcloud();

    let control_plane_subnets: Vec<SubnetSpec> = if input.control_plane_subnets.is_empty() {
        input
            .control_plane_zones()?
            .iter()
            .map(|zone| SubnetSpec {
                name: control_plane_subnet_name(infra_id, zone),
                zone: zone.clone(),
                ..Default::default()
            })
            .collect()
    } else {
        input.control_plane_subnets.iter().map(subnet_spec).collect()
    };

    let worker_subnets: Vec<SubnetSpec> = if input.compute_subnets.is_empty() {
        input
            .compute_zones()?
            .iter()
            .map(|zone| SubnetSpec {
                name: compute_subnet_name(infra_id, zone),
                zone: zone.clone(),
                ..Default::default()
            })
            .collect()
    } else {
        input.compute_subnets.iter().map(subnet_spec).collect()
    };

    let control_plane_names: Vec<String> =
        control_plane_subnets.iter().map(|s| s.name.clone()).collect();
    let all_subnet_names: Vec<String> = control_plane_subnets
        .iter()
        .chain(worker_subnets.iter())
        .map(|s| s.name.clone())
        .collect();

    let security_groups = build_security_groups_for_subnet_names(infra_id, &all_subnet_names);
    let load_balancers = build_load_balancers(
        infra_id,
        config.publish,
        &[security_group_name(infra_id, SG_KUBE_API_LB_SUFFIX)],
        &control_plane_names,
    );

    let vpc = match platform.vpc.as_deref() {
        Some(existing) if platform.uses_existing_vpc() => existing.to_string(),
        _ => format!("{infra_id}-vpc"),
    };
    let resource_group = platform
        .resource_group_name
        .clone()
        .filter(|rg| !rg.is_empty())
        .unwrap_or_else(|| infra_id.to_string());

    let spec = IBMVPCClusterSpec {
        region: platform.region.clone(),
        resource_group: resource_group.clone(),
        control_plane_endpoint: Some(APIEndpoint {
            host: api_int_record_name(config.cluster_name(), &config.base_domain),
            port: KUBE_API_PORT,
        }),
        image: Some(VPCResource::named(image_name(infra_id))),
        network: VPCNetworkSpec {
            vpc: Some(VPCResource::named(vpc)),
            resource_group: Some(VPCResource::named(
                platform
                    .network_resource_group()
                    .map_or(resource_group, str::to_string),
            )),
            control_plane_subnets,
            worker_subnets,
            security_groups,
            load_balancers,
        },
    };

    let mut cluster = IBMVPCCluster::new(infra_id, spec);
    cluster.metadata.namespace = Some(CAPI_GUESTS_NAMESPACE.to_string());
    cluster.metadata.labels = Some(cluster_labels(infra_id));
    Ok(cluster)
}

fn subnet_spec(subnet: &Subnet) -> SubnetSpec {
    SubnetSpec {
        id: Some(subnet.id.clone()),
        name: subnet.name.clone(),
        zone: subnet.zone.clone(),
        ipv4_cidr_block: Some(subnet.cidr.clone()),
    }
}
