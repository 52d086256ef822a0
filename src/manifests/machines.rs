// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bootstrap and control plane machines.
//!
//! Each machine is described by two objects: an `IBMVPCMachine` holding the
//! virtual server settings and a Cluster API `Machine` pointing at it.

use k8s_openapi::api::core::v1::ObjectReference;
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::{
    CAPI_GUESTS_NAMESPACE, CAPI_INFRASTRUCTURE_API_VERSION, DEFAULT_BOOT_VOLUME_SIZE_GIB,
    DEFAULT_CONTROL_PLANE_REPLICAS, DEFAULT_INSTANCE_TYPE, KIND_IBM_VPC_MACHINE,
    SG_CLUSTER_WIDE_SUFFIX, SG_CONTROL_PLANE_INTERNAL_SUFFIX, SG_CONTROL_PLANE_SUFFIX,
    SG_OPENSHIFT_NET_SUFFIX,
};
use crate::labels::{cluster_labels, BOOTSTRAP_MACHINE_LABEL, CAPI_CONTROL_PLANE_LABEL};
use crate::manifests::cluster::{control_plane_subnet_name, image_name};
use crate::manifests::security_groups::security_group_name;
use crate::manifests::types::{
    IBMVPCMachine, IBMVPCMachineSpec, Machine, MachineBootstrap, MachineSpec, NetworkInterface,
    VPCResource, VPCVolume,
};
use crate::manifests::{ManifestError, ManifestInput};

/// The two objects describing one machine.
#[derive(Clone, Debug)]
pub struct MachineManifests {
    pub infra_machine: IBMVPCMachine,
    pub machine: Machine,
}

impl MachineManifests {
    /// Machine name shared by both objects.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.infra_machine.spec.name
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Bootstrap,
    Master,
}

/// Build the bootstrap machine followed by the control plane machines.
///
/// Masters are spread round-robin across the control plane zones; the
/// bootstrap machine lands in the first zone.
///
/// # Errors
///
/// Returns [`ManifestError::NoZones`] when no control plane zone is known.
pub fn build_control_plane_machines(
    input: &ManifestInput<'_>,
) -> Result<Vec<MachineManifests>, ManifestError> {
    let infra_id = input.infra_id;
    let zones = input.control_plane_zones()?;
    let replicas = input
        .install_config
        .control_plane
        .as_ref()
        .and_then(|pool| pool.replicas)
        .unwrap_or(DEFAULT_CONTROL_PLANE_REPLICAS);

    debug!(
        infra_id = %infra_id,
        replicas = replicas,
        zones = ?zones,
        "Building control plane machines"
    );

    let subnets_by_zone: BTreeMap<&str, &str> = input
        .control_plane_subnets
        .iter()
        .rev()
        .map(|s| (s.zone.as_str(), s.name.as_str()))
        .collect();

    let mut machines = Vec::new();
    machines.push(build_machine(
        input,
        &format!("{infra_id}-bootstrap"),
        &zones[0],
        &subnets_by_zone,
        Role::Bootstrap,
    ));
    for (index, zone) in (0..replicas).zip(zones.iter().cycle()) {
        machines.push(build_machine(
            input,
            &format!("{infra_id}-master-{index}"),
            zone,
            &subnets_by_zone,
            Role::Master,
        ));
    }
    Ok(machines)
}

fn build_machine(
    input: &ManifestInput<'_>,
    name: &str,
    zone: &str,
    subnets_by_zone: &BTreeMap<&str, &str>,
    role: Role,
) -> MachineManifests {
    let infra_id = input.infra_id;
    let pool = input
        .install_config
        .control_plane
        .as_ref()
        .and_then(|pool| pool.ibmcloud());

    let profile = pool
        .and_then(|p| p.instance_type.clone())
        .unwrap_or_else(|| DEFAULT_INSTANCE_TYPE.to_string());
    let encryption_key_crn = pool
        .and_then(|p| p.boot_volume.as_ref())
        .and_then(|b| b.encryption_key.clone())
        .filter(|k| !k.is_empty());
    let subnet = subnets_by_zone
        .get(zone)
        .map_or_else(|| control_plane_subnet_name(infra_id, zone), |s| (*s).to_string());

    let security_groups = [
        SG_CLUSTER_WIDE_SUFFIX,
        SG_OPENSHIFT_NET_SUFFIX,
        SG_CONTROL_PLANE_SUFFIX,
        SG_CONTROL_PLANE_INTERNAL_SUFFIX,
    ]
    .iter()
    .map(|suffix| VPCResource::named(security_group_name(infra_id, suffix)))
    .collect();

    let mut labels = cluster_labels(infra_id);
    let data_secret_name = match role {
        Role::Bootstrap => {
            labels.insert(BOOTSTRAP_MACHINE_LABEL.to_string(), String::new());
            format!("{infra_id}-bootstrap")
        }
        Role::Master => {
            labels.insert(CAPI_CONTROL_PLANE_LABEL.to_string(), String::new());
            format!("{infra_id}-master")
        }
    };

    let mut infra_machine = IBMVPCMachine::new(
        name,
        IBMVPCMachineSpec {
            name: name.to_string(),
            zone: zone.to_string(),
            profile,
            image: VPCResource::named(image_name(infra_id)),
            boot_volume: VPCVolume {
                delete_volume_on_instance_delete: true,
                size_gib: DEFAULT_BOOT_VOLUME_SIZE_GIB,
                encryption_key_crn,
            },
            primary_network_interface: NetworkInterface {
                subnet,
                security_groups,
            },
        },
    );
    infra_machine.metadata.namespace = Some(CAPI_GUESTS_NAMESPACE.to_string());
    infra_machine.metadata.labels = Some(labels.clone());

    let mut machine = Machine::new(
        name,
        MachineSpec {
            cluster_name: infra_id.to_string(),
            bootstrap: MachineBootstrap { data_secret_name },
            infrastructure_ref: ObjectReference {
                api_version: Some(CAPI_INFRASTRUCTURE_API_VERSION.to_string()),
                kind: Some(KIND_IBM_VPC_MACHINE.to_string()),
                name: Some(name.to_string()),
                namespace: Some(CAPI_GUESTS_NAMESPACE.to_string()),
                ..Default::default()
            },
            failure_domain: Some(zone.to_string()),
        },
    );
    machine.metadata.namespace = Some(CAPI_GUESTS_NAMESPACE.to_string());
    machine.metadata.labels = Some(labels);

    MachineManifests {
        infra_machine,
        machine,
    }
}
