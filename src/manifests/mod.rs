// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster API manifests for IBM Cloud.
//!
//! # Files
//!
//! | File | Content |
//! |------|---------|
//! | `01_ibmcloud-cluster.yaml` | The `IBMVPCCluster` |
//! | `10_inframachine_<name>.yaml` | One `IBMVPCMachine` per machine |
//! | `10_machine_<name>.yaml` | One `Machine` per machine |
//!
//! Derivation is pure; only [`write_all`] touches the filesystem.

pub mod cluster;
pub mod load_balancers;
pub mod machines;
pub mod security_groups;
pub mod types;

#[cfg(test)]
mod cluster_tests;
#[cfg(test)]
mod load_balancers_tests;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::constants::{
    CLUSTER_MANIFEST_FILENAME, INFRA_MACHINE_FILENAME_PREFIX, MACHINE_FILENAME_PREFIX,
};
use crate::install_config::InstallConfig;
use crate::subnets::Subnet;

pub use cluster::build_cluster;
pub use load_balancers::build_load_balancers;
pub use machines::{build_control_plane_machines, MachineManifests};
pub use security_groups::build_security_groups;

/// Errors raised while generating or writing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No zone to place machines or subnets in
    #[error("no zones available for {pool} in region {region}")]
    NoZones { pool: String, region: String },

    #[error("failed to serialize manifest {filename}: {source}")]
    Yaml {
        filename: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything manifest generation needs.
#[derive(Clone, Debug)]
pub struct ManifestInput<'a> {
    /// Infrastructure ID prefixing every cloud resource
    pub infra_id: &'a str,
    pub install_config: &'a InstallConfig,
    /// Zones of the region, used when a pool names none
    pub region_zones: Vec<String>,
    /// Resolved control plane subnets of an existing VPC
    pub control_plane_subnets: Vec<Subnet>,
    /// Resolved compute subnets of an existing VPC
    pub compute_subnets: Vec<Subnet>,
}

impl<'a> ManifestInput<'a> {
    /// Input for a cluster whose subnets are created by the installer.
    #[must_use]
    pub fn new(infra_id: &'a str, install_config: &'a InstallConfig, region_zones: Vec<String>) -> Self {
        Self {
            infra_id,
            install_config,
            region_zones,
            control_plane_subnets: Vec::new(),
            compute_subnets: Vec::new(),
        }
    }

    /// Use resolved subnets of an existing VPC.
    #[must_use]
    pub fn with_subnets(mut self, control_plane: Vec<Subnet>, compute: Vec<Subnet>) -> Self {
        self.control_plane_subnets = control_plane;
        self.compute_subnets = compute;
        self
    }

    /// Zones of the control plane pool, or the region zones.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NoZones`] when the result would be empty.
    pub fn control_plane_zones(&self) -> Result<Vec<String>, ManifestError> {
        let zones = self
            .install_config
            .control_plane
            .as_ref()
            .and_then(|pool| pool.ibmcloud())
            .map(|p| p.zones.clone())
            .filter(|zones| !zones.is_empty())
            .unwrap_or_else(|| self.region_zones.clone());
        self.non_empty(zones, "controlPlane")
    }

    /// Union of the compute pool zones in first-seen order, or the region zones.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NoZones`] when the result would be empty.
    pub fn compute_zones(&self) -> Result<Vec<String>, ManifestError> {
        let mut zones: Vec<String> = Vec::new();
        for zone in self
            .install_config
            .compute
            .iter()
            .filter_map(|pool| pool.ibmcloud())
            .flat_map(|p| p.zones.iter())
        {
            if !zones.contains(zone) {
                zones.push(zone.clone());
            }
        }
        if zones.is_empty() {
            zones.clone_from(&self.region_zones);
        }
        self.non_empty(zones, "compute")
    }

    fn non_empty(&self, zones: Vec<String>, pool: &str) -> Result<Vec<String>, ManifestError> {
        if zones.is_empty() {
            return Err(ManifestError::NoZones {
                pool: pool.to_string(),
                region: self.install_config.ibmcloud().region.clone(),
            });
        }
        Ok(zones)
    }
}

/// A rendered manifest file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestFile {
    pub filename: String,
    pub contents: String,
}

fn to_file<T: serde::Serialize>(filename: String, object: &T) -> Result<ManifestFile, ManifestError> {
    let contents = serde_yaml::to_string(object).map_err(|source| ManifestError::Yaml {
        filename: filename.clone(),
        source,
    })?;
    Ok(ManifestFile { filename, contents })
}

/// Generate every manifest file of a cluster.
///
/// The cluster file comes first, followed by the `IBMVPCMachine` and
/// `Machine` files of each machine.
///
/// # Errors
///
/// Returns an error if no zone is known or an object fails to serialize.
pub fn render(input: &ManifestInput<'_>) -> Result<Vec<ManifestFile>, ManifestError> {
    let cluster = build_cluster(input)?;
    let machines = build_control_plane_machines(input)?;

    let mut files = Vec::with_capacity(1 + machines.len() * 2);
    files.push(to_file(CLUSTER_MANIFEST_FILENAME.to_string(), &cluster)?);
    for machine in &machines {
        files.push(to_file(
            format!("{INFRA_MACHINE_FILENAME_PREFIX}{}.yaml", machine.name()),
            &machine.infra_machine,
        )?);
    }
    for machine in &machines {
        files.push(to_file(
            format!("{MACHINE_FILENAME_PREFIX}{}.yaml", machine.name()),
            &machine.machine,
        )?);
    }
    Ok(files)
}

/// Write manifest files into a directory, creating it if needed.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] naming the path that could not be written.
pub async fn write_all(dir: &Path, files: &[ManifestFile]) -> Result<(), ManifestError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ManifestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    for file in files {
        let path = dir.join(&file.filename);
        tokio::fs::write(&path, &file.contents)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "Wrote manifest");
    }
    Ok(())
}
