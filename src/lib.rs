// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # ibmcloud-installer - IBM Cloud platform layer for cluster installation
//!
//! This library turns an install-config into the IBM Cloud specific pieces a
//! cluster installation needs: resolved cloud resources, validation errors and
//! Cluster API manifests.
//!
//! ## Overview
//!
//! - Resolve subnets named in the install-config to IDs, CIDRs, VPCs and zones
//! - Find the CIS or DNS Services instance that owns the base domain
//! - Validate the install-config against the account, reporting every problem
//! - Generate `IBMVPCCluster`, `IBMVPCMachine` and `Machine` manifests
//!
//! ## Modules
//!
//! - [`client`] - The [`client::Api`] trait and its REST implementation
//! - [`metadata`] - Lazily resolved, cached cloud facts for one install
//! - [`subnets`] - Subnet resolution
//! - [`dns_zones`] - DNS instance lookup and API record creation
//! - [`validation`] - Install-config validation
//! - [`manifests`] - Cluster API manifest generation
//!
//! ## Example
//!
//! ```rust,no_run
//! use ibmcloud_installer::install_config::InstallConfig;
//! use ibmcloud_installer::manifests::{render, ManifestInput};
//!
//! let config = InstallConfig::from_yaml(
//!     "metadata: {name: demo}\nbaseDomain: example.com\nplatform: {ibmcloud: {region: us-south}}\n",
//! )?;
//! let zones = vec!["us-south-1".to_string(), "us-south-2".to_string()];
//! let files = render(&ManifestInput::new("demo-x7k2p", &config, zones))?;
//! assert_eq!(files[0].filename, "01_ibmcloud-cluster.yaml");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod constants;
pub mod crn;
pub mod dns_zones;
pub mod errors;
pub mod field;
pub mod http_errors;
pub mod install_config;
pub mod labels;
pub mod manifests;
pub mod metadata;
pub mod responses;
pub mod subnets;
pub mod validation;

#[cfg(test)]
mod crn_tests;
#[cfg(test)]
mod field_tests;
