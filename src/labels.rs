// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants used on rendered Cluster API objects.
//!
//! This module defines the standard Kubernetes labels and the Cluster API and
//! installer labels so every rendered manifest is labelled consistently.

use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/managed-by` on every object this installer renders
pub const MANAGED_BY_INSTALLER: &str = "ibmcloud-installer";

// ============================================================================
// Cluster API Labels
// ============================================================================

/// Label naming the Cluster API cluster an object belongs to
pub const CAPI_CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

/// Label marking a control plane machine; the value is empty
pub const CAPI_CONTROL_PLANE_LABEL: &str = "cluster.x-k8s.io/control-plane";

// ============================================================================
// Installer Labels
// ============================================================================

/// Label marking the bootstrap machine; the value is empty
pub const BOOTSTRAP_MACHINE_LABEL: &str = "install.openshift.io/bootstrap";

/// Labels shared by every object of a cluster.
#[must_use]
pub fn cluster_labels(infra_id: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (CAPI_CLUSTER_NAME_LABEL.to_string(), infra_id.to_string()),
        (K8S_MANAGED_BY.to_string(), MANAGED_BY_INSTALLER.to_string()),
    ])
}
