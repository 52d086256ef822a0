// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the IBM Cloud installer.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Cluster API Constants
// ============================================================================

/// Fully qualified API version of the IBM Cloud infrastructure resources
pub const CAPI_INFRASTRUCTURE_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1beta2";

/// Kind name for `IBMVPCMachine` resource
pub const KIND_IBM_VPC_MACHINE: &str = "IBMVPCMachine";

/// Namespace the installer renders all Cluster API guest objects into
pub const CAPI_GUESTS_NAMESPACE: &str = "openshift-cluster-api-guests";

// ============================================================================
// Manifest File Names
// ============================================================================

/// File name of the rendered `IBMVPCCluster` manifest
pub const CLUSTER_MANIFEST_FILENAME: &str = "01_ibmcloud-cluster.yaml";

/// File name prefix of rendered `IBMVPCMachine` manifests
pub const INFRA_MACHINE_FILENAME_PREFIX: &str = "10_inframachine_";

/// File name prefix of rendered Cluster API `Machine` manifests
pub const MACHINE_FILENAME_PREFIX: &str = "10_machine_";

// ============================================================================
// OpenShift Port Constants
// ============================================================================

/// SSH port
pub const SSH_PORT: u16 = 22;

/// Kubernetes API server port
pub const KUBE_API_PORT: u16 = 6443;

/// Machine Config Server port
pub const MACHINE_CONFIG_PORT: u16 = 22623;

/// Kubelet port
pub const KUBELET_PORT: u16 = 10250;

/// VXLAN overlay port
pub const VXLAN_PORT: u16 = 4789;

/// Geneve overlay port
pub const GENEVE_PORT: u16 = 6081;

/// IKE port used by IPsec
pub const IKE_PORT: u16 = 500;

/// IKE NAT-T port used by IPsec
pub const IKE_NAT_T_PORT: u16 = 4500;

/// First port of the internal OpenShift service range
pub const INTERNAL_SERVICES_PORT_MIN: u16 = 9000;

/// Last port of the internal OpenShift service range
pub const INTERNAL_SERVICES_PORT_MAX: u16 = 9999;

/// First Kubernetes `NodePort`
pub const NODE_PORT_MIN: u16 = 30000;

/// Last Kubernetes `NodePort`
pub const NODE_PORT_MAX: u16 = 32767;

/// First etcd port (client)
pub const ETCD_PORT_MIN: u16 = 2379;

/// Last etcd port (peer)
pub const ETCD_PORT_MAX: u16 = 2380;

/// First control plane component port (kube-controller-manager)
pub const CONTROL_PLANE_COMPONENT_PORT_MIN: u16 = 10257;

/// Last control plane component port (kube-scheduler)
pub const CONTROL_PLANE_COMPONENT_PORT_MAX: u16 = 10259;

// ============================================================================
// Load Balancer Health Check Constants
// ============================================================================

/// Seconds between backend pool health checks
pub const HEALTH_MONITOR_DELAY_SECS: i64 = 60;

/// Failed health checks before a member is marked unhealthy
pub const HEALTH_MONITOR_RETRIES: i64 = 5;

/// Seconds before a single health check times out
pub const HEALTH_MONITOR_TIMEOUT_SECS: i64 = 30;

/// URL path probed by the Kubernetes API health monitor
pub const KUBE_API_HEALTH_PATH: &str = "/readyz";

// ============================================================================
// Resource Naming Suffixes
// ============================================================================

/// Suffix of the cluster-wide security group
pub const SG_CLUSTER_WIDE_SUFFIX: &str = "sg-cluster-wide";

/// Suffix of the OpenShift network security group
pub const SG_OPENSHIFT_NET_SUFFIX: &str = "sg-openshift-net";

/// Suffix of the Kubernetes API load balancer security group
pub const SG_KUBE_API_LB_SUFFIX: &str = "sg-kube-api-lb";

/// Suffix of the control plane security group
pub const SG_CONTROL_PLANE_SUFFIX: &str = "sg-control-plane";

/// Suffix of the control plane internal (etcd) security group
pub const SG_CONTROL_PLANE_INTERNAL_SUFFIX: &str = "sg-cp-internal";

/// Suffix of the private Kubernetes API load balancer
pub const LB_PRIVATE_SUFFIX: &str = "kubernetes-api-private";

/// Suffix of the public Kubernetes API load balancer
pub const LB_PUBLIC_SUFFIX: &str = "kubernetes-api-public";

/// Suffix of the Kubernetes API backend pool
pub const POOL_KUBE_API_SUFFIX: &str = "kubernetes-api";

/// Suffix of the Machine Config Server backend pool
pub const POOL_MACHINE_CONFIG_SUFFIX: &str = "machine-config";

// ============================================================================
// Machine Defaults
// ============================================================================

/// Default VSI profile for control plane and bootstrap machines
pub const DEFAULT_INSTANCE_TYPE: &str = "bx2-4x16";

/// Default boot volume size in GiB
pub const DEFAULT_BOOT_VOLUME_SIZE_GIB: i64 = 100;

/// Default number of control plane replicas
pub const DEFAULT_CONTROL_PLANE_REPLICAS: i64 = 3;

// ============================================================================
// IBM Cloud Catalog Service IDs
// ============================================================================

/// Cloud Internet Services catalog service ID
pub const CIS_SERVICE_ID: &str = "75874a60-cb12-11e7-948e-37ac098eb1b9";

/// DNS Services catalog service ID
pub const DNS_SERVICE_ID: &str = "b4ed8a30-936f-11e9-b289-1d079699cbe5";

/// CRN service name of Hyper Protect Crypto Services
pub const HYPER_PROTECT_CRN_SERVICE_NAME: &str = "hs-crypto";

/// CRN service name of Key Protect
pub const KEY_PROTECT_CRN_SERVICE_NAME: &str = "kms";

// ============================================================================
// IBM Cloud Endpoint Constants
// ============================================================================

/// Default IAM endpoint
pub const IAM_DEFAULT_URL: &str = "https://iam.cloud.ibm.com";

/// Path of the IAM token service below the IAM endpoint
pub const IAM_TOKEN_PATH: &str = "identity/token";

/// Grant type used to exchange an API key for a bearer token
pub const IAM_APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Default Resource Controller endpoint
pub const RESOURCE_CONTROLLER_DEFAULT_URL: &str = "https://resource-controller.cloud.ibm.com";

/// Default Resource Manager endpoint
pub const RESOURCE_MANAGER_DEFAULT_URL: &str = "https://resource-controller.cloud.ibm.com";

/// Header carrying the API key when asking IAM to describe it
pub const IAM_APIKEY_HEADER: &str = "IAM-ApiKey";

/// Header naming the Key Protect / Hyper Protect instance of a key request
pub const KEY_INSTANCE_HEADER: &str = "bluemix-instance";

/// Default VPC endpoint, used to discover regional endpoints
pub const VPC_DEFAULT_URL: &str = "https://us-south.iaas.cloud.ibm.com/v1";

/// Path appended to a regional VPC endpoint
pub const VPC_API_PATH: &str = "v1";

/// Default Cloud Internet Services endpoint
pub const CIS_DEFAULT_URL: &str = "https://api.cis.cloud.ibm.com";

/// Default DNS Services endpoint
pub const DNS_SERVICES_DEFAULT_URL: &str = "https://api.dns-svcs.cloud.ibm.com/v1";

/// Key Protect endpoint template, `{region}` is substituted
pub const KEY_PROTECT_URL_TEMPLATE: &str = "https://{region}.kms.cloud.ibm.com";

/// Hyper Protect endpoint template, `{region}` is substituted
pub const HYPER_PROTECT_URL_TEMPLATE: &str = "https://api.{region}.hs-crypto.cloud.ibm.com";

/// VPC API version date sent with every VPC request
pub const VPC_API_VERSION: &str = "2024-04-30";

/// VPC API generation sent with every VPC request
pub const VPC_API_GENERATION: &str = "2";

/// Page size requested from paginated VPC collections
pub const VPC_PAGE_LIMIT: u32 = 100;

// ============================================================================
// HTTP Client Constants
// ============================================================================

/// Per-request timeout applied by the HTTP client (matches the one minute
/// deadline of each cloud call)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Refresh the IAM token when it expires within this many seconds
pub const IAM_TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

// ============================================================================
// DNS Constants
// ============================================================================

/// TTL of DNS Services records created for the cluster API endpoints
pub const DNS_SERVICES_RECORD_TTL_SECS: i64 = 60;

/// Record type of the cluster API endpoint records
pub const DNS_RECORD_TYPE_CNAME: &str = "CNAME";

/// CIS zone status considered usable
pub const CIS_ZONE_STATUS_ACTIVE: &str = "active";

/// DNS Services zone state considered usable
pub const DNS_ZONE_STATE_ACTIVE: &str = "active";

/// DNS Services zone state of a zone still waiting for a permitted network
pub const DNS_ZONE_STATE_PENDING_NETWORK_ADD: &str = "pending_network_add";

/// Key Protect / Hyper Protect state of an active key
pub const ENCRYPTION_KEY_STATE_ACTIVE: i64 = 1;
