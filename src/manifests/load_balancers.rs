// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Load balancers in front of the Kubernetes API and machine-config server.

use crate::constants::{
    HEALTH_MONITOR_DELAY_SECS, HEALTH_MONITOR_RETRIES, HEALTH_MONITOR_TIMEOUT_SECS,
    KUBE_API_HEALTH_PATH, KUBE_API_PORT, LB_PRIVATE_SUFFIX, LB_PUBLIC_SUFFIX, MACHINE_CONFIG_PORT,
    POOL_KUBE_API_SUFFIX, POOL_MACHINE_CONFIG_SUFFIX,
};
use crate::install_config::PublishingStrategy;
use crate::manifests::types::{
    AdditionalListenerSpec, HealthMonitorType, ListenerProtocol, PoolAlgorithm, PoolProtocol,
    VPCLoadBalancerBackendPoolSpec, VPCLoadBalancerHealthMonitorSpec, VPCLoadBalancerSpec,
    VPCResource,
};

/// Build the cluster load balancers.
///
/// The private load balancer always comes first and serves both the API
/// (6443) and the machine-config server (22623). External publishing adds a
/// public load balancer serving the API only.
///
/// # Arguments
///
/// * `infra_id` - Infrastructure ID prefixing every name
/// * `publish` - Publishing strategy of the cluster
/// * `security_groups` - Security group names attached to both load balancers
/// * `subnets` - Subnet names the load balancers are placed in
#[must_use]
pub fn build_load_balancers(
    infra_id: &str,
    publish: PublishingStrategy,
    security_groups: &[String],
    subnets: &[String],
) -> Vec<VPCLoadBalancerSpec> {
    let security_groups: Vec<VPCResource> =
        security_groups.iter().map(VPCResource::named).collect();
    let subnets: Vec<VPCResource> = subnets.iter().map(VPCResource::named).collect();

    let kube_api_pool = format!("{infra_id}-{POOL_KUBE_API_SUFFIX}");
    let machine_config_pool = format!("{infra_id}-{POOL_MACHINE_CONFIG_SUFFIX}");

    let mut load_balancers = vec![VPCLoadBalancerSpec {
        name: format!("{infra_id}-{LB_PRIVATE_SUFFIX}"),
        public: false,
        additional_listeners: vec![
            listener(&kube_api_pool, KUBE_API_PORT),
            listener(&machine_config_pool, MACHINE_CONFIG_PORT),
        ],
        backend_pools: vec![
            kube_api_backend_pool(&kube_api_pool),
            backend_pool(&machine_config_pool, tcp_health_monitor()),
        ],
        security_groups: security_groups.clone(),
        subnets: subnets.clone(),
    }];

    if publish == PublishingStrategy::External {
        load_balancers.push(VPCLoadBalancerSpec {
            name: format!("{infra_id}-{LB_PUBLIC_SUFFIX}"),
            public: true,
            additional_listeners: vec![listener(&kube_api_pool, KUBE_API_PORT)],
            backend_pools: vec![kube_api_backend_pool(&kube_api_pool)],
            security_groups,
            subnets,
        });
    }

    load_balancers
}

fn listener(pool: &str, port: u16) -> AdditionalListenerSpec {
    AdditionalListenerSpec {
        default_pool_name: pool.to_string(),
        port,
        protocol: ListenerProtocol::Tcp,
    }
}

fn kube_api_backend_pool(name: &str) -> VPCLoadBalancerBackendPoolSpec {
    backend_pool(
        name,
        VPCLoadBalancerHealthMonitorSpec {
            delay: HEALTH_MONITOR_DELAY_SECS,
            retries: HEALTH_MONITOR_RETRIES,
            timeout: HEALTH_MONITOR_TIMEOUT_SECS,
            monitor_type: HealthMonitorType::Https,
            url_path: Some(KUBE_API_HEALTH_PATH.to_string()),
        },
    )
}

fn tcp_health_monitor() -> VPCLoadBalancerHealthMonitorSpec {
    VPCLoadBalancerHealthMonitorSpec {
        delay: HEALTH_MONITOR_DELAY_SECS,
        retries: HEALTH_MONITOR_RETRIES,
        timeout: HEALTH_MONITOR_TIMEOUT_SECS,
        monitor_type: HealthMonitorType::Tcp,
        url_path: None,
    }
}

fn backend_pool(
    name: &str,
    health_monitor: VPCLoadBalancerHealthMonitorSpec,
) -> VPCLoadBalancerBackendPoolSpec {
    VPCLoadBalancerBackendPoolSpec {
        name: name.to_string(),
        algorithm: PoolAlgorithm::RoundRobin,
        protocol: PoolProtocol::Tcp,
        health_monitor,
    }
}
