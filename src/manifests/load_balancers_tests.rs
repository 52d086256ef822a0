// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::install_config::PublishingStrategy;
    use crate::manifests::load_balancers::*;
    use crate::manifests::types::{HealthMonitorType, PoolAlgorithm};

    fn build(publish: PublishingStrategy) -> Vec<crate::manifests::types::VPCLoadBalancerSpec> {
        build_load_balancers(
            "infra",
            publish,
            &["infra-sg-kube-api-lb".to_string()],
            &["cp-1".to_string(), "cp-2".to_string()],
        )
    }

    #[test]
    fn test_internal_has_only_private() {
        let lbs = build(PublishingStrategy::Internal);
        assert_eq!(lbs.len(), 1);
        assert_eq!(lbs[0].name, "infra-kubernetes-api-private");
        assert!(!lbs[0].public);
    }

    #[test]
    fn test_external_adds_public_after_private() {
        let lbs = build(PublishingStrategy::External);
        assert_eq!(lbs.len(), 2);
        assert_eq!(lbs[0].name, "infra-kubernetes-api-private");
        assert!(!lbs[0].public);
        assert_eq!(lbs[1].name, "infra-kubernetes-api-public");
        assert!(lbs[1].public);
    }

    #[test]
    fn test_private_listeners_and_pools() {
        let private = &build(PublishingStrategy::Internal)[0];

        let listeners: Vec<(u16, &str)> = private
            .additional_listeners
            .iter()
            .map(|l| (l.port, l.default_pool_name.as_str()))
            .collect();
        assert_eq!(
            listeners,
            vec![(6443, "infra-kubernetes-api"), (22623, "infra-machine-config")]
        );

        let api_pool = &private.backend_pools[0];
        assert_eq!(api_pool.name, "infra-kubernetes-api");
        assert_eq!(api_pool.algorithm, PoolAlgorithm::RoundRobin);
        assert_eq!(api_pool.health_monitor.monitor_type, HealthMonitorType::Https);
        assert_eq!(api_pool.health_monitor.url_path.as_deref(), Some("/readyz"));

        let mcs_pool = &private.backend_pools[1];
        assert_eq!(mcs_pool.name, "infra-machine-config");
        assert_eq!(mcs_pool.health_monitor.monitor_type, HealthMonitorType::Tcp);
        assert!(mcs_pool.health_monitor.url_path.is_none());

        for pool in &private.backend_pools {
            assert_eq!(pool.health_monitor.delay, 60);
            assert_eq!(pool.health_monitor.retries, 5);
            assert_eq!(pool.health_monitor.timeout, 30);
        }
    }

    #[test]
    fn test_public_serves_api_only() {
        let public = &build(PublishingStrategy::External)[1];
        assert_eq!(public.additional_listeners.len(), 1);
        assert_eq!(public.additional_listeners[0].port, 6443);
        assert_eq!(public.backend_pools.len(), 1);
        assert_eq!(
            public.backend_pools[0].health_monitor.monitor_type,
            HealthMonitorType::Https
        );
    }

    #[test]
    fn test_references_by_name() {
        for lb in build(PublishingStrategy::External) {
            assert_eq!(lb.security_groups[0].name.as_deref(), Some("infra-sg-kube-api-lb"));
            let subnets: Vec<_> = lb.subnets.iter().filter_map(|s| s.name.clone()).collect();
            assert_eq!(subnets, vec!["cp-1", "cp-2"]);
            assert!(lb.subnets.iter().all(|s| s.id.is_none()));
        }
    }

    #[test]
    fn test_serialized_pool_shape() {
        let json = serde_json::to_value(&build(PublishingStrategy::Internal)[0]).unwrap();
        assert_eq!(json["backendPools"][0]["algorithm"], "round_robin");
        assert_eq!(json["backendPools"][0]["healthMonitor"]["type"], "https");
        assert_eq!(json["backendPools"][0]["healthMonitor"]["urlPath"], "/readyz");
        assert_eq!(json["additionalListeners"][1]["defaultPoolName"], "infra-machine-config");
    }
}
