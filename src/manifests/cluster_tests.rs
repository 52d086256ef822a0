// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::install_config::InstallConfig;
    use crate::manifests::cluster::*;
    use crate::manifests::{ManifestError, ManifestInput};
    use crate::subnets::Subnet;

    fn config(extra: &str) -> InstallConfig {
        InstallConfig::from_yaml(&format!(
            r"
metadata:
  name: c1
baseDomain: example.com
platform:
  ibmcloud:
    region: us-south
{extra}"
        ))
        .unwrap()
    }

    fn zones() -> Vec<String> {
        vec!["us-south-1".to_string(), "us-south-2".to_string()]
    }

    fn subnet(name: &str, zone: &str) -> Subnet {
        Subnet {
            id: format!("id-{name}"),
            name: name.to_string(),
            cidr: "10.0.0.0/24".to_string(),
            crn: format!("crn-{name}"),
            vpc: "my-vpc".to_string(),
            zone: zone.to_string(),
        }
    }

    #[test]
    fn test_new_vpc_names_subnets_per_zone() {
        let ic = config("");
        let cluster = build_cluster(&ManifestInput::new("infra", &ic, zones())).unwrap();

        assert_eq!(cluster.metadata.name.as_deref(), Some("infra"));
        assert_eq!(
            cluster.metadata.namespace.as_deref(),
            Some("openshift-cluster-api-guests")
        );
        assert_eq!(cluster.spec.region, "us-south");
        assert_eq!(cluster.spec.resource_group, "infra");
        assert_eq!(
            cluster.spec.network.vpc.as_ref().unwrap().name.as_deref(),
            Some("infra-vpc")
        );

        let cp: Vec<&str> = cluster
            .spec
            .network
            .control_plane_subnets
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            cp,
            vec![
                "infra-subnet-control-plane-us-south-1",
                "infra-subnet-control-plane-us-south-2"
            ]
        );
        assert_eq!(
            cluster.spec.network.worker_subnets[0].name,
            "infra-subnet-compute-us-south-1"
        );
    }

    #[test]
    fn test_existing_vpc_uses_resolved_subnets() {
        let ic = config("    vpc: my-vpc\n    resourceGroupName: rg\n    networkResourceGroupName: net-rg\n");
        let input = ManifestInput::new("infra", &ic, zones()).with_subnets(
            vec![subnet("cp-a", "us-south-1")],
            vec![subnet("w-a", "us-south-1"), subnet("w-b", "us-south-2")],
        );
        let cluster = build_cluster(&input).unwrap();

        assert_eq!(cluster.spec.resource_group, "rg");
        let network = &cluster.spec.network;
        assert_eq!(network.vpc.as_ref().unwrap().name.as_deref(), Some("my-vpc"));
        assert_eq!(
            network.resource_group.as_ref().unwrap().name.as_deref(),
            Some("net-rg")
        );
        assert_eq!(network.control_plane_subnets[0].id.as_deref(), Some("id-cp-a"));
        assert_eq!(network.worker_subnets.len(), 2);
    }

    #[test]
    fn test_empty_vpc_name_creates_new_vpc() {
        let ic = config("    vpc: \"\"\n");
        let cluster = build_cluster(&ManifestInput::new("infra", &ic, zones())).unwrap();
        assert_eq!(
            cluster.spec.network.vpc.as_ref().unwrap().name.as_deref(),
            Some("infra-vpc")
        );
        assert_eq!(
            cluster.spec.network.control_plane_subnets[0].name,
            "infra-subnet-control-plane-us-south-1"
        );
    }

    #[test]
    fn test_security_groups_and_load_balancers_attached() {
        let ic = config("");
        let cluster = build_cluster(&ManifestInput::new("infra", &ic, zones())).unwrap();
        let network = &cluster.spec.network;

        assert_eq!(network.security_groups.len(), 5);
        assert_eq!(network.load_balancers.len(), 2);
        let lb_subnets: Vec<_> = network.load_balancers[0]
            .subnets
            .iter()
            .filter_map(|s| s.name.clone())
            .collect();
        assert_eq!(lb_subnets.len(), 2);
        assert!(lb_subnets.iter().all(|s| s.contains("control-plane")));
    }

    #[test]
    fn test_endpoint_and_image() {
        let ic = config("");
        let cluster = build_cluster(&ManifestInput::new("infra", &ic, zones())).unwrap();
        let endpoint = cluster.spec.control_plane_endpoint.unwrap();
        assert_eq!(endpoint.host, "api-int.c1.example.com");
        assert_eq!(endpoint.port, 6443);
        assert_eq!(cluster.spec.image.unwrap().name.as_deref(), Some("infra-rhcos"));
    }

    #[test]
    fn test_no_zones_fails() {
        let ic = config("");
        let err = build_cluster(&ManifestInput::new("infra", &ic, Vec::new())).unwrap_err();
        assert!(matches!(err, ManifestError::NoZones { .. }));
        assert_eq!(err.to_string(), "no zones available for controlPlane in region us-south");
    }

    #[test]
    fn test_serialized_type_meta() {
        let ic = config("");
        let cluster = build_cluster(&ManifestInput::new("infra", &ic, zones())).unwrap();
        let json = serde_json::to_value(&cluster).unwrap();
        assert_eq!(json["apiVersion"], "infrastructure.cluster.x-k8s.io/v1beta2");
        assert_eq!(json["kind"], "IBMVPCCluster");
        assert_eq!(json["metadata"]["labels"]["cluster.x-k8s.io/cluster-name"], "infra");
    }
}
