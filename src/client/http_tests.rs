// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for client endpoint handling and URL building.

#[cfg(test)]
mod tests {
    use crate::client::http::*;
    use crate::client::keys::key_service_url;
    use crate::client::resources::next_page_url;
    use crate::client::vpc::{regional_vpc_base, vpc_url};
    use crate::client::{Client, ClientConfig};
    use crate::crn::Crn;
    use crate::errors::ApiError;
    use crate::install_config::ServiceEndpoint;
    use chrono::{Duration, Utc};

    fn endpoint(name: &str, url: &str) -> ServiceEndpoint {
        ServiceEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    // ============================================================================
    // Endpoints
    // ============================================================================

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::from_overrides(&[]).unwrap();
        assert_eq!(endpoints.iam.as_str(), "https://iam.cloud.ibm.com/");
        assert_eq!(endpoints.vpc.as_str(), "https://us-south.iaas.cloud.ibm.com/v1");
        assert!(!endpoints.vpc_override);
        assert!(endpoints.key_protect.is_none());
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let endpoints = Endpoints::from_overrides(&[
            endpoint("IAM", "https://private.iam.cloud.ibm.com"),
            endpoint("VPC", "https://us-south.private.iaas.cloud.ibm.com/v1"),
            endpoint("KeyProtect", "https://private.us-south.kms.cloud.ibm.com"),
            endpoint("COS", "https://s3.direct.us-south.cloud-object-storage.appdomain.cloud"),
        ])
        .unwrap();
        assert_eq!(endpoints.iam.host_str(), Some("private.iam.cloud.ibm.com"));
        assert!(endpoints.vpc_override);
        assert_eq!(
            endpoints.key_protect.as_ref().and_then(|u| u.host_str()),
            Some("private.us-south.kms.cloud.ibm.com")
        );
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let err = Endpoints::from_overrides(&[endpoint("IAM", "not a url")]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidEndpoint { .. }));

        let err = Endpoints::from_overrides(&[endpoint("IAM", "ftp://iam.example.com")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_all_at_points_everything_at_one_server() {
        let endpoints = Endpoints::all_at("http://127.0.0.1:9999").unwrap();
        assert_eq!(endpoints.cis.as_str(), "http://127.0.0.1:9999/");
        assert_eq!(endpoints.dns_services.as_str(), "http://127.0.0.1:9999/");
        assert!(endpoints.vpc_override);
        assert!(endpoints.hyper_protect.is_some());
    }

    #[test]
    fn test_client_rejects_invalid_endpoint() {
        let config = ClientConfig::new("key").with_service_endpoints(vec![endpoint("CIS", "::")]);
        assert!(Client::new(config).is_err());
    }

    // ============================================================================
    // URL building
    // ============================================================================

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let base = parse_endpoint("https://api.cis.cloud.ibm.com").unwrap();
        let url = endpoint_url(&base, &["v1", "crn:v1:bluemix:public:internet-svcs:global:a/1:x::", "zones"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cis.cloud.ibm.com/v1/crn:v1:bluemix:public:internet-svcs:global:a%2F1:x::/zones"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let base = parse_endpoint("https://api.dns-svcs.cloud.ibm.com/v1").unwrap();
        let url = endpoint_url(&base, &["instances", "abc", "dnszones"]).unwrap();
        assert_eq!(url.path(), "/v1/instances/abc/dnszones");
    }

    #[test]
    fn test_vpc_url_adds_version_and_generation() {
        let base = parse_endpoint("https://us-south.iaas.cloud.ibm.com/v1").unwrap();
        let url = vpc_url(&base, &["subnets"]).unwrap();
        assert_eq!(url.path(), "/v1/subnets");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.iter().any(|(k, _)| k == "version"));
        assert!(query.contains(&("generation".to_string(), "2".to_string())));
    }

    #[test]
    fn test_regional_vpc_base() {
        let url = regional_vpc_base("https://eu-de.iaas.cloud.ibm.com").unwrap();
        assert_eq!(url.as_str(), "https://eu-de.iaas.cloud.ibm.com/v1");
    }

    // ============================================================================
    // Key service selection
    // ============================================================================

    #[test]
    fn test_key_protect_url_from_region() {
        let crn = Crn::parse("crn:v1:bluemix:public:kms:eu-gb:a/1:inst:key:k").unwrap();
        let url = key_service_url(&crn, None, None).unwrap();
        assert_eq!(url.host_str(), Some("eu-gb.kms.cloud.ibm.com"));
    }

    #[test]
    fn test_hyper_protect_url_from_region() {
        let crn = Crn::parse("crn:v1:bluemix:public:hs-crypto:us-east:a/1:inst:key:k").unwrap();
        let url = key_service_url(&crn, None, None).unwrap();
        assert_eq!(url.host_str(), Some("api.us-east.hs-crypto.cloud.ibm.com"));
    }

    #[test]
    fn test_key_service_override_wins() {
        let crn = Crn::parse("crn:v1:bluemix:public:kms:eu-gb:a/1:inst:key:k").unwrap();
        let over = parse_endpoint("https://private.eu-gb.kms.cloud.ibm.com").unwrap();
        let url = key_service_url(&crn, Some(&over), None).unwrap();
        assert_eq!(url, over);
    }

    #[test]
    fn test_unknown_key_service() {
        let crn = Crn::parse("crn:v1:bluemix:public:cloud-object-storage:global:a/1:inst:key:k").unwrap();
        let err = key_service_url(&crn, None, None).unwrap_err();
        assert!(matches!(err, ApiError::UnknownKeyService { .. }));
    }

    // ============================================================================
    // Bearer token freshness
    // ============================================================================

    #[test]
    fn test_token_fresh_outside_margin() {
        let now = Utc::now();
        let token = BearerToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(3600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn test_token_stale_inside_margin() {
        let now = Utc::now();
        let token = BearerToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(!token.is_fresh(now));
    }

    #[test]
    fn test_token_expiry_from_epoch_seconds() {
        let url = parse_endpoint("https://iam.cloud.ibm.com/identity/token").unwrap();
        let expires_at = token_expiry(&url, 1_700_000_000).unwrap();
        assert_eq!(expires_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_token_expiry_out_of_range_is_decode_error() {
        let url = parse_endpoint("https://iam.cloud.ibm.com/identity/token").unwrap();
        let err = token_expiry(&url, i64::MAX).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    // ============================================================================
    // Paging
    // ============================================================================

    #[test]
    fn test_next_page_url_keeps_endpoint_prefix() {
        let base = parse_endpoint("https://private.example.com/rc").unwrap();
        let url = next_page_url(&base, "/v2/resource_instances?type=service_instance&start=abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://private.example.com/rc/v2/resource_instances?type=service_instance&start=abc"
        );
    }

    #[test]
    fn test_next_page_url_without_query_is_rejected() {
        let base = parse_endpoint("https://resource-controller.cloud.ibm.com").unwrap();
        let err = next_page_url(&base, "/v2/resource_instances").unwrap_err();
        assert!(matches!(err, ApiError::InvalidEndpoint { .. }));
    }
}
