// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the IBM Cloud REST client
//!
//! Every service endpoint is overridden to point at a local mock server, so
//! these tests exercise real HTTP requests without an IBM Cloud account.
//!
//! Run with: cargo test --test client_integration

mod common;

use common::{
    client_for, config_for, endpoints_at, mount_iam, token_response, TEST_API_KEY, TEST_REGION,
    TEST_TOKEN,
};
use ibmcloud_installer::client::{Api, Client, ClientConfig};
use ibmcloud_installer::constants::{CIS_SERVICE_ID, DNS_SERVICE_ID};
use ibmcloud_installer::errors::ApiError;
use ibmcloud_installer::install_config::{InstallConfig, PublishingStrategy, ServiceEndpoint};
use ibmcloud_installer::metadata::Metadata;
use serde_json::json;
use wiremock::matchers::{
    bearer_token, body_json, body_string_contains, header, method, path, path_regex, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CIS_CRN: &str = "crn:v1:bluemix:public:internet-svcs:global:a/acct:cis-1::";
const DNS_CRN: &str = "crn:v1:bluemix:public:dns-svcs:global:a/acct:dns-guid::";
const KEY_CRN: &str = "crn:v1:bluemix:public:kms:us-south:a/acct:kp-instance:key:root-key";

fn subnet_json(name: &str, zone: &str) -> serde_json::Value {
    json!({
        "id": format!("id-{name}"),
        "name": name,
        "crn": format!("crn-{name}"),
        "ipv4_cidr_block": "10.240.0.0/24",
        "vpc": { "id": "vpc-id", "name": "my-vpc", "crn": "crn-vpc" },
        "zone": { "name": zone },
        "resource_group": { "id": "rg-id", "name": "my-rg" }
    })
}

async fn mount_resource_instances(server: &MockServer, service_id: &str, instances: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v2/resource_instances"))
        .and(query_param("resource_id", service_id))
        .and(query_param("type", "service_instance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": instances,
            "next_url": null
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_token_exchanged_once_and_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(body_string_contains("apikey=test-api-key"))
        .and(body_string_contains("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey"))
        .respond_with(token_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/regions/us-south/zones"))
        .and(bearer_token(TEST_TOKEN))
        .and(query_param("generation", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [
                { "name": "us-south-1" },
                { "name": "us-south-2" },
                { "name": "us-south-3" }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let zones = client.get_vpc_zones_for_region(TEST_REGION).await.unwrap();
    assert_eq!(zones, vec!["us-south-1", "us-south-2", "us-south-3"]);

    // Second call reuses the cached token
    client.get_vpc_zones_for_region(TEST_REGION).await.unwrap();
}

#[tokio::test]
async fn test_rejected_api_key_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Provided API key could not be found"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_vsi_profiles(TEST_REGION)
        .await
        .unwrap_err();
    match err {
        ApiError::Auth { reason } => assert!(reason.contains("Provided API key could not be found")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

// ============================================================================
// VPC
// ============================================================================

#[tokio::test]
async fn test_subnet_lookup_follows_pages() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/subnets"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subnets": [subnet_json("other-subnet", "us-south-1")],
            "next": { "href": format!("{}/subnets?limit=100&start=page-2", server.uri()) }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subnets"))
        .and(query_param("start", "page-2"))
        .and(query_param("version", "2024-04-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subnets": [subnet_json("cp-subnet-2", "us-south-2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subnet = client_for(&server)
        .get_subnet_by_name("cp-subnet-2", TEST_REGION)
        .await
        .unwrap();
    assert_eq!(subnet.id.as_deref(), Some("id-cp-subnet-2"));
    assert_eq!(
        subnet.zone.and_then(|z| z.name).as_deref(),
        Some("us-south-2")
    );
}

#[tokio::test]
async fn test_subnet_missing_from_every_page_is_not_found() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/subnets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subnets": [subnet_json("other-subnet", "us-south-1")]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_subnet_by_name("missing", TEST_REGION)
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[tokio::test]
async fn test_http_404_is_not_found() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/subnets/does-not-exist"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "code": "not_found", "message": "Subnet not found" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_subnet(TEST_REGION, "does-not-exist")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_http_500_keeps_status() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/instance/profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_vsi_profiles(TEST_REGION)
        .await
        .unwrap_err();
    match err {
        ApiError::Http { status, message, .. } => {
            assert_eq!(status, 500);
            assert!(message.contains("internal failure"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_vpcs_collected_from_every_page() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/vpcs"))
        .and(query_param_is_missing("start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{ "id": "vpc-1", "name": "first" }],
            "next": { "href": format!("{}/vpcs?start=2", server.uri()) }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vpcs"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{ "id": "vpc-2", "name": "second" }]
        })))
        .mount(&server)
        .await;

    let vpcs = client_for(&server).get_vpcs(TEST_REGION).await.unwrap();
    let names: Vec<_> = vpcs.iter().filter_map(|v| v.name.as_deref()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

// ============================================================================
// Resource groups and keys
// ============================================================================

#[tokio::test]
async fn test_resource_groups_scoped_to_api_key_account() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/apikeys/details"))
        .and(header("IAM-ApiKey", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "key-id",
            "account_id": "acct"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/resource_groups"))
        .and(query_param("account_id", "acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [
                { "id": "rg-1", "name": "default", "default": true },
                { "id": "rg-2", "name": "network" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let group = client.get_resource_group("network").await.unwrap();
    assert_eq!(group.id, "rg-2");
    let err = client.get_resource_group("missing").await.unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[tokio::test]
async fn test_encryption_key_fetched_from_key_protect_instance() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/keys/root-key"))
        .and(header("bluemix-instance", "kp-instance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": { "collectionType": "application/vnd.ibm.kms.key+json", "collectionTotal": 1 },
            "resources": [{
                "id": "root-key",
                "name": "cluster-root-key",
                "crn": KEY_CRN,
                "state": 1,
                "deleted": false
            }]
        })))
        .mount(&server)
        .await;

    let key = client_for(&server).get_encryption_key(KEY_CRN).await.unwrap();
    assert_eq!(key.crn.as_deref(), Some(KEY_CRN));
    assert_eq!(key.state, 1);
    assert_eq!(key.deleted, Some(false));
}

#[tokio::test]
async fn test_encryption_key_with_unknown_service_is_rejected() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .get_encryption_key("crn:v1:bluemix:public:cloud-object-storage:global:a/acct:cos::")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnknownKeyService { .. }));
}

// ============================================================================
// DNS
// ============================================================================

#[tokio::test]
async fn test_dns_services_zones_filtered_by_state() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    mount_resource_instances(
        &server,
        DNS_SERVICE_ID,
        json!([{
            "guid": "dns-guid",
            "crn": DNS_CRN,
            "name": "dns-instance",
            "resource_group_id": "rg-1"
        }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/instances/dns-guid/dnszones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dnszones": [
                { "id": "zone-active", "name": "active.example.com", "state": "ACTIVE" },
                { "id": "zone-pending", "name": "pending.example.com", "state": "PENDING_NETWORK_ADD" },
                { "id": "zone-disabled", "name": "disabled.example.com", "state": "DISABLED" }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let zones = client.get_dns_zones(PublishingStrategy::Internal).await.unwrap();
    let names: Vec<_> = zones.iter().map(|z| z.name.as_str()).collect();
    assert_eq!(names, vec!["active.example.com", "pending.example.com"]);
    assert_eq!(zones[0].instance_id, "dns-guid");
    assert_eq!(zones[0].instance_crn, DNS_CRN);

    let id = client
        .get_dns_zone_id_by_name("pending.example.com", PublishingStrategy::Internal)
        .await
        .unwrap();
    assert_eq!(id, "zone-pending");
    let err = client
        .get_dns_zone_id_by_name("disabled.example.com", PublishingStrategy::Internal)
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound);
}

#[tokio::test]
async fn test_service_instance_pages_keep_endpoint_prefix() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    let rc_url = format!("{}/rc", server.uri());
    let endpoints: Vec<ServiceEndpoint> = endpoints_at(&server)
        .into_iter()
        .map(|e| match e.name.as_str() {
            "ResourceController" => ServiceEndpoint {
                name: e.name,
                url: rc_url.clone(),
            },
            _ => e,
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/rc/v2/resource_instances"))
        .and(query_param("resource_id", DNS_SERVICE_ID))
        .and(query_param_is_missing("start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [{ "guid": "dns-a", "crn": "crn:v1:bluemix:public:dns-svcs:global:a/acct:dns-a::", "name": "a", "resource_group_id": "rg" }],
            "next_url": format!("/v2/resource_instances?resource_id={DNS_SERVICE_ID}&type=service_instance&start=page-2")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rc/v2/resource_instances"))
        .and(query_param("start", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [{ "guid": "dns-b", "crn": "crn:v1:bluemix:public:dns-svcs:global:a/acct:dns-b::", "name": "b", "resource_group_id": "rg" }],
            "next_url": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    for guid in ["dns-a", "dns-b"] {
        Mock::given(method("GET"))
            .and(path(format!("/instances/{guid}/dnszones")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dnszones": [{ "id": format!("zone-{guid}"), "name": format!("{guid}.example.com"), "state": "ACTIVE" }]
            })))
            .mount(&server)
            .await;
    }

    let client = Client::new(ClientConfig::new(TEST_API_KEY).with_service_endpoints(endpoints)).unwrap();
    let zones = client.get_dns_zones(PublishingStrategy::Internal).await.unwrap();
    let ids: Vec<_> = zones.iter().map(|z| z.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["dns-a", "dns-b"]);
}

#[tokio::test]
async fn test_cis_zones_collected_from_every_page() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    mount_resource_instances(
        &server,
        CIS_SERVICE_ID,
        json!([{ "guid": "cis-1", "crn": CIS_CRN, "name": "cis-instance" }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/.+/zones$"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                { "id": "zone-1", "name": "one.example.com", "status": "active" },
                { "id": "zone-x", "name": "pending.example.com", "status": "pending" }
            ],
            "result_info": { "page": 1, "total_pages": 2 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/.+/zones$"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "zone-2", "name": "two.example.com", "status": "active" }],
            "result_info": { "page": 2, "total_pages": 2 }
        })))
        .mount(&server)
        .await;

    let zones = client_for(&server)
        .get_dns_zones(PublishingStrategy::External)
        .await
        .unwrap();
    let ids: Vec<_> = zones.iter().map(|z| z.id.as_str()).collect();
    assert_eq!(ids, vec!["zone-1", "zone-2"]);
    assert!(zones.iter().all(|z| z.instance_crn == CIS_CRN));
}

#[tokio::test]
async fn test_cis_records_looked_up_by_name() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/.+/zones/zone-1/dns_records$"))
        .and(query_param("name", "api.demo.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "id": "record-1",
                "name": "api.demo.example.com",
                "type": "CNAME",
                "content": "lb.example.com"
            }]
        })))
        .mount(&server)
        .await;

    let records = client_for(&server)
        .get_dns_records_by_name(CIS_CRN, "zone-1", "api.demo.example.com")
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record_type.as_deref(), Some("CNAME"));
}

#[tokio::test]
async fn test_dns_services_record_created_as_cname() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("POST"))
        .and(path("/instances/dns-guid/dnszones/zone-1/resource_records"))
        .and(bearer_token(TEST_TOKEN))
        .and(body_json(json!({
            "type": "CNAME",
            "name": "api-int.demo.example.com",
            "rdata": { "cname": "private-lb.example.com" },
            "ttl": 60
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "record-1" })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .create_dns_services_dns_record(
            "dns-guid",
            "zone-1",
            "api-int.demo.example.com",
            "private-lb.example.com",
        )
        .await
        .unwrap();
}

// ============================================================================
// Metadata over the real client
// ============================================================================

#[tokio::test]
async fn test_metadata_resolves_cis_instance_once() {
    let server = MockServer::start().await;
    mount_iam(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/resource_instances"))
        .and(query_param("resource_id", CIS_SERVICE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [{ "guid": "cis-1", "crn": CIS_CRN, "name": "cis-instance" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/.+/zones$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "zone-1", "name": "example.com", "status": "active" }],
            "result_info": { "page": 1, "total_pages": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = InstallConfig::from_yaml(
        "metadata: {name: demo}\nbaseDomain: example.com\nplatform: {ibmcloud: {region: us-south}}\n",
    )
    .unwrap();
    let metadata = Metadata::new(&config).with_client_config(config_for(&server));

    assert_eq!(metadata.cis_instance_crn().await.unwrap(), CIS_CRN);
    assert_eq!(metadata.cis_instance_crn().await.unwrap(), CIS_CRN);
}
