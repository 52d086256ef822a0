// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use ibmcloud_installer::client::{Client, ClientConfig};
use ibmcloud_installer::install_config::ServiceEndpoint;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_TOKEN: &str = "test-bearer-token";
pub const TEST_REGION: &str = "us-south";

/// Services the client talks to, all redirected to the mock server.
const SERVICES: &[&str] = &[
    "IAM",
    "ResourceController",
    "ResourceManager",
    "VPC",
    "CIS",
    "DNSServices",
    "KeyProtect",
    "HyperProtect",
];

/// Endpoint overrides pointing every service at the mock server.
pub fn endpoints_at(server: &MockServer) -> Vec<ServiceEndpoint> {
    SERVICES
        .iter()
        .map(|name| ServiceEndpoint {
            name: (*name).to_string(),
            url: server.uri(),
        })
        .collect()
}

/// Client configuration for the mock server.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(TEST_API_KEY).with_service_endpoints(endpoints_at(server))
}

/// Client talking only to the mock server.
pub fn client_for(server: &MockServer) -> Client {
    Client::new(config_for(server)).expect("client should build against the mock server")
}

/// IAM token response valid for an hour.
pub fn token_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": TEST_TOKEN,
        "refresh_token": "not-used",
        "token_type": "Bearer",
        "expires_in": 3600,
        "expiration": chrono::Utc::now().timestamp() + 3600,
    }))
}

/// Mount the IAM token exchange.
pub async fn mount_iam(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(token_response())
        .mount(server)
        .await;
}
