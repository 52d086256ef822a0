// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP plumbing shared by every IBM Cloud service call.
//!
//! This module owns request execution, IAM bearer token exchange, and the
//! mapping of service names to base URLs. Calls are never retried: a failed
//! request surfaces immediately as an [`ApiError`].

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

use super::Client;
use crate::constants::{
    CIS_DEFAULT_URL, DNS_SERVICES_DEFAULT_URL, IAM_APIKEY_GRANT_TYPE, IAM_DEFAULT_URL,
    IAM_TOKEN_PATH, IAM_TOKEN_REFRESH_MARGIN_SECS, RESOURCE_CONTROLLER_DEFAULT_URL,
    RESOURCE_MANAGER_DEFAULT_URL, VPC_DEFAULT_URL,
};
use crate::errors::ApiError;
use crate::http_errors::map_http_status_to_category;
use crate::install_config::ServiceEndpoint;
use crate::responses::IamToken;

/// Base URLs of the IBM Cloud services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub iam: Url,
    pub resource_controller: Url,
    pub resource_manager: Url,
    /// VPC endpoint; used for region discovery unless overridden
    pub vpc: Url,
    /// Whether `vpc` was overridden and applies to every region
    pub vpc_override: bool,
    pub cis: Url,
    pub dns_services: Url,
    pub key_protect: Option<Url>,
    pub hyper_protect: Option<Url>,
}

impl Endpoints {
    /// Default public endpoints with the given overrides applied.
    ///
    /// Overrides for services the installer does not call (COS, global
    /// catalog, search, tagging) are accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if a URL does not parse.
    pub fn from_overrides(overrides: &[ServiceEndpoint]) -> Result<Self, ApiError> {
        let mut endpoints = Self {
            iam: parse_endpoint(IAM_DEFAULT_URL)?,
            resource_controller: parse_endpoint(RESOURCE_CONTROLLER_DEFAULT_URL)?,
            resource_manager: parse_endpoint(RESOURCE_MANAGER_DEFAULT_URL)?,
            vpc: parse_endpoint(VPC_DEFAULT_URL)?,
            vpc_override: false,
            cis: parse_endpoint(CIS_DEFAULT_URL)?,
            dns_services: parse_endpoint(DNS_SERVICES_DEFAULT_URL)?,
            key_protect: None,
            hyper_protect: None,
        };

        for endpoint in overrides {
            let url = parse_endpoint(&endpoint.url)?;
            match endpoint.name.as_str() {
                "IAM" => endpoints.iam = url,
                "ResourceController" => endpoints.resource_controller = url,
                "ResourceManager" => endpoints.resource_manager = url,
                "VPC" => {
                    endpoints.vpc = url;
                    endpoints.vpc_override = true;
                }
                "CIS" => endpoints.cis = url,
                "DNSServices" => endpoints.dns_services = url,
                "KeyProtect" => endpoints.key_protect = Some(url),
                "HyperProtect" => endpoints.hyper_protect = Some(url),
                other => debug!(service = %other, "Ignoring endpoint override for unused service"),
            }
        }

        Ok(endpoints)
    }

    /// Point every service at one base URL.
    ///
    /// Used against a local stand-in for IBM Cloud.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if the URL does not parse.
    pub fn all_at(base: &str) -> Result<Self, ApiError> {
        let overrides: Vec<ServiceEndpoint> = [
            "IAM",
            "ResourceController",
            "ResourceManager",
            "VPC",
            "CIS",
            "DNSServices",
            "KeyProtect",
            "HyperProtect",
        ]
        .iter()
        .map(|name| ServiceEndpoint {
            name: (*name).to_string(),
            url: base.to_string(),
        })
        .collect();
        Self::from_overrides(&overrides)
    }
}

/// Parse an endpoint URL, requiring an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ApiError::InvalidEndpoint`] when the value is not such a URL.
pub fn parse_endpoint(value: &str) -> Result<Url, ApiError> {
    let url = Url::parse(value).map_err(|e| ApiError::InvalidEndpoint {
        endpoint: value.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ApiError::InvalidEndpoint {
            endpoint: value.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ApiError::InvalidEndpoint {
            endpoint: value.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each segment.
///
/// # Errors
///
/// Returns [`ApiError::InvalidEndpoint`] if the base cannot carry a path.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ApiError::InvalidEndpoint {
                endpoint: base.to_string(),
                reason: "cannot append path".to_string(),
            })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Cached IAM bearer token.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    /// Whether the token stays valid past the refresh margin.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > chrono::Duration::seconds(IAM_TOKEN_REFRESH_MARGIN_SECS)
    }
}

/// Body of an outgoing request.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Json(serde_json::Value),
    /// URL-encoded form; never logged because it may carry the API key
    Form(String),
}

/// Expiry instant of an IAM token from its `expiration` epoch seconds.
pub(crate) fn token_expiry(url: &Url, expiration: i64) -> Result<DateTime<Utc>, ApiError> {
    DateTime::from_timestamp(expiration, 0).ok_or_else(|| ApiError::Decode {
        url: url.to_string(),
        reason: format!("token expiration {expiration} is out of range"),
    })
}

/// Decode a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(url: &Url, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl Client {
    /// Current bearer token, exchanging the API key when none is cached or the
    /// cached one is about to expire.
    pub(crate) async fn bearer_token(&self) -> Result<String, ApiError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn request_token(&self) -> Result<BearerToken, ApiError> {
        let segments: Vec<&str> = IAM_TOKEN_PATH.split('/').collect();
        let url = endpoint_url(&self.endpoints.iam, &segments)?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", IAM_APIKEY_GRANT_TYPE)
            .append_pair("apikey", &self.api_key)
            .finish();

        let text = self
            .execute(Method::POST, url.clone(), None, &[], Some(RequestBody::Form(form)))
            .await
            .map_err(|e| match e {
                ApiError::Http {
                    status: 400 | 401 | 403,
                    message,
                    ..
                } => ApiError::Auth { reason: message },
                other => other,
            })?;

        let token: IamToken = decode(&url, &text)?;
        let expires_at = token_expiry(&url, token.expiration)?;
        debug!(expires_at = %expires_at, "Obtained IAM bearer token");
        Ok(BearerToken {
            value: token.access_token,
            expires_at,
        })
    }

    /// Authenticated GET returning a decoded JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let token = self.bearer_token().await?;
        let text = self
            .execute(Method::GET, url.clone(), Some(&token), headers, None)
            .await?;
        decode(&url, &text)
    }

    /// Authenticated POST of a JSON body, returning the raw response body.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        headers: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Result<String, ApiError> {
        let token = self.bearer_token().await?;
        self.execute(
            Method::POST,
            url,
            Some(&token),
            headers,
            Some(RequestBody::Json(body)),
        )
        .await
    }

    /// Execute one HTTP request.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] for HTTP 404
    /// - [`ApiError::Http`] for any other non-success status
    /// - [`ApiError::Transport`] when no response was received
    async fn execute(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<RequestBody>,
    ) -> Result<String, ApiError> {
        info!(
            method = %method,
            url = %url,
            auth = token.is_some(),
            "HTTP API request to IBM Cloud"
        );

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");

        if let Some(token_value) = token {
            request = request.bearer_auth(token_value);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        match body {
            Some(RequestBody::Json(json)) => {
                debug!(body = %json, "Request body");
                request = request.json(&json);
            }
            Some(RequestBody::Form(form)) => {
                request = request
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(form);
            }
            None => {}
        }

        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let (category, message) = map_http_status_to_category(status.as_u16());

            if status == StatusCode::NOT_FOUND {
                debug!(method = %method, url = %url, "Resource not found");
                return Err(ApiError::NotFound);
            }

            error!(
                method = %method,
                url = %url,
                status = %status,
                category = %category,
                error = %error_text,
                "HTTP API request failed"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                message: format!("{message}: {error_text}"),
            });
        }

        let text = response.text().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "HTTP API request successful"
        );

        Ok(text)
    }
}
