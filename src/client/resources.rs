// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IAM, Resource Manager and Resource Controller calls.

use tracing::debug;
use url::Url;

use super::http::endpoint_url;
use super::Client;
use crate::constants::IAM_APIKEY_HEADER;
use crate::errors::ApiError;
use crate::responses::{
    ApiKeyDetails, ResourceGroup, ResourceGroupCollection, ResourceInstance,
    ResourceInstanceCollection,
};

pub(crate) async fn get_api_key_details(client: &Client) -> Result<ApiKeyDetails, ApiError> {
    let url = endpoint_url(&client.endpoints.iam, &["v1", "apikeys", "details"])?;
    client
        .get_json(url, &[(IAM_APIKEY_HEADER, client.api_key.as_str())])
        .await
}

pub(crate) async fn get_resource_instance(
    client: &Client,
    crn: &str,
) -> Result<ResourceInstance, ApiError> {
    let url = endpoint_url(
        &client.endpoints.resource_controller,
        &["v2", "resource_instances", crn],
    )?;
    client.get_json(url, &[]).await
}

/// Every service instance of a catalog service, following `next_url` links.
pub(crate) async fn list_resource_instances(
    client: &Client,
    resource_id: &str,
) -> Result<Vec<ResourceInstance>, ApiError> {
    let base = &client.endpoints.resource_controller;
    let mut url = endpoint_url(base, &["v2", "resource_instances"])?;
    url.query_pairs_mut()
        .append_pair("resource_id", resource_id)
        .append_pair("type", "service_instance");

    let mut instances = Vec::new();
    loop {
        let page: ResourceInstanceCollection = client.get_json(url, &[]).await?;
        instances.extend(page.resources);
        match page.next_url.as_deref().filter(|n| !n.is_empty()) {
            Some(next) => {
                url = next_page_url(base, next)?;
            }
            None => break,
        }
    }

    debug!(resource_id = %resource_id, count = instances.len(), "Listed service instances");
    Ok(instances)
}

/// URL of the next service instance page.
///
/// `next_url` is an absolute path on the default host, so only its query is
/// kept and the configured endpoint, path prefix included, is reused.
pub(crate) fn next_page_url(base: &Url, next: &str) -> Result<Url, ApiError> {
    let query = next
        .split_once('?')
        .map(|(_, q)| q)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::InvalidEndpoint {
            endpoint: next.to_string(),
            reason: "next_url carries no query".to_string(),
        })?;
    let mut url = endpoint_url(base, &["v2", "resource_instances"])?;
    url.set_query(Some(query));
    Ok(url)
}

/// Resource groups of the account owning the API key.
pub(crate) async fn list_resource_groups(client: &Client) -> Result<Vec<ResourceGroup>, ApiError> {
    let details = get_api_key_details(client).await?;
    let account_id = details
        .account_id
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::malformed("api key", "details", "account_id"))?;

    let mut url = endpoint_url(&client.endpoints.resource_manager, &["v2", "resource_groups"])?;
    url.query_pairs_mut().append_pair("account_id", &account_id);
    let groups: ResourceGroupCollection = client.get_json(url, &[]).await?;
    Ok(groups.resources)
}

pub(crate) async fn find_resource_group(
    client: &Client,
    name_or_id: &str,
) -> Result<ResourceGroup, ApiError> {
    list_resource_groups(client)
        .await?
        .into_iter()
        .find(|g| g.id == name_or_id || g.name == name_or_id)
        .ok_or(ApiError::NotFound)
}
