// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Key Protect and Hyper Protect root key lookups.

use url::Url;

use super::http::{endpoint_url, parse_endpoint};
use super::Client;
use crate::constants::{
    HYPER_PROTECT_CRN_SERVICE_NAME, HYPER_PROTECT_URL_TEMPLATE, KEY_INSTANCE_HEADER,
    KEY_PROTECT_CRN_SERVICE_NAME, KEY_PROTECT_URL_TEMPLATE,
};
use crate::crn::Crn;
use crate::errors::ApiError;
use crate::responses::{EncryptionKeyCollection, EncryptionKeyResponse};

/// Base URL of the key service named by a key CRN.
///
/// An endpoint override wins; otherwise the regional public endpoint is derived
/// from the CRN location.
///
/// # Errors
///
/// Returns [`ApiError::UnknownKeyService`] when the CRN is neither a Key Protect
/// nor a Hyper Protect CRN.
pub fn key_service_url(
    crn: &Crn,
    key_protect: Option<&Url>,
    hyper_protect: Option<&Url>,
) -> Result<Url, ApiError> {
    let (configured, template) = match crn.service_name.as_str() {
        KEY_PROTECT_CRN_SERVICE_NAME => (key_protect, KEY_PROTECT_URL_TEMPLATE),
        HYPER_PROTECT_CRN_SERVICE_NAME => (hyper_protect, HYPER_PROTECT_URL_TEMPLATE),
        _ => {
            return Err(ApiError::UnknownKeyService {
                crn: crn.to_string(),
            })
        }
    };

    match configured {
        Some(url) => Ok(url.clone()),
        None => parse_endpoint(&template.replace("{region}", &crn.location)),
    }
}

pub(crate) async fn get_encryption_key(
    client: &Client,
    key_crn: &str,
) -> Result<EncryptionKeyResponse, ApiError> {
    let crn = Crn::parse(key_crn)?;
    let base = key_service_url(
        &crn,
        client.endpoints.key_protect.as_ref(),
        client.endpoints.hyper_protect.as_ref(),
    )?;
    let url = endpoint_url(&base, &["api", "v2", "keys", &crn.resource])?;

    let keys: EncryptionKeyCollection = client
        .get_json(url, &[(KEY_INSTANCE_HEADER, crn.service_instance.as_str())])
        .await?;
    keys.resources.into_iter().next().ok_or(ApiError::NotFound)
}
