// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloud API and resolution error types.
//!
//! This module provides specialized error types for:
//! - IBM Cloud REST calls (not found, HTTP failures, transport failures)
//! - Responses that are missing a field the installer relies on
//! - DNS zone and DNS Services instance resolution
//!
//! Resolution paths fail fast with these errors. Validation converts them into
//! field errors (see [`crate::field`]) so every problem is reported at once.

use thiserror::Error;

/// Errors returned by calls to the IBM Cloud REST services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requested resource does not exist.
    ///
    /// Returned for HTTP 404 responses and for lookups by name that scanned every
    /// page of a collection without a match. Callers distinguish this variant from
    /// every other failure.
    #[error("Not Found")]
    NotFound,

    /// A successful response was missing a field the caller requires.
    #[error("{resource} '{name}' is missing required field '{field}'")]
    MalformedResponse {
        /// Kind of resource that was returned (e.g., "subnet")
        resource: String,
        /// Name or ID of the returned resource
        name: String,
        /// Missing field name
        field: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
        /// Response body or reason phrase
        message: String,
    },

    /// The request never produced an HTTP response (connect failure, timeout).
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Request URL
        url: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder error
        reason: String,
    },

    /// A CRN string could not be parsed.
    #[error("invalid CRN {crn:?}: {reason}")]
    InvalidCrn {
        /// The offending CRN
        crn: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// An encryption key CRN names a service that is neither Key Protect nor Hyper Protect.
    #[error("unknown key service for crn: {crn}")]
    UnknownKeyService {
        /// The key CRN
        crn: String,
    },

    /// An endpoint override could not be parsed as a URL.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The configured endpoint
        endpoint: String,
        /// Parser error
        reason: String,
    },

    /// IAM refused to issue a token or describe the API key.
    #[error("IAM authentication failed: {reason}")]
    Auth {
        /// Explanation from IAM
        reason: String,
    },
}

impl ApiError {
    /// Whether this error means the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    /// Build a [`ApiError::MalformedResponse`] for a missing field.
    pub fn malformed(
        resource: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        ApiError::MalformedResponse {
            resource: resource.into(),
            name: name.into(),
            field: field.into(),
        }
    }
}

/// Errors returned while resolving install metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No CIS zone matched the base domain.
    #[error("cisInstanceCRN unknown due to DNS zone {domain:?} not found")]
    CisZoneNotFound {
        /// Base domain that was searched for
        domain: String,
    },

    /// No DNS Services zone matched the base domain.
    #[error("dnsInstance unknown due to DNS zone {domain:?} not found")]
    DnsZoneNotFound {
        /// Base domain that was searched for
        domain: String,
    },

    /// The matching DNS Services zone carried only half of its instance identity.
    #[error("dnsInstance has unknown ID/CRN: {id:?} - {crn:?}")]
    UnknownDnsInstance {
        /// Instance ID as returned (possibly empty)
        id: String,
        /// Instance CRN as returned (possibly empty)
        crn: String,
    },

    /// A field required for resolution was not configured.
    #[error("{0}")]
    Missing(String),

    /// The underlying cloud call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ResolveError {
    /// Whether the root cause is a missing cloud resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            ResolveError::CisZoneNotFound { .. } | ResolveError::DnsZoneNotFound { .. } => true,
            ResolveError::Api(err) => err.is_not_found(),
            ResolveError::UnknownDnsInstance { .. } | ResolveError::Missing(_) => false,
        }
    }
}
