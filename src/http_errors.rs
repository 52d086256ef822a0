// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP status code mapping to error categories.
//!
//! The IBM Cloud services report failures with plain HTTP status codes. This module
//! maps those codes to a short category and a human-readable message so failed
//! calls are logged consistently across every service.
//!
//! # Usage
//!
//! ```rust
//! use ibmcloud_installer::http_errors::map_http_status_to_category;
//!
//! let (category, message) = map_http_status_to_category(404);
//! assert_eq!(category, "NotFound");
//!
//! let (category, message) = map_http_status_to_category(500);
//! assert_eq!(category, "ServiceInternalError");
//! ```

/// Request was malformed
pub const CATEGORY_BAD_REQUEST: &str = "BadRequest";

/// Credentials missing, expired, or lacking permission
pub const CATEGORY_AUTH_FAILED: &str = "AuthFailed";

/// Resource does not exist
pub const CATEGORY_NOT_FOUND: &str = "NotFound";

/// Resource already exists or is in a conflicting state
pub const CATEGORY_CONFLICT: &str = "Conflict";

/// Client is being rate limited
pub const CATEGORY_RATE_LIMITED: &str = "RateLimited";

/// Service failed internally
pub const CATEGORY_SERVICE_INTERNAL_ERROR: &str = "ServiceInternalError";

/// Gateway in front of the service failed
pub const CATEGORY_GATEWAY_ERROR: &str = "GatewayError";

/// Anything else
pub const CATEGORY_UNEXPECTED: &str = "Unexpected";

/// Map an HTTP status code to an error category and message.
///
/// # Arguments
///
/// * `status_code` - HTTP status code (e.g., 400, 404, 500)
///
/// # Returns
///
/// A tuple of `(category, message)`.
///
/// | HTTP Code | Category |
/// |-----------|----------|
/// | 400 | `BadRequest` |
/// | 401, 403 | `AuthFailed` |
/// | 404 | `NotFound` |
/// | 409 | `Conflict` |
/// | 429 | `RateLimited` |
/// | 500 | `ServiceInternalError` |
/// | 502, 503, 504 | `GatewayError` |
/// | Other | `Unexpected` |
#[must_use]
pub fn map_http_status_to_category(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            CATEGORY_BAD_REQUEST,
            "Invalid request to IBM Cloud API (400)".into(),
        ),
        401 => (
            CATEGORY_AUTH_FAILED,
            "IBM Cloud authentication required (401)".into(),
        ),
        403 => (
            CATEGORY_AUTH_FAILED,
            "IBM Cloud authorization failed (403)".into(),
        ),
        404 => (CATEGORY_NOT_FOUND, "Resource not found (404)".into()),
        409 => (
            CATEGORY_CONFLICT,
            "Resource conflict in IBM Cloud (409)".into(),
        ),
        429 => (
            CATEGORY_RATE_LIMITED,
            "Rate limited by IBM Cloud (429)".into(),
        ),
        500 => (
            CATEGORY_SERVICE_INTERNAL_ERROR,
            "IBM Cloud service internal error (500)".into(),
        ),
        502 => (
            CATEGORY_GATEWAY_ERROR,
            "Bad gateway reaching IBM Cloud (502)".into(),
        ),
        503 => (
            CATEGORY_GATEWAY_ERROR,
            "IBM Cloud service unavailable (503)".into(),
        ),
        504 => (
            CATEGORY_GATEWAY_ERROR,
            "Gateway timeout reaching IBM Cloud (504)".into(),
        ),
        _ => (
            CATEGORY_UNEXPECTED,
            format!("Unexpected HTTP status from IBM Cloud ({status_code})"),
        ),
    }
}
