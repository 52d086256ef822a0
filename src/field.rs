// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Field-path annotated validation errors.
//!
//! Validation never stops at the first problem. Each problem is recorded as a
//! [`FieldError`] against the install-config path that caused it, and the full
//! list is returned as one [`AggregateError`]. The rendering follows the
//! Kubernetes field error format, so a missing VPC reads:
//!
//! ```text
//! platform.ibmcloud.vpc: Not found: "my-vpc"
//! ```

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Path to a field inside the install-config, e.g. `compute[1].platform.ibmcloud.type`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    rendered: String,
}

impl FieldPath {
    /// Start a path at a top-level field.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            rendered: root.to_string(),
        }
    }

    /// Descend into a named child field.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let rendered = if self.rendered.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.rendered)
        };
        Self { rendered }
    }

    /// Descend into a list element.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self {
            rendered: format!("{}[{index}]", self.rendered),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Category of a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Referenced resource does not exist
    NotFound,
    /// Required field is empty
    Required,
    /// Value appears more than once
    Duplicate,
    /// Value is not acceptable
    Invalid,
    /// Value is not one of the supported values
    NotSupported,
    /// Validation could not complete because a cloud call failed
    Internal,
}

impl ErrorType {
    fn as_str(self) -> &'static str {
        match self {
            ErrorType::NotFound => "Not found",
            ErrorType::Required => "Required value",
            ErrorType::Duplicate => "Duplicate value",
            ErrorType::Invalid => "Invalid value",
            ErrorType::NotSupported => "Unsupported value",
            ErrorType::Internal => "Internal error",
        }
    }

    // Required and Internal errors never echo the offending value.
    fn shows_value(self) -> bool {
        !matches!(self, ErrorType::Required | ErrorType::Internal)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure at a specific install-config path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: FieldPath,
    pub bad_value: Value,
    pub detail: String,
}

impl FieldError {
    fn build(error_type: ErrorType, field: &FieldPath, bad_value: Value, detail: String) -> Self {
        Self {
            error_type,
            field: field.clone(),
            bad_value,
            detail,
        }
    }

    /// The referenced resource does not exist.
    pub fn not_found(field: &FieldPath, value: impl Into<Value>) -> Self {
        Self::build(ErrorType::NotFound, field, value.into(), String::new())
    }

    /// A required value is missing.
    pub fn required(field: &FieldPath, detail: impl Into<String>) -> Self {
        Self::build(ErrorType::Required, field, Value::Null, detail.into())
    }

    /// A value is repeated.
    pub fn duplicate(field: &FieldPath, value: impl Into<Value>) -> Self {
        Self::build(ErrorType::Duplicate, field, value.into(), String::new())
    }

    /// A value is unacceptable.
    pub fn invalid(field: &FieldPath, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self::build(ErrorType::Invalid, field, value.into(), detail.into())
    }

    /// A value is outside the supported set.
    pub fn not_supported(field: &FieldPath, value: impl Into<Value>, supported: &[&str]) -> Self {
        let detail = format!(
            "supported values: {}",
            supported
                .iter()
                .map(|s| format!("{s:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self::build(ErrorType::NotSupported, field, value.into(), detail)
    }

    /// A cloud call failed while checking the field.
    pub fn internal(field: &FieldPath, detail: impl fmt::Display) -> Self {
        Self::build(ErrorType::Internal, field, Value::Null, detail.to_string())
    }

    fn render_value(&self) -> String {
        match &self.bad_value {
            Value::String(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type)?;
        if self.error_type.shows_value() {
            write!(f, ": {}", self.render_value())?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// An ordered list of field errors.
pub type ErrorList = Vec<FieldError>;

/// Every field error found by a validation pass.
///
/// A single error renders on its own; several render as `[first, second]`.
/// Identical messages are only rendered once.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render_aggregate(.0))]
pub struct AggregateError(pub ErrorList);

impl AggregateError {
    /// The individual errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

/// Turn an error list into a result, `Ok(())` when the list is empty.
///
/// # Errors
///
/// Returns an [`AggregateError`] holding every error when the list is non-empty.
pub fn to_aggregate(errors: ErrorList) -> Result<(), AggregateError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AggregateError(errors))
    }
}

fn render_aggregate(errors: &[FieldError]) -> String {
    let mut messages: Vec<String> = Vec::with_capacity(errors.len());
    for err in errors {
        let msg = err.to_string();
        if !messages.contains(&msg) {
            messages.push(msg);
        }
    }
    match messages.len() {
        0 => String::new(),
        1 => messages.remove(0),
        _ => format!("[{}]", messages.join(", ")),
    }
}
