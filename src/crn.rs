// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IBM Cloud Resource Name parsing.
//!
//! A CRN has ten colon separated segments:
//!
//! ```text
//! crn:v1:bluemix:public:kms:us-south:a/<account>:<instance>:key:<key-id>
//! ```

use crate::errors::ApiError;
use std::fmt;
use std::str::FromStr;

const CRN_PREFIX: &str = "crn";
const CRN_SEGMENTS: usize = 10;

/// A parsed Cloud Resource Name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crn {
    pub version: String,
    pub cname: String,
    pub ctype: String,
    pub service_name: String,
    pub location: String,
    pub scope: String,
    pub service_instance: String,
    pub resource_type: String,
    pub resource: String,
}

impl Crn {
    /// Parse a CRN string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCrn`] when the string does not start with `crn`
    /// or does not have exactly ten segments.
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        let segments: Vec<&str> = value.split(':').collect();
        if segments.len() != CRN_SEGMENTS {
            return Err(ApiError::InvalidCrn {
                crn: value.to_string(),
                reason: format!(
                    "expected {CRN_SEGMENTS} segments, found {}",
                    segments.len()
                ),
            });
        }
        if segments[0] != CRN_PREFIX {
            return Err(ApiError::InvalidCrn {
                crn: value.to_string(),
                reason: format!("must start with {CRN_PREFIX:?}"),
            });
        }

        Ok(Self {
            version: segments[1].to_string(),
            cname: segments[2].to_string(),
            ctype: segments[3].to_string(),
            service_name: segments[4].to_string(),
            location: segments[5].to_string(),
            scope: segments[6].to_string(),
            service_instance: segments[7].to_string(),
            resource_type: segments[8].to_string(),
            resource: segments[9].to_string(),
        })
    }
}

impl FromStr for Crn {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crn::parse(s)
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CRN_PREFIX}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.version,
            self.cname,
            self.ctype,
            self.service_name,
            self.location,
            self.scope,
            self.service_instance,
            self.resource_type,
            self.resource
        )
    }
}
