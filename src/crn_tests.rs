// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::crn::*;
    use crate::errors::ApiError;

    const KEY_CRN: &str = "crn:v1:bluemix:public:kms:us-south:a/1234:5678-instance:key:abcd-key";

    #[test]
    fn test_parse_key_protect_crn() {
        let crn = Crn::parse(KEY_CRN).unwrap();
        assert_eq!(crn.service_name, "kms");
        assert_eq!(crn.location, "us-south");
        assert_eq!(crn.scope, "a/1234");
        assert_eq!(crn.service_instance, "5678-instance");
        assert_eq!(crn.resource_type, "key");
        assert_eq!(crn.resource, "abcd-key");
    }

    #[test]
    fn test_display_round_trips() {
        let crn: Crn = "crn:v1:bluemix:public:dns-svcs:global:a/1:inst-1::"
            .parse()
            .unwrap();
        assert_eq!(crn.to_string(), "crn:v1:bluemix:public:dns-svcs:global:a/1:inst-1::");
    }

    #[test]
    fn test_too_few_segments_fails() {
        let err = Crn::parse("crn:v1:bluemix").unwrap_err();
        assert!(matches!(err, ApiError::InvalidCrn { .. }));
        assert!(err.to_string().contains("expected 10 segments"));
    }

    #[test]
    fn test_wrong_prefix_fails() {
        let err = Crn::parse("urn:v1:bluemix:public:kms:us-south:a/1:i::k").unwrap_err();
        assert!(err.to_string().contains("must start with"));
    }
}
