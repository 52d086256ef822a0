// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::field::*;

    fn ibmcloud() -> FieldPath {
        FieldPath::new("platform").child("ibmcloud")
    }

    // ============================================================================
    // FieldPath
    // ============================================================================

    #[test]
    fn test_path_children_and_indexes() {
        let path = ibmcloud().child("serviceEndpoints").index(1).child("name");
        assert_eq!(path.to_string(), "platform.ibmcloud.serviceEndpoints[1].name");
    }

    #[test]
    fn test_child_of_empty_path_has_no_leading_dot() {
        assert_eq!(FieldPath::default().child("vpc").to_string(), "vpc");
    }

    // ============================================================================
    // FieldError rendering
    // ============================================================================

    #[test]
    fn test_not_found_quotes_value() {
        let err = FieldError::not_found(&ibmcloud().child("vpc"), "missing-vpc");
        assert_eq!(err.to_string(), "platform.ibmcloud.vpc: Not found: \"missing-vpc\"");
    }

    #[test]
    fn test_invalid_includes_value_and_detail() {
        let err = FieldError::invalid(
            &ibmcloud().child("networkResourceGroupName"),
            "",
            "networkResourceGroupName cannot be empty when providing a vpc: valid-vpc",
        );
        assert_eq!(
            err.to_string(),
            "platform.ibmcloud.networkResourceGroupName: Invalid value: \"\": networkResourceGroupName cannot be empty when providing a vpc: valid-vpc"
        );
    }

    #[test]
    fn test_internal_omits_value() {
        let err = FieldError::internal(&ibmcloud().child("controlPlaneSubnets"), "ibmcloud error");
        assert_eq!(
            err.to_string(),
            "platform.ibmcloud.controlPlaneSubnets: Internal error: ibmcloud error"
        );
    }

    #[test]
    fn test_required_omits_value() {
        let err = FieldError::required(&ibmcloud().child("region"), "region is required");
        assert_eq!(
            err.to_string(),
            "platform.ibmcloud.region: Required value: region is required"
        );
    }

    #[test]
    fn test_duplicate_value() {
        let path = ibmcloud().child("serviceEndpoints").index(1).child("name");
        let err = FieldError::duplicate(&path, "IAM");
        assert_eq!(
            err.to_string(),
            "platform.ibmcloud.serviceEndpoints[1].name: Duplicate value: \"IAM\""
        );
    }

    #[test]
    fn test_numeric_value_is_not_quoted() {
        let err = FieldError::invalid(&FieldPath::new("controlPlane").child("replicas"), 0, "must be positive");
        assert_eq!(err.to_string(), "controlPlane.replicas: Invalid value: 0: must be positive");
    }

    #[test]
    fn test_not_supported_lists_values() {
        let err = FieldError::not_supported(&FieldPath::new("publish"), "Mixed", &["External", "Internal"]);
        assert_eq!(
            err.to_string(),
            "publish: Unsupported value: \"Mixed\": supported values: \"External\", \"Internal\""
        );
    }

    // ============================================================================
    // AggregateError
    // ============================================================================

    #[test]
    fn test_empty_list_is_ok() {
        assert!(to_aggregate(Vec::new()).is_ok());
    }

    #[test]
    fn test_single_error_renders_alone() {
        let err = to_aggregate(vec![FieldError::not_found(&ibmcloud().child("vpc"), "x")]).unwrap_err();
        assert_eq!(err.to_string(), "platform.ibmcloud.vpc: Not found: \"x\"");
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_multiple_errors_render_bracketed() {
        let err = to_aggregate(vec![
            FieldError::not_found(&ibmcloud().child("vpc"), "x"),
            FieldError::internal(&ibmcloud().child("resourceGroupName"), "boom"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[platform.ibmcloud.vpc: Not found: \"x\", platform.ibmcloud.resourceGroupName: Internal error: boom]"
        );
    }

    #[test]
    fn test_duplicate_messages_render_once() {
        let dup = FieldError::not_found(&ibmcloud().child("vpc"), "x");
        let err = to_aggregate(vec![dup.clone(), dup]).unwrap_err();
        assert_eq!(err.to_string(), "platform.ibmcloud.vpc: Not found: \"x\"");
        assert_eq!(err.errors().len(), 2);
    }
}
