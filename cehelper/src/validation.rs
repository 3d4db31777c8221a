//! Structural presence checks for `ClusterExtension`-shaped resources.
//!
//! The checks are fixed and run in order, stopping at the first missing
//! field. The custom resource definition fetched from the cluster plays no
//! part here; it is only handed to the model as context.

use serde_json::{Map, Value};

/// Outcome of validating a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// All required fields are present
    Valid,
    /// The first required field found missing, as a human-readable reason
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Reason for the failure, empty when valid
    pub fn reason(&self) -> &str {
        match self {
            Self::Valid => "",
            Self::Invalid(reason) => reason,
        }
    }
}

/// Validates that the resource carries every required nested field
pub fn validate(resource: &Value) -> Validation {
    match check(resource) {
        Ok(()) => Validation::Valid,
        Err(reason) => Validation::Invalid(reason.to_string()),
    }
}

fn check(resource: &Value) -> Result<(), &'static str> {
    let spec = object(resource, "spec").ok_or("spec field is missing")?;

    let install = object_in(spec, "install").ok_or("install field is missing")?;
    string_in(install, "namespace").ok_or("namespace is missing in install")?;
    let service_account =
        object_in(install, "serviceAccount").ok_or("serviceAccount is missing in install")?;
    string_in(service_account, "name").ok_or("serviceAccount name is missing")?;

    let source = object_in(spec, "source").ok_or("source field is missing")?;
    string_in(source, "sourceType").ok_or("sourceType is missing in source")?;
    let catalog = object_in(source, "catalog").ok_or("catalog is missing in source")?;
    string_in(catalog, "packageName").ok_or("packageName is missing in catalog")?;

    Ok(())
}

fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

fn object_in<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn string_in<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_resource() -> Value {
        json!({
            "apiVersion": "olm.operatorframework.io/v1alpha1",
            "kind": "ClusterExtension",
            "metadata": { "name": "example" },
            "spec": {
                "install": {
                    "namespace": "example-namespace",
                    "serviceAccount": { "name": "example-sa" }
                },
                "source": {
                    "sourceType": "Catalog",
                    "catalog": { "packageName": "example-package" }
                }
            }
        })
    }

    fn without(path: &[&str]) -> Value {
        let mut resource = valid_resource();
        let (last, parents) = path.split_last().unwrap();
        let mut cursor = &mut resource;
        for key in parents {
            cursor = cursor.get_mut(*key).unwrap();
        }
        cursor.as_object_mut().unwrap().remove(*last);
        resource
    }

    #[test]
    fn test_valid_resource() {
        let result = validate(&valid_resource());
        assert!(result.is_valid());
        assert_eq!(result.reason(), "");
    }

    #[test]
    fn test_missing_fields_report_first_failure() {
        let cases: &[(&[&str], &str)] = &[
            (&["spec"], "spec field is missing"),
            (&["spec", "install"], "install field is missing"),
            (&["spec", "install", "namespace"], "namespace is missing in install"),
            (&["spec", "install", "serviceAccount"], "serviceAccount is missing in install"),
            (&["spec", "install", "serviceAccount", "name"], "serviceAccount name is missing"),
            (&["spec", "source"], "source field is missing"),
            (&["spec", "source", "sourceType"], "sourceType is missing in source"),
            (&["spec", "source", "catalog"], "catalog is missing in source"),
            (&["spec", "source", "catalog", "packageName"], "packageName is missing in catalog"),
        ];

        for (path, reason) in cases {
            let result = validate(&without(path));
            assert_eq!(result, Validation::Invalid(reason.to_string()), "path {path:?}");
        }
    }

    #[test]
    fn test_short_circuits_on_install_before_source() {
        let mut resource = valid_resource();
        resource["spec"]["install"]["namespace"] = Value::Null;
        resource["spec"]["source"] = Value::Null;

        assert_eq!(validate(&resource).reason(), "namespace is missing in install");
    }

    #[test]
    fn test_wrong_types_count_as_missing() {
        let mut resource = valid_resource();
        resource["spec"]["install"]["namespace"] = json!(42);
        assert_eq!(validate(&resource).reason(), "namespace is missing in install");

        let mut resource = valid_resource();
        resource["spec"]["source"]["catalog"] = Value::Null;
        assert_eq!(validate(&resource).reason(), "catalog is missing in source");

        let mut resource = valid_resource();
        resource["spec"] = json!(["install"]);
        assert_eq!(validate(&resource).reason(), "spec field is missing");
    }

    #[test]
    fn test_non_object_resource() {
        assert_eq!(validate(&Value::Null).reason(), "spec field is missing");
        assert_eq!(validate(&json!("spec")).reason(), "spec field is missing");
    }
}
