//! Lookup of the custom resource definition describing a resource.

use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::{GroupVersion, GroupVersionKind};
use kube::{Api, Client, discovery};
use serde_json::Value;

use crate::{Error, Result};

/// Source of schema definitions, keyed by group/version/kind
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Returns the definition of `gvk` as an opaque document
    async fn definition(&self, gvk: &GroupVersionKind) -> Result<Value>;
}

/// Reads the `GroupVersionKind` declared by a resource's `apiVersion` and `kind`
pub fn resource_gvk(resource: &Value) -> Result<GroupVersionKind> {
    let api_version = resource
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::UnresolvedKind("apiVersion is missing".into()))?;
    let kind = resource
        .get("kind")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
        .ok_or_else(|| Error::UnresolvedKind("kind is missing".into()))?;

    let gv: GroupVersion = api_version
        .parse()
        .map_err(|err| Error::UnresolvedKind(format!("{api_version}: {err}")))?;

    Ok(gv.with_kind(kind))
}

/// Name under which a CRD for `plural` resources of `group` is registered
pub fn crd_name(plural: &str, group: &str) -> String {
    format!("{plural}.{group}")
}

/// Fetches custom resource definitions from the cluster
///
/// The plural resource name is resolved through API discovery, and the CRD
/// is read as `<plural>.<group>`.
#[derive(Clone)]
pub struct KubeSchemaSource {
    client: Client,
}

impl KubeSchemaSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SchemaSource for KubeSchemaSource {
    async fn definition(&self, gvk: &GroupVersionKind) -> Result<Value> {
        let (resource, _caps) = discovery::pinned_kind(&self.client, gvk)
            .await
            .map_err(Error::SchemaFetch)?;

        let name = crd_name(&resource.plural, &gvk.group);
        tracing::debug!(crd = %name, "fetching custom resource definition");

        let crds = Api::<CustomResourceDefinition>::all(self.client.clone());
        let crd = crds.get(&name).await.map_err(Error::SchemaFetch)?;

        Ok(serde_json::to_value(crd)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_gvk_with_group() {
        let resource = json!({
            "apiVersion": "olm.operatorframework.io/v1alpha1",
            "kind": "ClusterExtension"
        });

        let gvk = resource_gvk(&resource).unwrap();
        assert_eq!(gvk.group, "olm.operatorframework.io");
        assert_eq!(gvk.version, "v1alpha1");
        assert_eq!(gvk.kind, "ClusterExtension");
    }

    #[test]
    fn test_resource_gvk_core_group() {
        let gvk = resource_gvk(&json!({ "apiVersion": "v1", "kind": "ConfigMap" })).unwrap();
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
    }

    #[test]
    fn test_resource_gvk_missing_fields() {
        let err = resource_gvk(&json!({ "kind": "ClusterExtension" })).unwrap_err();
        assert!(matches!(err, Error::UnresolvedKind(_)));

        let err = resource_gvk(&json!({ "apiVersion": "v1" })).unwrap_err();
        assert!(matches!(err, Error::UnresolvedKind(_)));
    }

    #[test]
    fn test_crd_name() {
        assert_eq!(
            crd_name("clusterextensions", "olm.operatorframework.io"),
            "clusterextensions.olm.operatorframework.io"
        );
    }
}
