use std::path::PathBuf;

use kube::core::admission::{ConvertAdmissionReviewError, SerializePatchError};
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur while reviewing and repairing a resource
#[derive(Error, Debug)]
pub enum Error {
    /// The request body is not an admission review
    #[error("Could not decode body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The admission review carries no request
    #[error("Could not decode body: {0}")]
    InvalidReview(#[from] ConvertAdmissionReviewError),

    /// Neither completion provider is configured
    #[error("neither LOCAL_LLM_URL nor OPENAI_API_KEY environment variable is set")]
    NoProvider,

    /// A create or update request arrived without an object
    #[error("no object in admission request")]
    MissingObject,

    /// The resource does not name a resolvable apiVersion and kind
    #[error("cannot resolve resource kind: {0}")]
    UnresolvedKind(String),

    /// Looking up the custom resource definition failed
    #[error("failed to retrieve CRD: {0}")]
    SchemaFetch(#[source] kube::Error),

    /// The completion provider failed
    #[error("completion provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model reply does not contain a resource document
    #[error("model returned non-YAML content instead of corrected CR")]
    NonConformingOutput,

    /// The sanitized model reply is not valid YAML
    #[error("failed to convert adjusted CR YAML to JSON: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The repaired resource still misses a required field
    #[error("adjusted CR is still invalid: {0}")]
    StillInvalid(String),

    /// Error during JSON serialization/deserialization
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error while rendering a document as YAML
    #[error("failed to render YAML: {0}")]
    Render(#[source] serde_yaml::Error),

    /// The computed patch could not be attached to the response
    #[error("failed to serialize patch: {0}")]
    Patch(#[from] SerializePatchError),

    /// Error from the Kubernetes client
    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),

    /// A TLS certificate or key file could not be read
    #[error("failed to read {path}: {source}")]
    Tls {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TLS listener could not be set up
    #[error("failed to bind webhook server: {0}")]
    Bind(#[source] warp::Error),
}

/// Result type for cehelper operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
