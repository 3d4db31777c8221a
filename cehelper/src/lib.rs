//! Admission webhook that repairs non-conforming custom resources
//!
//! Create and update requests for a `ClusterExtension`-shaped resource are
//! checked for a fixed set of required fields. Invalid resources are handed,
//! together with their custom resource definition, to a language model; the
//! corrected copy it returns is sanitized, validated again and sent back to
//! the API server as a JSON Patch.

pub mod admission;
pub mod config;
pub mod error;
pub mod patch;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod sanitizer;
pub mod schema;
pub mod server;
pub mod telemetry;
pub mod validation;

pub use admission::MutatingAdmissionHandler;
pub use config::Settings;
pub use error::{Error, Result};
pub use pipeline::{Repair, Repairer};
pub use provider::{CompletionProvider, ProviderConfig, ProviderError};
pub use sanitizer::Extraction;
pub use schema::{KubeSchemaSource, SchemaSource};
pub use server::WebhookServer;
pub use validation::{Validation, validate};
