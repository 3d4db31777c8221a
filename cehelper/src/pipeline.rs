//! The validate, repair and patch pipeline.
//!
//! A resource that passes validation is admitted untouched. Otherwise its
//! custom resource definition is fetched, the model is asked once for a
//! corrected copy, the copy is sanitized, parsed and validated again, and the
//! difference to the submitted resource is returned as a JSON Patch. Every
//! failure is terminal for the request; nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use json_patch::Patch;
use kube::api::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, Operation};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::admission::MutatingAdmissionHandler;
use crate::patch::build_patch;
use crate::prompt::repair_prompt;
use crate::provider::CompletionProvider;
use crate::sanitizer::{Extraction, sanitize};
use crate::schema::{SchemaSource, resource_gvk};
use crate::validation::{Validation, validate};
use crate::{Error, Result};

/// Outcome of running the pipeline on a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    /// The resource already conforms
    Unchanged,
    /// The patch turning the resource into its repaired form
    Patched(Patch),
}

/// Repairs non-conforming resources with a language model
pub struct Repairer {
    provider: Arc<dyn CompletionProvider>,
    schemas: Arc<dyn SchemaSource>,
    extraction: Extraction,
}

impl Repairer {
    pub fn new(provider: Arc<dyn CompletionProvider>, schemas: Arc<dyn SchemaSource>) -> Self {
        Self {
            provider,
            schemas,
            extraction: Extraction::default(),
        }
    }

    /// Selects how the document is located in model replies
    #[must_use]
    pub fn with_extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Validates `resource` and, when invalid, repairs it into a patch
    pub async fn repair(&self, resource: &Value) -> Result<Repair> {
        let reason = match validate(resource) {
            Validation::Valid => return Ok(Repair::Unchanged),
            Validation::Invalid(reason) => reason,
        };
        info!(reason = %reason, "resource is invalid, requesting repair");

        let gvk = resource_gvk(resource)?;
        let definition = self.schemas.definition(&gvk).await?;

        let adjusted = self.adjust(resource, &definition).await?;

        if let Validation::Invalid(reason) = validate(&adjusted) {
            warn!(reason = %reason, "adjusted resource is still invalid");
            return Err(Error::StillInvalid(reason));
        }

        let patch = build_patch(resource, &adjusted);
        debug!(patch = %serde_json::to_string(&patch)?, "computed patch");

        Ok(Repair::Patched(patch))
    }

    /// Asks the model for a copy of `resource` conforming to `definition`
    ///
    /// The returned document is parsed but not validated.
    pub async fn adjust(&self, resource: &Value, definition: &Value) -> Result<Value> {
        let prompt = repair_prompt(resource, definition)?;
        debug!(provider = self.provider.name(), %prompt, "sending repair prompt");

        let raw = self.provider.complete(&prompt).await?;
        debug!(%raw, "raw completion");

        let sanitized = sanitize(&raw, self.extraction).inspect_err(|_| {
            warn!(%raw, "completion does not contain a resource document");
        })?;
        debug!(%sanitized, "sanitized completion");

        serde_yaml::from_str(&sanitized).map_err(|err| {
            warn!(error = %err, %sanitized, "sanitized completion is not valid YAML");
            Error::Parse(err)
        })
    }
}

#[async_trait]
impl MutatingAdmissionHandler for Repairer {
    type Err = Error;

    fn name(&self) -> &'static str {
        "Repairer"
    }

    async fn mutate(&self, req: &AdmissionRequest<DynamicObject>) -> Result<AdmissionResponse> {
        if !matches!(req.operation, Operation::Create | Operation::Update) {
            return Ok(AdmissionResponse::from(req));
        }

        let object = req.object.as_ref().ok_or(Error::MissingObject)?;
        let resource = serde_json::to_value(object)?;

        match self.repair(&resource).await? {
            Repair::Unchanged => Ok(AdmissionResponse::from(req)),
            Repair::Patched(patch) => Ok(AdmissionResponse::from(req).with_patch(patch)?),
        }
    }
}
