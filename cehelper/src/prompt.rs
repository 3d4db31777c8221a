use serde_json::Value;

use crate::{Error, Result};

/// Renders the repair instructions for `resource` given its `definition`
///
/// Both documents are embedded as YAML. The validation failure reason is not
/// part of the prompt.
pub fn repair_prompt(resource: &Value, definition: &Value) -> Result<String> {
    let resource_yaml = serde_yaml::to_string(resource).map_err(Error::Render)?;
    let definition_yaml = serde_yaml::to_string(definition).map_err(Error::Render)?;

    Ok(format!(
        r#"You are an expert in Kubernetes custom resources.

**Definitions:**

- **Custom Resource Definition (CRD):** A schema that defines the structure and validation rules for a custom resource in Kubernetes.
- **Custom Resource (CR):** An instance of a custom resource that must conform to the schema defined by a CRD.

**Task:**

Given the following Custom Resource Definition (CRD):

---
{definition_yaml}
---

And the following Custom Resource (CR) that may not conform to the CRD:

---
{resource_yaml}
---

Please adjust the CR so that it conforms to the CRD schema.

- Return only the corrected CR in YAML format.
- Exclude 'annotations', 'managedFields', 'status', and any other unnecessary fields.
- Do not include any explanations, notes, or additional text."#
    ))
}
