use json_patch::Patch;
use serde_json::Value;

/// Computes the JSON Patch (RFC 6902) turning `original` into `adjusted`
pub fn build_patch(original: &Value, adjusted: &Value) -> Patch {
    json_patch::diff(original, adjusted)
}
