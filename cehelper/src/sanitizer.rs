//! Extraction of a YAML document from a free-form model reply.
//!
//! Models wrap their answer in prose, markdown fences and trailing notes,
//! and occasionally emit invisible or typographic characters that break YAML
//! parsing. The line scanner below is intentionally literal: collection
//! starts at the first `apiVersion:`/`kind:` line and stops at the first
//! `Note:` or fence line.

use clap::ValueEnum;

use crate::{Error, Result};

const START_MARKERS: [&str; 2] = ["apiVersion:", "kind:"];
const STOP_MARKERS: [&str; 2] = ["Note:", FENCE];
const FENCE: &str = "```";

/// How the document is located inside the model reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Extraction {
    /// Collect lines from the first top-level marker up to a note or fence
    #[default]
    LineScan,
    /// Strip a single surrounding fence pair when both fences are present
    FencePair,
}

impl Extraction {
    pub fn extract(self, response: &str) -> String {
        match self {
            Self::LineScan => scan_lines(response),
            Self::FencePair => strip_fence_pair(response),
        }
    }
}

/// Extracts and cleans the document embedded in `response`
///
/// Fails with [`Error::NonConformingOutput`] when the cleaned text carries
/// neither an `apiVersion:` nor a `kind:` marker.
pub fn sanitize(response: &str, extraction: Extraction) -> Result<String> {
    let cleaned = strip_non_printable(&extraction.extract(response));

    if !START_MARKERS.iter().any(|marker| cleaned.contains(marker)) {
        return Err(Error::NonConformingOutput);
    }

    Ok(cleaned)
}

fn scan_lines(response: &str) -> String {
    let mut collected = Vec::new();
    let mut collecting = false;

    for line in response.split('\n') {
        let trimmed = line.trim();
        if START_MARKERS.iter().any(|marker| trimmed.starts_with(marker)) {
            collecting = true;
        }
        if !collecting {
            continue;
        }
        if STOP_MARKERS.iter().any(|marker| trimmed.starts_with(marker)) {
            break;
        }
        collected.push(line);
    }

    collected.join("\n")
}

fn strip_fence_pair(response: &str) -> String {
    let trimmed = response.trim();

    let Some(inner) = trimmed
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    else {
        return trimmed.to_string();
    };

    // drop the language tag that follows the opening fence
    match inner.split_once('\n') {
        Some((_, body)) => body.to_string(),
        None => String::new(),
    }
}

/// Keeps newlines, carriage returns and printable ASCII only
pub fn strip_non_printable(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '\n' | '\r' | ' '..='~'))
        .collect()
}
