//! Upload request and outcome types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One user-initiated upload batch.
///
/// Created once per batch and shared read-only with every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Path to the media file
    pub file_path: PathBuf,
    /// Publication title
    pub title: String,
    /// Publication description
    #[serde(default)]
    pub description: String,
    /// Tags, appended to the description as hashtags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional thumbnail image
    #[serde(default)]
    pub thumbnail_path: Option<PathBuf>,
}

impl UploadRequest {
    /// Description with `#tag` tokens appended.
    ///
    /// Tags go into the description only, matching how the destinations
    /// actually surface them.
    pub fn hashtag_description(&self) -> String {
        if self.tags.is_empty() {
            return self.description.clone();
        }
        let hashtags = self
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        if self.description.is_empty() {
            hashtags
        } else {
            format!("{}\n\n{}", self.description, hashtags)
        }
    }

    /// Thumbnail path if it exists on disk; a missing thumbnail degrades
    /// to `None` with a warning, it never fails the upload.
    pub fn existing_thumbnail(&self) -> Option<&PathBuf> {
        match &self.thumbnail_path {
            Some(p) if p.exists() => Some(p),
            Some(p) => {
                tracing::warn!("thumbnail not found, skipping: {}", p.display());
                None
            }
            None => None,
        }
    }
}

/// Success/failure record for one destination within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub destination_key: String,
    pub success: bool,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn ok(key: impl Into<String>, result_url: Option<String>) -> Self {
        Self {
            destination_key: key.into(),
            success: true,
            result_url,
            error: None,
        }
    }

    pub fn failed(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            destination_key: key.into(),
            success: false,
            result_url: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of a batch, one outcome per attempted destination,
/// in the caller-supplied order.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchResult {
    pub fn push(&mut self, outcome: UploadOutcome) {
        self.outcomes.push(outcome);
    }

    /// The batch as a whole succeeded only if every attempted destination did.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Human-readable error strings, one per failed destination.
    pub fn errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| {
                o.error
                    .clone()
                    .unwrap_or_else(|| format!("{}: unknown error", o.destination_key))
            })
            .collect()
    }
}
