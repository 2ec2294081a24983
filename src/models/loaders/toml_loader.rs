//! TOML loaders for upload jobs and destination registries

use crate::models::destination::DestinationRegistry;
use crate::models::request::UploadRequest;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// One batch described as a TOML file: the request fields plus the
/// destination keys to attempt, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadJob {
    #[serde(flatten)]
    pub request: UploadRequest,
    pub destinations: Vec<String>,
}

/// Load an upload job from a TOML file.
pub async fn load_job(path: &Path) -> Result<UploadJob> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read job file: {}", path.display()))?;

    let job: UploadJob = toml::from_str(&content)
        .with_context(|| format!("failed to parse job file: {}", path.display()))?;

    Ok(job)
}

/// Load a destination registry from a TOML file.
pub async fn load_registry(path: &Path) -> Result<DestinationRegistry> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read destinations file: {}", path.display()))?;

    let registry: DestinationRegistry = toml::from_str(&content)
        .with_context(|| format!("failed to parse destinations file: {}", path.display()))?;

    tracing::info!("loaded {} destination descriptors", registry.destinations.len());
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_toml_parses() {
        let job: UploadJob = toml::from_str(
            r#"
            file_path = "clip.mp4"
            title = "My clip"
            description = "About the clip"
            tags = ["rust", "demo"]
            destinations = ["rutube", "telegram"]
            "#,
        )
        .unwrap();

        assert_eq!(job.request.title, "My clip");
        assert_eq!(job.request.tags.len(), 2);
        assert!(job.request.thumbnail_path.is_none());
        assert_eq!(job.destinations, vec!["rutube", "telegram"]);
    }

    #[test]
    fn registry_toml_parses_with_parameters() {
        let registry: DestinationRegistry = toml::from_str(
            r#"
            [[destination]]
            key = "rutube"
            display_name = "Rutube"
            requires_browser_session = true

            [destination.parameters]
            entry_url = "https://studio.rutube.ru/uploader/"

            [[destination]]
            key = "tiktok"
            display_name = "TikTok"
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(registry.destinations.len(), 2);
        let rutube = registry.get("rutube").unwrap();
        assert!(rutube.enabled);
        assert!(rutube.requires_browser_session);
        assert_eq!(
            rutube.param_str("entry_url"),
            Some("https://studio.rutube.ru/uploader/")
        );
        assert!(!registry.get("tiktok").unwrap().requires_browser_session);
    }
}
