//! Dispatcher batch semantics, run against fake handlers.
//!
//! The capability table is injected, so no browser and no network are
//! involved; the tests pin down the outcome-aggregation contract.

use async_trait::async_trait;
use multipost::browser::{ProfileStore, SessionManager};
use multipost::config::Config;
use multipost::destinations::{DestinationHandler, HandlerFactory};
use multipost::error::{AppError, ValidationError};
use multipost::models::{
    DestinationDescriptor, DestinationRegistry, UploadOutcome, UploadRequest,
};
use multipost::orchestrator::Dispatcher;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Records which destination keys reached a handler. Tests run in parallel
/// in one binary, so assertions use per-test unique keys, never totals.
static INVOCATIONS: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn record_invocation(key: &str) {
    INVOCATIONS.lock().unwrap().push(key.to_string());
}

fn was_invoked(key: &str) -> bool {
    INVOCATIONS.lock().unwrap().iter().any(|k| k == key)
}

struct OkHandler {
    key: String,
}

#[async_trait]
impl DestinationHandler for OkHandler {
    async fn upload(
        &self,
        _request: &UploadRequest,
        _sessions: &SessionManager,
    ) -> anyhow::Result<UploadOutcome> {
        record_invocation(&self.key);
        Ok(UploadOutcome::ok(
            &self.key,
            Some(format!("https://example.com/{}/1", self.key)),
        ))
    }
}

struct FailingHandler {
    key: String,
}

#[async_trait]
impl DestinationHandler for FailingHandler {
    async fn upload(
        &self,
        _request: &UploadRequest,
        _sessions: &SessionManager,
    ) -> anyhow::Result<UploadOutcome> {
        record_invocation(&self.key);
        anyhow::bail!("step 'file-input' timed out after 20.0s")
    }
}

fn fake_resolve(key: &str) -> Option<HandlerFactory> {
    match key {
        "site_a" | "site_b" | "probe_empty" | "probe_missing" => Some(|d, _| {
            Ok(Box::new(OkHandler {
                key: d.key.clone(),
            }))
        }),
        "failing" => Some(|d, _| {
            Ok(Box::new(FailingHandler {
                key: d.key.clone(),
            }))
        }),
        "broken" => Some(|d, _| Err(AppError::missing_parameter(&d.key, "bot_token"))),
        _ => None,
    }
}

fn descriptor(key: &str, enabled: bool) -> DestinationDescriptor {
    DestinationDescriptor {
        key: key.to_string(),
        display_name: key.to_uppercase(),
        requires_browser_session: false,
        enabled,
        parameters: toml::Table::new(),
    }
}

fn test_registry() -> DestinationRegistry {
    DestinationRegistry {
        destinations: vec![
            descriptor("site_a", true),
            descriptor("site_b", true),
            descriptor("disabled_site", false),
            descriptor("failing", true),
            descriptor("broken", true),
            descriptor("probe_empty", true),
            descriptor("probe_missing", true),
        ],
    }
}

fn dispatcher() -> (Dispatcher, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let sessions = Arc::new(SessionManager::new(ProfileStore::new(dir.path())));
    let dispatcher = Dispatcher::with_resolver(
        test_registry(),
        sessions,
        Config::default(),
        fake_resolve,
    );
    (dispatcher, dir)
}

fn request_for(file: &std::path::Path) -> UploadRequest {
    UploadRequest {
        file_path: file.to_path_buf(),
        title: "Title".to_string(),
        description: "Description".to_string(),
        tags: vec!["tag".to_string()],
        thumbnail_path: None,
    }
}

fn media_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, b"not really a video").unwrap();
    path
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

#[tokio::test]
async fn one_outcome_per_enabled_destination() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&media_file(&dir));

    let result = dispatcher
        .dispatch(&request, &keys(&["site_a", "disabled_site", "unknown_site"]))
        .await
        .unwrap();

    // disabled destinations are skipped without an outcome; unknown keys
    // still produce one
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[0].destination_key, "site_a");
    assert!(result.outcomes[0].success);
    assert_eq!(result.outcomes[1].destination_key, "unknown_site");
    assert_eq!(
        result.outcomes[1].error.as_deref(),
        Some("unknown_site: config not found")
    );
}

#[tokio::test]
async fn unknown_key_invokes_no_handler() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&media_file(&dir));

    let result = dispatcher
        .dispatch(&request, &keys(&["unknown_site"]))
        .await
        .unwrap();

    assert!(!was_invoked("unknown_site"));
    assert_eq!(result.outcomes.len(), 1);
    assert!(!result.all_succeeded());
}

#[tokio::test]
async fn empty_file_path_aborts_with_zero_outcomes() {
    let (dispatcher, _dir) = dispatcher();
    let request = request_for(std::path::Path::new(""));

    let err = dispatcher
        .dispatch(&request, &keys(&["probe_empty"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::MissingFilePath)
    ));
    assert!(!was_invoked("probe_empty"));
}

#[tokio::test]
async fn missing_file_aborts_before_any_destination() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&dir.path().join("does_not_exist.mp4"));

    let err = dispatcher
        .dispatch(&request, &keys(&["probe_missing", "site_b"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::FileNotFound { .. })
    ));
    assert!(!was_invoked("probe_missing"));
}

#[tokio::test]
async fn partial_failure_preserves_order_and_successes() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&media_file(&dir));

    let result = dispatcher
        .dispatch(&request, &keys(&["failing", "site_a", "site_b"]))
        .await
        .unwrap();

    let attempted: Vec<&str> = result
        .outcomes
        .iter()
        .map(|o| o.destination_key.as_str())
        .collect();
    assert_eq!(attempted, vec!["failing", "site_a", "site_b"]);

    assert!(!result.outcomes[0].success);
    assert!(result.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("failing: "));
    // one failure does not stop the rest of the batch
    assert!(result.outcomes[1].success);
    assert!(result.outcomes[2].success);
    assert!(!result.all_succeeded());
    assert_eq!(result.errors().len(), 1);
}

#[tokio::test]
async fn factory_error_becomes_no_entrypoint_outcome() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&media_file(&dir));

    let result = dispatcher
        .dispatch(&request, &keys(&["broken"]))
        .await
        .unwrap();

    assert_eq!(result.outcomes.len(), 1);
    let error = result.outcomes[0].error.as_deref().unwrap();
    assert!(error.starts_with("broken: no entrypoint"), "got: {}", error);
}

#[tokio::test]
async fn key_without_registered_module_is_reported() {
    // present in the registry but absent from the capability table
    let dir = tempfile::tempdir().unwrap();
    let sessions = Arc::new(SessionManager::new(ProfileStore::new(dir.path())));
    let mut registry = test_registry();
    registry.destinations.push(descriptor("orphan", true));
    let dispatcher =
        Dispatcher::with_resolver(registry, sessions, Config::default(), fake_resolve);

    let request = request_for(&media_file(&dir));
    let result = dispatcher
        .dispatch(&request, &keys(&["orphan"]))
        .await
        .unwrap();

    assert_eq!(
        result.outcomes[0].error.as_deref(),
        Some("orphan: module missing")
    );
}

#[tokio::test]
async fn successful_batch_reports_urls() {
    let (dispatcher, dir) = dispatcher();
    let request = request_for(&media_file(&dir));

    let result = dispatcher
        .dispatch(&request, &keys(&["site_a", "site_b"]))
        .await
        .unwrap();

    assert!(result.all_succeeded());
    assert!(result.errors().is_empty());
    assert_eq!(
        result.outcomes[0].result_url.as_deref(),
        Some("https://example.com/site_a/1")
    );
}
