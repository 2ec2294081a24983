//! Upload dispatcher - orchestration layer
//!
//! Resolves destination keys against the registry, invokes the matching
//! handlers in caller order and aggregates per-destination outcomes. One
//! destination failing never aborts the batch; the caller always gets the
//! full structured [`BatchResult`] and derives "all succeeded" itself.

use crate::browser::SessionManager;
use crate::config::Config;
use crate::destinations::{self, HandlerFactory};
use crate::error::{AppError, AppResult, DispatchError, ValidationError};
use crate::models::{BatchResult, DestinationRegistry, UploadOutcome, UploadRequest};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Capability lookup: destination key -> handler factory. Injectable so
/// tests can run batches against fake handlers.
pub type Resolver = fn(&str) -> Option<HandlerFactory>;

pub struct Dispatcher {
    registry: DestinationRegistry,
    sessions: Arc<SessionManager>,
    config: Config,
    resolver: Resolver,
}

impl Dispatcher {
    pub fn new(registry: DestinationRegistry, sessions: Arc<SessionManager>, config: Config) -> Self {
        Self::with_resolver(registry, sessions, config, destinations::resolve)
    }

    pub fn with_resolver(
        registry: DestinationRegistry,
        sessions: Arc<SessionManager>,
        config: Config,
        resolver: Resolver,
    ) -> Self {
        Self {
            registry,
            sessions,
            config,
            resolver,
        }
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// Upload one file to every requested destination.
    ///
    /// Validation of the shared input file happens before any destination is
    /// touched; a missing file aborts the whole batch with zero outcomes.
    /// After that, every requested key produces exactly one outcome unless
    /// the destination is disabled (skipped silently).
    pub async fn dispatch(
        &self,
        request: &UploadRequest,
        destination_keys: &[String],
    ) -> AppResult<BatchResult> {
        if request.file_path.as_os_str().is_empty() {
            return Err(AppError::Validation(ValidationError::MissingFilePath));
        }
        if !request.file_path.exists() {
            return Err(AppError::Validation(ValidationError::FileNotFound {
                path: request.file_path.display().to_string(),
            }));
        }

        // Sessions start lazily per destination; this only decides whether
        // there is shared browser state to tear down afterwards.
        let browser_involved = destination_keys.iter().any(|key| {
            self.registry
                .get(key)
                .is_some_and(|d| d.enabled && d.requires_browser_session)
        });

        let mut batch = BatchResult::default();

        for key in destination_keys {
            let Some(descriptor) = self.registry.get(key) else {
                warn!("destination '{}' not in registry", key);
                batch.push(UploadOutcome::failed(
                    key,
                    DispatchError::ConfigNotFound { key: key.clone() }.to_string(),
                ));
                continue;
            };

            if !descriptor.enabled {
                info!("{} disabled, skipping", key);
                continue;
            }

            let Some(factory) = (self.resolver)(key) else {
                warn!("no handler registered for '{}'", key);
                batch.push(UploadOutcome::failed(
                    key,
                    DispatchError::ModuleMissing { key: key.clone() }.to_string(),
                ));
                continue;
            };

            let handler = match factory(descriptor, &self.config) {
                Ok(handler) => handler,
                Err(e) => {
                    error!("could not construct handler for '{}': {}", key, e);
                    batch.push(UploadOutcome::failed(
                        key,
                        DispatchError::NoEntrypoint {
                            key: key.clone(),
                            reason: e.to_string(),
                        }
                        .to_string(),
                    ));
                    continue;
                }
            };

            info!(
                "[UPLOAD] {} | browser={} | file={}",
                key,
                descriptor.requires_browser_session,
                request.file_path.display()
            );
            match handler.upload(request, &self.sessions).await {
                Ok(outcome) => batch.push(outcome),
                Err(e) => {
                    error!("{}: {}", key, e);
                    batch.push(UploadOutcome::failed(
                        key,
                        DispatchError::Handler {
                            key: key.clone(),
                            message: e.to_string(),
                        }
                        .to_string(),
                    ));
                }
            }
        }

        // Tear-down is best-effort; its own failures stay out of the result.
        if browser_involved {
            self.sessions.stop_all().await;
        }

        Ok(batch)
    }
}
