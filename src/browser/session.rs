//! Shared browser session manager
//!
//! Process-wide registry of live CDP sessions keyed by profile name. The
//! registry is explicitly constructed and passed by reference; handlers
//! re-acquire sessions through [`SessionManager::start`] instead of holding
//! them across calls.
//!
//! Invariant: at most one live session per profile name. All registry
//! mutations go through one async mutex, so two concurrent starts for the
//! same profile can never race two browsers into existence.

use crate::browser::profile::ProfileStore;
use crate::error::{AppError, AppResult, SessionError};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

struct SessionEntry {
    browser: Browser,
    page: Page,
}

/// Registry of live browser sessions.
pub struct SessionManager {
    profiles: ProfileStore,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(profiles: ProfileStore) -> Self {
        Self {
            profiles,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start or reuse the session for a profile.
    ///
    /// An existing session is probed cheaply first; if it still responds it
    /// is returned as-is, otherwise it is discarded and replaced. A freshly
    /// launched browser is polled for responsiveness up to `timeout`; not
    /// becoming responsive in time is logged but non-fatal, callers discover
    /// real failure on first use.
    pub async fn start(
        &self,
        profile_name: &str,
        headless: bool,
        extra_args: &[String],
        timeout: Duration,
    ) -> AppResult<Page> {
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get(profile_name) {
            match entry.page.url().await {
                Ok(_) => {
                    info!("reusing existing session for profile '{}'", profile_name);
                    return Ok(entry.page.clone());
                }
                Err(e) => {
                    warn!(
                        "session for '{}' is unresponsive ({}), restarting",
                        profile_name, e
                    );
                    if let Some(stale) = sessions.remove(profile_name) {
                        close_entry(profile_name, stale).await;
                    }
                }
            }
        }

        // A crashed prior session may have left lock markers behind.
        self.profiles.remove_lock(profile_name);
        let profile_path = self.profiles.path_for(profile_name);

        info!(
            "launching browser for profile '{}' (path={}, headless={})",
            profile_name,
            profile_path.display(),
            headless
        );

        let mut args: Vec<String> = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-extensions".to_string(),
        ];
        if headless {
            args.push("--disable-gpu".to_string());
        }
        args.extend(extra_args.iter().cloned());

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&profile_path)
            .args(args.iter().map(|s| s.as_str()).collect::<Vec<_>>());
        // Do not also pass --profile-directory; CDP treats the combination
        // as conflicting options.
        builder = if headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };

        let browser_config =
            builder
                .build()
                .map_err(|reason| AppError::Session(SessionError::ConfigurationFailed {
                    profile: profile_name.to_string(),
                    reason,
                }))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::launch_failed(profile_name, e))?;

        // Drive CDP events in the background for the session's lifetime.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(|e| {
            AppError::Session(SessionError::PageCreationFailed {
                profile: profile_name.to_string(),
                source: Box::new(e),
            })
        })?;

        self.wait_until_responsive(profile_name, &page, timeout).await;

        let handle = page.clone();
        sessions.insert(profile_name.to_string(), SessionEntry { browser, page });
        Ok(handle)
    }

    /// Poll a fresh session until it answers a trivial query or the window
    /// elapses. Never fails; an unresponsive browser is still registered.
    async fn wait_until_responsive(&self, profile_name: &str, page: &Page, timeout: Duration) {
        let started = Instant::now();
        while started.elapsed() < timeout {
            if page.url().await.is_ok() {
                debug!(
                    "session for '{}' responsive after {:.1}s",
                    profile_name,
                    started.elapsed().as_secs_f64()
                );
                return;
            }
            sleep(Duration::from_millis(200)).await;
        }
        warn!(
            "browser for '{}' launched but not responsive within {:.0}s",
            profile_name,
            timeout.as_secs_f64()
        );
    }

    /// Stop and forget the session for a profile. Close failures are logged,
    /// never raised; the registry entry is removed regardless so the next
    /// start gets fresh state.
    pub async fn stop(&self, profile_name: &str) {
        let entry = self.sessions.lock().await.remove(profile_name);
        if let Some(entry) = entry {
            close_entry(profile_name, entry).await;
        }
    }

    /// Stop every registered session; called at the end of a batch that
    /// required a shared session.
    pub async fn stop_all(&self) {
        let entries: Vec<(String, SessionEntry)> =
            self.sessions.lock().await.drain().collect();
        for (name, entry) in entries {
            close_entry(&name, entry).await;
        }
        info!("all browser sessions stopped");
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

async fn close_entry(profile_name: &str, mut entry: SessionEntry) {
    if let Err(e) = entry.browser.close().await {
        warn!("could not close browser for '{}': {}", profile_name, e);
        return;
    }
    let _ = entry.browser.wait().await;
    debug!("session for '{}' closed", profile_name);
}
