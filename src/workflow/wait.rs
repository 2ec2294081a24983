//! Condition-wait primitives
//!
//! Every browser-driven flow is a sequence of "wait for a condition on the
//! remote page, then act" steps. The primitives here are generic over an
//! async probe so the timing contracts stay testable without a browser:
//! production code passes page probes, tests pass scripted closures.

use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Timeout and polling interval for one wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Same interval, reduced budget. Used for the primary half of a
    /// fallback-locator wait.
    pub fn slice(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            interval: self.interval,
        }
    }
}

/// Poll an async probe until it yields a value or the budget elapses.
///
/// The probe runs immediately, then at `interval` until `timeout`. A probe
/// that never yields produces a `StepTimeout` tagged with `step`.
pub async fn poll_until<T, F, Fut>(step: &str, policy: WaitPolicy, mut probe: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await {
            debug!(
                "step '{}' satisfied after {:.1}s",
                step,
                started.elapsed().as_secs_f64()
            );
            return Ok(value);
        }
        if started.elapsed() >= policy.timeout {
            return Err(AppError::step_timeout(step, started.elapsed()));
        }
        sleep(policy.interval).await;
    }
}

/// Wait for the interactive login round-trip to finish.
///
/// The sole authentication signal is the URL: after the login trigger is
/// clicked the page leaves `origin_url` (the flow started) and eventually
/// returns to it (the flow completed). Any number of intermediate redirect
/// URLs is tolerated; both phases share one deadline.
pub async fn wait_for_auth_return<F, Fut>(
    step: &str,
    policy: WaitPolicy,
    origin_url: &str,
    mut current_url: F,
) -> AppResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let started = Instant::now();

    // Phase 1: the URL diverges from the origin.
    loop {
        if let Some(url) = current_url().await {
            if url != origin_url {
                debug!("'{}': login flow started (at {})", step, url);
                break;
            }
        }
        if started.elapsed() >= policy.timeout {
            return Err(AppError::auth_timeout(step, started.elapsed()));
        }
        sleep(policy.interval).await;
    }

    // Phase 2: the URL returns to the origin.
    loop {
        if let Some(url) = current_url().await {
            if url == origin_url {
                debug!(
                    "'{}': login flow completed after {:.1}s",
                    step,
                    started.elapsed().as_secs_f64()
                );
                return Ok(());
            }
        }
        if started.elapsed() >= policy.timeout {
            return Err(AppError::auth_timeout(step, started.elapsed()));
        }
        sleep(policy.interval).await;
    }
}

/// What ended a publish wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishSignal {
    /// The page navigated away from the edit URL
    UrlChanged(String),
    /// The destination reported readiness in the page content
    MarkerSeen,
}

/// One observation of the page during the publish wait.
#[derive(Debug, Clone, Default)]
pub struct PublishProbe {
    pub url: Option<String>,
    pub marker_seen: bool,
}

/// Wait until either the URL leaves `origin_url` or a ready marker shows up,
/// whichever happens first.
///
/// The probe runs on every poll tick, so callers fold the publish re-click
/// into it; clicking may be a no-op until the UI settles.
pub async fn wait_for_publish<F, Fut>(
    step: &str,
    policy: WaitPolicy,
    origin_url: &str,
    mut probe: F,
) -> AppResult<PublishSignal>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PublishProbe>,
{
    poll_until(step, policy, || {
        let observed = probe();
        async move {
            let observed = observed.await;
            if observed.marker_seen {
                return Some(PublishSignal::MarkerSeen);
            }
            match observed.url {
                Some(url) if url != origin_url => Some(PublishSignal::UrlChanged(url)),
                _ => None,
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    fn fast_policy() -> WaitPolicy {
        WaitPolicy::new(Duration::from_millis(100), Duration::from_millis(5))
    }

    /// Yields scripted values, repeating the last one once exhausted.
    fn scripted_urls(urls: &[&str]) -> Mutex<VecDeque<String>> {
        Mutex::new(urls.iter().map(|u| u.to_string()).collect())
    }

    fn next_url(script: &Mutex<VecDeque<String>>) -> Option<String> {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }

    #[tokio::test]
    async fn poll_until_returns_first_success() {
        let calls = Mutex::new(0u32);
        let result = poll_until("probe", fast_policy(), || {
            let mut calls = calls.lock().unwrap();
            *calls += 1;
            let done = *calls >= 3;
            async move { done.then_some(42) }
        })
        .await;
        assert_eq!(assert_ok!(result), 42);
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn poll_until_times_out_with_step_name() {
        let result: AppResult<()> =
            poll_until("upload-button", fast_policy(), || async { None }).await;
        match result {
            Err(AppError::Step(StepError::Timeout { step, .. })) => {
                assert_eq!(step, "upload-button");
            }
            other => panic!("expected step timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn auth_wait_succeeds_when_url_returns_to_origin() {
        // A -> B -> C -> A: success exactly when the URL is back at A,
        // whatever the intermediate hops were.
        let script = scripted_urls(&["a.example/feed", "sso.example/x", "sso.example/y", "a.example/feed"]);
        let result = wait_for_auth_return("login", fast_policy(), "a.example/feed", || {
            let url = next_url(&script);
            async move { url }
        })
        .await;
        assert_ok!(result);
    }

    #[tokio::test]
    async fn auth_wait_times_out_if_url_never_leaves_origin() {
        let script = scripted_urls(&["a.example/feed"]);
        let result = wait_for_auth_return("login", fast_policy(), "a.example/feed", || {
            let url = next_url(&script);
            async move { url }
        })
        .await;
        match result {
            Err(AppError::Step(StepError::AuthTimeout { .. })) => {}
            other => panic!("expected auth timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn auth_wait_times_out_if_url_never_returns() {
        let script = scripted_urls(&["a.example/feed", "sso.example/stuck"]);
        let result = wait_for_auth_return("login", fast_policy(), "a.example/feed", || {
            let url = next_url(&script);
            async move { url }
        })
        .await;
        assert!(matches!(
            result,
            Err(AppError::Step(StepError::AuthTimeout { .. }))
        ));
    }

    #[tokio::test]
    async fn publish_wait_prefers_marker_over_url_change() {
        // Marker appears while the URL is still the edit page: the wait must
        // end on the marker, not run to timeout.
        let ticks = Mutex::new(0u32);
        let result = wait_for_publish("publish", fast_policy(), "edit.example", || {
            let mut ticks = ticks.lock().unwrap();
            *ticks += 1;
            let marker = *ticks >= 2;
            async move {
                PublishProbe {
                    url: Some("edit.example".to_string()),
                    marker_seen: marker,
                }
            }
        })
        .await;
        assert_eq!(assert_ok!(result), PublishSignal::MarkerSeen);
    }

    #[tokio::test]
    async fn publish_wait_detects_url_change() {
        let script = scripted_urls(&["edit.example", "edit.example", "watch.example/v/1"]);
        let result = wait_for_publish("publish", fast_policy(), "edit.example", || {
            let url = next_url(&script);
            async move {
                PublishProbe {
                    url,
                    marker_seen: false,
                }
            }
        })
        .await;
        assert_eq!(
            assert_ok!(result),
            PublishSignal::UrlChanged("watch.example/v/1".to_string())
        );
    }

    #[tokio::test]
    async fn publish_wait_times_out_without_signal() {
        let result = wait_for_publish("publish", fast_policy(), "edit.example", || async {
            PublishProbe {
                url: Some("edit.example".to_string()),
                marker_seen: false,
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(AppError::Step(StepError::Timeout { .. }))
        ));
    }
}
