//! Page-bound interaction steps
//!
//! The flow-shaped building blocks every browser-driven destination is
//! assembled from: element waits with locator fallback, the login round-trip,
//! variant detection, the publish loop. Each step is a condition-wait over
//! the [`PageDriver`] plus one action.

use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::workflow::wait::{self, PublishProbe, PublishSignal, WaitPolicy};
use chromiumoxide::Element;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Wait for an element to be present.
pub async fn wait_for_element(
    driver: &PageDriver,
    step: &str,
    selector: &str,
    policy: WaitPolicy,
) -> AppResult<Element> {
    wait::poll_until(step, policy, || {
        let fut = driver.find(selector);
        async move { fut.await }
    })
    .await
}

/// Wait for an element, trying the primary locator strategy first and
/// falling back to the alternatives if it does not show up within a short
/// slice of the budget. Tolerates superficial page changes.
pub async fn wait_for_element_fallback(
    driver: &PageDriver,
    step: &str,
    primary: &str,
    fallbacks: &[&str],
    policy: WaitPolicy,
) -> AppResult<Element> {
    let primary_slice = policy.slice(policy.timeout / 4);
    if let Ok(el) = wait_for_element(driver, step, primary, primary_slice).await {
        return Ok(el);
    }
    warn!(
        "step '{}': primary locator '{}' not found, trying fallbacks",
        step, primary
    );

    let mut selectors = vec![primary];
    selectors.extend_from_slice(fallbacks);
    let selectors: &[&str] = &selectors;
    wait::poll_until(step, policy, || {
        let fut = driver.find_any(selectors);
        async move { fut.await }
    })
    .await
}

/// Fixed settle delay, the documented fallback for steps with no reliable
/// completion signal. Prefer a condition-wait whenever any page marker is
/// observable.
pub async fn settle(reason: &str, duration: Duration) {
    debug!("settling {:.1}s ({})", duration.as_secs_f64(), reason);
    sleep(duration).await;
}

/// Detect and drive the interactive login, if the page asks for it.
///
/// When a login trigger is visible: click it, then wait for the URL to leave
/// and return to its click-time value (the only authentication signal these
/// pages give us). Returns whether a login round-trip happened. A started
/// round-trip that never completes is an error; no trigger at all means the
/// profile is already authenticated.
pub async fn handle_login(
    driver: &PageDriver,
    trigger_selectors: &[&str],
    policy: WaitPolicy,
) -> AppResult<bool> {
    let Some(trigger) = driver.find_any(trigger_selectors).await else {
        debug!("no login trigger visible, assuming authenticated profile");
        return Ok(false);
    };

    let origin_url = driver.current_url().await.unwrap_or_default();
    info!("login trigger found, starting interactive login");
    if let Err(e) = driver.scroll_click(&trigger).await {
        warn!("could not click login trigger: {}", e);
        return Ok(false);
    }

    wait::wait_for_auth_return("login", policy, &origin_url, || {
        let fut = driver.current_url();
        async move { fut.await }
    })
    .await?;

    info!("login completed");
    // Give the page a beat to re-render in the authenticated state.
    settle("post-login render", Duration::from_secs(1)).await;
    Ok(true)
}

/// Post variant of a browser upload, decided once per flow and threaded
/// through the remaining steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostVariant {
    /// Short-form editor (vertical clip UI)
    ShortForm,
    /// Standard long-form editor
    Standard,
}

/// Classify the upload by probing once for a variant-specific control.
pub async fn detect_variant(
    driver: &PageDriver,
    shortform_selector: &str,
    probe_budget: WaitPolicy,
) -> PostVariant {
    let found = wait::poll_until("variant-probe", probe_budget, || {
        let fut = driver.find(shortform_selector);
        async move { fut.await.map(|_| ()) }
    })
    .await;

    match found {
        Ok(()) => {
            info!("short-form editor detected");
            PostVariant::ShortForm
        }
        Err(_) => PostVariant::Standard,
    }
}

/// Drive the publish action until the destination reacts.
///
/// Clicking publish may be a no-op while the UI settles, so the click is
/// retried on every poll tick until either the URL changes or the ready
/// marker appears in the page text.
pub async fn publish_and_wait(
    driver: &PageDriver,
    publish_selector: &str,
    ready_marker: Option<&str>,
    policy: WaitPolicy,
) -> AppResult<PublishSignal> {
    let origin_url = driver.current_url().await.unwrap_or_default();

    wait::wait_for_publish("publish", policy, &origin_url, || async move {
        driver.click_if_present(publish_selector).await;
        let marker_seen = match ready_marker {
            Some(marker) => driver.body_contains(marker).await,
            None => false,
        };
        PublishProbe {
            url: driver.current_url().await,
            marker_seen,
        }
    })
    .await
}
