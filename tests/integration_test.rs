//! Browser-backed integration tests.
//!
//! These launch a real Chromium and are ignored by default; run them
//! manually with `cargo test -- --ignored` on a machine with a browser.

use multipost::browser::{ProfileStore, SessionManager};
use multipost::utils::logging;
use std::time::Duration;

fn manager() -> (SessionManager, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    (SessionManager::new(ProfileStore::new(dir.path())), dir)
}

#[tokio::test]
#[ignore]
async fn session_start_and_stop() {
    logging::init();
    let (sessions, _dir) = manager();

    let page = sessions
        .start("default", true, &[], Duration::from_secs(20))
        .await
        .expect("browser should launch");
    assert!(page.url().await.is_ok());
    assert_eq!(sessions.len().await, 1);

    sessions.stop("default").await;
    assert!(sessions.is_empty().await);
}

#[tokio::test]
#[ignore]
async fn second_start_reuses_healthy_session() {
    logging::init();
    let (sessions, _dir) = manager();

    let first = sessions
        .start("default", true, &[], Duration::from_secs(20))
        .await
        .expect("browser should launch");
    first.goto("about:blank").await.expect("navigation");

    // a healthy session is probed and handed back, not relaunched
    let second = sessions
        .start("default", true, &[], Duration::from_secs(20))
        .await
        .expect("reuse should succeed");
    assert_eq!(sessions.len().await, 1);
    assert_eq!(first.url().await.unwrap(), second.url().await.unwrap());

    sessions.stop_all().await;
}

#[tokio::test]
#[ignore]
async fn separate_profiles_get_separate_sessions() {
    logging::init();
    let (sessions, _dir) = manager();

    sessions
        .start("rutube", true, &[], Duration::from_secs(20))
        .await
        .expect("first profile");
    sessions
        .start("vk", true, &[], Duration::from_secs(20))
        .await
        .expect("second profile");
    assert_eq!(sessions.len().await, 2);

    sessions.stop_all().await;
    assert!(sessions.is_empty().await);
}
