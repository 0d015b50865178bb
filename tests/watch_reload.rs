//! Integration tests for live configuration synchronization.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use probe_monitor::config::snapshot::{ConfigApplier, SharedConfig};
use probe_monitor::watch::registry::{WatchSetupError, WatcherRegistry};
use probe_monitor::watch::source::ConfigLocation;

mod common;

const DOC_ONE: &str = r#"{"probes":[{"id":"1","requests":[{"url":"https://example.com"}]}]}"#;
const DOC_TWO: &str =
    r#"{"probes":[{"id":"2","requests":[{"url":"https://example.com/changed"}]}]}"#;

fn test_registry(poll_secs: u64) -> (Arc<SharedConfig>, WatcherRegistry) {
    let shared = Arc::new(SharedConfig::new());
    let applier = ConfigApplier::new(shared.clone());
    let registry = WatcherRegistry::new(applier, Duration::from_secs(poll_secs));
    (shared, registry)
}

#[tokio::test]
async fn test_polls_config_from_url() {
    let addr = common::start_config_server(|| async { (200, DOC_ONE.to_string()) }).await;

    let (shared, registry) = test_registry(1);
    let location = ConfigLocation::classify(&format!("http://{addr}/monitor.json"));
    let report = registry.start(vec![location]);
    assert_eq!(report.handles.len(), 1);
    assert!(report.failures.is_empty());

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let config = shared.current().expect("config should be loaded");
    assert_eq!(config.probes[0].requests[0].url, "https://example.com");

    for handle in &report.handles {
        handle.cancel();
    }
}

#[tokio::test]
async fn test_failed_poll_keeps_previous_snapshot() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let addr = common::start_config_server(move || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                (500, "upstream exploded".to_string())
            } else {
                (200, DOC_ONE.to_string())
            }
        }
    })
    .await;

    let (shared, registry) = test_registry(1);
    let location = ConfigLocation::classify(&format!("http://{addr}/monitor.json"));
    let report = registry.start(vec![location]);

    // First cycle hits the 500 and must leave the snapshot empty.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(shared.current().is_none());

    // Second tick recovers without the loop having died.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let config = shared.current().expect("second poll should load the document");
    assert_eq!(config.probes[0].id, "1");
    assert!(hits.load(Ordering::SeqCst) >= 2);

    for handle in &report.handles {
        handle.cancel();
    }
}

#[tokio::test]
async fn test_reloads_on_file_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.json");
    std::fs::write(&path, DOC_ONE).unwrap();

    let (shared, registry) = test_registry(900);
    let mut updates = shared.subscribe();
    let report = registry.start(vec![ConfigLocation::File(path.clone())]);
    assert_eq!(report.handles.len(), 1);

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("initial load should apply")
        .unwrap();
    assert_eq!(shared.current().unwrap().probes[0].id, "1");

    std::fs::write(&path, DOC_TWO).unwrap();

    let propagated = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            updates.changed().await.unwrap();
            if let Some(config) = shared.current() {
                if config.probes[0].id == "2" {
                    break;
                }
            }
        }
    })
    .await;
    assert!(propagated.is_ok(), "file change should propagate without polling");
    assert_eq!(
        shared.current().unwrap().probes[0].requests[0].url,
        "https://example.com/changed"
    );

    for handle in &report.handles {
        handle.cancel();
    }
}

#[tokio::test]
async fn test_invalid_file_content_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.json");
    std::fs::write(&path, DOC_ONE).unwrap();

    let (shared, registry) = test_registry(900);
    let mut updates = shared.subscribe();
    let report = registry.start(vec![ConfigLocation::File(path.clone())]);

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("initial load should apply")
        .unwrap();

    std::fs::write(&path, "{ definitely not json").unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let config = shared.current().expect("snapshot must survive a bad write");
    assert_eq!(config.probes[0].id, "1");
    assert_eq!(shared.generation(), 1);

    for handle in &report.handles {
        handle.cancel();
    }
}

#[tokio::test]
async fn test_start_reports_missing_file_without_blocking_others() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("monitor.json");
    std::fs::write(&good, DOC_ONE).unwrap();
    let missing = dir.path().join("absent.json");

    let (_shared, registry) = test_registry(900);
    let report = registry.start(vec![
        ConfigLocation::File(good),
        ConfigLocation::File(missing.clone()),
    ]);

    assert_eq!(report.handles.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, ConfigLocation::File(missing));
    assert!(matches!(
        report.failures[0].1,
        WatchSetupError::MissingFile(_)
    ));

    for handle in &report.handles {
        handle.cancel();
    }
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_stops_fetches() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let addr = common::start_config_server(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, DOC_ONE.to_string())
        }
    })
    .await;

    let (shared, registry) = test_registry(1);
    let location = ConfigLocation::classify(&format!("http://{addr}/monitor.json"));
    let report = registry.start(vec![location]);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(shared.current().is_some());

    let handle = report.handles.into_iter().next().unwrap();
    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
    handle.join().await;

    // Several poll intervals pass; the cancelled watcher must stay silent.
    let after_cancel = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test]
async fn test_url_and_file_watchers_share_one_snapshot() {
    let addr = common::start_config_server(|| async { (200, DOC_ONE.to_string()) }).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.json");
    std::fs::write(&path, DOC_TWO).unwrap();

    let (shared, registry) = test_registry(1);
    let report = registry.start(vec![
        ConfigLocation::classify(&format!("http://{addr}/monitor.json")),
        ConfigLocation::File(path),
    ]);
    assert_eq!(report.handles.len(), 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Whichever source applied last, the snapshot is one complete document.
    let config = shared.current().expect("some source should have loaded");
    assert_eq!(config.probes.len(), 1);
    assert!(config.version.is_some());

    for handle in &report.handles {
        handle.cancel();
    }
}
