mod common;

use common::{session, session_with, status, RecordingTransport};
use lenorefin_client::audit::LOG_ENTRY_PATH;
use lenorefin_client::http::Body;
use lenorefin_client::{CacheKey, SessionOptions, Topic};
use serde_json::json;

#[tokio::test]
async fn flush_posts_queued_entries() {
    let transport = RecordingTransport::default();
    let session = session(&transport);
    session.log_entries().list().await.unwrap();

    session.reminders().delete(5).await.unwrap();
    assert_eq!(session.audit().pending(), 1);
    assert_eq!(transport.count(LOG_ENTRY_PATH).await, 0);

    assert_eq!(session.flush_audit().await.unwrap(), 1);
    assert_eq!(session.audit().pending(), 0);

    let posted = transport.calls().await.pop().unwrap();
    assert_eq!(posted.path, LOG_ENTRY_PATH);
    let Body::Json(entry) = posted.body else {
        panic!("log entry should be JSON");
    };
    assert_eq!(entry["log_entry"], "Reminder deleted");
    assert_eq!(entry["reminder_id"], 5);
    assert_eq!(entry["error_level_id"], 1);
    assert_eq!(session.cache().is_stale(&CacheKey::new(Topic::LogEntries)), Some(true));
}

#[tokio::test]
async fn failed_operation_is_logged_with_status() {
    let transport = RecordingTransport::with_responses(vec![Err(status(409, ""))]);
    let session = session(&transport);

    session.reminders().delete(5).await.unwrap_err();
    session.flush_audit().await.unwrap();

    let posted = transport.calls().await.pop().unwrap();
    let Body::Json(entry) = posted.body else {
        panic!("log entry should be JSON");
    };
    assert_eq!(entry["log_entry"], "Reminder not deleted");
    assert_eq!(entry["error_num"], 409);
    assert_eq!(entry["error_level_id"], 2);
}

#[tokio::test]
async fn delivery_failure_does_not_touch_the_operation() {
    let transport = RecordingTransport::default();
    let session = session(&transport);

    let value = session.reminders().delete(5).await.unwrap();
    assert_eq!(value, json!({}));

    transport.push(Err(status(500, ""))).await;
    assert_eq!(session.flush_audit().await.unwrap(), 1);

    let shown = session.notifications().visible().unwrap();
    assert_eq!(shown.text, "Reminder deleted successfully!");
    assert_eq!(shown.color, "success");
    assert_eq!(session.audit().pending(), 0);
}

#[tokio::test]
async fn reads_below_configured_level_are_not_queued() {
    let transport = RecordingTransport::default();
    let options = SessionOptions {
        audit_level: 1,
        ..Default::default()
    };
    let session = session_with(&transport, options);

    session.reminders().list().await.unwrap();
    assert_eq!(session.audit().pending(), 0);
    session.reminders().delete(1).await.unwrap();
    assert_eq!(session.audit().pending(), 1);
}

#[tokio::test]
async fn worker_delivers_in_background() {
    let transport = RecordingTransport::default();
    let session = session(&transport);
    let worker = session.spawn_audit_worker();

    session.reminders().delete(5).await.unwrap();
    for _ in 0..50 {
        if transport.count(LOG_ENTRY_PATH).await == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(transport.count(LOG_ENTRY_PATH).await, 1);
    worker.abort();
}
