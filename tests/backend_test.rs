mod common;

use common::{session, session_with, RecordingTransport};
use lenorefin_client::http::Body;
use lenorefin_client::{ApiError, SessionOptions, Topic};
use reqwest::Method;
use serde_json::json;
use std::time::Duration;

fn unreachable() -> ApiError {
    ApiError::NoResponse("connection refused".into())
}

#[tokio::test(start_paused = true)]
async fn health_polls_until_backend_answers() {
    let transport = RecordingTransport::with_responses(vec![
        Err(unreachable()),
        Err(unreachable()),
        Ok(json!({"status": "ok"})),
    ]);
    let session = session(&transport);

    assert!(session.wait_until_ready().await);
    assert_eq!(transport.count("/administration/health/").await, 3);
}

#[tokio::test(start_paused = true)]
async fn health_gives_up_after_max_attempts() {
    let responses = (0..5).map(|_| Err(unreachable())).collect();
    let transport = RecordingTransport::with_responses(responses);
    let options = SessionOptions {
        health_max_attempts: 3,
        health_poll_interval: Duration::from_millis(250),
        ..Default::default()
    };
    let session = session_with(&transport, options);

    assert!(!session.wait_until_ready().await);
    assert_eq!(transport.count("/administration/health/").await, 3);
}

#[tokio::test]
async fn file_import_sends_multipart_and_announces_id() {
    let transport = RecordingTransport::with_responses(vec![Ok(json!([])), Ok(json!({"id": 12}))]);
    let session = session(&transport);
    session.transactions().list().await.unwrap();

    let mappings = json!({"account_id": 1, "date_column": 0, "amount_column": 3});
    session
        .file_import()
        .upload(&mappings, "march.csv", b"date,desc,x,amount\n".to_vec())
        .await
        .unwrap();

    let call = transport.api_calls().await.pop().unwrap();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/administration/file-imports/create");
    match call.body {
        Body::Multipart {
            file_name,
            bytes,
            payload,
        } => {
            assert_eq!(file_name, "march.csv");
            assert!(bytes.starts_with(b"date"));
            let decoded: serde_json::Value = serde_json::from_str(&payload).unwrap();
            assert_eq!(decoded, mappings);
        }
        other => panic!("expected multipart, got {other:?}"),
    }
    assert_eq!(session.notifications().current().text, "File import ID #12 started!");
    assert!(session
        .options()
        .graph
        .invalidation_set(Topic::Transactions)
        .contains(&Topic::Accounts));
}

#[tokio::test]
async fn version_is_fetched_once() {
    let transport = RecordingTransport::with_responses(vec![Ok(json!({"version": "1.4.0"}))]);
    let session = session(&transport);

    session.version().prefetch().await;
    let version = session.version().get().await.unwrap();
    assert_eq!(version["version"], "1.4.0");
    assert_eq!(transport.api_calls().await.len(), 1);
}

#[tokio::test]
async fn file_import_announces_string_ids_unquoted() {
    let transport = RecordingTransport::with_responses(vec![Ok(json!({"id": "imp-7"}))]);
    let session = session(&transport);

    session
        .file_import()
        .upload(&json!({}), "april.csv", Vec::new())
        .await
        .unwrap();
    assert_eq!(
        session.notifications().current().text,
        "File import ID #imp-7 started!"
    );
}
