//! The webhook notifier against a local receiver

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use url::Url;
use uuid::Uuid;

use common::notify::{Notification, Notifier};
use santa_daemon::notifier::{WebhookError, WebhookNotifier, WebhookPayload};

#[derive(Clone, Default)]
struct Received {
    requests: Arc<Mutex<Vec<(Option<String>, WebhookPayload)>>>,
}

async fn accept(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    received.requests.lock().push((auth, payload));
    StatusCode::ACCEPTED
}

async fn reject() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn receiver() -> (Url, Received) {
    let received = Received::default();
    let router = Router::new()
        .route("/hook", post(accept))
        .route("/broken", post(reject))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (Url::parse(&format!("http://{}/", addr)).unwrap(), received)
}

fn notification() -> Notification {
    Notification {
        room_id: Uuid::new_v4(),
        room_name: "Office 2024".to_string(),
        giver_name: "Alice".to_string(),
        giver_email: "alice@example.com".to_string(),
        giftee_name: "Bob".to_string(),
    }
}

#[tokio::test]
async fn test_posts_payload_with_token() {
    let (base, received) = receiver().await;
    let notifier =
        WebhookNotifier::new(base.join("hook").unwrap(), Some("s3cret".to_string())).unwrap();
    let n = notification();

    notifier.notify(&n).await.unwrap();

    let requests = received.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    let (auth, payload) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer s3cret"));
    assert_eq!(
        payload,
        &WebhookPayload {
            room_id: n.room_id,
            room_name: "Office 2024".to_string(),
            to: "alice@example.com".to_string(),
            subject: n.subject(),
            body: n.body(),
        }
    );
    assert!(payload.body.contains("You are gifting Bob."));
}

#[tokio::test]
async fn test_no_token_no_header() {
    let (base, received) = receiver().await;
    let notifier = WebhookNotifier::new(base.join("hook").unwrap(), None).unwrap();

    notifier.notify(&notification()).await.unwrap();

    let requests = received.requests.lock().clone();
    assert_eq!(requests[0].0, None);
}

#[tokio::test]
async fn test_non_success_status_is_a_failure() {
    let (base, _) = receiver().await;
    let notifier = WebhookNotifier::new(base.join("broken").unwrap(), None).unwrap();

    let result = notifier.notify(&notification()).await;
    assert!(matches!(
        result,
        Err(WebhookError::HttpStatus(status)) if status == reqwest::StatusCode::BAD_GATEWAY
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier =
        WebhookNotifier::new(Url::parse(&format!("http://{}/hook", addr)).unwrap(), None).unwrap();
    let result = notifier.notify(&notification()).await;
    assert!(matches!(result, Err(WebhookError::Reqwest(_))));
}

#[test]
fn test_debug_redacts_token() {
    let notifier = WebhookNotifier::new(
        Url::parse("http://localhost/hook").unwrap(),
        Some("s3cret".to_string()),
    )
    .unwrap();
    assert!(!format!("{:?}", notifier).contains("s3cret"));
}
