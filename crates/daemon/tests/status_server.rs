//! The status server over a real listener

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;

use common::draw::SchedulerConfig;
use common::testkit::test_key;
use santa_daemon::http_server::serve_status;
use santa_daemon::notifier::{AnyNotifier, LogNotifier};
use santa_daemon::{Database, ServiceState};

struct TestServer {
    addr: SocketAddr,
    state: ServiceState,
    shutdown_tx: watch::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let db = Database::connect(&url::Url::parse("sqlite::memory:").unwrap())
            .await
            .unwrap();
        let state = ServiceState::new(
            db,
            AnyNotifier::Log(LogNotifier),
            test_key(),
            SchedulerConfig::default(),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let server_state = state.clone();
        let task = tokio::spawn(async move {
            serve_status(listener, tracing::Level::DEBUG, server_state, shutdown_rx)
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        self.shutdown_tx.send(()).unwrap();
        self.task.await.unwrap();
    }
}

#[tokio::test]
async fn test_status_endpoints() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let livez = client.get(server.url("/_status/livez")).send().await.unwrap();
    assert_eq!(livez.status(), reqwest::StatusCode::OK);

    let readyz = client.get(server.url("/_status/readyz")).send().await.unwrap();
    assert_eq!(readyz.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = readyz.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let version: serde_json::Value = client
        .get(server.url("/_status/version"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .get(server.url("/api/rooms"))
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["msg"], "not found");

    server.stop().await;
}

#[tokio::test]
async fn test_readiness_fails_without_database() {
    let server = TestServer::start().await;
    server.state.database().close().await;

    let response = reqwest::get(server.url("/_status/readyz")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    // liveness does not depend on the database
    let response = reqwest::get(server.url("/_status/livez")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_marks_state() {
    let server = TestServer::start().await;
    let state = server.state.clone();
    assert!(!state.is_shutting_down());

    server.stop().await;
    assert!(state.is_shutting_down());
}
