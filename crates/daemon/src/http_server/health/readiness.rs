use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::time::timeout;

use super::data_source::*;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, data_src.is_ready()).await {
        Ok(Ok(())) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(Err(e)) => unavailable(&e.to_string()),
        Err(_) => unavailable("health check timed out"),
    }
}

fn unavailable(message: &str) -> Response {
    let msg = serde_json::json!({"status": "failure", "message": message});
    (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    use crate::database::Database;
    use crate::http_server::health::data_source::tests::*;
    use crate::notifier::AnyNotifier;
    use crate::ServiceState;
    use common::draw::SchedulerConfig;
    use common::testkit::test_key;

    #[tokio::test]
    async fn test_handler_direct() {
        let response = handler(StateDataSource::new(Arc::new(MockReadiness::Ready))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handler(StateDataSource::new(Arc::new(
            MockReadiness::DependencyFailure,
        )))
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = handler(StateDataSource::new(Arc::new(MockReadiness::ShuttingDown))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_service_source() {
        let db = Database::connect(&url::Url::parse("sqlite::memory:").unwrap())
            .await
            .unwrap();
        let state = ServiceState::new(
            db.clone(),
            AnyNotifier::Log(Default::default()),
            test_key(),
            SchedulerConfig::default(),
        );

        let response = handler(StateDataSource::new(Arc::new(ServiceSource::new(
            state.clone(),
        ))))
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        db.close().await;
        let response = handler(StateDataSource::new(Arc::new(ServiceSource::new(
            state.clone(),
        ))))
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unready_while_shutting_down() {
        let db = Database::connect(&url::Url::parse("sqlite::memory:").unwrap())
            .await
            .unwrap();
        let state = ServiceState::new(
            db,
            AnyNotifier::Log(Default::default()),
            test_key(),
            SchedulerConfig::default(),
        );
        state.mark_shutting_down();

        let response = handler(StateDataSource::new(Arc::new(ServiceSource::new(state)))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
