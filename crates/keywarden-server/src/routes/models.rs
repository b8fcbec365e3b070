use axum::http::StatusCode;
use axum::{extract::State, routing::get, Json, Router};
use keywarden_service::KeyService;
use serde_json::{json, Value};

use super::{to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/models", get(list_models))
}

async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_models()
        .await
        .map(|models| Json(json!(models)))
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use keywarden_service::UnavailableCatalog;
    use tower::ServiceExt;

    use crate::test_helpers::{test_router, test_router_with_catalog};

    #[tokio::test]
    async fn lists_catalog_models_in_order() {
        let app = test_router();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let models: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(models, crate::test_helpers::default_models());
    }

    #[tokio::test]
    async fn unreachable_catalog_returns_503() {
        let app = test_router_with_catalog(Arc::new(UnavailableCatalog));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
