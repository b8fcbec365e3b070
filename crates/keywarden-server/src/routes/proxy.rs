use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

use super::AppState;

/// OpenAI-compatible gateway. A caller presents a key secret as a bearer
/// token; the request is forwarded to the serving backend only when the
/// requested model matches the one the key is bound to.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/chat/completions", post(chat_completions))
}

async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => return error_response(StatusCode::UNAUTHORIZED, "invalid authorization scheme"),
    };

    let key = match state.db.find_api_key_by_secret(token) {
        Ok(Some(key)) => key,
        Ok(None) => return error_response(StatusCode::UNAUTHORIZED, "invalid api key"),
        Err(e) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let requested = body.get("model").and_then(|m| m.as_str()).unwrap_or_default();
    if requested != key.model {
        return error_response(
            StatusCode::FORBIDDEN,
            &format!(
                "this api key is not authorized for model '{requested}', only '{}'",
                key.model
            ),
        );
    }

    let upstream = state
        .http
        .post(format!("{}/v1/chat/completions", state.upstream_url))
        .json(&body)
        .send()
        .await;

    match upstream {
        Ok(resp) => {
            let status = resp.status();
            let builder = match resp.headers().get(header::CONTENT_TYPE) {
                Some(ct) => Response::builder()
                    .status(status)
                    .header(header::CONTENT_TYPE, ct),
                None => Response::builder().status(status),
            };
            // Stream the upstream body through without buffering, so
            // token-by-token completions arrive as they are produced.
            builder
                .body(Body::from_stream(resp.bytes_stream()))
                .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "upstream request failed");
            error_response(StatusCode::BAD_GATEWAY, &format!("upstream error: {e}"))
        }
    }
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_helpers::{test_router, test_router_with_upstream};

    async fn create_key(app: &axum::Router, model: &str) -> String {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/keys")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "name": "gw", "model_name": model }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let created: Value = serde_json::from_slice(&bytes).unwrap();
        created["secret_key"].as_str().unwrap().to_string()
    }

    fn completion_request(token: Option<&str>, model: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(
                json!({ "model": model, "messages": [] }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_bearer_is_401() {
        let app = test_router();
        let resp = app
            .oneshot(completion_request(None, "llama3:8b"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_key_is_401() {
        let app = test_router();
        let resp = app
            .oneshot(completion_request(Some("sk-ollama-bogus"), "llama3:8b"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_model_is_403() {
        let app = test_router();
        let secret = create_key(&app, "llama3:8b").await;
        let resp = app
            .oneshot(completion_request(Some(&secret), "mistral:7b"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn authorized_request_streams_upstream_body() {
        // Fake serving backend that answers completions with a fixed body.
        let upstream = axum::Router::new().route(
            "/v1/chat/completions",
            axum::routing::post(|| async {
                axum::Json(json!({ "choices": [{ "message": { "content": "hi" } }] }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let app = test_router_with_upstream(&upstream_url);
        let secret = create_key(&app, "llama3:8b").await;

        let resp = app
            .oneshot(completion_request(Some(&secret), "llama3:8b"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], "hi");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_502() {
        let app = test_router();
        let secret = create_key(&app, "llama3:8b").await;
        let resp = app
            .oneshot(completion_request(Some(&secret), "llama3:8b"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
