use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use keywarden_core::CreateApiKey;
use keywarden_service::KeyService;
use serde_json::{json, Value};

use super::{to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/keys", get(list_keys).post(create_key))
        .route("/api/keys/{id}", axum::routing::delete(delete_key))
}

async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_keys()
        .await
        .map(|keys| Json(json!(keys)))
        .map_err(to_error)
}

async fn create_key(
    State(state): State<AppState>,
    Json(input): Json<CreateApiKey>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_key(&input)
        .await
        .map(|created| (StatusCode::CREATED, Json(json!(created))))
        .map_err(to_error)
}

async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_key(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}
