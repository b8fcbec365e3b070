pub mod health;
pub mod keys;
pub mod models;
pub mod proxy;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use keywarden_db::Db;
use keywarden_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct InnerAppState {
    pub service: LocalService,
    /// Direct handle for the gateway's key lookup by raw secret.
    pub db: Db,
    /// Base URL of the model-serving backend the gateway forwards to.
    pub upstream_url: String,
    pub http: reqwest::Client,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(models::routes())
        .merge(keys::routes())
        .merge(proxy::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}
