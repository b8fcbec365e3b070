mod routes;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use keywarden_db::Db;
use keywarden_service::{LocalService, ModelCatalog};
use tokio::net::TcpListener;

pub use routes::{build_router, AppState, InnerAppState};

pub async fn serve(
    listener: TcpListener,
    db: Db,
    catalog: Arc<dyn ModelCatalog>,
    upstream_url: &str,
) -> Result<()> {
    let state = Arc::new(InnerAppState {
        service: LocalService::new(db.clone(), catalog),
        db,
        upstream_url: upstream_url.trim_end_matches('/').to_string(),
        http: reqwest::Client::new(),
    });
    let app = routes::build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
