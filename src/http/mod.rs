use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::db::{ClientStore, ProspectStore};

mod clients;
mod error;
mod prospects;

use error::ApiError;
pub use error::Message;

/// Storage handles shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub prospects: Arc<dyn ProspectStore>,
    pub clients: Arc<dyn ClientStore>,
}

impl AppState {
    /// State backed by one store serving both resources
    pub fn from_store<S>(store: S) -> Self
    where
        S: ProspectStore + ClientStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            prospects: store.clone(),
            clients: store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/prospects", prospects::routes())
        .nest("/api/clients", clients::routes())
        // nested `/` only matches the bare prefix
        .route("/api/prospects/", prospects::collection())
        .route("/api/clients/", clients::collection())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("invalid id `{raw}`")))
}

/// Serve the API on `listener` until `shutdown` resolves, then let
/// in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}
