use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};

use super::error::{ApiError, Message};
use super::{parse_id, AppState};
use crate::models::{Client, ClientPatch, NewClient};

const RESOURCE: &str = "Client";

/// `GET` and `POST` on the collection path
pub fn collection() -> MethodRouter<AppState> {
    get(list_clients).post(create_client)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", collection())
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let client = state.clients.create_client(&input).await?;
    tracing::info!(id = %client.id, status = %client.status, "client created");

    Ok((StatusCode::CREATED, Json(client)))
}

async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.clients.list_clients().await?))
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    let id = parse_id(&id)?;

    state
        .clients
        .get_client(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(RESOURCE))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClientPatch>, JsonRejection>,
) -> Result<Json<Client>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    patch.validate()?;

    let client = state
        .clients
        .update_client(id, &patch)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;
    tracing::info!(%id, "client updated");

    Ok(Json(client))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&id)?;

    if !state.clients.delete_client(id).await? {
        return Err(ApiError::NotFound(RESOURCE));
    }
    tracing::info!(%id, "client deleted");

    Ok(Json(Message::new("Client deleted")))
}
