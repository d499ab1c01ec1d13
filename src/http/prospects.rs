use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};

use super::error::{ApiError, Message};
use super::{parse_id, AppState};
use crate::models::{NewProspect, Prospect, ProspectPatch};

const RESOURCE: &str = "Prospect";

/// `GET` and `POST` on the collection path
pub fn collection() -> MethodRouter<AppState> {
    get(list_prospects).post(create_prospect)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", collection())
        .route(
            "/:id",
            get(get_prospect)
                .put(update_prospect)
                .delete(delete_prospect),
        )
}

async fn create_prospect(
    State(state): State<AppState>,
    payload: Result<Json<NewProspect>, JsonRejection>,
) -> Result<(StatusCode, Json<Prospect>), ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let prospect = state.prospects.create_prospect(&input).await?;
    tracing::info!(id = %prospect.id, "prospect created");

    Ok((StatusCode::CREATED, Json(prospect)))
}

async fn list_prospects(State(state): State<AppState>) -> Result<Json<Vec<Prospect>>, ApiError> {
    Ok(Json(state.prospects.list_prospects().await?))
}

async fn get_prospect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prospect>, ApiError> {
    let id = parse_id(&id)?;

    state
        .prospects
        .get_prospect(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(RESOURCE))
}

async fn update_prospect(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProspectPatch>, JsonRejection>,
) -> Result<Json<Prospect>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    patch.validate()?;

    let prospect = state
        .prospects
        .update_prospect(id, &patch)
        .await?
        .ok_or(ApiError::NotFound(RESOURCE))?;
    tracing::info!(%id, "prospect updated");

    Ok(Json(prospect))
}

async fn delete_prospect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&id)?;

    if !state.prospects.delete_prospect(id).await? {
        return Err(ApiError::NotFound(RESOURCE));
    }
    tracing::info!(%id, "prospect deleted");

    Ok(Json(Message::new("Prospect deleted")))
}
