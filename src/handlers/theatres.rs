use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::models::theatre::{NewTheatre, TheatrePatch};
use crate::theatres;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewTheatre>,
) -> Result<Response, AppError> {
    let theatre = theatres::create_theatre(&state.pool, req, Utc::now()).await?;
    Ok(created(theatre, "Theatre created").into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(theatre_id): Path<Uuid>,
    AppJson(patch): AppJson<TheatrePatch>,
) -> Result<Response, AppError> {
    let theatre = theatres::edit_theatre(&state.pool, theatre_id, patch, Utc::now()).await?;
    Ok(success(theatre, "Theatre updated").into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    Path(theatre_id): Path<Uuid>,
) -> Result<Response, AppError> {
    theatres::delete_theatre(&state.pool, theatre_id).await?;
    Ok(empty_success("Theatre deleted").into_response())
}
