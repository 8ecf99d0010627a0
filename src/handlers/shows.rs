use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::models::show::{NewShow, ShowPatch};
use crate::shows;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewShow>,
) -> Result<Response, AppError> {
    let details = shows::create_show(&state.pool, req, Utc::now()).await?;
    Ok(created(details, "Show created").into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    AppJson(patch): AppJson<ShowPatch>,
) -> Result<Response, AppError> {
    let details = shows::edit_show(&state.pool, show_id, patch, Utc::now()).await?;
    Ok(success(details, "Show updated").into_response())
}

pub async fn remove(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
) -> Result<Response, AppError> {
    shows::delete_show(&state.pool, show_id).await?;
    Ok(empty_success("Show deleted").into_response())
}
