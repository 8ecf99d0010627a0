use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::reporting;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

pub async fn summary(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = reporting::summary(&state.pool).await?;
    Ok(success(snapshot, "Catalog summary").into_response())
}

pub async fn schedule_csv(
    State(state): State<AppState>,
    Path(theatre_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let csv = reporting::theatre_schedule_csv(&state.pool, theatre_id).await?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}
