use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::models::review::NewReview;
use crate::reviews;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::created;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    AppJson(req): AppJson<NewReview>,
) -> Result<Response, AppError> {
    let review = reviews::submit_review(
        &state.pool,
        show_id,
        req.user_id,
        req.rating,
        req.comment,
        Utc::now(),
    )
    .await?;
    Ok(created(review, "Review submitted").into_response())
}
