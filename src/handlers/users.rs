use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::models::user::NewUser;
use crate::users;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::created;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewUser>,
) -> Result<Response, AppError> {
    let user = users::register(&state.pool, req, Utc::now()).await?;
    Ok(created(user, "Registered successfully").into_response())
}
