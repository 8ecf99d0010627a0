use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::booking;
use crate::events::BookingCompleted;
use crate::models::booking::NewBooking;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::created;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    AppJson(req): AppJson<NewBooking>,
) -> Result<Response, AppError> {
    let booking = booking::book(&state.pool, show_id, req.user_id, req.seats, Utc::now()).await?;

    // Fire-and-forget; a send error only means nobody is listening.
    let _ = state.events.send(BookingCompleted {
        booking_id: booking.id,
        show_id: booking.show_id,
        user_id: booking.user_id,
        seats: booking.seats,
    });

    Ok(created(booking, "Booking confirmed").into_response())
}
