//! Booking engine: validates a booking request and debits the show's seat
//! pool atomically.
//!
//! The capacity check and the decrement happen in one transaction, and the
//! decrement itself is guarded (`WHERE seats_left >= ?`), so concurrent
//! bookings can never drive `seats_left` negative. Committed bookings are
//! permanent; there is no cancel path crediting seats back.

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::show::Show;
use crate::utils::error::{AppError, AppResult};

/// Bookings close this long before the show starts. Policy constant, not
/// user-configurable.
pub const BOOKING_LEAD_MINUTES: i64 = 30;

/// Books `seats` tickets on a show for a user.
///
/// Preconditions are checked in a fixed order, each with its own error kind:
/// show exists (`NotFound`), seats >= 1 (`InvalidRequest`), lead window still
/// open (`TooLateToBook`), enough seats left (`InsufficientCapacity`).
pub async fn book(
    pool: &SqlitePool,
    show_id: Uuid,
    user_id: Uuid,
    seats: i64,
    now: DateTime<Utc>,
) -> AppResult<Booking> {
    let mut tx = pool.begin().await?;

    let show = fetch_show(tx.as_mut(), show_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("show '{show_id}' does not exist")))?;

    validate_seats(seats)?;
    ensure_lead_window_open(now, show.start_time)?;
    ensure_user_exists(tx.as_mut(), user_id).await?;

    if show.seats_left < seats {
        return Err(insufficient(&show, seats));
    }

    // Guarded debit: the predicate re-checks capacity at write time, so even
    // a stale read above cannot overdraw the pool.
    let debited = sqlx::query(
        "UPDATE shows SET seats_left = seats_left - ?1, updated_at = ?2
         WHERE id = ?3 AND seats_left >= ?1",
    )
    .bind(seats)
    .bind(now)
    .bind(show_id)
    .execute(tx.as_mut())
    .await?;

    if debited.rows_affected() == 0 {
        return Err(insufficient(&show, seats));
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        user_id,
        show_id,
        seats,
        created_at: now,
    };
    sqlx::query(
        "INSERT INTO bookings (id, user_id, show_id, seats, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(booking.id)
    .bind(booking.user_id)
    .bind(booking.show_id)
    .bind(booking.seats)
    .bind(booking.created_at)
    .execute(tx.as_mut())
    .await?;

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        show_id = %show_id,
        seats,
        "booking committed"
    );

    Ok(booking)
}

fn validate_seats(seats: i64) -> AppResult<()> {
    if seats < 1 {
        return Err(AppError::InvalidRequest(
            "a booking must reserve at least one seat".to_string(),
        ));
    }
    Ok(())
}

fn ensure_lead_window_open(now: DateTime<Utc>, start_time: DateTime<Utc>) -> AppResult<()> {
    if now + Duration::minutes(BOOKING_LEAD_MINUTES) >= start_time {
        return Err(AppError::TooLateToBook(format!(
            "bookings close {BOOKING_LEAD_MINUTES} minutes before the show starts"
        )));
    }
    Ok(())
}

fn insufficient(show: &Show, requested: i64) -> AppError {
    AppError::InsufficientCapacity(format!(
        "show '{}' has {} seats left, {} requested",
        show.name, show.seats_left, requested
    ))
}

pub(crate) async fn fetch_show(
    conn: &mut SqliteConnection,
    show_id: Uuid,
) -> Result<Option<Show>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shows WHERE id = ?1")
        .bind(show_id)
        .fetch_optional(&mut *conn)
        .await
}

async fn ensure_user_exists(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
}
