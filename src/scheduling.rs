//! Conflict detection for show scheduling.
//!
//! Two shows in the same theatre may never overlap in time. Intervals are
//! half-open `[start, end)`, so a show ending exactly when another starts is
//! not a conflict. The check runs on the caller's write transaction so a
//! concurrent creation cannot slip between check and insert.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::show::Show;
use crate::utils::error::{AppError, AppResult};

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Rejects the candidate interval with `Conflict` if any show in the theatre
/// overlaps it. `excluding` skips the show being edited.
pub async fn ensure_no_conflict(
    conn: &mut SqliteConnection,
    theatre_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    excluding: Option<Uuid>,
) -> AppResult<()> {
    let existing: Vec<Show> = sqlx::query_as("SELECT * FROM shows WHERE theatre_id = ?1")
        .bind(theatre_id)
        .fetch_all(&mut *conn)
        .await?;

    for show in existing {
        if excluding == Some(show.id) {
            continue;
        }
        if overlaps(start, end, show.start_time, show.end_time()) {
            return Err(AppError::Conflict(format!(
                "show '{}' already runs from {} to {} in this theatre",
                show.name,
                show.start_time,
                show.end_time()
            )));
        }
    }

    Ok(())
}
