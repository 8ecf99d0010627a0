//! Show lifecycle: creation, editing, and deletion.
//!
//! Creation and editing run the scheduling conflict check and the tag
//! reconciler on the same transaction as the row write, so no overlapping
//! pair of shows can ever commit. Deleting a show with bookings is blocked;
//! seats already sold are a record the catalog keeps.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::booking::fetch_show;
use crate::models::show::{NewShow, Show, ShowDetails, ShowPatch};
use crate::models::theatre::Theatre;
use crate::scheduling;
use crate::tags;
use crate::utils::error::{AppError, AppResult};

pub async fn create_show(
    pool: &SqlitePool,
    req: NewShow,
    now: DateTime<Utc>,
) -> AppResult<ShowDetails> {
    let name = validated_name(&req.name)?;
    validate_price(req.ticket_price)?;
    validate_duration(req.duration_minutes)?;

    let mut tx = pool.begin().await?;

    let theatre: Theatre = sqlx::query_as("SELECT * FROM theatres WHERE id = ?1")
        .bind(req.theatre_id)
        .fetch_optional(tx.as_mut())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("theatre '{}' does not exist", req.theatre_id)))?;

    let end = req.start_time + Duration::minutes(req.duration_minutes);
    scheduling::ensure_no_conflict(tx.as_mut(), theatre.id, req.start_time, end, None).await?;

    let show = Show {
        id: Uuid::new_v4(),
        theatre_id: theatre.id,
        name,
        ticket_price: req.ticket_price,
        start_time: req.start_time,
        duration_minutes: req.duration_minutes,
        // The show's seat pool starts at the venue capacity.
        seats_left: theatre.capacity,
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO shows (id, theatre_id, name, ticket_price, start_time, duration_minutes,
                            seats_left, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(show.id)
    .bind(show.theatre_id)
    .bind(&show.name)
    .bind(show.ticket_price)
    .bind(show.start_time)
    .bind(show.duration_minutes)
    .bind(show.seats_left)
    .bind(show.created_at)
    .bind(show.updated_at)
    .execute(tx.as_mut())
    .await?;

    let tags = tags::reconcile(tx.as_mut(), show.id, &req.tag_names).await?;

    tx.commit().await?;

    tracing::info!(show_id = %show.id, theatre_id = %show.theatre_id, "show created");

    Ok(ShowDetails { show, tags })
}

pub async fn edit_show(
    pool: &SqlitePool,
    show_id: Uuid,
    patch: ShowPatch,
    now: DateTime<Utc>,
) -> AppResult<ShowDetails> {
    let mut tx = pool.begin().await?;

    let mut show = fetch_show(tx.as_mut(), show_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("show '{show_id}' does not exist")))?;

    if let Some(name) = &patch.name {
        show.name = validated_name(name)?;
    }
    if let Some(price) = patch.ticket_price {
        validate_price(price)?;
        show.ticket_price = price;
    }
    if let Some(start_time) = patch.start_time {
        show.start_time = start_time;
    }
    if let Some(duration) = patch.duration_minutes {
        validate_duration(duration)?;
        show.duration_minutes = duration;
    }
    show.updated_at = now;

    scheduling::ensure_no_conflict(
        tx.as_mut(),
        show.theatre_id,
        show.start_time,
        show.end_time(),
        Some(show.id),
    )
    .await?;

    sqlx::query(
        "UPDATE shows SET name = ?1, ticket_price = ?2, start_time = ?3,
                          duration_minutes = ?4, updated_at = ?5
         WHERE id = ?6",
    )
    .bind(&show.name)
    .bind(show.ticket_price)
    .bind(show.start_time)
    .bind(show.duration_minutes)
    .bind(show.updated_at)
    .bind(show.id)
    .execute(tx.as_mut())
    .await?;

    let tags = match &patch.tag_names {
        Some(names) => tags::reconcile(tx.as_mut(), show.id, names).await?,
        None => tags::tags_for_show(tx.as_mut(), show.id).await?,
    };

    tx.commit().await?;

    Ok(ShowDetails { show, tags })
}

/// Deletes a show. Blocked with `Conflict` while bookings exist for it; a
/// successful delete garbage-collects tags the show held alone.
pub async fn delete_show(pool: &SqlitePool, show_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    fetch_show(tx.as_mut(), show_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("show '{show_id}' does not exist")))?;

    let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE show_id = ?1")
        .bind(show_id)
        .fetch_one(tx.as_mut())
        .await?;
    if bookings > 0 {
        return Err(AppError::Conflict(format!(
            "show has {bookings} booking(s) and cannot be deleted"
        )));
    }

    sqlx::query("DELETE FROM shows WHERE id = ?1")
        .bind(show_id)
        .execute(tx.as_mut())
        .await?;

    tags::sweep_orphans(tx.as_mut()).await?;

    tx.commit().await?;

    tracing::info!(show_id = %show_id, "show deleted");

    Ok(())
}

fn validated_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(
            "show name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidRequest(
            "ticket price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn validate_duration(minutes: i64) -> AppResult<()> {
    if minutes < 1 {
        return Err(AppError::InvalidRequest(
            "duration must be at least one minute".to_string(),
        ));
    }
    Ok(())
}
