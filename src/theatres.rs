//! Theatre lifecycle. A theatre is unique by (name, place); deleting one
//! cascades its shows unless any of them has bookings, in which case the
//! delete is blocked like a single-show delete would be.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::theatre::{NewTheatre, Theatre, TheatrePatch};
use crate::tags;
use crate::utils::error::{AppError, AppResult};

pub async fn create_theatre(
    pool: &SqlitePool,
    req: NewTheatre,
    now: DateTime<Utc>,
) -> AppResult<Theatre> {
    let name = validated_field("name", &req.name)?;
    let place = validated_field("place", &req.place)?;
    validate_capacity(req.capacity)?;

    let theatre = Theatre {
        id: Uuid::new_v4(),
        name,
        place,
        capacity: req.capacity,
        created_at: now,
        updated_at: now,
    };

    let inserted = sqlx::query(
        "INSERT INTO theatres (id, name, place, capacity, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(theatre.id)
    .bind(&theatre.name)
    .bind(&theatre.place)
    .bind(theatre.capacity)
    .bind(theatre.created_at)
    .bind(theatre.updated_at)
    .execute(pool)
    .await;

    map_duplicate(inserted)?;

    tracing::info!(theatre_id = %theatre.id, "theatre created");

    Ok(theatre)
}

pub async fn edit_theatre(
    pool: &SqlitePool,
    theatre_id: Uuid,
    patch: TheatrePatch,
    now: DateTime<Utc>,
) -> AppResult<Theatre> {
    let mut tx = pool.begin().await?;

    let mut theatre = fetch_theatre(tx.as_mut(), theatre_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("theatre '{theatre_id}' does not exist")))?;

    if let Some(name) = &patch.name {
        theatre.name = validated_field("name", name)?;
    }
    if let Some(place) = &patch.place {
        theatre.place = validated_field("place", place)?;
    }
    if let Some(capacity) = patch.capacity {
        validate_capacity(capacity)?;
        theatre.capacity = capacity;
    }
    theatre.updated_at = now;

    let updated = sqlx::query(
        "UPDATE theatres SET name = ?1, place = ?2, capacity = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(&theatre.name)
    .bind(&theatre.place)
    .bind(theatre.capacity)
    .bind(theatre.updated_at)
    .bind(theatre.id)
    .execute(tx.as_mut())
    .await;

    map_duplicate(updated)?;

    tx.commit().await?;

    Ok(theatre)
}

/// Deletes a theatre and its shows. Blocked with `Conflict` if any show in
/// the theatre has bookings.
pub async fn delete_theatre(pool: &SqlitePool, theatre_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    fetch_theatre(tx.as_mut(), theatre_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("theatre '{theatre_id}' does not exist")))?;

    let bookings: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings b
         JOIN shows s ON s.id = b.show_id
         WHERE s.theatre_id = ?1",
    )
    .bind(theatre_id)
    .fetch_one(tx.as_mut())
    .await?;
    if bookings > 0 {
        return Err(AppError::Conflict(format!(
            "theatre has shows with {bookings} booking(s) and cannot be deleted"
        )));
    }

    sqlx::query("DELETE FROM shows WHERE theatre_id = ?1")
        .bind(theatre_id)
        .execute(tx.as_mut())
        .await?;

    tags::sweep_orphans(tx.as_mut()).await?;

    sqlx::query("DELETE FROM theatres WHERE id = ?1")
        .bind(theatre_id)
        .execute(tx.as_mut())
        .await?;

    tx.commit().await?;

    tracing::info!(theatre_id = %theatre_id, "theatre deleted");

    Ok(())
}

async fn fetch_theatre(
    conn: &mut SqliteConnection,
    theatre_id: Uuid,
) -> Result<Option<Theatre>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM theatres WHERE id = ?1")
        .bind(theatre_id)
        .fetch_optional(&mut *conn)
        .await
}

fn validated_field(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "theatre {field} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_capacity(capacity: i64) -> AppResult<()> {
    if capacity < 0 {
        return Err(AppError::InvalidRequest(
            "capacity must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn map_duplicate<T>(result: Result<T, sqlx::Error>) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
            "a theatre with this name already exists at this place".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}
