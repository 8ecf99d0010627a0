//! Read-only reporting over the catalog: the summary snapshot and the
//! per-theatre CSV schedule export. No caching; repeated calls against an
//! unchanged catalog return identical results.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::show::Show;
use crate::models::theatre::Theatre;
use crate::utils::error::{AppError, AppResult};

const TOP_N: i64 = 3;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub users: i64,
    pub theatres: i64,
    pub shows: i64,
    pub bookings: i64,
    pub reviews: i64,
    pub average_rating: Option<f64>,
    pub top_shows: Vec<TopShow>,
    pub top_reviewers: Vec<TopReviewer>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopShow {
    pub id: Uuid,
    pub name: String,
    pub seats_booked: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopReviewer {
    pub id: Uuid,
    pub username: String,
    pub reviews: i64,
}

pub async fn summary(pool: &SqlitePool) -> AppResult<Summary> {
    // One transaction so every figure comes from the same snapshot.
    let mut tx = pool.begin().await?;

    let mut counts = [0i64; 5];
    for (i, table) in ["users", "theatres", "shows", "bookings", "reviews"]
        .iter()
        .enumerate()
    {
        counts[i] = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(tx.as_mut())
            .await?;
    }

    let average_rating: Option<f64> = sqlx::query_scalar("SELECT AVG(rating) FROM reviews")
        .fetch_one(tx.as_mut())
        .await?;

    // Ties rank by id ascending so the ordering is deterministic.
    let top_shows = sqlx::query_as(
        "SELECT s.id, s.name, SUM(b.seats) AS seats_booked
         FROM shows s
         JOIN bookings b ON b.show_id = s.id
         GROUP BY s.id, s.name
         ORDER BY seats_booked DESC, s.id ASC
         LIMIT ?1",
    )
    .bind(TOP_N)
    .fetch_all(tx.as_mut())
    .await?;

    let top_reviewers = sqlx::query_as(
        "SELECT u.id, u.username, COUNT(*) AS reviews
         FROM users u
         JOIN reviews r ON r.user_id = u.id
         GROUP BY u.id, u.username
         ORDER BY reviews DESC, u.id ASC
         LIMIT ?1",
    )
    .bind(TOP_N)
    .fetch_all(tx.as_mut())
    .await?;

    tx.commit().await?;

    Ok(Summary {
        users: counts[0],
        theatres: counts[1],
        shows: counts[2],
        bookings: counts[3],
        reviews: counts[4],
        average_rating,
        top_shows,
        top_reviewers,
    })
}

/// CSV of a theatre's schedule, one row per show ordered by start time.
pub async fn theatre_schedule_csv(pool: &SqlitePool, theatre_id: Uuid) -> AppResult<String> {
    let mut tx = pool.begin().await?;

    let theatre: Option<Theatre> = sqlx::query_as("SELECT * FROM theatres WHERE id = ?1")
        .bind(theatre_id)
        .fetch_optional(tx.as_mut())
        .await?;
    theatre.ok_or_else(|| AppError::NotFound(format!("theatre '{theatre_id}' does not exist")))?;

    let shows: Vec<Show> =
        sqlx::query_as("SELECT * FROM shows WHERE theatre_id = ?1 ORDER BY start_time, id")
            .bind(theatre_id)
            .fetch_all(tx.as_mut())
            .await?;

    tx.commit().await?;

    let mut csv = String::from("name,ticket_price,start_time,duration_minutes,end_time\n");
    for show in shows {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&show.name),
            show.ticket_price,
            show.start_time.to_rfc3339(),
            show.duration_minutes,
            show.end_time().to_rfc3339(),
        ));
    }

    Ok(csv)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
