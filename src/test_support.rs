//! Seed helpers for store-backed tests. Rows are inserted directly so each
//! test controls exactly the catalog state it needs.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

pub(crate) async fn seed_user(pool: &SqlitePool, username: &str) -> Uuid {
    seed_user_with_id(pool, Uuid::new_v4(), username).await
}

pub(crate) async fn seed_user_with_id(pool: &SqlitePool, id: Uuid, username: &str) -> Uuid {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, 'x', 0, ?4, ?4)",
    )
    .bind(id)
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(now)
    .execute(pool)
    .await
    .expect("user row should insert");
    id
}

pub(crate) async fn seed_theatre(pool: &SqlitePool, name: &str, capacity: i64) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO theatres (id, name, place, capacity, created_at, updated_at)
         VALUES (?1, ?2, 'Downtown', ?3, ?4, ?4)",
    )
    .bind(id)
    .bind(name)
    .bind(capacity)
    .bind(now)
    .execute(pool)
    .await
    .expect("theatre row should insert");
    id
}

pub(crate) async fn seed_show(
    pool: &SqlitePool,
    theatre_id: Uuid,
    name: &str,
    start_time: DateTime<Utc>,
    duration_minutes: i64,
    seats_left: i64,
) -> Uuid {
    seed_show_with_id(
        pool,
        Uuid::new_v4(),
        theatre_id,
        name,
        start_time,
        duration_minutes,
        seats_left,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn seed_show_with_id(
    pool: &SqlitePool,
    id: Uuid,
    theatre_id: Uuid,
    name: &str,
    start_time: DateTime<Utc>,
    duration_minutes: i64,
    seats_left: i64,
) -> Uuid {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO shows (id, theatre_id, name, ticket_price, start_time, duration_minutes,
                            seats_left, created_at, updated_at)
         VALUES (?1, ?2, ?3, 10.0, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(theatre_id)
    .bind(name)
    .bind(start_time)
    .bind(duration_minutes)
    .bind(seats_left)
    .bind(now)
    .execute(pool)
    .await
    .expect("show row should insert");
    id
}

pub(crate) async fn seed_booking(
    pool: &SqlitePool,
    user_id: Uuid,
    show_id: Uuid,
    seats: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO bookings (id, user_id, show_id, seats, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(user_id)
    .bind(show_id)
    .bind(seats)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("booking row should insert");
    id
}

pub(crate) fn instant(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().expect("test timestamp should parse")
}
