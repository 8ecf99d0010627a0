//! Booking and scheduling core for theatre ticketing: conflict-free show
//! scheduling, atomic seat allocation, attendance-gated reviews, and derived
//! reporting, backed by a transactional SQLite catalog.

use sqlx::SqlitePool;

pub mod booking;
pub mod catalog;
pub mod config;
pub mod events;
pub mod handlers;
pub mod models;
pub mod reporting;
pub mod reviews;
pub mod routes;
pub mod scheduling;
pub mod shows;
pub mod tags;
pub mod theatres;
pub mod users;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub events: events::EventSender,
}
