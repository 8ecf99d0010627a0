use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::tag::Tag;

/// A scheduled performance. `seats_left` is the show's remaining-capacity
/// pool, owned by the store and debited only inside the booking transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Show {
    pub id: Uuid,
    pub theatre_id: Uuid,
    pub name: String,
    pub ticket_price: f64,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub seats_left: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Show {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewShow {
    pub theatre_id: Uuid,
    pub name: String,
    pub ticket_price: f64,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub tag_names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowPatch {
    pub name: Option<String>,
    pub ticket_price: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ShowDetails {
    #[serde(flatten)]
    pub show: Show,
    pub tags: Vec<Tag>,
}
