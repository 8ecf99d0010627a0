//! Review gate: a review is accepted only from a user who booked the show,
//! only after the show has ended, and only once per (user, show).
//!
//! The once-only rule rests on the store's `UNIQUE (user_id, show_id)`
//! constraint, so a duplicate-submission race resolves to exactly one
//! persisted review; the loser gets `Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::booking::fetch_show;
use crate::models::review::Review;
use crate::utils::error::{AppError, AppResult};

pub async fn submit_review(
    pool: &SqlitePool,
    show_id: Uuid,
    user_id: Uuid,
    rating: i64,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> AppResult<Review> {
    let mut tx = pool.begin().await?;

    let show = fetch_show(tx.as_mut(), show_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("show '{show_id}' does not exist")))?;

    if !has_booking(tx.as_mut(), user_id, show_id).await? {
        return Err(AppError::NotEligible(
            "you must book a show before reviewing it".to_string(),
        ));
    }

    if now < show.end_time() {
        return Err(AppError::NotEligible(
            "the show has not ended yet".to_string(),
        ));
    }

    validate_rating(rating)?;

    let review = Review {
        id: Uuid::new_v4(),
        user_id,
        show_id,
        rating,
        comment,
        created_at: now,
    };

    let inserted = sqlx::query(
        "INSERT INTO reviews (id, user_id, show_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.show_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .execute(tx.as_mut())
    .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::Conflict(
                "you have already reviewed this show".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    tx.commit().await?;

    tracing::info!(review_id = %review.id, show_id = %show_id, rating, "review accepted");

    Ok(review)
}

fn validate_rating(rating: i64) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::InvalidRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

async fn has_booking(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    show_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM bookings WHERE user_id = ?1 AND show_id = ?2 LIMIT 1")
            .bind(user_id)
            .bind(show_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::{seed_booking, seed_show, seed_theatre, seed_user};
    use chrono::Duration;
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        show: Uuid,
        user: Uuid,
        show_end: DateTime<Utc>,
    }

    /// A show that started two hours ago and ended an hour ago, with a
    /// booking by `alice`.
    async fn ended_show_with_booking() -> Fixture {
        let pool = catalog::test_pool().await;
        let start = Utc::now() - Duration::hours(2);
        let theatre = seed_theatre(&pool, "Lyric", 50).await;
        let show = seed_show(&pool, theatre, "Hamlet", start, 60, 40).await;
        let user = seed_user(&pool, "alice").await;
        seed_booking(&pool, user, show, 2).await;
        Fixture {
            pool,
            show,
            user,
            show_end: start + Duration::minutes(60),
        }
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(matches!(validate_rating(0), Err(AppError::InvalidRequest(_))));
        assert!(matches!(validate_rating(6), Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn review_before_show_end_is_not_eligible() {
        let f = ended_show_with_booking().await;
        let before_end = f.show_end - Duration::minutes(10);
        let err = submit_review(&f.pool, f.show, f.user, 4, None, before_end)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotEligible(_)));
    }

    #[tokio::test]
    async fn review_without_booking_is_not_eligible() {
        let f = ended_show_with_booking().await;
        let stranger = seed_user(&f.pool, "mallory").await;
        let err = submit_review(&f.pool, f.show, stranger, 4, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotEligible(_)));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_invalid_after_eligibility() {
        let f = ended_show_with_booking().await;
        let err = submit_review(&f.pool, f.show, f.user, 6, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn second_review_for_same_show_conflicts() {
        let f = ended_show_with_booking().await;

        submit_review(&f.pool, f.show, f.user, 4, Some("great".into()), Utc::now())
            .await
            .unwrap();

        let err = submit_review(&f.pool, f.show, f.user, 5, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let persisted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        assert_eq!(persisted, 1);
    }

    #[tokio::test]
    async fn unknown_show_is_not_found() {
        let pool = catalog::test_pool().await;
        let user = seed_user(&pool, "alice").await;
        let err = submit_review(&pool, Uuid::new_v4(), user, 4, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_duplicate_reviews_persist_exactly_one() {
        let f = ended_show_with_booking().await;
        let now = Utc::now();
        let (show, user) = (f.show, f.user);

        let a = {
            let pool = f.pool.clone();
            tokio::spawn(async move { submit_review(&pool, show, user, 4, None, now).await })
        };
        let b = {
            let pool = f.pool.clone();
            tokio::spawn(async move { submit_review(&pool, show, user, 5, None, now).await })
        };

        let outcomes = [a.await.unwrap(), b.await.unwrap()];
        let ok = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count();

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 1);

        let persisted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        assert_eq!(persisted, 1);
    }
}
