//! Tag reconciliation: free-text tag names become canonical [`Tag`] rows.
//!
//! Names are trimmed and matched case-sensitively; missing tags are created
//! on the spot. A show's tag set is always replaced wholesale, and any tag
//! left without a referencing show is deleted.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::tag::Tag;
use crate::utils::error::AppResult;

/// Trims names, drops empties, and deduplicates while preserving first
/// occurrence order.
pub fn normalize_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || seen.iter().any(|s| s == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

/// Replaces `show_id`'s tag associations with the tags named in `names`,
/// creating missing tags and pruning any that end up unreferenced. Runs on
/// the caller's transaction.
pub async fn reconcile(
    conn: &mut SqliteConnection,
    show_id: Uuid,
    names: &[String],
) -> AppResult<Vec<Tag>> {
    let names = normalize_names(names);

    let mut tags = Vec::with_capacity(names.len());
    for name in &names {
        tags.push(resolve_or_create(conn, name).await?);
    }

    sqlx::query("DELETE FROM show_tags WHERE show_id = ?1")
        .bind(show_id)
        .execute(&mut *conn)
        .await?;

    for tag in &tags {
        sqlx::query("INSERT INTO show_tags (show_id, tag_id) VALUES (?1, ?2)")
            .bind(show_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;
    }

    sweep_orphans(conn).await?;

    Ok(tags)
}

/// Deletes every tag no show references any more. Reference counts are
/// recomputed from `show_tags` membership, never stored.
pub async fn sweep_orphans(conn: &mut SqliteConnection) -> AppResult<u64> {
    let swept = sqlx::query("DELETE FROM tags WHERE id NOT IN (SELECT tag_id FROM show_tags)")
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if swept > 0 {
        tracing::debug!(swept, "pruned orphaned tags");
    }

    Ok(swept)
}

/// Tags currently attached to a show, in name order.
pub async fn tags_for_show(conn: &mut SqliteConnection, show_id: Uuid) -> AppResult<Vec<Tag>> {
    let tags = sqlx::query_as(
        "SELECT t.id, t.name FROM tags t
         JOIN show_tags st ON st.tag_id = t.id
         WHERE st.show_id = ?1
         ORDER BY t.name",
    )
    .bind(show_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tags)
}

async fn resolve_or_create(conn: &mut SqliteConnection, name: &str) -> AppResult<Tag> {
    let existing: Option<Tag> = sqlx::query_as("SELECT id, name FROM tags WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(tag) = existing {
        return Ok(tag);
    }

    let tag = Tag {
        id: Uuid::new_v4(),
        name: name.to_string(),
    };
    sqlx::query("INSERT INTO tags (id, name) VALUES (?1, ?2)")
        .bind(tag.id)
        .bind(&tag.name)
        .execute(&mut *conn)
        .await?;

    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::{instant, seed_show, seed_theatre};
    use sqlx::SqlitePool;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_trims_dedupes_and_drops_empties() {
        let input = names(&[" drama ", "drama", "", "  ", "comedy", "Drama"]);
        assert_eq!(normalize_names(&input), vec!["drama", "comedy", "Drama"]);
    }

    async fn seed_one_show(pool: &SqlitePool) -> Uuid {
        let theatre = seed_theatre(pool, "Lyric", 50).await;
        seed_show(
            pool,
            theatre,
            "Hamlet",
            instant("2024-01-01T18:00:00Z"),
            120,
            50,
        )
        .await
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let pool = catalog::test_pool().await;
        let show = seed_one_show(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let first = reconcile(&mut conn, show, &names(&["drama", "classic"]))
            .await
            .unwrap();
        let second = reconcile(&mut conn, show, &names(&["drama", "classic"]))
            .await
            .unwrap();

        assert_eq!(first, second);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn replacement_prunes_orphans_and_keeps_shared_tags() {
        let pool = catalog::test_pool().await;
        let theatre = seed_theatre(&pool, "Lyric", 50).await;
        let hamlet = seed_show(
            &pool,
            theatre,
            "Hamlet",
            instant("2024-01-01T18:00:00Z"),
            120,
            50,
        )
        .await;
        let macbeth = seed_show(
            &pool,
            theatre,
            "Macbeth",
            instant("2024-01-02T18:00:00Z"),
            120,
            50,
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        reconcile(&mut conn, hamlet, &names(&["drama", "classic"]))
            .await
            .unwrap();
        reconcile(&mut conn, macbeth, &names(&["drama"])).await.unwrap();

        // Editing Hamlet away from both tags orphans "classic" but not the
        // shared "drama".
        let replaced = reconcile(&mut conn, hamlet, &names(&["comedy"]))
            .await
            .unwrap();
        assert_eq!(replaced.len(), 1);

        let remaining: Vec<String> = sqlx::query_scalar("SELECT name FROM tags ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();
        assert_eq!(remaining, vec!["comedy", "drama"]);
    }

    #[tokio::test]
    async fn tag_identity_is_stable_across_shows() {
        let pool = catalog::test_pool().await;
        let theatre = seed_theatre(&pool, "Lyric", 50).await;
        let hamlet = seed_show(
            &pool,
            theatre,
            "Hamlet",
            instant("2024-01-01T18:00:00Z"),
            120,
            50,
        )
        .await;
        let macbeth = seed_show(
            &pool,
            theatre,
            "Macbeth",
            instant("2024-01-02T18:00:00Z"),
            120,
            50,
        )
        .await;

        let mut conn = pool.acquire().await.unwrap();
        let first = reconcile(&mut conn, hamlet, &names(&["drama"])).await.unwrap();
        let second = reconcile(&mut conn, macbeth, &names(&["drama"])).await.unwrap();

        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn sweep_after_unlinking_removes_unreferenced_tags() {
        let pool = catalog::test_pool().await;
        let show = seed_one_show(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        reconcile(&mut conn, show, &names(&["drama"])).await.unwrap();

        sqlx::query("DELETE FROM show_tags WHERE show_id = ?1")
            .bind(show)
            .execute(&mut *conn)
            .await
            .unwrap();

        let swept = sweep_orphans(&mut conn).await.unwrap();
        assert_eq!(swept, 1);
    }
}
