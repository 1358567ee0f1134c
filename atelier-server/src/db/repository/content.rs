//! Content Block Repository

use super::RepoResult;
use shared::models::{ContentBlock, ContentUpsert};
use sqlx::SqlitePool;

const CONTENT_SELECT: &str =
    "SELECT key, title, body, image, is_published, updated_at FROM content_block";

pub async fn list(pool: &SqlitePool, published_only: bool) -> RepoResult<Vec<ContentBlock>> {
    let sql = format!("{CONTENT_SELECT} WHERE (?1 = 0 OR is_published = 1) ORDER BY key");
    let rows = sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(published_only)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get(
    pool: &SqlitePool,
    key: &str,
    published_only: bool,
) -> RepoResult<Option<ContentBlock>> {
    let sql = format!("{CONTENT_SELECT} WHERE key = ?1 AND (?2 = 0 OR is_published = 1)");
    let row = sqlx::query_as::<_, ContentBlock>(&sql)
        .bind(key)
        .bind(published_only)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create or replace the block stored under `key`
pub async fn upsert(pool: &SqlitePool, key: &str, data: ContentUpsert) -> RepoResult<ContentBlock> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO content_block (key, title, body, image, is_published, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (key) DO UPDATE SET title = excluded.title, body = excluded.body, image = excluded.image, is_published = excluded.is_published, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(&data.title)
    .bind(&data.body)
    .bind(&data.image)
    .bind(data.is_published)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(ContentBlock {
        key: key.to_string(),
        title: data.title,
        body: data.body,
        image: data.image,
        is_published: data.is_published,
        updated_at: now,
    })
}

pub async fn delete(pool: &SqlitePool, key: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM content_block WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
