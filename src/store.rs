//! Append-only persistence for docstring records.
//!
//! The `docstrings` table is a flat log: rows are inserted once, never
//! updated, never deleted by this pipeline. Queries are limited to a total
//! count and a small id-ordered sample for verification.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::models::{DocRecord, StoredRecord};

/// Insert one record and return its assigned surrogate id.
///
/// `style` is always bound to NULL — classification is a separate,
/// out-of-scope stage.
pub async fn append(pool: &SqlitePool, record: &DocRecord) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO docstrings (content, source_url, project_name, file_path, doc_type, object_name, style)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.content)
    .bind(&record.source_url)
    .bind(&record.project_name)
    .bind(&record.file_path)
    .bind(record.doc_type.as_str())
    .bind(&record.object_name)
    .bind(Option::<String>::None)
    .execute(pool)
    .await
    .context("Failed to insert docstring record")?;

    Ok(result.last_insert_rowid())
}

/// Total number of persisted records.
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM docstrings")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// The first `limit` records, ordered by id ascending.
pub async fn sample(pool: &SqlitePool, limit: i64) -> Result<Vec<StoredRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, content, source_url, project_name, file_path, doc_type, object_name, style
        FROM docstrings
        ORDER BY id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let records = rows
        .iter()
        .map(|row| StoredRecord {
            id: row.get("id"),
            content: row.get("content"),
            source_url: row.get("source_url"),
            project_name: row.get("project_name"),
            file_path: row.get("file_path"),
            doc_type: row.get("doc_type"),
            object_name: row.get("object_name"),
            style: row.get("style"),
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DbConfig, HarvestConfig};
    use crate::models::DocKind;
    use crate::{db, migrate};

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            db: DbConfig {
                path: dir.path().join("test.sqlite"),
            },
            harvest: HarvestConfig::default(),
            repos: Vec::new(),
        }
    }

    fn record(content: &str) -> DocRecord {
        DocRecord {
            content: content.to_string(),
            source_url: Some("https://github.com/acme/widget/blob/abc123/widget/api.py".into()),
            project_name: Some("widget".into()),
            file_path: Some("widget/widget/api.py".into()),
            doc_type: DocKind::Function,
            object_name: Some("fetch".into()),
        }
    }

    #[tokio::test]
    async fn append_increments_count_and_ids_never_repeat() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = test_config(&tmp);
        migrate::run_migrations(&config).await.unwrap();
        let pool = db::connect(&config).await.unwrap();

        assert_eq!(count(&pool).await.unwrap(), 0);

        let first = append(&pool, &record("First doc.")).await.unwrap();
        assert_eq!(count(&pool).await.unwrap(), 1);

        let second = append(&pool, &record("Second doc.")).await.unwrap();
        assert_eq!(count(&pool).await.unwrap(), 2);
        assert!(second > first, "ids must never be reused");

        pool.close().await;
    }

    #[tokio::test]
    async fn sample_returns_id_ordered_prefix_with_null_style() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = test_config(&tmp);
        migrate::run_migrations(&config).await.unwrap();
        let pool = db::connect(&config).await.unwrap();

        for i in 0..5 {
            append(&pool, &record(&format!("Doc {}", i))).await.unwrap();
        }

        let rows = sample(&pool, 3).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(rows[0].content, "Doc 0");
        assert!(rows.iter().all(|r| r.style.is_none()));
        assert_eq!(rows[0].doc_type.as_deref(), Some("function"));

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent_and_preserve_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = test_config(&tmp);
        migrate::run_migrations(&config).await.unwrap();

        let pool = db::connect(&config).await.unwrap();
        append(&pool, &record("Survivor.")).await.unwrap();
        pool.close().await;

        migrate::run_migrations(&config).await.unwrap();

        let pool = db::connect(&config).await.unwrap();
        assert_eq!(count(&pool).await.unwrap(), 1);
        pool.close().await;
    }
}
