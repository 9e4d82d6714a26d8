use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Idempotently create the `docstrings` table. Never drops existing data.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS docstrings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            source_url TEXT,
            project_name TEXT,
            file_path TEXT,
            doc_type TEXT,
            object_name TEXT,
            style TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
