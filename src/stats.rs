//! Database statistics overview.
//!
//! Provides a quick summary of what has been harvested: total record
//! counts, database size, and a per-project breakdown by docstring type.
//! Used by `dq stats` to give confidence that harvests are working as
//! expected.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;

/// Per-project breakdown of record counts by docstring type.
struct ProjectStats {
    project: String,
    total: i64,
    modules: i64,
    classes: i64,
    functions: i64,
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    let total_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM docstrings")
        .fetch_one(&pool)
        .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("doc-quarry — Database Stats");
    println!("===========================");
    println!();
    println!("  Database:   {}", config.db.path.display());
    println!("  Size:       {}", format_bytes(db_size));
    println!();
    println!("  Records:    {}", total_records);

    let project_rows = sqlx::query(
        r#"
        SELECT
            COALESCE(project_name, '(none)') AS project,
            COUNT(*) AS total,
            SUM(CASE WHEN doc_type = 'module' THEN 1 ELSE 0 END) AS modules,
            SUM(CASE WHEN doc_type = 'class' THEN 1 ELSE 0 END) AS classes,
            SUM(CASE WHEN doc_type = 'function' THEN 1 ELSE 0 END) AS functions
        FROM docstrings
        GROUP BY project
        ORDER BY total DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let project_stats: Vec<ProjectStats> = project_rows
        .iter()
        .map(|row| ProjectStats {
            project: row.get("project"),
            total: row.get("total"),
            modules: row.get("modules"),
            classes: row.get("classes"),
            functions: row.get("functions"),
        })
        .collect();

    if !project_stats.is_empty() {
        println!();
        println!("  By project:");
        println!(
            "  {:<24} {:>8} {:>8} {:>8} {:>10}",
            "PROJECT", "RECORDS", "MODULE", "CLASS", "FUNCTION"
        );
        println!("  {}", "-".repeat(64));

        for s in &project_stats {
            println!(
                "  {:<24} {:>8} {:>8} {:>8} {:>10}",
                s.project, s.total, s.modules, s.classes, s.functions
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_format() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
