//! Record sampling for verification.
//!
//! Prints the first N stored records in id order. Used by the `dq sample`
//! CLI command and by the post-harvest summary.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::models::StoredRecord;
use crate::store;

/// CLI entry point — fetches and prints the first `limit` records.
pub async fn run_sample(config: &Config, limit: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let rows = store::sample(&pool, limit).await?;
    pool.close().await;

    if rows.is_empty() {
        println!("No records stored.");
        return Ok(());
    }

    println!("Showing the first {} stored records:", rows.len());
    print_records(&rows);
    Ok(())
}

/// Render records in a compact two-line-per-record listing.
pub fn print_records(rows: &[StoredRecord]) {
    for row in rows {
        println!(
            "[{}] {}  {}  {}  object={}  style={}",
            row.id,
            row.project_name.as_deref().unwrap_or("-"),
            row.doc_type.as_deref().unwrap_or("-"),
            row.file_path.as_deref().unwrap_or("-"),
            row.object_name.as_deref().unwrap_or("-"),
            row.style.as_deref().unwrap_or("unlabeled"),
        );
        println!("    \"{}\"", preview(&row.content, 70));
    }
}

/// Collapse whitespace and truncate to `max_chars` for one-line display.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
