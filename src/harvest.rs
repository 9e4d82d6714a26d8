//! Harvest pipeline orchestration.
//!
//! Coordinates the full flow per repository: provision working copy →
//! scan source files → extract docstrings → append records → tear down.
//! Repositories are processed one at a time; each stage returns its own
//! counters and the caller sums them. No error aborts the run — a
//! repository that cannot be provisioned is reported and skipped, a file
//! that cannot be parsed costs one extraction error, and the loop moves on.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Instant;

use crate::config::{Config, RepoSpec};
use crate::db;
use crate::extractor::{self, FileMeta};
use crate::models::RunCounters;
use crate::progress::{HarvestProgressEvent, HarvestProgressReporter};
use crate::provisioner;
use crate::sample;
use crate::store;

/// Rows shown in the post-run sample.
const SAMPLE_LIMIT: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Restrict the run to one configured repository by name.
    pub repo: Option<String>,
    /// Leave working copies on disk after harvesting.
    pub keep_clones: bool,
    /// Provision and scan only — no parsing, no writes.
    pub dry_run: bool,
    /// Maximum number of files to process per repository.
    pub limit: Option<usize>,
}

pub async fn run_harvest(
    config: &Config,
    opts: &HarvestOptions,
    progress: &dyn HarvestProgressReporter,
) -> Result<()> {
    let repos: Vec<&RepoSpec> = match &opts.repo {
        Some(name) => match config.repos.iter().find(|r| &r.name == name) {
            Some(spec) => vec![spec],
            None => bail!("Unknown repository: '{}' (not in config)", name),
        },
        None => config.repos.iter().collect(),
    };

    if repos.is_empty() {
        println!("No repositories configured — nothing to harvest.");
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let run_start = Instant::now();

    let mut totals = RunCounters::default();
    let mut repos_failed = 0u64;

    for spec in &repos {
        let repo_start = Instant::now();

        match harvest_repository(&pool, config, spec, opts, progress).await {
            Ok(counters) => {
                println!("harvest {}", spec.name);
                println!("  files scanned: {}", counters.files_scanned);
                if !opts.dry_run {
                    println!("  records stored: {}", counters.records_stored);
                }
                println!("  extraction errors: {}", counters.extraction_errors);
                println!(
                    "  elapsed: {}",
                    format_duration(repo_start.elapsed().as_secs())
                );
                totals.absorb(counters);
            }
            Err(e) => {
                // A repository that cannot be provisioned contributes no
                // counters, but the failure is surfaced in the summary
                // instead of blending into "zero files".
                eprintln!("harvest {}: skipped: {:#}", spec.name, e);
                repos_failed += 1;
            }
        }
    }

    println!();
    println!("Harvest complete");
    println!("================");
    println!(
        "  repositories: {} processed, {} failed",
        repos.len() as u64 - repos_failed,
        repos_failed
    );
    println!("  files scanned: {}", totals.files_scanned);
    println!("  extraction errors: {}", totals.extraction_errors);
    println!("  elapsed: {}", format_duration(run_start.elapsed().as_secs()));

    if !opts.dry_run {
        println!("  records stored this run: {}", totals.records_stored);

        let total_stored = store::count(&pool).await?;
        println!("  total stored records: {}", total_stored);

        let rows = store::sample(&pool, SAMPLE_LIMIT).await?;
        if !rows.is_empty() {
            println!();
            println!("Sample of stored records:");
            sample::print_records(&rows);
        }
    }

    pool.close().await;
    Ok(())
}

/// Harvest one repository. Provisioning errors propagate to the caller;
/// everything after a successful checkout is recoverable and counted.
async fn harvest_repository(
    pool: &SqlitePool,
    config: &Config,
    spec: &RepoSpec,
    opts: &HarvestOptions,
    progress: &dyn HarvestProgressReporter,
) -> Result<RunCounters> {
    progress.report(HarvestProgressEvent::Provisioning {
        project: spec.name.clone(),
    });

    let repo_dir = provisioner::ensure(&config.harvest, spec)?;

    let result = extract_repository(pool, config, spec, &repo_dir, opts, progress).await;

    if !(opts.keep_clones || config.harvest.keep_clones) {
        if let Err(e) = provisioner::teardown(&repo_dir) {
            // Cleanup failure is logged but never affects counters or the run.
            eprintln!("harvest {}: cleanup failed: {:#}", spec.name, e);
        }
    }

    result
}

async fn extract_repository(
    pool: &SqlitePool,
    config: &Config,
    spec: &RepoSpec,
    repo_dir: &Path,
    opts: &HarvestOptions,
    progress: &dyn HarvestProgressReporter,
) -> Result<RunCounters> {
    let mut files = extractor::scan_files(
        repo_dir,
        &config.harvest.include_globs,
        &config.harvest.exclude_globs,
    )?;

    if let Some(limit) = opts.limit {
        files.truncate(limit);
    }

    let mut counters = RunCounters::default();

    if opts.dry_run {
        counters.files_scanned = files.len() as u64;
        return Ok(counters);
    }

    // Deep links point at the commit actually checked out; "main" is only
    // a fallback when the SHA cannot be resolved.
    let head_ref = provisioner::head_sha(repo_dir).unwrap_or_else(|_| "main".to_string());

    let total = files.len() as u64;
    for (i, path) in files.iter().enumerate() {
        progress.report(HarvestProgressEvent::Extracting {
            project: spec.name.clone(),
            n: i as u64 + 1,
            total,
        });
        counters.absorb(harvest_file(pool, config, spec, repo_dir, &head_ref, path).await);
    }

    Ok(counters)
}

/// Process one source file: parse, extract, append. Failures are counted,
/// never propagated — a bad file costs one error and the loop continues.
async fn harvest_file(
    pool: &SqlitePool,
    config: &Config,
    spec: &RepoSpec,
    repo_dir: &Path,
    head_ref: &str,
    path: &Path,
) -> RunCounters {
    let mut counters = RunCounters {
        files_scanned: 1,
        ..RunCounters::default()
    };

    let repo_rel = path
        .strip_prefix(repo_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    let collection_rel = path
        .strip_prefix(&config.harvest.clone_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    let source_url = provisioner::build_web_url(&spec.url, head_ref, &repo_rel);
    let module_fallback = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let meta = FileMeta {
        project_name: Some(&spec.name),
        file_path: Some(&collection_rel),
        source_url: Some(&source_url),
        module_fallback: &module_fallback,
    };

    let records = match extractor::extract_file(path, &meta) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("harvest {}: {}: {:#}", spec.name, repo_rel, e);
            counters.extraction_errors += 1;
            return counters;
        }
    };

    for record in &records {
        match store::append(pool, record).await {
            Ok(_) => counters.records_stored += 1,
            Err(e) => {
                eprintln!("harvest {}: {}: insert failed: {:#}", spec.name, repo_rel, e);
                counters.extraction_errors += 1;
            }
        }
    }

    counters
}

/// Format an elapsed duration as "2 h 4 min 11 s" / "3 min 2 s" / "45 s".
fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{} h {} min {} s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{} min {} s", minutes, seconds)
    } else {
        format!("{} s", seconds)
    }
}
