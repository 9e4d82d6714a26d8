//! Working-copy provisioning for harvest targets.
//!
//! Guarantees a readable checkout at a deterministic path before
//! extraction and removes it afterwards:
//! 1. Determine `<clone_dir>/<name>` for the repository.
//! 2. Clone (shallow if configured) or pull to update.
//! 3. After extraction, recursively delete the working copy, relaxing
//!    read-only permission bits if the first attempt fails.
//!
//! Git is an external collaborator invoked as a subprocess; any transport
//! or auth failure surfaces as an error the harvest loop treats as
//! non-fatal for the run.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use walkdir::WalkDir;

use crate::config::{HarvestConfig, RepoSpec};

/// Ensure a current working copy of `spec` exists under the clone
/// directory and return its path.
pub fn ensure(harvest: &HarvestConfig, spec: &RepoSpec) -> Result<PathBuf> {
    let dest = harvest.clone_dir.join(&spec.name);

    if dest.join(".git").exists() {
        git_pull(&dest)?;
    } else {
        git_clone(&spec.url, &dest, harvest.shallow)?;
    }

    Ok(dest)
}

/// Remove a working copy. On failure, clear read-only bits across the
/// tree and retry once.
pub fn teardown(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    if std::fs::remove_dir_all(path).is_ok() {
        return Ok(());
    }

    make_tree_writable(path);
    std::fs::remove_dir_all(path)
        .with_context(|| format!("Failed to delete working copy: {}", path.display()))
}

/// HEAD commit SHA of a checkout, used for deep links.
pub fn head_sha(repo_dir: &Path) -> Result<String> {
    let output = git(&["rev-parse", "HEAD"], Some(repo_dir))?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn git_clone(url: &str, dest: &Path, shallow: bool) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create clone directory: {}", parent.display()))?;
    }

    let mut args = vec!["clone"];
    if shallow {
        args.extend(["--depth", "1"]);
    }
    args.push(url);
    let dest_str = dest.to_string_lossy();
    args.push(&dest_str);

    git(&args, None)?;
    Ok(())
}

fn git_pull(repo_dir: &Path) -> Result<()> {
    git(&["pull", "--ff-only"], Some(repo_dir))?;
    Ok(())
}

/// Run a git subcommand. Prompts are disabled so a repository that wants
/// credentials fails instead of hanging the run.
fn git(args: &[&str], dir: Option<&Path>) -> Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute 'git {}'. Is git installed?", args[0]))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args[0], stderr.trim());
    }

    Ok(output)
}

fn make_tree_writable(root: &Path) {
    for entry in WalkDir::new(root).into_iter().flatten() {
        if let Ok(metadata) = entry.metadata() {
            let mut perms = metadata.permissions();
            if perms.readonly() {
                perms.set_readonly(false);
                let _ = std::fs::set_permissions(entry.path(), perms);
            }
        }
    }
}

/// Attempt to build a web-browsable URL for a file from the git remote URL.
///
/// `git_ref` is normally the checkout's HEAD SHA; callers fall back to
/// `main` when the SHA cannot be resolved.
pub fn build_web_url(repo_url: &str, git_ref: &str, relative_path: &str) -> String {
    // git@github.com:org/repo.git → https://github.com/org/repo/blob/<ref>/<path>
    if let Some(rest) = repo_url.strip_prefix("git@github.com:") {
        let repo = rest.trim_end_matches(".git");
        return format!("https://github.com/{}/blob/{}/{}", repo, git_ref, relative_path);
    }

    // https://github.com/org/repo.git → https://github.com/org/repo/blob/<ref>/<path>
    if repo_url.contains("github.com") {
        let base = repo_url.trim_end_matches(".git");
        return format!("{}/blob/{}/{}", base, git_ref, relative_path);
    }

    // git@gitlab.com:org/repo.git → https://gitlab.com/org/repo/-/blob/<ref>/<path>
    if let Some(rest) = repo_url.strip_prefix("git@gitlab.com:") {
        let repo = rest.trim_end_matches(".git");
        return format!(
            "https://gitlab.com/{}/-/blob/{}/{}",
            repo, git_ref, relative_path
        );
    }

    if repo_url.contains("gitlab.com") {
        let base = repo_url.trim_end_matches(".git");
        return format!("{}/-/blob/{}/{}", base, git_ref, relative_path);
    }

    // Fallback: just reference the relative path
    format!("git://{}/{}", repo_url, relative_path)
}
