use anyhow::Result;
use std::process::Command;

use crate::config::Config;

/// List configured repositories and their local checkout status. Useful
/// for verifying configuration before running a harvest.
pub fn list_repos(config: &Config) -> Result<()> {
    let git_ok = Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    println!("git client: {}", if git_ok { "OK" } else { "NOT FOUND" });
    println!("clone dir:  {}", config.harvest.clone_dir.display());
    println!();

    if config.repos.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    println!("{:<24} {:<10} URL", "NAME", "CHECKOUT");
    for repo in &config.repos {
        let checkout = config.harvest.clone_dir.join(&repo.name);
        let status = if checkout.join(".git").exists() {
            "present"
        } else {
            "absent"
        };
        println!("{:<24} {:<10} {}", repo.name, status, repo.url);
    }

    Ok(())
}
