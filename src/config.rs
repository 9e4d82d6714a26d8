use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub repos: Vec<RepoSpec>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// One harvesting target: a remote repository and the name its records
/// are filed under.
#[derive(Debug, Deserialize, Clone)]
pub struct RepoSpec {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    /// Directory working copies are cloned into. Each repository lands at
    /// `<clone_dir>/<name>`.
    #[serde(default = "default_clone_dir")]
    pub clone_dir: PathBuf,

    /// Keep working copies on disk after harvesting instead of deleting them.
    #[serde(default)]
    pub keep_clones: bool,

    /// Clone with `--depth 1`.
    #[serde(default)]
    pub shallow: bool,

    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,

    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            clone_dir: default_clone_dir(),
            keep_clones: false,
            shallow: false,
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_clone_dir() -> PathBuf {
    PathBuf::from("./cloned_repos")
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.py".to_string()]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate repos
    let mut seen = HashSet::new();
    for repo in &config.repos {
        if repo.name.trim().is_empty() {
            anyhow::bail!("repos entry with url '{}' has an empty name", repo.url);
        }
        if repo.url.trim().is_empty() {
            anyhow::bail!("repos entry '{}' has an empty url", repo.name);
        }
        if repo.name.contains('/') || repo.name.contains('\\') {
            anyhow::bail!(
                "repos entry '{}' must not contain path separators",
                repo.name
            );
        }
        if !seen.insert(repo.name.as_str()) {
            anyhow::bail!("duplicate repos entry: '{}'", repo.name);
        }
    }

    if config.harvest.include_globs.is_empty() {
        anyhow::bail!("harvest.include_globs must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_minimal_config() {
        let file = write_config(
            r#"
[db]
path = "data/docstrings.sqlite"

[[repos]]
url = "https://github.com/psf/requests.git"
name = "requests"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.repos[0].name, "requests");
        assert_eq!(config.harvest.clone_dir, PathBuf::from("./cloned_repos"));
        assert!(!config.harvest.keep_clones);
        assert_eq!(config.harvest.include_globs, vec!["**/*.py".to_string()]);
    }

    #[test]
    fn duplicate_repo_names_rejected() {
        let file = write_config(
            r#"
[db]
path = "data/docstrings.sqlite"

[[repos]]
url = "https://github.com/a/one.git"
name = "one"

[[repos]]
url = "https://github.com/b/one.git"
name = "one"
"#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn repo_name_with_separator_rejected() {
        let file = write_config(
            r#"
[db]
path = "data/docstrings.sqlite"

[[repos]]
url = "https://github.com/a/one.git"
name = "a/one"
"#,
        );

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn empty_repo_list_is_allowed() {
        let file = write_config(
            r#"
[db]
path = "data/docstrings.sqlite"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert!(config.repos.is_empty());
    }
}
