//! Configuration management for repoclone
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REPOCLONE_*)
//! 3. Config file (~/.config/repoclone/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::git::GitCloner;
use crate::options::{CloneOptions, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};
use crate::{Error, Result};

/// Clone-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloneSettings {
    /// Root directory for cloned repositories (current directory when unset)
    pub destination: Option<PathBuf>,

    /// Maximum number of clones running at once
    pub concurrency: usize,

    /// Maximum number of attempts per repository
    pub max_attempts: u32,

    /// Path to the git executable
    pub git_path: String,

    /// Abort a single clone after this long (e.g. "10m")
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            destination: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            git_path: "git".to_string(),
            timeout: None,
        }
    }
}

/// GitHub-related configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// API base URL, for GitHub Enterprise installations
    pub api_url: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Clone configuration
    pub clone: CloneSettings,

    /// GitHub configuration
    pub github: GitHubSettings,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--dest`
    pub destination: Option<PathBuf>,
    /// `--concurrency`
    pub concurrency: Option<usize>,
    /// `--max-attempts`
    pub max_attempts: Option<u32>,
    /// `--git`
    pub git_path: Option<String>,
    /// `--api-url`
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/repoclone/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repoclone").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REPOCLONE_DEST: Destination root
    /// - REPOCLONE_GIT_PATH: Path to git executable
    /// - REPOCLONE_API_URL: API base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dest) = std::env::var("REPOCLONE_DEST") {
            self.clone.destination = Some(PathBuf::from(dest));
        }

        if let Ok(git_path) = std::env::var("REPOCLONE_GIT_PATH") {
            self.clone.git_path = git_path;
        }

        if let Ok(api_url) = std::env::var("REPOCLONE_API_URL") {
            self.github.api_url = Some(api_url);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(dest) = overrides.destination {
            self.clone.destination = Some(dest);
        }

        if let Some(concurrency) = overrides.concurrency {
            self.clone.concurrency = concurrency;
        }

        if let Some(max_attempts) = overrides.max_attempts {
            self.clone.max_attempts = max_attempts;
        }

        if let Some(git_path) = overrides.git_path {
            self.clone.git_path = git_path;
        }

        if let Some(api_url) = overrides.api_url {
            self.github.api_url = Some(api_url);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }

    /// Run options for `owners` seeded from this configuration
    pub fn clone_options<I, S>(&self, owners: I) -> CloneOptions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = CloneOptions::default()
            .with_owners(owners)
            .with_concurrency(self.clone.concurrency)
            .with_max_attempts(self.clone.max_attempts);

        options.destination = self.clone.destination.clone();
        options.api_url = self.github.api_url.clone();
        options
    }

    /// Clone operation configured from this configuration
    pub fn git_cloner(&self) -> GitCloner {
        GitCloner::new()
            .with_git_path(&self.clone.git_path)
            .with_timeout(self.clone.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.clone.concurrency, 8);
        assert_eq!(config.clone.max_attempts, 3);
        assert_eq!(config.clone.git_path, "git");
        assert!(config.clone.destination.is_none());
        assert!(config.clone.timeout.is_none());
        assert!(config.github.api_url.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            destination: Some(PathBuf::from("/srv/mirror")),
            concurrency: Some(2),
            max_attempts: None,
            git_path: Some("/usr/local/bin/git".to_string()),
            api_url: Some("https://ghe.example.com/api/v3".to_string()),
        });

        assert_eq!(config.clone.destination, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(config.clone.concurrency, 2);
        assert_eq!(config.clone.max_attempts, 3);
        assert_eq!(config.clone.git_path, "/usr/local/bin/git");
        assert_eq!(
            config.github.api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[clone]
destination = "/srv/mirror"
concurrency = 4
max_attempts = 5
git_path = "/opt/git/bin/git"
timeout = "10m"

[github]
api_url = "https://ghe.example.com/api/v3"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.clone.destination, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(config.clone.concurrency, 4);
        assert_eq!(config.clone.max_attempts, 5);
        assert_eq!(config.clone.timeout, Some(Duration::from_secs(600)));
        assert_eq!(
            config.github.api_url,
            Some("https://ghe.example.com/api/v3".to_string())
        );
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[clone]
concurrency = 2
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else should use defaults
        assert_eq!(config.clone.concurrency, 2);
        assert_eq!(config.clone.max_attempts, 3);
        assert_eq!(config.clone.git_path, "git");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[clone]\nconcurrency = \"many\"\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_clone_options_from_config() {
        let mut config = Config::default();
        config.clone.destination = Some(PathBuf::from("/srv/mirror"));
        config.clone.concurrency = 2;

        let options = config.clone_options(["acme", "doowb"]);
        assert_eq!(options.owners, vec!["acme", "doowb"]);
        assert_eq!(options.destination, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(options.concurrency, 2);
        assert_eq!(options.max_attempts, 3);
    }

    #[test]
    fn test_git_cloner_from_config() {
        let mut config = Config::default();
        config.clone.git_path = "/opt/git".to_string();
        assert_eq!(config.git_cloner().git_path(), "/opt/git");
    }
}
