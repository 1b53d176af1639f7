//! Secrets management for repoclone
//!
//! API credentials live in `~/.config/repoclone/secrets.toml`, apart from
//! `config.toml`. The file holds either a token or a username/password pair
//! and must not be readable by group or others on Unix.
//!
//! Loading priority:
//! 1. Environment variables (GITHUB_TOKEN)
//! 2. Secrets file (~/.config/repoclone/secrets.toml)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::Credentials;
use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,

    /// Username for basic authentication
    pub username: Option<String>,

    /// Password for basic authentication
    pub password: Option<String>,
}

impl std::fmt::Debug for GitHubSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSecrets")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location, if present
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }
        if let Some(ref mut username) = secrets.github.username {
            *username = username.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/repoclone/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repoclone").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn github_token(&self) -> Option<String> {
        env_token().or_else(|| self.file_token())
    }

    fn file_token(&self) -> Option<String> {
        match self.github.token {
            Some(ref token) if !token.is_empty() => {
                debug!("Using GitHub token from secrets file");
                Some(token.clone())
            }
            _ => None,
        }
    }

    /// Credentials to fall back on when none were given explicitly
    ///
    /// A token (environment or file) wins over a username/password pair
    /// from the secrets file.
    pub fn credentials(&self) -> Option<Credentials> {
        env_token()
            .map(Credentials::token)
            .or_else(|| self.file_credentials())
    }

    /// Credentials stored in the secrets file alone
    fn file_credentials(&self) -> Option<Credentials> {
        if let Some(token) = self.file_token() {
            return Some(Credentials::token(token));
        }

        match (&self.github.username, &self.github.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                debug!("Using basic credentials from secrets file");
                Some(Credentials::basic(username.clone(), password.clone()))
            }
            _ => None,
        }
    }
}

fn env_token() -> Option<String> {
    let token = std::env::var("GITHUB_TOKEN").ok()?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    debug!("Using GitHub token from GITHUB_TOKEN environment variable");
    Some(token.to_string())
}
