//! Run configuration for a clone run
//!
//! A [`CloneOptions`] is built once per invocation and validated before any
//! network or filesystem activity. Validation only normalizes: owners are
//! trimmed and de-duplicated, and the destination defaults to the current
//! working directory.

use std::fmt;
use std::path::PathBuf;

use crate::filter::RepoFilter;
use crate::{Error, Result};

/// Default number of clones running at the same time
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default number of clone attempts per repository
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Credentials for the hosting API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username and password (basic authentication)
    Basic {
        /// Account username
        username: String,
        /// Account password
        password: String,
    },
    /// Personal access token
    Token {
        /// Token value
        token: String,
    },
}

impl Credentials {
    /// Basic authentication credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Token authentication credentials
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token {
            token: token.into(),
        }
    }

    /// Select a credential shape from loose command line parts
    ///
    /// A username or password selects basic authentication, a token selects
    /// token authentication. Supplying both shapes is an error. Missing halves
    /// of the basic pair are left empty so that [`Credentials::validate`]
    /// reports them.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
    ) -> Result<Option<Self>> {
        let wants_basic = username.is_some() || password.is_some();

        match (wants_basic, token) {
            (true, Some(_)) => Err(Error::Config(
                "Use either `username`/`password` or `token`, not both".to_string(),
            )),
            (true, None) => Ok(Some(Credentials::basic(
                username.unwrap_or_default(),
                password.unwrap_or_default(),
            ))),
            (false, Some(token)) => Ok(Some(Credentials::token(token))),
            (false, None) => Ok(None),
        }
    }

    /// Check that the selected shape has all required fields
    pub fn validate(&self) -> Result<()> {
        match self {
            Credentials::Basic { username, password } => {
                if username.trim().is_empty() {
                    return Err(Error::Config(
                        "Expected a `username` for basic authentication".to_string(),
                    ));
                }
                if password.is_empty() {
                    return Err(Error::Config(
                        "Expected a `password` for basic authentication".to_string(),
                    ));
                }
            }
            Credentials::Token { token } => {
                if token.trim().is_empty() {
                    return Err(Error::Config(
                        "Expected a `token` for token authentication".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Short name of the authentication scheme
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Basic { .. } => "basic",
            Credentials::Token { .. } => "token",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Everything a clone run needs to know
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Accounts whose repositories are cloned, in processing order
    pub owners: Vec<String>,

    /// Root directory; repositories land in `<destination>/<owner>/<name>`
    pub destination: Option<PathBuf>,

    /// Credentials for the hosting API
    pub credentials: Option<Credentials>,

    /// Which repositories to clone
    pub filter: RepoFilter,

    /// Maximum number of clones running at once
    pub concurrency: usize,

    /// Maximum number of clone attempts per repository
    pub max_attempts: u32,

    /// Base URL of the hosting API (defaults to the public service)
    pub api_url: Option<String>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            destination: None,
            credentials: None,
            filter: RepoFilter::default(),
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            api_url: None,
        }
    }
}

impl CloneOptions {
    /// Options for a single owner
    pub fn new(owner: impl Into<String>) -> Self {
        Self::default().with_owner(owner)
    }

    /// Append an owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    /// Append several owners
    pub fn with_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners.extend(owners.into_iter().map(Into::into));
        self
    }

    /// Set the destination root
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the API credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the repository filter
    pub fn with_filter(
        mut self,
        predicate: impl Fn(&crate::Repository) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = RepoFilter::new(predicate);
        self
    }

    /// Set the concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-repository attempt ceiling
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Validate and normalize the options
    ///
    /// Performs no IO beyond reading the current working directory when no
    /// destination was given.
    pub fn validate(mut self) -> Result<Self> {
        let mut owners: Vec<String> = Vec::with_capacity(self.owners.len());
        for owner in self.owners.iter().map(|o| o.trim()) {
            if owner.is_empty() {
                return Err(Error::Config("Owner names must not be empty".to_string()));
            }
            if !is_valid_owner(owner) {
                return Err(Error::Config(format!("Invalid owner name '{}'", owner)));
            }
            if !owners.iter().any(|o| o == owner) {
                owners.push(owner.to_string());
            }
        }
        if owners.is_empty() {
            return Err(Error::Config("Expected `owner` to be set.".to_string()));
        }
        self.owners = owners;

        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }

        if self.concurrency == 0 {
            return Err(Error::Config("Concurrency must be at least 1".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("Max attempts must be at least 1".to_string()));
        }

        if self.destination.is_none() {
            self.destination = Some(std::env::current_dir().map_err(|e| {
                Error::Config(format!("Could not determine current directory: {}", e))
            })?);
        }

        Ok(self)
    }

    /// Destination root, falling back to the current directory
    pub fn destination_root(&self) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Account names only use characters that are safe in a URL path segment
fn is_valid_owner(owner: &str) -> bool {
    owner
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && owner != "."
        && owner != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_owner_rejected() {
        let err = CloneOptions::default().validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Expected `owner` to be set."
        );
    }

    #[test]
    fn test_blank_owner_rejected() {
        let err = CloneOptions::new("  ").validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_owner_with_path_characters_rejected() {
        for owner in ["acme/widget", "acme?page=2", "ac%2Fme", "..", "ac me"] {
            let err = CloneOptions::new(owner)
                .with_destination("/tmp/out")
                .validate()
                .unwrap_err();
            assert!(matches!(err, Error::Config(_)), "accepted {:?}", owner);
        }

        assert!(CloneOptions::new("my-org_2.0")
            .with_destination("/tmp/out")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_owners_normalized() {
        let options = CloneOptions::new(" acme ")
            .with_owners(["doowb", "acme"])
            .with_destination("/tmp/out")
            .validate()
            .unwrap();
        assert_eq!(options.owners, vec!["acme", "doowb"]);
    }

    #[test]
    fn test_destination_defaults_to_cwd() {
        let options = CloneOptions::new("acme").validate().unwrap();
        assert_eq!(options.destination, Some(std::env::current_dir().unwrap()));
    }

    #[test]
    fn test_defaults() {
        let options = CloneOptions::new("acme");
        assert_eq!(options.concurrency, 8);
        assert_eq!(options.max_attempts, 3);
        assert!(options.credentials.is_none());
        assert!(options.filter.accepts(&crate::Repository::new("acme", "x")));
    }

    #[test]
    fn test_basic_auth_requires_both_fields() {
        let missing_password = CloneOptions::new("acme")
            .with_credentials(Credentials::basic("me", ""))
            .validate()
            .unwrap_err();
        assert!(missing_password.to_string().contains("`password`"));

        let missing_username = CloneOptions::new("acme")
            .with_credentials(Credentials::basic("", "secret"))
            .validate()
            .unwrap_err();
        assert!(missing_username.to_string().contains("`username`"));

        assert!(CloneOptions::new("acme")
            .with_credentials(Credentials::basic("me", "secret"))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_token_auth_requires_token() {
        let err = CloneOptions::new("acme")
            .with_credentials(Credentials::token(" "))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("`token`"));
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(CloneOptions::new("acme")
            .with_concurrency(0)
            .validate()
            .is_err());
        assert!(CloneOptions::new("acme")
            .with_max_attempts(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(Credentials::from_parts(None, None, None).unwrap(), None);
        assert_eq!(
            Credentials::from_parts(None, None, Some("ghp_x".into())).unwrap(),
            Some(Credentials::token("ghp_x"))
        );
        assert_eq!(
            Credentials::from_parts(Some("me".into()), None, None).unwrap(),
            Some(Credentials::basic("me", ""))
        );
        assert!(Credentials::from_parts(Some("me".into()), None, Some("t".into())).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::basic("me", "hunter2"));
        assert!(debug.contains("me"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Credentials::token("ghp_secret"));
        assert!(!debug.contains("ghp_secret"));
    }
}
