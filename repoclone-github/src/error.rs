//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<Error> for repoclone_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::RateLimited(message) => repoclone_core::Error::RateLimited(message),
            Error::Parse(message) => {
                repoclone_core::Error::Config(format!("Invalid GitHub setting: {}", message))
            }
            other => repoclone_core::Error::Api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_maps_to_core_rate_limit() {
        let core: repoclone_core::Error =
            Error::RateLimited("API rate limit exceeded".to_string()).into();
        assert!(matches!(core, repoclone_core::Error::RateLimited(_)));
        assert!(core.is_fatal());
    }

    #[test]
    fn test_other_errors_map_to_core_api_error() {
        let core: repoclone_core::Error = Error::Auth("Bad credentials".to_string()).into();
        assert!(matches!(core, repoclone_core::Error::Api(_)));
        assert!(core.to_string().contains("Bad credentials"));
    }

    #[test]
    fn test_parse_error_maps_to_config_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        let core: repoclone_core::Error = err.into();
        assert!(matches!(core, repoclone_core::Error::Config(_)));
    }
}
