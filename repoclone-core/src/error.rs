//! Error types for repoclone

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for repoclone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for repoclone operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Listing request failed
    #[error("API error: {0}")]
    Api(String),

    /// Hosting service refused the listing because of rate limiting
    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    /// Owner directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    Filesystem {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The clone command reported failure
    #[error("Failed to clone {repo}: {message}")]
    Clone {
        /// Full name of the repository
        repo: String,
        /// Diagnostic output of the clone command
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts the whole run.
    ///
    /// Filesystem and clone failures are confined to a single repository
    /// and count against its retry budget instead.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Filesystem { .. } | Error::Clone { .. })
    }
}
