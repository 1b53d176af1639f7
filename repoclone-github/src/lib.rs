//! repoclone GitHub - GitHub integration for repoclone
//!
//! This crate lists repositories through the GitHub REST API and wires the
//! listing into the core clone pipeline.

mod client;
mod error;
mod repos;

use std::sync::Arc;

use repoclone_core::{CloneOptions, CloneReport, Cloner, GitCloner};

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::{Error, Result};
pub use repos::PER_PAGE;

/// Clone every repository of the configured owners using the system `git`
pub async fn clone_repos(options: CloneOptions) -> repoclone_core::Result<CloneReport> {
    clone_repos_with(options, Arc::new(GitCloner::new())).await
}

/// Clone every repository of the configured owners with a custom clone operation
///
/// Options are validated before the API client is built, so bad input never
/// reaches the network.
pub async fn clone_repos_with(
    options: CloneOptions,
    cloner: Arc<dyn Cloner>,
) -> repoclone_core::Result<CloneReport> {
    let options = options.validate()?;
    let client = GitHubClient::new(options.credentials.as_ref(), options.api_url.as_deref())?;

    repoclone_core::clone_repos(options, &client, cloner).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use repoclone_core::Credentials;

    #[tokio::test]
    async fn test_missing_owner_is_config_error() {
        let err = clone_repos(CloneOptions::default()).await.unwrap_err();
        assert!(matches!(err, repoclone_core::Error::Config(_)));
    }

    #[tokio::test]
    async fn test_incomplete_token_is_config_error() {
        let options = CloneOptions::new("doowb").with_credentials(Credentials::token(""));
        let err = clone_repos(options).await.unwrap_err();
        assert!(matches!(err, repoclone_core::Error::Config(_)));
    }

    #[tokio::test]
    async fn test_bad_api_url_is_config_error() {
        let options = CloneOptions::new("doowb").with_api_url("ftp://ghe.example.com");
        let err = clone_repos(options).await.unwrap_err();
        assert!(matches!(err, repoclone_core::Error::Config(_)));
    }
}
