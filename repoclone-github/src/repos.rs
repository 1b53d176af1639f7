//! Repository listing for users and organizations

use async_trait::async_trait;
use repoclone_core::{is_rate_limit_message, ListingPage, RepositoryApi};
use serde::Serialize;
use tracing::debug;

use crate::{Error, GitHubClient, Result};

/// Records requested per page (the API maximum)
pub const PER_PAGE: u8 = 100;

/// Query parameters for `GET /users/{owner}/repos`
#[derive(Debug, Serialize)]
struct ListParams {
    page: u32,
    per_page: u8,
}

fn repos_route(owner: &str) -> String {
    format!("/users/{}/repos", owner)
}

/// Map an octocrab failure to a GitHub error, spotting rate limiting
fn classify_error(err: octocrab::Error) -> Error {
    match &err {
        octocrab::Error::GitHub { source, .. } if is_rate_limit_message(&source.message) => {
            Error::RateLimited(source.message.clone())
        }
        _ => Error::Api(err),
    }
}

impl GitHubClient {
    /// Fetch one page of the repositories owned by `owner`
    ///
    /// Works for both users and organizations. Pages are 1-based; a page past
    /// the end comes back empty.
    pub async fn list_repos_page(&self, owner: &str, page: u32) -> Result<ListingPage> {
        debug!(owner, page, "Listing repositories");

        let params = ListParams {
            page,
            per_page: PER_PAGE,
        };

        let listing: ListingPage = self
            .client()
            .get(repos_route(owner), Some(&params))
            .await
            .map_err(classify_error)?;

        Ok(listing)
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn list_page(&self, owner: &str, page: u32) -> repoclone_core::Result<ListingPage> {
        Ok(self.list_repos_page(owner, page).await?)
    }
}
