//! Paginated repository listing
//!
//! The hosting API is consumed through [`RepositoryApi`], one page at a
//! time. [`list_repositories`] walks pages starting at 1 until the API
//! returns an empty page.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::{Error, ListingPage, Repository, Result};

/// Source of repository listings
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Fetch one page (1-based) of the repositories owned by `owner`
    async fn list_page(&self, owner: &str, page: u32) -> Result<ListingPage>;
}

/// Whether an API message reports rate limiting
pub fn is_rate_limit_message(message: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)rate limit exceeded").expect("rate limit pattern is valid")
        })
        .is_match(message)
}

/// Turn a `message` body into the matching API error
pub fn message_error(message: String) -> Error {
    if is_rate_limit_message(&message) {
        Error::RateLimited(message)
    } else {
        Error::Api(message)
    }
}

/// Fetch every repository owned by `owner`
///
/// Any failed page aborts the listing; nothing fetched so far is returned.
pub async fn list_repositories<A>(api: &A, owner: &str) -> Result<Vec<Repository>>
where
    A: RepositoryApi + ?Sized,
{
    let mut repos = Vec::new();
    let mut page = 1u32;

    loop {
        match api.list_page(owner, page).await? {
            ListingPage::Repositories(batch) if batch.is_empty() => break,
            ListingPage::Repositories(batch) => {
                debug!(owner, page, count = batch.len(), "Fetched repository page");
                repos.extend(batch);
            }
            ListingPage::Message { message } => return Err(message_error(message)),
        }
        page += 1;
    }

    debug!(owner, pages = page - 1, total = repos.len(), "Listing complete");
    Ok(repos)
}
