//! Repository records as returned by the hosting service

use serde::{Deserialize, Serialize};

/// Account that owns a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Account login (user or organization name)
    pub login: String,
}

/// A repository listed for an owner
///
/// Only the fields the clone pipeline reads are kept; everything else in
/// the API payload is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Globally unique `owner/name` identifier
    pub full_name: String,
    /// Repository name without the owner
    pub name: String,
    /// Owning account
    pub owner: Owner,
    /// Whether this repository is a fork of another one
    #[serde(default)]
    pub fork: bool,
    /// URL passed to `git clone`
    pub clone_url: String,
}

impl Repository {
    /// Build a record by hand (tests, fixtures, non-API sources)
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{}/{}", owner, name),
            clone_url: format!("https://github.com/{}/{}.git", owner, name),
            name,
            owner: Owner { login: owner },
            fork: false,
        }
    }

    /// Mark this record as a fork
    pub fn as_fork(mut self) -> Self {
        self.fork = true;
        self
    }

    /// Login of the owning account
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }
}

/// One page of a repository listing
///
/// The hosting API answers either with an array of records or with an
/// object carrying a `message` (errors, rate limiting).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListingPage {
    /// Records on this page; empty marks the end of the listing
    Repositories(Vec<Repository>),
    /// Message body returned instead of records
    Message {
        /// Human readable message from the API
        message: String,
    },
}

impl ListingPage {
    /// A page holding no records
    pub fn empty() -> Self {
        ListingPage::Repositories(Vec::new())
    }
}
