//! repoclone core - clone every repository of a set of owners
//!
//! The pipeline lists each owner's repositories page by page, drops forks
//! and anything the caller's filter rejects, then clones the rest through a
//! bounded worker pool that retries failed clones. Owners are processed one
//! after another.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod git;
pub mod listing;
pub mod options;
pub mod pipeline;
pub mod repository;
pub mod secrets;

pub use config::{CliOverrides, Config};
pub use dispatch::{DispatchLimits, DispatchOutcome, Dispatcher, FailedClone};
pub use error::{Error, Result};
pub use filter::{filter_repositories, RepoFilter};
pub use git::{clone_into_owner_dir, Cloner, GitCloner};
pub use listing::{is_rate_limit_message, list_repositories, RepositoryApi};
pub use options::{CloneOptions, Credentials};
pub use pipeline::{clone_repos, CloneReport, OwnerSummary, RunPhase};
pub use repository::{ListingPage, Owner, Repository};
pub use secrets::Secrets;
