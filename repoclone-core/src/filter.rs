//! Repository selection

use std::fmt;
use std::sync::Arc;

use crate::Repository;

/// Caller-supplied predicate deciding which repositories to clone
///
/// Forks are excluded regardless of what the predicate says.
#[derive(Clone)]
pub struct RepoFilter(Arc<dyn Fn(&Repository) -> bool + Send + Sync>);

impl RepoFilter {
    /// Wrap a predicate
    pub fn new(predicate: impl Fn(&Repository) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Accept every repository
    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }

    /// Accept repositories whose name matches `pattern`
    pub fn name_matches(pattern: regex::Regex) -> Self {
        Self::new(move |repo| pattern.is_match(&repo.name))
    }

    /// Evaluate the predicate for one record
    pub fn accepts(&self, repo: &Repository) -> bool {
        (self.0)(repo)
    }
}

impl Default for RepoFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl fmt::Debug for RepoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RepoFilter(<fn>)")
    }
}

/// Keep the non-fork repositories accepted by `filter`, in input order
pub fn filter_repositories(repos: Vec<Repository>, filter: &RepoFilter) -> Vec<Repository> {
    repos
        .into_iter()
        .filter(|repo| !repo.fork && filter.accepts(repo))
        .collect()
}
