//! Owner sequencing: list, filter and clone each owner in turn
//!
//! Owners are processed strictly in configured order. An owner's clones all
//! finish before the next owner's listing starts. A listing failure aborts
//! the run; clone failures only show up in the report.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};

use crate::dispatch::{DispatchLimits, Dispatcher, FailedClone};
use crate::filter::filter_repositories;
use crate::git::Cloner;
use crate::listing::{list_repositories, RepositoryApi};
use crate::{CloneOptions, Result};

/// Phase of a clone run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Checking the options
    Validating,
    /// Fetching an owner's repository pages
    Listing,
    /// Selecting which repositories to clone
    Filtering,
    /// Cloning through the worker pool
    Dispatching,
    /// Every owner processed
    Done,
    /// Stopped by a fatal error
    Aborted,
}

impl RunPhase {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Aborted)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Validating => "validating",
            RunPhase::Listing => "listing",
            RunPhase::Filtering => "filtering",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Done => "done",
            RunPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Per-owner counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    /// Owner login
    pub owner: String,
    /// Repositories returned by the listing
    pub listed: usize,
    /// Repositories left after filtering
    pub selected: usize,
    /// Repositories cloned
    pub cloned: usize,
    /// Repositories abandoned after exhausting their attempts
    pub failed: usize,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    /// Cloned repositories across all owners
    ///
    /// Owners appear in configured order; within an owner, in the order
    /// clones completed.
    pub cloned: Vec<String>,
    /// Repositories that ran out of attempts
    pub failed: Vec<FailedClone>,
    /// Counts per owner, in processing order
    pub owners: Vec<OwnerSummary>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last owner drained
    pub finished_at: DateTime<Utc>,
}

impl CloneReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            cloned: Vec::new(),
            failed: Vec::new(),
            owners: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Whether every selected repository was cloned
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clone the repositories of every configured owner
///
/// The options are validated before any request is made or directory is
/// created. The first listing error is returned as-is; clones finished for
/// earlier owners stay on disk.
pub async fn clone_repos<A>(
    options: CloneOptions,
    api: &A,
    cloner: Arc<dyn Cloner>,
) -> Result<CloneReport>
where
    A: RepositoryApi + ?Sized,
{
    let options = options.validate()?;
    let destination = options.destination_root();
    let limits = DispatchLimits {
        concurrency: options.concurrency,
        max_attempts: options.max_attempts,
    };

    info!(
        owners = ?options.owners,
        destination = %destination.display(),
        concurrency = limits.concurrency,
        max_attempts = limits.max_attempts,
        "Starting clone run"
    );

    let mut report = CloneReport::new();

    for owner in &options.owners {
        let span = info_span!("owner", owner = %owner);
        let result = clone_owner(owner, &options, api, &cloner, &destination, limits, &mut report)
            .instrument(span)
            .await;

        match result {
            Ok(summary) => report.owners.push(summary),
            Err(e) => {
                error!(owner = %owner, phase = %RunPhase::Aborted, error = %e, "Run aborted");
                return Err(e);
            }
        }
    }

    report.finished_at = Utc::now();
    info!(
        phase = %RunPhase::Done,
        cloned = report.cloned.len(),
        failed = report.failed.len(),
        "Clone run finished"
    );

    Ok(report)
}

async fn clone_owner<A>(
    owner: &str,
    options: &CloneOptions,
    api: &A,
    cloner: &Arc<dyn Cloner>,
    destination: &Path,
    limits: DispatchLimits,
    report: &mut CloneReport,
) -> Result<OwnerSummary>
where
    A: RepositoryApi + ?Sized,
{
    info!(phase = %RunPhase::Listing, "Listing repositories");
    let repos = list_repositories(api, owner).await?;
    let listed = repos.len();

    let selected = filter_repositories(repos, &options.filter);
    info!(
        phase = %RunPhase::Filtering,
        listed,
        selected = selected.len(),
        "Selected repositories"
    );
    let selected_count = selected.len();

    let mut dispatcher = Dispatcher::new(Arc::clone(cloner), destination, limits);
    dispatcher.enqueue_all(selected);

    info!(phase = %RunPhase::Dispatching, queued = selected_count, "Cloning");
    let outcome = dispatcher.run().await;

    let summary = OwnerSummary {
        owner: owner.to_string(),
        listed,
        selected: selected_count,
        cloned: outcome.cloned.len(),
        failed: outcome.failed.len(),
    };
    info!(cloned = summary.cloned, failed = summary.failed, "Owner drained");

    report.cloned.extend(outcome.cloned);
    report.failed.extend(outcome.failed);

    Ok(summary)
}
