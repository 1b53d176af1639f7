//! Bounded-concurrency clone dispatch with per-repository retries
//!
//! A [`Dispatcher`] is built for one owner's repositories. It keeps at most
//! `concurrency` clones in flight, puts failed repositories back at the end
//! of its queue until they have used `max_attempts` attempts, and finishes
//! once the queue is empty and no clone is running. Dropping a running
//! dispatcher aborts its clones.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info, warn};

use crate::git::{clone_into_owner_dir, Cloner};
use crate::options::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};
use crate::{Error, Repository, Result};

/// Concurrency and retry ceilings for one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchLimits {
    /// Maximum number of clones in flight
    pub concurrency: usize,
    /// Maximum number of attempts per repository
    pub max_attempts: u32,
}

impl Default for DispatchLimits {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A repository that never cloned successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedClone {
    /// Full name of the repository
    pub full_name: String,
    /// Number of attempts made
    pub attempts: u32,
    /// Error from the last attempt
    pub error: String,
}

/// Result of draining a dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Successfully cloned repositories, in completion order
    pub cloned: Vec<String>,
    /// Repositories abandoned after exhausting their attempts
    pub failed: Vec<FailedClone>,
}

/// Worker pool cloning one owner's repositories
pub struct Dispatcher {
    cloner: Arc<dyn Cloner>,
    destination: PathBuf,
    limits: DispatchLimits,
    queue: VecDeque<Repository>,
    attempts: HashMap<String, u32>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("destination", &self.destination)
            .field("limits", &self.limits)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create an empty dispatcher cloning into `destination`
    pub fn new(
        cloner: Arc<dyn Cloner>,
        destination: impl Into<PathBuf>,
        limits: DispatchLimits,
    ) -> Self {
        Self {
            cloner,
            destination: destination.into(),
            limits: DispatchLimits {
                concurrency: limits.concurrency.max(1),
                max_attempts: limits.max_attempts.max(1),
            },
            queue: VecDeque::new(),
            attempts: HashMap::new(),
        }
    }

    /// Queue a repository for cloning
    pub fn enqueue(&mut self, repo: Repository) {
        self.attempts.entry(repo.full_name.clone()).or_insert(0);
        self.queue.push_back(repo);
    }

    /// Queue several repositories, preserving their order
    pub fn enqueue_all(&mut self, repos: impl IntoIterator<Item = Repository>) {
        for repo in repos {
            self.enqueue(repo);
        }
    }

    /// Number of repositories waiting for a worker
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Clone everything queued and wait until the dispatcher drains
    ///
    /// Individual failures never abort the run; they are retried and, once
    /// out of attempts, reported in [`DispatchOutcome::failed`].
    pub async fn run(mut self) -> DispatchOutcome {
        let mut workers: JoinSet<Result<PathBuf>> = JoinSet::new();
        let mut in_flight: HashMap<Id, Repository> = HashMap::new();
        let mut outcome = DispatchOutcome::default();

        loop {
            while workers.len() < self.limits.concurrency {
                let Some(repo) = self.queue.pop_front() else {
                    break;
                };
                self.spawn_worker(&mut workers, &mut in_flight, repo);
            }

            // Nothing running and nothing queued: drained
            let Some(joined) = workers.join_next_with_id().await else {
                break;
            };

            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(join_err) => (
                    join_err.id(),
                    Err(Error::Other(format!("Clone worker failed: {}", join_err))),
                ),
            };
            let Some(repo) = in_flight.remove(&id) else {
                error!(task = %id, "Finished clone task has no repository");
                continue;
            };

            match result {
                Ok(path) => {
                    info!(repo = %repo.full_name, path = %path.display(), "Cloned");
                    outcome.cloned.push(repo.full_name);
                }
                Err(err) => self.record_failure(repo, err, &mut outcome),
            }
        }

        outcome
    }

    fn spawn_worker(
        &self,
        workers: &mut JoinSet<Result<PathBuf>>,
        in_flight: &mut HashMap<Id, Repository>,
        repo: Repository,
    ) {
        let cloner = Arc::clone(&self.cloner);
        let destination = self.destination.clone();
        let attempt = self.attempts.get(&repo.full_name).copied().unwrap_or(0) + 1;

        debug!(repo = %repo.full_name, attempt, "Starting clone");

        let task_repo = repo.clone();
        let handle = workers.spawn(async move {
            clone_into_owner_dir(cloner.as_ref(), &destination, &task_repo).await
        });
        in_flight.insert(handle.id(), repo);
    }

    fn record_failure(&mut self, repo: Repository, err: Error, outcome: &mut DispatchOutcome) {
        let attempts = self.attempts.entry(repo.full_name.clone()).or_insert(0);
        *attempts += 1;
        let attempts = *attempts;

        if attempts < self.limits.max_attempts {
            warn!(
                repo = %repo.full_name,
                error = %err,
                "Retry attempt ({}) for {}",
                attempts,
                repo.full_name
            );
            self.queue.push_back(repo);
        } else {
            error!(
                repo = %repo.full_name,
                attempts,
                error = %err,
                "Giving up on repository"
            );
            outcome.failed.push(FailedClone {
                full_name: repo.full_name,
                attempts,
                error: err.to_string(),
            });
        }
    }
}
