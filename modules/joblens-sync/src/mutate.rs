use std::sync::Arc;

use tracing::{debug, warn};

use joblens_common::{JobPosting, MutationKind};

use crate::errors::ErrorSurface;
use crate::list::JobList;
use crate::traits::JobApi;

/// Rollback record for one optimistic change. Created when the local state
/// mutates, moved into the rollback on failure, dropped on success — consumed
/// exactly once either way, which is what makes rollback idempotent.
enum PendingMutation {
    Pin {
        job_id: String,
        previous: bool,
    },
    Hide {
        index: usize,
        job: JobPosting,
    },
    HideCompany {
        company: String,
        removed: Vec<(usize, JobPosting)>,
    },
}

/// Applies pin/hide actions to the local list immediately, issues the
/// corresponding write, and reverts the local change if the write fails.
/// Failures land on the error surface; the list itself is the result.
pub struct OptimisticMutator {
    api: Arc<dyn JobApi>,
    list: Arc<JobList>,
    errors: Arc<ErrorSurface>,
}

impl OptimisticMutator {
    pub fn new(api: Arc<dyn JobApi>, list: Arc<JobList>, errors: Arc<ErrorSurface>) -> Self {
        Self { api, list, errors }
    }

    /// Flip a job's pinned flag locally, then confirm with the server.
    pub async fn toggle_pin(&self, job_id: &str) {
        let Some(previous) = self.list.flip_pin(job_id) else {
            debug!(job_id, "pin target not in list");
            return;
        };
        let pending = PendingMutation::Pin {
            job_id: job_id.to_string(),
            previous,
        };
        let kind = if previous {
            MutationKind::Unpin
        } else {
            MutationKind::Pin
        };
        debug!(job_id, kind = %kind, "optimistic mutation applied");
        match self.api.set_pinned(job_id, !previous).await {
            Ok(()) => debug!(job_id, kind = %kind, "write confirmed"),
            Err(err) => self.roll_back(pending, kind, err),
        }
    }

    /// Remove a job locally, then confirm with the server.
    pub async fn hide_job(&self, job_id: &str) {
        let Some((index, job)) = self.list.remove_job(job_id) else {
            debug!(job_id, "hide target not in list");
            return;
        };
        let pending = PendingMutation::Hide { index, job };
        match self.api.hide_job(job_id).await {
            Ok(()) => debug!(job_id, kind = %MutationKind::HideJob, "write confirmed"),
            Err(err) => self.roll_back(pending, MutationKind::HideJob, err),
        }
    }

    /// Remove every listed job from a company locally, then confirm. The
    /// write goes out even when nothing is currently listed for the company —
    /// hiding also covers pages not yet loaded.
    pub async fn hide_company(&self, company: &str) {
        let removed = self.list.remove_company(company);
        let pending = PendingMutation::HideCompany {
            company: company.to_string(),
            removed,
        };
        match self.api.hide_company(company).await {
            Ok(()) => debug!(company, kind = %MutationKind::HideCompany, "write confirmed"),
            Err(err) => self.roll_back(pending, MutationKind::HideCompany, err),
        }
    }

    /// Restore the pre-mutation state exactly and surface the failure.
    fn roll_back(&self, pending: PendingMutation, kind: MutationKind, err: joblens_common::SyncError) {
        warn!(kind = %kind, error = %err, "write failed, rolling back optimistic change");
        match pending {
            PendingMutation::Pin { job_id, previous } => {
                self.list.restore_pin(&job_id, previous);
            }
            PendingMutation::Hide { index, job } => {
                self.list.unremove_job(index, job);
            }
            PendingMutation::HideCompany { company, removed } => {
                self.list.unremove_company(&company, removed);
            }
        }
        self.errors.report(err);
    }
}
