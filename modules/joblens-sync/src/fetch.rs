use std::sync::Arc;

use tracing::{debug, info};

use joblens_common::FilterCriteria;

use crate::errors::ErrorSurface;
use crate::list::{JobList, Phase};
use crate::query::build_query;
use crate::traits::JobApi;

/// Owns the fetch lifecycle for one list view: initial loads, pagination,
/// retry and the similarity flow. All list state lives in the shared
/// `JobList`; this type decides when to fetch and what to do with the result.
pub struct FetchOrchestrator {
    api: Arc<dyn JobApi>,
    list: Arc<JobList>,
    errors: Arc<ErrorSurface>,
    page_size: u32,
}

impl FetchOrchestrator {
    pub fn new(
        api: Arc<dyn JobApi>,
        list: Arc<JobList>,
        errors: Arc<ErrorSurface>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            list,
            errors,
            page_size,
        }
    }

    pub fn list(&self) -> &Arc<JobList> {
        &self.list
    }

    pub fn errors(&self) -> &Arc<ErrorSurface> {
        &self.errors
    }

    /// Start over for a new stabilized filter snapshot: clear the list, drop
    /// the cursor and fetch page one. Always proceeds — an in-flight fetch is
    /// superseded by the generation bump and its response discarded on
    /// arrival.
    pub async fn reset_and_fetch(&self, filters: &FilterCriteria) {
        let generation = self.list.begin_reset(filters);
        self.errors.clear();
        let query = build_query(filters, None, self.page_size);
        debug!(generation, "fetching initial page");
        match self.api.list(&query).await {
            Ok(page) => {
                if self.list.apply_initial(generation, page, self.page_size) {
                    debug!(generation, "initial page applied");
                }
            }
            Err(err) => {
                if self.list.fail_fetch(generation) {
                    self.errors.report(err);
                }
            }
        }
    }

    /// Fetch the next page. No-op while anything is in flight, after the end
    /// of the data, or outside the loaded state — the caller's UI disables
    /// the affordance rather than queueing.
    pub async fn load_more(&self) {
        let Some((generation, cursor, filters)) = self.list.begin_load_more() else {
            debug!("load_more ignored");
            return;
        };
        let query = build_query(&filters, cursor, self.page_size);
        debug!(generation, "fetching next page");
        match self.api.list(&query).await {
            Ok(page) => {
                self.list.apply_more(generation, page, self.page_size);
            }
            Err(err) => {
                if self.list.fail_fetch(generation) {
                    self.errors.report(err);
                }
            }
        }
    }

    /// Re-issue the initial fetch after a failure, with the same filters.
    pub async fn retry(&self) {
        if self.list.phase() != Phase::Failed {
            return;
        }
        let filters = self.list.active_filters();
        self.reset_and_fetch(&filters).await;
    }

    /// Kick off a server-side similarity search for a listed job, then
    /// re-query. Not optimistic: while the trigger is pending the view shows
    /// the loading-similar state instead of the list.
    pub async fn find_similar(&self, job_id: &str) {
        let Some(title) = self.list.begin_similar(job_id) else {
            debug!(job_id, "find_similar ignored");
            return;
        };
        info!(job_id, title, "similarity search requested");
        match self.api.find_similar(job_id).await {
            Ok(()) => {
                let filters = self.list.active_filters();
                self.reset_and_fetch(&filters).await;
            }
            Err(err) => {
                self.list.abort_similar();
                self.errors.report(err);
            }
        }
    }

    /// Leave the "similar to X" view and fetch the plain list again.
    pub async fn clear_similar(&self) {
        if !self.list.clear_similar() {
            return;
        }
        let filters = self.list.active_filters();
        self.reset_and_fetch(&filters).await;
    }
}
