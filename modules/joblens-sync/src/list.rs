use std::collections::HashSet;
use std::sync::Mutex;

use tracing::debug;

use joblens_common::{FilterCriteria, JobPosting};

/// Where a list view is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingInitial,
    LoadingMore,
    /// Similarity trigger in flight; the view suppresses the list and the
    /// filter controls while this is set.
    LoadingSimilar,
    Loaded,
    Failed,
}

/// Shared list state for one view: result list, pagination cursor, loading
/// phase, filter generation and the locally-hidden sets. The fetch
/// orchestrator and the optimistic mutator both hold an `Arc` of this.
///
/// The mutex guards short critical sections only and is never held across an
/// await.
pub struct JobList {
    state: Mutex<ListState>,
}

struct ListState {
    jobs: Vec<JobPosting>,
    cursor: Option<String>,
    has_more: bool,
    phase: Phase,
    /// Bumped by every reset. A response carries the generation it was issued
    /// under and is dropped on arrival if the list has moved on — last writer
    /// wins by generation, not by arrival order.
    generation: u64,
    /// Generation of the fetch currently in flight, if any.
    in_flight: Option<u64>,
    /// Filters the current generation was issued with; `load_more` and
    /// `retry` reuse them.
    active_filters: FilterCriteria,
    /// Ids hidden locally. A late page must never resurrect these.
    hidden_jobs: HashSet<String>,
    hidden_companies: HashSet<String>,
    /// Title marker for the "similar to X" view.
    similar_to: Option<String>,
}

impl Default for JobList {
    fn default() -> Self {
        Self::new()
    }
}

impl JobList {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ListState {
                jobs: Vec::new(),
                cursor: None,
                has_more: true,
                phase: Phase::Idle,
                generation: 0,
                in_flight: None,
                active_filters: FilterCriteria::default(),
                hidden_jobs: HashSet::new(),
                hidden_companies: HashSet::new(),
                similar_to: None,
            }),
        }
    }

    // --- Read access ---

    pub fn snapshot(&self) -> Vec<JobPosting> {
        self.state.lock().unwrap().jobs.clone()
    }

    pub fn job(&self, job_id: &str) -> Option<JobPosting> {
        let state = self.state.lock().unwrap();
        state.jobs.iter().find(|j| j.id == job_id).cloned()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().unwrap().has_more
    }

    pub fn cursor(&self) -> Option<String> {
        self.state.lock().unwrap().cursor.clone()
    }

    pub fn similar_to(&self) -> Option<String> {
        self.state.lock().unwrap().similar_to.clone()
    }

    pub fn active_filters(&self) -> FilterCriteria {
        self.state.lock().unwrap().active_filters.clone()
    }

    // --- Fetch transitions ---

    /// Start a fresh query generation: clear the list and cursor, remember
    /// the filters, and supersede whatever fetch may be in flight.
    pub(crate) fn begin_reset(&self, filters: &FilterCriteria) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.jobs.clear();
        state.cursor = None;
        state.has_more = true;
        state.phase = Phase::LoadingInitial;
        state.in_flight = Some(state.generation);
        state.active_filters = filters.clone();
        state.generation
    }

    /// Claim a load-more slot. `None` when there is nothing to load, a fetch
    /// is already in flight, or the view is not in a loaded state — callers
    /// treat that as a no-op, not an error.
    pub(crate) fn begin_load_more(&self) -> Option<(u64, Option<String>, FilterCriteria)> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Loaded || !state.has_more || state.in_flight.is_some() {
            return None;
        }
        state.phase = Phase::LoadingMore;
        state.in_flight = Some(state.generation);
        Some((
            state.generation,
            state.cursor.clone(),
            state.active_filters.clone(),
        ))
    }

    /// Apply a reset page. Returns false (and changes nothing) if the page's
    /// generation was superseded while it was in flight.
    pub(crate) fn apply_initial(
        &self,
        generation: u64,
        page: Vec<JobPosting>,
        page_size: u32,
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!(generation, "discarding stale initial page");
            return false;
        }
        state.cursor = page.last().map(|j| j.id.clone());
        state.has_more = page.len() as u32 == page_size;
        state.jobs.clear();
        admit(&mut state, page);
        state.phase = Phase::Loaded;
        state.in_flight = None;
        true
    }

    /// Append a loaded-more page. Ids already present and ids hidden locally
    /// are dropped; the cursor and `has_more` come from the raw page, before
    /// any filtering.
    pub(crate) fn apply_more(&self, generation: u64, page: Vec<JobPosting>, page_size: u32) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!(generation, "discarding stale load-more page");
            return false;
        }
        if let Some(last) = page.last() {
            state.cursor = Some(last.id.clone());
        }
        state.has_more = page.len() as u32 == page_size;
        let appended = admit(&mut state, page);
        debug!(appended, total = state.jobs.len(), "page merged");
        state.phase = Phase::Loaded;
        state.in_flight = None;
        true
    }

    /// Record a fetch failure. Returns false if the failing fetch had already
    /// been superseded — its error is dropped along with its data.
    pub(crate) fn fail_fetch(&self, generation: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!(generation, "discarding stale fetch failure");
            return false;
        }
        state.phase = Phase::Failed;
        state.in_flight = None;
        true
    }

    // --- Similarity view ---

    /// Enter the loading-similar state for a job currently in the list.
    /// Returns the job's title for the "similar to X" marker.
    pub(crate) fn begin_similar(&self, job_id: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Loaded {
            return None;
        }
        let title = state.jobs.iter().find(|j| j.id == job_id)?.title.clone();
        state.phase = Phase::LoadingSimilar;
        state.similar_to = Some(title.clone());
        Some(title)
    }

    /// Back out of a similarity trigger that failed.
    pub(crate) fn abort_similar(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase == Phase::LoadingSimilar {
            state.phase = Phase::Loaded;
        }
        state.similar_to = None;
    }

    /// Drop the similarity marker. Returns whether it was set.
    pub(crate) fn clear_similar(&self) -> bool {
        self.state.lock().unwrap().similar_to.take().is_some()
    }

    // --- Optimistic mutation primitives ---

    /// Flip a job's pinned flag, returning the previous value.
    pub(crate) fn flip_pin(&self, job_id: &str) -> Option<bool> {
        let mut state = self.state.lock().unwrap();
        let job = state.jobs.iter_mut().find(|j| j.id == job_id)?;
        let previous = job.is_pinned;
        job.is_pinned = !previous;
        Some(previous)
    }

    pub(crate) fn restore_pin(&self, job_id: &str, previous: bool) {
        let mut state = self.state.lock().unwrap();
        if let Some(job) = state.jobs.iter_mut().find(|j| j.id == job_id) {
            job.is_pinned = previous;
        }
    }

    /// Remove a job and mark its id hidden so later pages cannot bring it
    /// back. Returns the job and its index for rollback.
    pub(crate) fn remove_job(&self, job_id: &str) -> Option<(usize, JobPosting)> {
        let mut state = self.state.lock().unwrap();
        let index = state.jobs.iter().position(|j| j.id == job_id)?;
        let job = state.jobs.remove(index);
        state.hidden_jobs.insert(job.id.clone());
        Some((index, job))
    }

    /// Undo `remove_job`: unmark and re-insert at the original index, or at
    /// the end if intervening loads made that index disappear.
    pub(crate) fn unremove_job(&self, index: usize, job: JobPosting) {
        let mut state = self.state.lock().unwrap();
        state.hidden_jobs.remove(&job.id);
        let index = index.min(state.jobs.len());
        state.jobs.insert(index, job);
    }

    /// Remove every job from a company and mark the company hidden. The
    /// returned pairs carry pre-removal indices, in ascending order, so
    /// re-inserting them front to back restores the original list exactly.
    /// Empty when nothing currently listed matches — the company is still
    /// marked.
    pub(crate) fn remove_company(&self, company: &str) -> Vec<(usize, JobPosting)> {
        let mut state = self.state.lock().unwrap();
        state.hidden_companies.insert(company.to_string());
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(state.jobs.len());
        for (index, job) in state.jobs.drain(..).enumerate() {
            if job.company == company {
                removed.push((index, job));
            } else {
                kept.push(job);
            }
        }
        state.jobs = kept;
        removed
    }

    /// Undo `remove_company`: unmark and re-insert in original relative
    /// order, positions best-effort.
    pub(crate) fn unremove_company(&self, company: &str, removed: Vec<(usize, JobPosting)>) {
        let mut state = self.state.lock().unwrap();
        state.hidden_companies.remove(company);
        for (index, job) in removed {
            let index = index.min(state.jobs.len());
            state.jobs.insert(index, job);
        }
    }
}

/// Append the admissible part of a page: ids not already present, not hidden,
/// and not from a hidden company. Returns how many made it in.
fn admit(state: &mut ListState, page: Vec<JobPosting>) -> usize {
    let mut ids: HashSet<String> = state.jobs.iter().map(|j| j.id.clone()).collect();
    let before = state.jobs.len();
    for job in page {
        if ids.contains(&job.id)
            || state.hidden_jobs.contains(&job.id)
            || state.hidden_companies.contains(&job.company)
        {
            continue;
        }
        ids.insert(job.id.clone());
        state.jobs.push(job);
    }
    state.jobs.len() - before
}
