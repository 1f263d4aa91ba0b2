// Test mocks for the sync engine.
//
// MockJobApi implements the JobApi seam with scripted pages and failures:
// builder style for setup, recorded calls for assertions, and an optional
// gate that holds a list call open while a test races something against it.
// No server, no tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use joblens_common::{JobPosting, ListQuery, Location, LocationKind, SyncError};

use crate::traits::JobApi;

/// Fixture posting with company "Acme".
pub fn job(id: &str) -> JobPosting {
    job_for(id, "Acme")
}

pub fn job_for(id: &str, company: &str) -> JobPosting {
    JobPosting {
        id: id.to_string(),
        title: format!("{id} title"),
        company: company.to_string(),
        locations: vec![Location {
            kind: LocationKind::Remote,
            text: "anywhere".to_string(),
        }],
        description: format!("{id} description"),
        posted_at: Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
        is_pinned: false,
    }
}

/// Fixture postings `job-{n}` for `n` in `range`.
pub fn jobs(range: std::ops::Range<usize>) -> Vec<JobPosting> {
    range.map(|n| job(&format!("job-{n}"))).collect()
}

/// HashMap-backed `JobApi`. Pages are keyed by cursor; unregistered cursors
/// return an error, like an unscripted URL would.
pub struct MockJobApi {
    pages: Mutex<HashMap<Option<String>, Result<Vec<JobPosting>, SyncError>>>,
    /// Pages keyed by title filter, consulted before the cursor map. Lets a
    /// test give two generations of the same cursor distinct content.
    titled_pages: Mutex<HashMap<String, Result<Vec<JobPosting>, SyncError>>>,
    mutation_result: Mutex<Result<(), SyncError>>,
    similar_result: Mutex<Result<(), SyncError>>,
    hold_next_list: Mutex<Option<Arc<Notify>>>,
    list_queries: Mutex<Vec<ListQuery>>,
    mutations: Mutex<Vec<String>>,
}

impl Default for MockJobApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJobApi {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            titled_pages: Mutex::new(HashMap::new()),
            mutation_result: Mutex::new(Ok(())),
            similar_result: Mutex::new(Ok(())),
            hold_next_list: Mutex::new(None),
            list_queries: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(self, cursor: Option<&str>, page: Vec<JobPosting>) -> Self {
        self.script_page(cursor, Ok(page));
        self
    }

    pub fn fail_page(self, cursor: Option<&str>, err: SyncError) -> Self {
        self.script_page(cursor, Err(err));
        self
    }

    pub fn on_titled_page(self, title: &str, page: Vec<JobPosting>) -> Self {
        self.titled_pages
            .lock()
            .unwrap()
            .insert(title.to_string(), Ok(page));
        self
    }

    pub fn fail_mutations(self, err: SyncError) -> Self {
        *self.mutation_result.lock().unwrap() = Err(err);
        self
    }

    pub fn fail_similar(self, err: SyncError) -> Self {
        *self.similar_result.lock().unwrap() = Err(err);
        self
    }

    /// Re-script a page mid-test.
    pub fn script_page(&self, cursor: Option<&str>, result: Result<Vec<JobPosting>, SyncError>) {
        self.pages
            .lock()
            .unwrap()
            .insert(cursor.map(|c| c.to_string()), result);
    }

    /// Make the next `list` call block until the returned gate is notified.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold_next_list.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Every query `list` has been called with, in order.
    pub fn list_queries(&self) -> Vec<ListQuery> {
        self.list_queries.lock().unwrap().clone()
    }

    /// Every write issued, in order, e.g. `"pin job-1 true"`.
    pub fn recorded_mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobApi for MockJobApi {
    async fn list(&self, query: &ListQuery) -> Result<Vec<JobPosting>, SyncError> {
        self.list_queries.lock().unwrap().push(query.clone());
        let gate = self.hold_next_list.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(title) = &query.title {
            if let Some(result) = self.titled_pages.lock().unwrap().get(title) {
                return result.clone();
            }
        }
        self.pages
            .lock()
            .unwrap()
            .get(&query.cursor)
            .cloned()
            .unwrap_or_else(|| {
                Err(SyncError::Server {
                    status: 404,
                    message: format!("MockJobApi: no page registered for {:?}", query.cursor),
                })
            })
    }

    async fn set_pinned(&self, job_id: &str, pinned: bool) -> Result<(), SyncError> {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("pin {job_id} {pinned}"));
        self.mutation_result.lock().unwrap().clone()
    }

    async fn hide_job(&self, job_id: &str) -> Result<(), SyncError> {
        self.mutations.lock().unwrap().push(format!("hide {job_id}"));
        self.mutation_result.lock().unwrap().clone()
    }

    async fn hide_company(&self, company: &str) -> Result<(), SyncError> {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("hide_company {company}"));
        self.mutation_result.lock().unwrap().clone()
    }

    async fn find_similar(&self, job_id: &str) -> Result<(), SyncError> {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("find_similar {job_id}"));
        self.similar_result.lock().unwrap().clone()
    }
}
