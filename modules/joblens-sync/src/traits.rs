// The remote API as the engine sees it: one method per operation.
//
// Everything behind this seam is network; everything in front is
// deterministic and testable with `testing::MockJobApi` — no server, no
// tokens, `cargo test` in seconds.

use async_trait::async_trait;

use joblens_common::{JobPosting, ListQuery, SyncError};

#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetch one page of postings for a query descriptor.
    async fn list(&self, query: &ListQuery) -> Result<Vec<JobPosting>, SyncError>;

    /// Set the pinned flag on a posting.
    async fn set_pinned(&self, job_id: &str, pinned: bool) -> Result<(), SyncError>;

    /// Hide a single posting.
    async fn hide_job(&self, job_id: &str) -> Result<(), SyncError>;

    /// Hide every posting from a company.
    async fn hide_company(&self, company: &str) -> Result<(), SyncError>;

    /// Start a server-side similarity job. Acknowledgement only; results
    /// arrive through a later `list`.
    async fn find_similar(&self, job_id: &str) -> Result<(), SyncError>;
}

#[async_trait]
impl JobApi for joblens_client::JobsClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<JobPosting>, SyncError> {
        self.list(query).await
    }

    async fn set_pinned(&self, job_id: &str, pinned: bool) -> Result<(), SyncError> {
        self.set_pinned(job_id, pinned).await
    }

    async fn hide_job(&self, job_id: &str) -> Result<(), SyncError> {
        self.hide_job(job_id).await
    }

    async fn hide_company(&self, company: &str) -> Result<(), SyncError> {
        self.hide_company(company).await
    }

    async fn find_similar(&self, job_id: &str) -> Result<(), SyncError> {
        self.find_similar(job_id).await
    }
}
