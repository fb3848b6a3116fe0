use crate::db::{decode_all, encode_fields, Collection, OrderBy, SharedStore, StoreError};
use crate::models::{now_millis, JobApplication, JobOpening, NewApplication, NewJob};

const POSTED_AT: &str = "postedAt";
const APPLIED_AT: &str = "appliedAt";

/// Job postings and applications. No live feed here: callers re-list after
/// a change.
#[derive(Clone)]
pub struct CareersRepository {
    store: SharedStore,
}

impl CareersRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobOpening>, StoreError> {
        let docs = self
            .store
            .list_ordered(Collection::Jobs, OrderBy::desc(POSTED_AT))
            .await?;
        decode_all(docs)
    }

    /// Like `list_jobs`, but a failed read yields an empty list.
    pub async fn get_jobs(&self) -> Vec<JobOpening> {
        self.list_jobs().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to fetch jobs, showing none");
            vec![]
        })
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<JobOpening>, StoreError> {
        match self.store.get(Collection::Jobs, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn create_job(&self, input: NewJob) -> Result<JobOpening, StoreError> {
        let mut job = input.into_job(now_millis());
        job.id = self
            .store
            .create(Collection::Jobs, encode_fields(&job)?)
            .await?;

        tracing::info!(id = %job.id, title = %job.title, "job created");
        Ok(job)
    }

    /// Applications that reference the job are left in place.
    pub async fn delete_job(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete_document(Collection::Jobs, id).await?;
        tracing::info!(%id, "job deleted");
        Ok(())
    }

    pub async fn submit_application(&self, input: NewApplication) -> Result<(), StoreError> {
        let application = input.into_application(now_millis());
        let id = self
            .store
            .create(Collection::Applications, encode_fields(&application)?)
            .await?;

        tracing::info!(%id, job_id = %application.job_id, "application submitted");
        Ok(())
    }

    pub async fn list_applications(&self) -> Result<Vec<JobApplication>, StoreError> {
        let docs = self
            .store
            .list_ordered(Collection::Applications, OrderBy::desc(APPLIED_AT))
            .await?;
        decode_all(docs)
    }

    /// Like `list_applications`, but a failed read yields an empty list.
    pub async fn get_applications(&self) -> Vec<JobApplication> {
        self.list_applications().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to fetch applications, showing none");
            vec![]
        })
    }
}
