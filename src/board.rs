// src/board.rs
//! Cached job collection backed by the remote store.
//!
//! The cache is never patched: every successful write is followed by a full
//! refetch. Fetches are ticketed so a slow, older fetch cannot overwrite the
//! result of a newer one.

use crate::store::{Caller, RemoteStore, StoreResult};
use crate::types::{JobDraft, JobPosting};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Create (no id) or full update (with id) from the admin form.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveJob {
    pub id: Option<i64>,
    pub draft: JobDraft,
}

#[derive(Default)]
struct Cache {
    jobs: Vec<JobPosting>,
    loaded: bool,
    applied_ticket: u64,
}

pub struct JobBoard {
    store: Arc<dyn RemoteStore>,
    cache: RwLock<Cache>,
    next_ticket: AtomicU64,
}

impl JobBoard {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(Cache::default()),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Refetch the whole collection. On failure the previous contents stay
    /// in place; either way the board counts as loaded afterwards.
    pub async fn refresh(&self) -> StoreResult<()> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        debug!("Refreshing job board (ticket {})", ticket);

        let result = self.store.list_jobs().await;

        let mut cache = self.cache.write().await;
        cache.loaded = true;
        match result {
            Ok(jobs) => {
                if ticket < cache.applied_ticket {
                    warn!(
                        "Dropping stale fetch (ticket {} < {})",
                        ticket, cache.applied_ticket
                    );
                    return Ok(());
                }
                info!("Job board refreshed with {} jobs", jobs.len());
                cache.applied_ticket = ticket;
                cache.jobs = jobs;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching jobs: {}", e);
                Err(e)
            }
        }
    }

    pub async fn jobs(&self) -> Vec<JobPosting> {
        self.cache.read().await.jobs.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.cache.read().await.loaded
    }

    pub async fn find(&self, id: i64) -> Option<JobPosting> {
        self.cache
            .read()
            .await
            .jobs
            .iter()
            .find(|job| job.id == id)
            .cloned()
    }

    pub async fn save(&self, request: SaveJob, caller: Caller<'_>) -> StoreResult<()> {
        let record = request.draft.into_record();
        let result = match request.id {
            Some(id) => {
                info!("Updating job {}", id);
                self.store.update_job(id, record, caller).await
            }
            None => {
                info!("Creating job '{}'", record.draft.title);
                self.store.create_job(record, caller).await
            }
        };
        result.map_err(|e| {
            error!("Error saving job: {}", e);
            e
        })?;

        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn bulk_add(&self, drafts: Vec<JobDraft>, caller: Caller<'_>) -> StoreResult<()> {
        if drafts.is_empty() {
            return Ok(());
        }
        let records = drafts.into_iter().map(JobDraft::into_record).collect();
        self.store.create_jobs(records, caller).await.map_err(|e| {
            error!("Error bulk adding jobs: {}", e);
            e
        })?;

        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn delete(&self, id: i64, caller: Caller<'_>) -> StoreResult<()> {
        self.store.delete_job(id, caller).await.map_err(|e| {
            error!("Error deleting job {}: {}", id, e);
            e
        })?;

        self.refresh_after_write().await;
        Ok(())
    }

    async fn refresh_after_write(&self) {
        // the write already succeeded; a failed refetch only leaves the cache stale
        let _ = self.refresh().await;
    }
}
