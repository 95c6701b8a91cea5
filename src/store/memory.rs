// src/store/memory.rs
//! In-process job store for local runs and tests.

use super::{release_session, Caller, RemoteStore, StoreError, StoreResult};
use crate::auth::issue_access_token;
use crate::session::{Session, SessionEvents};
use crate::types::{JobPosting, JobRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const SESSION_TTL_HOURS: i64 = 1;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    jobs: Vec<JobPosting>,
}

pub struct MemoryStore {
    state: RwLock<MemoryState>,
    admins: HashMap<String, String>,
    jwt_secret: String,
    sessions: SessionEvents,
    revoked: RwLock<HashSet<String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                jobs: Vec::new(),
            }),
            admins: HashMap::new(),
            jwt_secret: jwt_secret.into(),
            sessions: SessionEvents::new(),
            revoked: RwLock::new(HashSet::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_admin(mut self, email: &str, password: &str) -> Self {
        self.admins.insert(email.to_lowercase(), password.to_string());
        self
    }

    pub fn with_jobs(mut self, jobs: Vec<JobPosting>) -> Self {
        {
            let state = self.state.get_mut();
            state.next_id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
            state.jobs = jobs;
        }
        self
    }

    /// Load seed postings from a JSON array file.
    pub fn with_seed_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
        let jobs: Vec<JobPosting> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))?;
        info!("Seeded memory store with {} jobs", jobs.len());
        Ok(self.with_jobs(jobs))
    }

    /// Make every job operation fail, to exercise error paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Transport("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    /// Tokens revoked by a sign-out are refused, like the hosted backend does.
    async fn check_caller(&self, caller: Caller<'_>) -> StoreResult<()> {
        if let Caller::Token(token) = caller {
            if self.revoked.read().await.contains(token) {
                return Err(StoreError::Api {
                    status: 401,
                    message: "JWT has been revoked".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_jobs(&self) -> StoreResult<Vec<JobPosting>> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut jobs = state.jobs.clone();
        jobs.sort_by(|a, b| {
            b.posted_date
                .cmp(&a.posted_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(jobs)
    }

    async fn create_job(&self, record: JobRecord, caller: Caller<'_>) -> StoreResult<()> {
        self.create_jobs(vec![record], caller).await
    }

    async fn create_jobs(&self, records: Vec<JobRecord>, caller: Caller<'_>) -> StoreResult<()> {
        self.check_available()?;
        self.check_caller(caller).await?;
        let mut state = self.state.write().await;
        let now = Utc::now();
        for record in records {
            let id = state.next_id;
            state.next_id += 1;
            debug!("Memory store: inserting job {}", id);
            state.jobs.push(JobPosting::from_record(id, now, record));
        }
        Ok(())
    }

    async fn update_job(&self, id: i64, record: JobRecord, caller: Caller<'_>) -> StoreResult<()> {
        self.check_available()?;
        self.check_caller(caller).await?;
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound(id))?;
        *job = JobPosting::from_record(id, job.posted_date, record);
        Ok(())
    }

    async fn delete_job(&self, id: i64, caller: Caller<'_>) -> StoreResult<()> {
        self.check_available()?;
        self.check_caller(caller).await?;
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.id != id);
        if state.jobs.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> StoreResult<Session> {
        let email = email.trim().to_lowercase();
        match self.admins.get(&email) {
            Some(expected) if expected == password => {}
            _ => {
                warn!("Memory store: rejected sign-in for {}", email);
                return Err(StoreError::Auth("Invalid login credentials".to_string()));
            }
        }

        let user_id = format!("local-{}", email);
        let ttl = Duration::hours(SESSION_TTL_HOURS);
        let access_token = issue_access_token(&self.jwt_secret, &user_id, &email, ttl)
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let session = Session {
            access_token,
            refresh_token: None,
            user_id,
            email,
            expires_at: Utc::now() + ttl,
        };
        Ok(session)
    }

    async fn sign_out(&self, caller: Caller<'_>) -> StoreResult<()> {
        let token = match caller {
            Caller::Token(token) => Some(token.to_string()),
            Caller::Session => self.sessions.current().map(|s| s.access_token),
        };
        if let Some(token) = token {
            self.revoked.write().await.insert(token);
        }
        release_session(&self.sessions, caller);
        Ok(())
    }

    fn session_events(&self) -> &SessionEvents {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{draft, job};

    #[tokio::test]
    async fn test_create_assigns_id_and_date() {
        let store = MemoryStore::new("secret").with_jobs(vec![job(7, "Old", "Acme", "Pune")]);
        store
            .create_job(draft("New", "Globex").into_record(), Caller::Session)
            .await
            .unwrap();

        let jobs = store.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, 8);
        assert_eq!(jobs[0].title, "New");
        assert_eq!(jobs[0].company_logo_url, "https://logo.clearbit.com/globex.com");
        assert_eq!(jobs[0].url, "#");
    }

    #[tokio::test]
    async fn test_update_keeps_posted_date() {
        let original = job(3, "Dev", "Acme", "Pune");
        let store = MemoryStore::new("secret").with_jobs(vec![original.clone()]);

        let mut edited = original.to_draft();
        edited.company = "Initech".to_string();
        store
            .update_job(3, edited.into_record(), Caller::Session)
            .await
            .unwrap();

        let jobs = store.list_jobs().await.unwrap();
        assert_eq!(jobs[0].posted_date, original.posted_date);
        assert_eq!(jobs[0].company_logo_url, "https://logo.clearbit.com/initech.com");

        assert!(matches!(
            store
                .update_job(99, draft("x", "y").into_record(), Caller::Session)
                .await,
            Err(StoreError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_unavailable() {
        let store = MemoryStore::new("secret").with_jobs(vec![job(1, "A", "B", "C")]);
        store.set_unavailable(true);
        assert!(store.delete_job(1, Caller::Session).await.is_err());
        assert!(store.list_jobs().await.is_err());
        store.set_unavailable(false);
        store.delete_job(1, Caller::Session).await.unwrap();
        assert!(store.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_and_out_notify() {
        let store = MemoryStore::new("secret").with_admin("admin@example.com", "hunter2");

        let err = store.sign_in("admin@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(store.get_session().is_none());

        let session = store.sign_in("Admin@Example.com", "hunter2").await.unwrap();
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(store.get_session(), Some(session));

        store.sign_out(Caller::Session).await.unwrap();
        assert!(store.get_session().is_none());
    }

    #[tokio::test]
    async fn test_token_sign_out_revokes_only_that_token() {
        let store = MemoryStore::new("secret")
            .with_admin("a@example.com", "pw-a")
            .with_admin("b@example.com", "pw-b");

        let first = store.sign_in("a@example.com", "pw-a").await.unwrap();
        let second = store.authenticate("b@example.com", "pw-b").await.unwrap();
        assert_eq!(store.get_session(), Some(first.clone()));

        store
            .sign_out(Caller::Token(&second.access_token))
            .await
            .unwrap();
        assert_eq!(store.get_session(), Some(first.clone()));

        let record = draft("New", "Globex").into_record();
        let err = store
            .create_job(record.clone(), Caller::Token(&second.access_token))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 401, .. }));

        store
            .create_job(record, Caller::Token(&first.access_token))
            .await
            .unwrap();
        assert_eq!(store.list_jobs().await.unwrap().len(), 1);
    }
}
