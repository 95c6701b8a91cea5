// src/store/mod.rs
//! Remote store seam: job CRUD plus the auth session of the hosted backend.

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use crate::session::{Session, SessionEvents, Subscription};
use crate::types::{JobPosting, JobRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request to the job store failed: {0}")]
    Transport(String),

    #[error("Job store returned error status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode job store response: {0}")]
    Decode(String),

    #[error("{0}")]
    Auth(String),

    #[error("Job not found: {0}")]
    NotFound(i64),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Whose credentials authorize a store call.
///
/// Interactive front ends act as the store's own signed-in session. The
/// HTTP API serves several admins from one store, so each request passes
/// the bearer token it was authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller<'a> {
    Session,
    Token(&'a str),
}

impl Caller<'_> {
    /// Whether signing out as this caller ends `session`.
    pub fn owns(&self, session: &Session) -> bool {
        match self {
            Caller::Session => true,
            Caller::Token(token) => session.access_token == *token,
        }
    }
}

/// Drop the stored session if it belongs to `caller`.
pub(crate) fn release_session(events: &SessionEvents, caller: Caller<'_>) {
    if events.current().is_some_and(|session| caller.owns(&session)) {
        events.set(None);
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All postings, newest `postedDate` first.
    async fn list_jobs(&self) -> StoreResult<Vec<JobPosting>>;

    async fn create_job(&self, record: JobRecord, caller: Caller<'_>) -> StoreResult<()>;

    async fn create_jobs(&self, records: Vec<JobRecord>, caller: Caller<'_>) -> StoreResult<()>;

    /// Full-record update; `postedDate` is never touched.
    async fn update_job(&self, id: i64, record: JobRecord, caller: Caller<'_>) -> StoreResult<()>;

    async fn delete_job(&self, id: i64, caller: Caller<'_>) -> StoreResult<()>;

    /// Check email and password and issue a session without storing it.
    /// On failure the error carries the backend's message for display on
    /// the login gate.
    async fn authenticate(&self, email: &str, password: &str) -> StoreResult<Session>;

    /// Authenticate and make the result the store's current session.
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let session = self.authenticate(email, password).await?;
        self.session_events().set(Some(session.clone()));
        Ok(session)
    }

    /// Revoke the caller's token. The stored session is cleared only when
    /// it belongs to the caller.
    async fn sign_out(&self, caller: Caller<'_>) -> StoreResult<()>;

    fn session_events(&self) -> &SessionEvents;

    fn get_session(&self) -> Option<Session> {
        self.session_events().current()
    }

    fn on_session_change(
        &self,
        listener: Box<dyn Fn(Option<&Session>) + Send + Sync>,
    ) -> Subscription {
        self.session_events().subscribe(listener)
    }
}
