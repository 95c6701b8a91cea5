// src/store/supabase.rs
//! Hosted backend adapter: PostgREST-style table API plus password auth.

use super::{release_session, Caller, RemoteStore, StoreError, StoreResult};
use crate::session::{Session, SessionEvents};
use crate::types::{JobPosting, JobRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, error, info, trace};

const JOBS_ENDPOINT: &str = "/rest/v1/jobs";
const TOKEN_ENDPOINT: &str = "/auth/v1/token?grant_type=password";
const LOGOUT_ENDPOINT: &str = "/auth/v1/logout";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    /// Privileged key used for writes when no user session is active.
    pub service_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
    sessions: SessionEvents,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Error bodies differ between the table API and the auth API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

impl SupabaseStore {
    pub fn new(settings: SupabaseSettings) -> Result<Self> {
        let timeout = settings.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            anon_key: settings.anon_key,
            service_key: settings.service_key,
            sessions: SessionEvents::new(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// The caller's own token, else the signed-in user's token, then the
    /// service key, then the anon key.
    fn bearer(&self, caller: Caller<'_>) -> String {
        if let Caller::Token(token) = caller {
            return token.to_string();
        }
        self.sessions
            .current()
            .map(|s| s.access_token)
            .or_else(|| self.service_key.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authorized(&self, request: RequestBuilder, caller: Caller<'_>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer(caller)))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> StoreResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!("Job store request failed ({}): {}", what, e);
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        trace!("Job store response status ({}): {}", what, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("Job store error response ({}): {} {}", what, status, body);
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(body);

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn id_filter(id: i64) -> String {
        format!("{}?id=eq.{}", JOBS_ENDPOINT, id)
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn list_jobs(&self) -> StoreResult<Vec<JobPosting>> {
        let url = self.url(&format!("{}?select=*&order=postedDate.desc", JOBS_ENDPOINT));
        debug!("Fetching jobs: {}", url);

        let response = self
            .send(self.authorized(self.client.get(&url), Caller::Session), "list jobs")
            .await?;
        let jobs: Vec<JobPosting> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        info!("Fetched {} jobs", jobs.len());
        Ok(jobs)
    }

    async fn create_job(&self, record: JobRecord, caller: Caller<'_>) -> StoreResult<()> {
        self.create_jobs(vec![record], caller).await
    }

    async fn create_jobs(&self, records: Vec<JobRecord>, caller: Caller<'_>) -> StoreResult<()> {
        let url = self.url(JOBS_ENDPOINT);
        info!("Inserting {} jobs", records.len());

        let request = self
            .authorized(self.client.post(&url), caller)
            .header("Prefer", "return=minimal")
            .json(&records);
        self.send(request, "insert jobs").await?;
        Ok(())
    }

    async fn update_job(&self, id: i64, record: JobRecord, caller: Caller<'_>) -> StoreResult<()> {
        let url = self.url(&Self::id_filter(id));
        info!("Updating job {}", id);

        let request = self
            .authorized(self.client.patch(&url), caller)
            .header("Prefer", "return=minimal")
            .json(&record);
        self.send(request, "update job").await?;
        Ok(())
    }

    async fn delete_job(&self, id: i64, caller: Caller<'_>) -> StoreResult<()> {
        let url = self.url(&Self::id_filter(id));
        info!("Deleting job {}", id);

        self.send(self.authorized(self.client.delete(&url), caller), "delete job")
            .await?;
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> StoreResult<Session> {
        let url = self.url(TOKEN_ENDPOINT);
        info!("Signing in {}", email);

        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&payload);

        let response = self.send(request, "sign in").await.map_err(|e| match e {
            StoreError::Api { message, .. } => StoreError::Auth(message),
            other => other,
        })?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let session = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_string()),
            expires_at: Utc::now() + Duration::seconds(token.expires_in.unwrap_or(3600)),
        };
        Ok(session)
    }

    async fn sign_out(&self, caller: Caller<'_>) -> StoreResult<()> {
        let token = match caller {
            Caller::Token(token) => Some(token.to_string()),
            Caller::Session => self.sessions.current().map(|s| s.access_token),
        };
        if let Some(token) = token {
            let request = self
                .client
                .post(self.url(LOGOUT_ENDPOINT))
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {}", token));
            // the local session is cleared even when the backend call fails
            if let Err(e) = self.send(request, "sign out").await {
                error!("Sign-out request failed: {}", e);
            }
        }
        release_session(&self.sessions, caller);
        Ok(())
    }

    fn session_events(&self) -> &SessionEvents {
        &self.sessions
    }
}
