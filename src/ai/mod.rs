// src/ai/mod.rs
//! Generative-language seam and the failure taxonomy shown to admins.

pub mod drafts;
pub mod gemini;

pub use drafts::{generate_description, generate_job_batch, DescriptionDraft};
pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

pub const CREDENTIAL_MESSAGE: &str = "AI features are disabled. The Google AI API key is missing or invalid in the application's environment.";
pub const DESCRIPTION_FAILED_MESSAGE: &str =
    "Failed to generate description. The AI might be busy. Please try again.";
pub const DESCRIPTION_FORMAT_MESSAGE: &str = "AI generated content was in an unexpected format.";
pub const SCOUT_FAILED_MESSAGE: &str = "Failed to generate jobs. The AI might be busy or the query is too complex. Please try again with a more specific query.";

/// Single prompt in, text out. A schema, when given, asks for JSON output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        schema: Option<serde_json::Value>,
    ) -> Result<String, AiError>;
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key is missing or invalid")]
    CredentialMissing,

    #[error("AI request failed: {0}")]
    Request(String),

    #[error("AI response contained no text")]
    EmptyResponse,

    #[error("{0}")]
    Malformed(String),
}

/// Which admin action a failure belongs to; picks the generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTask {
    Description,
    Scout,
}

impl AiError {
    /// Turn raw failure text into an error, spotting credential problems.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("api key") {
            AiError::CredentialMissing
        } else {
            AiError::Request(message)
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, AiError::CredentialMissing)
    }

    pub fn error_code(&self) -> &'static str {
        if self.is_credential() {
            "AI_CREDENTIAL_MISSING"
        } else {
            "AI_GENERATION_FAILED"
        }
    }

    pub fn user_message(&self, task: AiTask) -> &'static str {
        match (self, task) {
            (AiError::CredentialMissing, _) => CREDENTIAL_MESSAGE,
            (AiError::Malformed(_), AiTask::Description) => DESCRIPTION_FORMAT_MESSAGE,
            (_, AiTask::Description) => DESCRIPTION_FAILED_MESSAGE,
            (_, AiTask::Scout) => SCOUT_FAILED_MESSAGE,
        }
    }
}
