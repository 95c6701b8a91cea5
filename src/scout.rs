// src/scout.rs
//! AI scout workspace: one query, the generated postings, and which of them
//! were already added to the board.

use crate::ai::{AiError, AiTask};
use crate::types::JobDraft;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query to find jobs.";

pub const EXAMPLE_QUERIES: [&str; 3] = [
    "Latest marketing jobs in Bangalore for experienced professionals",
    "Entry-level data analyst roles in India (remote)",
    "Part-time content writing internships",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoutWorkspace {
    pub query: String,
    pub generating: bool,
    pub error: Option<String>,
    pub results: Vec<JobDraft>,
    added: HashSet<String>,
}

impl ScoutWorkspace {
    /// Start a run: clears previous results and the added set.
    pub fn begin(&mut self, query: &str) -> Option<String> {
        if self.generating {
            return None;
        }
        let query = query.trim();
        if query.is_empty() {
            self.error = Some(EMPTY_QUERY_MESSAGE.to_string());
            return None;
        }

        self.query = query.to_string();
        self.generating = true;
        self.error = None;
        self.results.clear();
        self.added.clear();
        Some(self.query.clone())
    }

    pub fn finish(&mut self, result: Result<Vec<JobDraft>, AiError>) {
        self.generating = false;
        match result {
            Ok(jobs) => {
                info!("Scout produced {} postings", jobs.len());
                self.results = jobs;
            }
            Err(e) => self.error = Some(e.user_message(AiTask::Scout).to_string()),
        }
    }

    pub fn is_added(&self, job: &JobDraft) -> bool {
        self.added.contains(&job.scout_key())
    }

    pub fn mark_added(&mut self, job: &JobDraft) {
        self.added.insert(job.scout_key());
    }

    /// Results not yet added, in generated order.
    pub fn pending(&self) -> Vec<&JobDraft> {
        self.results.iter().filter(|j| !self.is_added(j)).collect()
    }
}
