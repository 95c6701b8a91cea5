// src/form.rs
//! Admin create/edit form.

use crate::ai::{AiError, AiTask, DescriptionDraft};
use crate::board::SaveJob;
use crate::types::{
    join_lines, split_lines, Category, ExperienceLevel, JobDraft, JobPosting, JobType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all required fields.")]
    MissingRequired,

    #[error("Please enter a job title first.")]
    TitleRequired,

    #[error("A description is already being generated.")]
    GenerationInProgress,
}

/// Editable form fields. Requirements and qualifications are edited as
/// newline-separated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobForm {
    #[serde(default)]
    pub editing_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default = "default_job_type")]
    pub job_type: JobType,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default = "default_experience")]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub qualifications: String,
    #[serde(skip)]
    pub generating: bool,
    #[serde(skip)]
    pub error: Option<String>,
}

fn default_job_type() -> JobType {
    JobType::FullTime
}

fn default_category() -> Category {
    Category::Tech
}

fn default_experience() -> ExperienceLevel {
    ExperienceLevel::Experienced
}

impl Default for JobForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl JobForm {
    pub fn blank() -> Self {
        Self {
            editing_id: None,
            title: String::new(),
            company: String::new(),
            location: String::new(),
            job_type: default_job_type(),
            category: default_category(),
            experience_level: default_experience(),
            url: String::new(),
            description: String::new(),
            requirements: String::new(),
            qualifications: String::new(),
            generating: false,
            error: None,
        }
    }

    /// Prefill from an existing posting for editing.
    pub fn from_job(job: &JobPosting) -> Self {
        Self {
            editing_id: Some(job.id),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type,
            category: job.category,
            experience_level: job.experience_level,
            url: job.url.clone(),
            description: job.description.clone(),
            requirements: join_lines(&job.requirements),
            qualifications: join_lines(&job.qualifications),
            generating: false,
            error: None,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let required = [&self.title, &self.company, &self.location];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(FormError::MissingRequired);
        }
        Ok(())
    }

    pub fn to_draft(&self) -> JobDraft {
        JobDraft {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_type: self.job_type,
            category: self.category,
            experience_level: self.experience_level,
            description: self.description.clone(),
            url: self.url.clone(),
            requirements: split_lines(&self.requirements),
            qualifications: split_lines(&self.qualifications),
        }
    }

    /// Validate and produce the save request. A validation failure is kept
    /// on the form for inline display.
    pub fn submit(&mut self) -> Result<SaveJob, FormError> {
        if let Err(e) = self.validate() {
            warn!("Form rejected: {}", e);
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.error = None;
        Ok(SaveJob {
            id: self.editing_id,
            draft: self.to_draft(),
        })
    }

    /// Enter the generating state. Refused while a generation is running or
    /// when there is no title to generate from.
    pub fn begin_generating(&mut self) -> Result<String, FormError> {
        if self.generating {
            return Err(FormError::GenerationInProgress);
        }
        if self.title.trim().is_empty() {
            self.error = Some(FormError::TitleRequired.to_string());
            return Err(FormError::TitleRequired);
        }
        self.generating = true;
        self.error = None;
        Ok(self.title.clone())
    }

    /// Leave the generating state, merging the draft or recording the failure.
    pub fn finish_generating(&mut self, result: Result<DescriptionDraft, AiError>) {
        self.generating = false;
        match result {
            Ok(draft) => {
                debug!("Merging generated description into form");
                self.apply_description(draft);
            }
            Err(e) => {
                self.error = Some(e.user_message(AiTask::Description).to_string());
            }
        }
    }

    pub fn apply_description(&mut self, draft: DescriptionDraft) {
        self.description = draft.description;
        self.requirements = join_lines(&draft.requirements);
        self.qualifications = join_lines(&draft.qualifications);
        self.category = draft.category;
        self.experience_level = draft.experience_level;
    }
}
