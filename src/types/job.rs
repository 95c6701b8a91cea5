// src/types/job.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PLACEHOLDER_URL: &str = "#";
const LOGO_SERVICE_URL: &str = "https://logo.clearbit.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Tech")]
    Tech,
    #[serde(rename = "Non-Tech")]
    NonTech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Fresher")]
    Fresher,
    #[serde(rename = "Experienced")]
    Experienced,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }

    /// Maps free-form model output onto a valid job type, defaulting to full-time.
    pub fn from_lenient(value: &str) -> Self {
        let normalized = normalize(value);
        if normalized.contains("intern") {
            JobType::Internship
        } else if normalized.contains("part") {
            JobType::PartTime
        } else if normalized.contains("contract") || normalized.contains("freelance") {
            JobType::Contract
        } else {
            JobType::FullTime
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "Tech",
            Category::NonTech => "Non-Tech",
        }
    }

    pub fn from_lenient(value: &str) -> Self {
        // "none" is an absent value, not a category
        if normalize(value).replace("none", "").contains("non") {
            Category::NonTech
        } else {
            Category::Tech
        }
    }
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Fresher => "Fresher",
            ExperienceLevel::Experienced => "Experienced",
        }
    }

    pub fn from_lenient(value: &str) -> Self {
        let normalized = normalize(value);
        let fresher_words = ["fresher", "fresh", "entry", "junior", "graduate", "intern"];
        if fresher_words.iter().any(|w| normalized.contains(w)) {
            ExperienceLevel::Fresher
        } else {
            ExperienceLevel::Experienced
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// A job posting as stored in the remote `jobs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: Category,
    pub experience_level: ExperienceLevel,
    pub description: String,
    pub posted_date: DateTime<Utc>,
    pub url: String,
    pub company_logo_url: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
}

/// Posting content without the store-assigned and derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: Category,
    pub experience_level: ExperienceLevel,
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
}

/// Row written to the store on create or update. `companyLogoUrl` is always
/// recomputed here, never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(flatten)]
    pub draft: JobDraft,
    pub company_logo_url: String,
}

impl JobDraft {
    pub fn into_record(mut self) -> JobRecord {
        if self.url.trim().is_empty() {
            self.url = PLACEHOLDER_URL.to_string();
        }
        let company_logo_url = company_logo_url(&self.company);
        JobRecord {
            draft: self,
            company_logo_url,
        }
    }

    /// Title, company and location must be non-blank.
    pub fn has_required_fields(&self) -> bool {
        [&self.title, &self.company, &self.location]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Identity used by the scout workspace to remember accepted postings.
    pub fn scout_key(&self) -> String {
        format!("{}-{}", self.title, self.company)
    }
}

impl JobPosting {
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
            requirements: self.requirements.clone(),
            qualifications: self.qualifications.clone(),
        }
    }

    /// Builds a stored posting from a record plus the store-assigned fields.
    pub fn from_record(id: i64, posted_date: DateTime<Utc>, record: JobRecord) -> Self {
        let JobRecord {
            draft,
            company_logo_url,
        } = record;
        Self {
            id,
            title: draft.title,
            company: draft.company,
            location: draft.location,
            job_type: draft.job_type,
            category: draft.category,
            experience_level: draft.experience_level,
            description: draft.description,
            posted_date,
            url: draft.url,
            company_logo_url,
            requirements: draft.requirements,
            qualifications: draft.qualifications,
        }
    }
}

/// Derive the logo lookup URL from a company name.
pub fn company_logo_url(company: &str) -> String {
    let name: String = company
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    format!("{}/{}.com", LOGO_SERVICE_URL, name)
}

/// Split newline-delimited form text into entries, dropping blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}
