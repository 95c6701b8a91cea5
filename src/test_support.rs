//! Fixtures shared by unit tests.

use crate::types::{Category, ExperienceLevel, JobDraft, JobPosting, JobType};
use chrono::{Duration, TimeZone, Utc};

/// A full-time experienced tech posting; ids further apart are posted earlier.
pub fn job(id: i64, title: &str, company: &str, location: &str) -> JobPosting {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    JobPosting {
        id,
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        job_type: JobType::FullTime,
        category: Category::Tech,
        experience_level: ExperienceLevel::Experienced,
        description: format!("{} at {}. Apply today.", title, company),
        posted_date: base - Duration::hours(id),
        url: "#".to_string(),
        company_logo_url: crate::types::company_logo_url(company),
        requirements: vec!["Communication".to_string()],
        qualifications: vec!["Degree".to_string()],
    }
}

pub fn draft(title: &str, company: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        company: company.to_string(),
        location: "Remote".to_string(),
        job_type: JobType::FullTime,
        category: Category::Tech,
        experience_level: ExperienceLevel::Experienced,
        description: "Generated posting.".to_string(),
        url: String::new(),
        requirements: vec!["Rust".to_string()],
        qualifications: vec!["BSc".to_string()],
    }
}
