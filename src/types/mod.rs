pub mod job;
pub mod response;

pub use job::{
    company_logo_url, join_lines, split_lines, Category, ExperienceLevel, JobDraft, JobPosting,
    JobRecord, JobType, PLACEHOLDER_URL,
};
