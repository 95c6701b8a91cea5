// src/ai/drafts.rs
//! Prompting and output parsing for the two admin AI actions: backfilling a
//! single form from a title, and scouting a batch of postings from a query.

use super::{AiError, TextGenerator};
use crate::types::{Category, ExperienceLevel, JobDraft, JobType, PLACEHOLDER_URL};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::{error, info, warn};

pub const BOARD_NAME: &str = "TheJobofficer";
pub const SCOUT_BATCH_SIZE: usize = 5;
pub const NO_JSON_MESSAGE: &str = "Could not find valid JSON in the AI's response.";

static FENCED_BLOCK: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```"));

/// Content merged into the admin form after a successful backfill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionDraft {
    pub description: String,
    pub requirements: Vec<String>,
    pub qualifications: Vec<String>,
    pub category: Category,
    pub experience_level: ExperienceLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescription {
    description: Option<String>,
    requirements: Option<Vec<String>>,
    qualifications: Option<Vec<String>>,
    category: Option<String>,
    experience_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoutJob {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    #[serde(rename = "type")]
    job_type: Option<String>,
    category: Option<String>,
    experience_level: Option<String>,
    description: Option<String>,
    url: Option<String>,
    requirements: Option<Vec<String>>,
    qualifications: Option<Vec<String>>,
}

pub fn description_prompt(title: &str) -> String {
    format!(
        r#"Write a compelling job description for a "{}" position. Include a main description, a list of key requirements, and a list of desired qualifications. Also, classify the job category as either "Tech" or "Non-Tech", and the experience level as "Fresher" or "Experienced". Format the output as a JSON object with five keys: "description", "requirements" (an array of strings), "qualifications" (an array of strings), "category" (a string: "Tech" or "Non-Tech"), and "experienceLevel" (a string: "Fresher" or "Experienced")."#,
        title
    )
}

pub fn description_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": { "type": "STRING" },
            "requirements": { "type": "ARRAY", "items": { "type": "STRING" } },
            "qualifications": { "type": "ARRAY", "items": { "type": "STRING" } },
            "category": { "type": "STRING" },
            "experienceLevel": { "type": "STRING" }
        }
    })
}

pub fn scout_prompt(query: &str) -> String {
    format!(
        r#"You are a professional job recruiter for an Indian job board called "{board}".
Your task is to generate a list of {count} realistic, recent job postings suitable for Indian job seekers based on the user's query.
The location for each job should be relevant to India if not specified in the query.

User Query: "{query}"

Your response MUST be a single JSON array of objects, enclosed in a markdown code block (```json ... ```).
Do NOT include any text, explanation, or conversation before or after the JSON code block.
Each object in the JSON array must have the following keys: "title", "company", "location", "type", "category", "experienceLevel", "description", "url", "requirements", and "qualifications".
- "type" must be one of: 'Full-time', 'Part-time', 'Contract', 'Internship'
- "category" must be one of: 'Tech', 'Non-Tech'
- "experienceLevel" must be one of: 'Fresher', 'Experienced'
- "requirements" and "qualifications" must be an array of strings.
- "url" should be a placeholder "{url}"."#,
        board = BOARD_NAME,
        count = SCOUT_BATCH_SIZE,
        query = query,
        url = PLACEHOLDER_URL,
    )
}

/// Draft a description, requirements and classification for a job title.
/// Incomplete output is rejected as a whole.
pub async fn generate_description(
    generator: &dyn TextGenerator,
    title: &str,
) -> Result<DescriptionDraft, AiError> {
    info!("Generating description for '{}'", title);
    let text = generator
        .generate(&description_prompt(title), Some(description_schema()))
        .await?;

    parse_description(&text).map_err(|e| {
        error!("Unusable description output: {}", e);
        e
    })
}

/// Ask for a batch of postings matching a free-text query.
pub async fn generate_job_batch(
    generator: &dyn TextGenerator,
    query: &str,
) -> Result<Vec<JobDraft>, AiError> {
    info!("Scouting jobs for query '{}'", query);
    let text = generator.generate(&scout_prompt(query), None).await?;

    let jobs = parse_job_batch(&text).map_err(|e| {
        error!("Failed to extract jobs from response: {}", text);
        e
    })?;
    info!("Scouted {} jobs", jobs.len());
    Ok(jobs)
}

pub fn parse_description(text: &str) -> Result<DescriptionDraft, AiError> {
    let raw: RawDescription = serde_json::from_value(extract_json(text)?)
        .map_err(|e| AiError::Malformed(format!("Unexpected description shape: {}", e)))?;

    let description = non_empty(raw.description, "description")?;
    let category = non_empty(raw.category, "category")?;
    let experience = non_empty(raw.experience_level, "experienceLevel")?;
    let requirements = raw
        .requirements
        .ok_or_else(|| missing("requirements"))?;
    let qualifications = raw
        .qualifications
        .ok_or_else(|| missing("qualifications"))?;

    Ok(DescriptionDraft {
        description,
        requirements,
        qualifications,
        category: Category::from_lenient(&category),
        experience_level: ExperienceLevel::from_lenient(&experience),
    })
}

pub fn parse_job_batch(text: &str) -> Result<Vec<JobDraft>, AiError> {
    let items = match extract_json(text)? {
        Value::Array(items) => items,
        _ => {
            return Err(AiError::Malformed(
                "Expected a JSON array of job postings".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let raw: RawScoutJob = serde_json::from_value(item).map_err(|e| {
                AiError::Malformed(format!("Job {} has an unexpected shape: {}", index + 1, e))
            })?;
            scout_job_to_draft(raw)
        })
        .collect()
}

fn scout_job_to_draft(raw: RawScoutJob) -> Result<JobDraft, AiError> {
    let job_type = non_empty(raw.job_type, "type")?;
    let category = non_empty(raw.category, "category")?;
    let experience = non_empty(raw.experience_level, "experienceLevel")?;

    Ok(JobDraft {
        title: non_empty(raw.title, "title")?,
        company: non_empty(raw.company, "company")?,
        location: non_empty(raw.location, "location")?,
        job_type: JobType::from_lenient(&job_type),
        category: Category::from_lenient(&category),
        experience_level: ExperienceLevel::from_lenient(&experience),
        description: raw.description.ok_or_else(|| missing("description"))?,
        url: raw
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_URL.to_string()),
        requirements: raw.requirements.ok_or_else(|| missing("requirements"))?,
        qualifications: raw
            .qualifications
            .ok_or_else(|| missing("qualifications"))?,
    })
}

/// Pull the JSON payload out of model text: a fenced block first, then the
/// whole text.
pub fn extract_json(text: &str) -> Result<Value, AiError> {
    let fence = FENCED_BLOCK
        .as_ref()
        .map_err(|e| AiError::Malformed(format!("Invalid extraction pattern: {}", e)))?;

    if let Some(block) = fence.captures(text).and_then(|c| c.get(1)) {
        match serde_json::from_str(block.as_str()) {
            Ok(value) => return Ok(value),
            Err(e) => warn!("Fenced block is not valid JSON: {}", e),
        }
    }

    serde_json::from_str(text.trim()).map_err(|_| AiError::Malformed(NO_JSON_MESSAGE.to_string()))
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, AiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

fn missing(field: &str) -> AiError {
    AiError::Malformed(format!("Missing required field '{}'", field))
}
