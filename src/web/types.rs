// src/web/types.rs

use crate::ai::TextGenerator;
use crate::board::JobBoard;
use crate::listing::{ListingView, PageItem, ShareLinks};
use crate::router::AdminView;
use crate::types::{JobDraft, JobPosting};
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state managed by Rocket.
pub struct ServerState {
    pub board: Arc<JobBoard>,
    pub generator: Arc<dyn TextGenerator>,
    /// Public address of the board, used in share links.
    pub public_url: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

/// Error envelope with a real HTTP status.
pub type ApiError = status::Custom<Json<StandardErrorResponse>>;

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct DescribeRequest {
    pub title: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ScoutRequest {
    pub query: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AcceptScoutedRequest {
    pub jobs: Vec<JobDraft>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobListData {
    pub items: Vec<JobPosting>,
    pub page: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub page_strip: Vec<PageItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl From<ListingView<'_>> for JobListData {
    fn from(view: ListingView<'_>) -> Self {
        Self {
            items: view.page.items.into_iter().cloned().collect(),
            page: view.page.page,
            total_count: view.page.total_count,
            total_pages: view.page.total_pages,
            page_strip: view.page_strip,
            empty_message: view.empty_message,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobDetailData {
    pub job: JobPosting,
    pub posted_ago: String,
    pub similar: Vec<SimilarJob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareLinks>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SimilarJob {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub summary: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ViewData {
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i64>,
    pub fragment: String,
    pub admin_view: AdminView,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminJobsData {
    pub jobs: Vec<JobPosting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl TextResponse {
    pub fn success(message: String) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

pub fn api_error(
    status: Status,
    error: impl Into<String>,
    error_code: &str,
    suggestions: Vec<String>,
) -> ApiError {
    status::Custom(
        status,
        Json(StandardErrorResponse::new(
            error.into(),
            error_code.to_string(),
            suggestions,
        )),
    )
}
