// src/web/handlers/jobs_handlers.rs
use crate::auth::OptionalAdmin;
use crate::listing::{
    build_view, posted_ago, share_links, share_url, similar_jobs, summary_line, CategoryFilter,
    ExperienceFilter, JobFilters,
};
use crate::router::{resolve_view, AdminView, Route, RouteContext, View};
use crate::web::types::*;

use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

/// Raw listing query parameters.
pub struct ListingQuery {
    pub category: Option<String>,
    pub experience: Option<String>,
    pub remote: Option<bool>,
    pub internship: Option<bool>,
    pub q: Option<String>,
    pub page: Option<usize>,
}

impl ListingQuery {
    fn filters(&self) -> Result<JobFilters, ApiError> {
        let category = match self.category.as_deref() {
            None => CategoryFilter::All,
            Some(value) => CategoryFilter::parse(value).ok_or_else(|| {
                invalid_filter(format!("Unknown category filter: {}", value), "all, tech, non-tech")
            })?,
        };
        let experience = match self.experience.as_deref() {
            None => ExperienceFilter::All,
            Some(value) => ExperienceFilter::parse(value).ok_or_else(|| {
                invalid_filter(
                    format!("Unknown experience filter: {}", value),
                    "all, fresher, experienced",
                )
            })?,
        };

        Ok(JobFilters {
            category,
            experience,
            remote_only: self.remote.unwrap_or(false),
            internship_only: self.internship.unwrap_or(false),
            search_term: self.q.clone().unwrap_or_default(),
        })
    }
}

fn invalid_filter(error: String, accepted: &str) -> ApiError {
    api_error(
        Status::BadRequest,
        error,
        "INVALID_FILTER",
        vec![format!("Accepted values: {}", accepted)],
    )
}

pub async fn list_jobs_handler(
    query: ListingQuery,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<JobListData>>, ApiError> {
    let filters = query.filters()?;
    let jobs = state.board.jobs().await;

    let view = build_view(&jobs, &filters, query.page.unwrap_or(1));
    let data = JobListData::from(view);
    info!(
        "Listing page {} of {} ({} matching jobs)",
        data.page, data.total_pages, data.total_count
    );

    let message = format!("{} jobs found", data.total_count);
    Ok(Json(DataResponse::success(message, data)))
}

pub async fn job_detail_handler(
    id: i64,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<JobDetailData>>, ApiError> {
    let jobs = state.board.jobs().await;
    let job = match jobs.iter().find(|job| job.id == id) {
        Some(job) => job,
        None => {
            warn!("Job {} not found", id);
            return Err(api_error(
                Status::NotFound,
                format!("Job {} not found", id),
                "JOB_NOT_FOUND",
                vec![
                    "The posting may have been removed".to_string(),
                    "Go back to the listing to browse current jobs".to_string(),
                ],
            ));
        }
    };

    let similar = similar_jobs(job, &jobs)
        .into_iter()
        .map(|other| SimilarJob {
            id: other.id,
            title: other.title.clone(),
            company: other.company.clone(),
            location: other.location.clone(),
            summary: summary_line(&other.description),
        })
        .collect();

    let share = share_url(job, state.public_url.as_deref())
        .and_then(|url| share_links(&job.title, &url));

    let data = JobDetailData {
        job: job.clone(),
        posted_ago: posted_ago(job.posted_date, Utc::now()),
        similar,
        share,
    };
    Ok(Json(DataResponse::success(
        format!("{} at {}", job.title, job.company),
        data,
    )))
}

pub async fn view_handler(
    fragment: Option<String>,
    admin_view: Option<String>,
    auth: OptionalAdmin,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ViewData>>, ApiError> {
    let admin_view = match admin_view.as_deref() {
        None => AdminView::Panel,
        Some(value) => AdminView::parse(value).ok_or_else(|| {
            api_error(
                Status::BadRequest,
                format!("Unknown admin view: {}", value),
                "INVALID_ADMIN_VIEW",
                vec!["Accepted values: panel, form, scout".to_string()],
            )
        })?,
    };

    let route = Route::parse(fragment.as_deref().unwrap_or_default());
    let jobs = state.board.jobs().await;
    let loading = !state.board.is_loaded().await;

    let view = resolve_view(RouteContext {
        route,
        jobs: &jobs,
        has_session: auth.user.is_some(),
        admin_view,
        loading,
    });
    let job_id = match view {
        View::Detail(job) => Some(job.id),
        _ => None,
    };

    let data = ViewData {
        view: view.name(),
        job_id,
        fragment: route.fragment(),
        admin_view,
    };
    Ok(Json(DataResponse::success(
        format!("Resolved view: {}", data.view),
        data,
    )))
}
