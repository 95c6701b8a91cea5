// src/web/handlers/ai_handlers.rs
use crate::ai::{generate_description, generate_job_batch, AiError, AiTask, DescriptionDraft};
use crate::auth::AdminUser;
use crate::form::FormError;
use crate::scout::{EMPTY_QUERY_MESSAGE, EXAMPLE_QUERIES};
use crate::types::JobDraft;
use crate::web::handlers::admin_handlers::categorize_store_error;
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

pub async fn describe_handler(
    request: Json<DescribeRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<DescriptionDraft>>, ApiError> {
    let title = request.into_inner().title;
    let title = title.trim();

    if title.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            FormError::TitleRequired.to_string(),
            "TITLE_REQUIRED",
            vec!["Provide a job title to describe".to_string()],
        ));
    }

    info!("Admin {} requested a description for '{}'", auth.email, title);
    match generate_description(state.generator.as_ref(), title).await {
        Ok(draft) => Ok(Json(DataResponse::success(
            format!("Description drafted for {}", title),
            draft,
        ))),
        Err(e) => Err(ai_error(&e, AiTask::Description)),
    }
}

pub async fn scout_handler(
    request: Json<ScoutRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<Vec<JobDraft>>>, ApiError> {
    let query = request.into_inner().query;
    let query = query.trim();

    if query.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            EMPTY_QUERY_MESSAGE,
            "EMPTY_QUERY",
            EXAMPLE_QUERIES.iter().map(|q| q.to_string()).collect(),
        ));
    }

    info!("Admin {} scouting '{}'", auth.email, query);
    match generate_job_batch(state.generator.as_ref(), query).await {
        Ok(jobs) => Ok(Json(DataResponse::success(
            format!("{} jobs found", jobs.len()),
            jobs,
        ))),
        Err(e) => Err(ai_error(&e, AiTask::Scout)),
    }
}

pub async fn accept_scouted_handler(
    request: Json<AcceptScoutedRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let jobs = request.into_inner().jobs;

    if jobs.is_empty() {
        return Err(api_error(
            Status::BadRequest,
            "No jobs to add",
            "EMPTY_BATCH",
            vec!["Select at least one scouted job".to_string()],
        ));
    }

    let invalid: Vec<usize> = jobs
        .iter()
        .enumerate()
        .filter(|(_, job)| !job.has_required_fields())
        .map(|(index, _)| index)
        .collect();
    if !invalid.is_empty() {
        warn!(
            "Admin {} sent {} scouted jobs missing required fields",
            auth.email,
            invalid.len()
        );
        return Err(api_error(
            Status::BadRequest,
            FormError::MissingRequired.to_string(),
            "VALIDATION_ERROR",
            invalid
                .iter()
                .map(|index| format!("Job {} needs a title, company and location", index + 1))
                .collect(),
        ));
    }

    let count = jobs.len();
    info!("Admin {} adding {} scouted jobs", auth.email, count);
    match state.board.bulk_add(jobs, auth.caller()).await {
        Ok(()) => Ok(Json(ActionResponse::success(
            format!("{} jobs added", count),
            "bulk_add".to_string(),
        ))),
        Err(e) => {
            error!("Bulk add failed: {}", e);
            let (status, code, suggestions) = categorize_store_error(&e);
            Err(api_error(status, e.to_string(), code, suggestions))
        }
    }
}

fn ai_error(e: &AiError, task: AiTask) -> ApiError {
    error!("AI request failed: {}", e);
    let status = if e.is_credential() {
        Status::ServiceUnavailable
    } else {
        Status::BadGateway
    };
    let suggestions = if e.is_credential() {
        vec!["Set API_KEY in the server environment and restart".to_string()]
    } else {
        vec!["Try again in a few moments".to_string()]
    };
    api_error(status, e.user_message(task), e.error_code(), suggestions)
}
