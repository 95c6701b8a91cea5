// src/web/handlers/admin_handlers.rs
use crate::app::{ADMIN_EMPTY_MESSAGE, DELETE_CONFIRMATION};
use crate::auth::AdminUser;
use crate::board::SaveJob;
use crate::form::JobForm;
use crate::session::Session;
use crate::store::StoreError;
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

pub async fn login_handler(
    login: Json<LoginRequest>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<Session>>, ApiError> {
    let login = login.into_inner();

    // each client keeps its own token; the shared store session stays untouched
    match state
        .board
        .store()
        .authenticate(&login.email, &login.password)
        .await
    {
        Ok(session) => {
            info!("Admin {} logged in", session.email);
            Ok(Json(DataResponse::success("Signed in".to_string(), session)))
        }
        Err(e) => {
            warn!("Login failed for {}: {}", login.email, e);
            let (status, code, suggestions) = categorize_store_error(&e);
            let status = if status == Status::BadGateway {
                status
            } else {
                Status::Unauthorized
            };
            Err(api_error(status, e.to_string(), code, suggestions))
        }
    }
}

pub async fn logout_handler(
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    if let Err(e) = state.board.store().sign_out(auth.caller()).await {
        error!("Sign-out failed for {}: {}", auth.email, e);
    }
    info!("Admin {} logged out", auth.email);
    Ok(Json(ActionResponse::success(
        "Signed out".to_string(),
        "logout".to_string(),
    )))
}

pub async fn admin_jobs_handler(
    auth: AdminUser,
    state: &State<ServerState>,
) -> Json<DataResponse<AdminJobsData>> {
    let jobs = state.board.jobs().await;
    info!("Admin {} listing {} jobs", auth.email, jobs.len());

    let empty_message = jobs.is_empty().then_some(ADMIN_EMPTY_MESSAGE);
    Json(DataResponse::success(
        format!("{} jobs", jobs.len()),
        AdminJobsData {
            jobs,
            empty_message,
        },
    ))
}

pub async fn create_job_handler(
    form: Json<JobForm>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut form = form.into_inner();
    form.editing_id = None;

    let save = submit_form(&mut form)?;
    info!("Admin {} creating job '{}'", auth.email, save.draft.title);
    save_job(state, &auth, save, "create").await
}

pub async fn update_job_handler(
    id: i64,
    form: Json<JobForm>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    if state.board.find(id).await.is_none() {
        return Err(not_found(id));
    }

    let mut form = form.into_inner();
    form.editing_id = Some(id);

    let save = submit_form(&mut form)?;
    info!("Admin {} updating job {}", auth.email, id);
    save_job(state, &auth, save, "update").await
}

pub async fn delete_job_handler(
    id: i64,
    confirm: Option<bool>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    if confirm != Some(true) {
        return Err(api_error(
            Status::Conflict,
            DELETE_CONFIRMATION,
            "CONFIRMATION_REQUIRED",
            vec![format!("Repeat the request with ?confirm=true to delete job {}", id)],
        ));
    }
    if state.board.find(id).await.is_none() {
        return Err(not_found(id));
    }

    info!("Admin {} deleting job {}", auth.email, id);
    match state.board.delete(id, auth.caller()).await {
        Ok(()) => Ok(Json(ActionResponse::success(
            format!("Job {} deleted", id),
            "delete".to_string(),
        ))),
        Err(e) => {
            let (status, code, suggestions) = categorize_store_error(&e);
            Err(api_error(status, e.to_string(), code, suggestions))
        }
    }
}

fn submit_form(form: &mut JobForm) -> Result<SaveJob, ApiError> {
    form.submit().map_err(|e| {
        api_error(
            Status::BadRequest,
            e.to_string(),
            "VALIDATION_ERROR",
            vec!["Title, company and location are required".to_string()],
        )
    })
}

async fn save_job(
    state: &State<ServerState>,
    auth: &AdminUser,
    save: SaveJob,
    action: &str,
) -> Result<Json<ActionResponse>, ApiError> {
    match state.board.save(save, auth.caller()).await {
        Ok(()) => Ok(Json(ActionResponse::success(
            "Job saved".to_string(),
            action.to_string(),
        ))),
        Err(e) => {
            let (status, code, suggestions) = categorize_store_error(&e);
            Err(api_error(status, e.to_string(), code, suggestions))
        }
    }
}

fn not_found(id: i64) -> ApiError {
    api_error(
        Status::NotFound,
        format!("Job {} not found", id),
        "JOB_NOT_FOUND",
        vec!["Refresh the job list and try again".to_string()],
    )
}

pub(crate) fn categorize_store_error(e: &StoreError) -> (Status, &'static str, Vec<String>) {
    match e {
        StoreError::NotFound(_) => (
            Status::NotFound,
            "JOB_NOT_FOUND",
            vec!["Refresh the job list and try again".to_string()],
        ),
        StoreError::Auth(_) => (
            Status::Unauthorized,
            "LOGIN_FAILED",
            vec!["Check your email and password".to_string()],
        ),
        StoreError::Api { status, .. } if *status == 401 || *status == 403 => (
            Status::Forbidden,
            "STORE_PERMISSION_DENIED",
            vec!["Sign in again; the session may have expired".to_string()],
        ),
        StoreError::Transport(_) | StoreError::Api { .. } | StoreError::Decode(_) => (
            Status::BadGateway,
            "STORE_ERROR",
            vec![
                "The job store is temporarily unavailable".to_string(),
                "Try again in a few moments".to_string(),
            ],
        ),
    }
}
