// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::ai::DescriptionDraft;
use crate::auth::{AdminUser, AuthConfig, OptionalAdmin};
use crate::board::JobBoard;
use crate::config::AppConfig;
use crate::form::JobForm;
use crate::session::Session;
use crate::types::JobDraft;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Public board

#[get("/jobs?<category>&<experience>&<remote>&<internship>&<q>&<page>")]
pub async fn list_jobs(
    category: Option<String>,
    experience: Option<String>,
    remote: Option<bool>,
    internship: Option<bool>,
    q: Option<String>,
    page: Option<usize>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<JobListData>>, ApiError> {
    let query = ListingQuery {
        category,
        experience,
        remote,
        internship,
        q,
        page,
    };
    handlers::list_jobs_handler(query, state).await
}

#[get("/jobs/<id>")]
pub async fn job_detail(
    id: i64,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<JobDetailData>>, ApiError> {
    handlers::job_detail_handler(id, state).await
}

#[get("/view?<fragment>&<admin_view>")]
pub async fn current_view(
    fragment: Option<String>,
    admin_view: Option<String>,
    auth: OptionalAdmin,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ViewData>>, ApiError> {
    handlers::view_handler(fragment, admin_view, auth, state).await
}

#[get("/health")]
pub async fn health(auth: OptionalAdmin, state: &State<ServerState>) -> Json<TextResponse> {
    handlers::health_handler(auth, state).await
}

// Admin area

#[post("/admin/login", data = "<request>")]
pub async fn login(
    request: Json<LoginRequest>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<Session>>, ApiError> {
    handlers::login_handler(request, state).await
}

#[post("/admin/logout")]
pub async fn logout(
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::logout_handler(auth, state).await
}

#[get("/admin/jobs")]
pub async fn admin_jobs(
    auth: AdminUser,
    state: &State<ServerState>,
) -> Json<DataResponse<AdminJobsData>> {
    handlers::admin_jobs_handler(auth, state).await
}

#[post("/admin/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<JobForm>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::create_job_handler(request, auth, state).await
}

#[put("/admin/jobs/<id>", data = "<request>")]
pub async fn update_job(
    id: i64,
    request: Json<JobForm>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::update_job_handler(id, request, auth, state).await
}

#[delete("/admin/jobs/<id>?<confirm>")]
pub async fn delete_job(
    id: i64,
    confirm: Option<bool>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_job_handler(id, confirm, auth, state).await
}

#[post("/admin/ai/describe", data = "<request>")]
pub async fn describe(
    request: Json<DescribeRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<DescriptionDraft>>, ApiError> {
    handlers::describe_handler(request, auth, state).await
}

#[post("/admin/ai/scout", data = "<request>")]
pub async fn scout(
    request: Json<ScoutRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<Vec<JobDraft>>>, ApiError> {
    handlers::scout_handler(request, auth, state).await
}

#[post("/admin/ai/scout/accept", data = "<request>")]
pub async fn accept_scouted(
    request: Json<AcceptScoutedRequest>,
    auth: AdminUser,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::accept_scouted_handler(request, auth, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Admin session required".to_string(),
        "UNAUTHORIZED".to_string(),
        vec!["Sign in through /api/admin/login and send the access token as a Bearer header".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Verify field names and value types".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

pub fn build_rocket(state: ServerState, auth_config: AuthConfig, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .manage(auth_config)
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                list_jobs,
                job_detail,
                current_view,
                health,
                login,
                logout,
                admin_jobs,
                create_job,
                update_job,
                delete_job,
                describe,
                scout,
                accept_scouted,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &AppConfig) -> Result<()> {
    let store = config.build_store()?;
    let generator = config.build_generator()?;
    let board = Arc::new(JobBoard::new(store));

    if let Err(e) = board.refresh().await {
        error!("Initial job load failed: {}", e);
    }

    info!("Starting job board API server on port {}", config.server.port);
    let state = ServerState {
        board,
        generator,
        public_url: config.server.public_url.clone(),
    };
    let auth_config = AuthConfig::new(config.auth.jwt_secret.clone());

    build_rocket(state, auth_config, config.server.port)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::scripted::ScriptedGenerator;
    use crate::ai::AiError;
    use crate::store::MemoryStore;
    use crate::test_support::job;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};

    const SECRET: &str = "test-secret";
    const ADMIN: &str = "admin@example.com";
    const PASSWORD: &str = "hunter2";
    const SECOND_ADMIN: &str = "second@example.com";
    const SECOND_PASSWORD: &str = "swordfish";

    async fn client_with(generator: ScriptedGenerator) -> Client {
        let jobs = vec![
            job(1, "Rust Engineer", "Ferrous", "Remote"),
            job(2, "Backend Developer", "Acme", "Pune"),
            job(3, "Data Analyst", "Acme", "Chennai"),
        ];
        let store = MemoryStore::new(SECRET)
            .with_admin(ADMIN, PASSWORD)
            .with_admin(SECOND_ADMIN, SECOND_PASSWORD)
            .with_jobs(jobs);
        let board = Arc::new(JobBoard::new(Arc::new(store)));
        board.refresh().await.unwrap();

        let state = ServerState {
            board,
            generator: Arc::new(generator),
            public_url: Some("https://jobs.example.com".to_string()),
        };
        Client::tracked(build_rocket(state, AuthConfig::new(SECRET), 0))
            .await
            .unwrap()
    }

    async fn token(client: &Client) -> String {
        login_as(client, ADMIN, PASSWORD).await
    }

    async fn login_as(client: &Client, email: &str, password: &str) -> String {
        let response = client
            .post("/api/admin/login")
            .header(ContentType::JSON)
            .body(json!({ "email": email, "password": password }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token))
    }

    #[rocket::async_test]
    async fn test_listing_filters_remote_jobs() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/jobs?remote=true").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["total_count"], 1);
        assert_eq!(body["data"]["items"][0]["title"], "Rust Engineer");
    }

    #[rocket::async_test]
    async fn test_listing_rejects_unknown_category() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/jobs?category=legal").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "INVALID_FILTER");
    }

    #[rocket::async_test]
    async fn test_missing_job_is_404() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/jobs/99").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "JOB_NOT_FOUND");
    }

    #[rocket::async_test]
    async fn test_detail_lists_similar_jobs() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/jobs/2").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["job"]["company"], "Acme");
        assert_eq!(body["data"]["similar"].as_array().unwrap().len(), 2);
    }

    #[rocket::async_test]
    async fn test_admin_view_requires_session() {
        let client = client_with(ScriptedGenerator::default()).await;

        let response = client.get("/api/view?fragment=%23%2Fadmin").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["view"], "admin_gate");

        let token = token(&client).await;
        let response = client
            .get("/api/view?fragment=%23%2Fadmin&admin_view=scout")
            .header(bearer(&token))
            .dispatch()
            .await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["view"], "admin_scout");
    }

    #[rocket::async_test]
    async fn test_admin_routes_reject_anonymous() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/admin/jobs").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "UNAUTHORIZED");
    }

    #[rocket::async_test]
    async fn test_bad_credentials_are_rejected() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client
            .post("/api/admin/login")
            .header(ContentType::JSON)
            .body(json!({ "email": ADMIN, "password": "wrong" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Invalid login credentials");
    }

    #[rocket::async_test]
    async fn test_create_then_confirmed_delete() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let response = client
            .post("/api/admin/jobs")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(
                json!({
                    "title": "Platform Engineer",
                    "company": "Initech",
                    "location": "Remote",
                    "requirements": "Rust\nKubernetes\n"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/jobs?q=initech").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["total_count"], 1);
        assert_eq!(body["data"]["items"][0]["requirements"], json!(["Rust", "Kubernetes"]));
        let id = body["data"]["items"][0]["id"].as_i64().unwrap();

        let response = client
            .delete(format!("/api/admin/jobs/{}", id))
            .header(bearer(&token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "CONFIRMATION_REQUIRED");

        let response = client
            .delete(format!("/api/admin/jobs/{}?confirm=true", id))
            .header(bearer(&token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get(format!("/api/jobs/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_create_requires_core_fields() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let response = client
            .post("/api/admin/jobs")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "title": "Platform Engineer", "company": " " }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }

    #[rocket::async_test]
    async fn test_describe_reports_missing_credential() {
        let generator = ScriptedGenerator::new(vec![Err(AiError::CredentialMissing)]);
        let client = client_with(generator).await;
        let token = token(&client).await;

        let response = client
            .post("/api/admin/ai/describe")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "title": "Nurse" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::ServiceUnavailable);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "AI_CREDENTIAL_MISSING");
        assert_eq!(body["error"], crate::ai::CREDENTIAL_MESSAGE);
    }

    #[rocket::async_test]
    async fn test_describe_returns_draft() {
        let generator = ScriptedGenerator::replying(
            r#"{"description": "Care for patients.", "requirements": ["License"], "qualifications": ["BSc Nursing"], "category": "Non-Tech", "experienceLevel": "Fresher"}"#,
        );
        let client = client_with(generator).await;
        let token = token(&client).await;

        let response = client
            .post("/api/admin/ai/describe")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "title": "Nurse" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["category"], "Non-Tech");
        assert_eq!(body["data"]["experienceLevel"], "Fresher");
    }

    #[rocket::async_test]
    async fn test_scout_rejects_blank_query() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let response = client
            .post("/api/admin/ai/scout")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(json!({ "query": "   " }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "EMPTY_QUERY");
    }

    #[rocket::async_test]
    async fn test_huge_page_number_returns_empty_page() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client
            .get(format!("/api/jobs?page={}", usize::MAX))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["items"], json!([]));
        assert_eq!(body["data"]["total_count"], 3);
    }

    #[rocket::async_test]
    async fn test_envelopes_carry_no_chat_fields() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let response = client.get("/api/jobs").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["type"], "data");
        assert!(body.get("conversation_id").is_none());

        let response = client
            .post("/api/admin/logout")
            .header(bearer(&token))
            .dispatch()
            .await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["action"], "logout");
        assert!(body.get("next_actions").is_none());
        assert!(body.get("conversation_id").is_none());

        let response = client.get("/api/jobs/99").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert!(body.get("conversation_id").is_none());
    }

    #[rocket::async_test]
    async fn test_detail_includes_share_links() {
        let client = client_with(ScriptedGenerator::default()).await;
        let response = client.get("/api/jobs/1").dispatch().await;
        let body: Value = response.into_json().await.unwrap();

        let share = &body["data"]["share"];
        assert_eq!(share["url"], "https://jobs.example.com/#/job/1");
        assert_eq!(
            share["telegram"],
            "https://t.me/share/url?url=https%3A%2F%2Fjobs.example.com%2F%23%2Fjob%2F1&text=Rust+Engineer"
        );
    }

    #[rocket::async_test]
    async fn test_logout_of_one_admin_keeps_the_other_working() {
        let client = client_with(ScriptedGenerator::default()).await;
        let first = token(&client).await;
        let second = login_as(&client, SECOND_ADMIN, SECOND_PASSWORD).await;

        let state = client.rocket().state::<ServerState>().unwrap();
        assert!(state.board.store().get_session().is_none());

        let response = client
            .post("/api/admin/logout")
            .header(bearer(&second))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let form = json!({ "title": "SRE", "company": "Initech", "location": "Remote" });
        let response = client
            .post("/api/admin/jobs")
            .header(ContentType::JSON)
            .header(bearer(&first))
            .body(form.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post("/api/admin/jobs")
            .header(ContentType::JSON)
            .header(bearer(&second))
            .body(form.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "STORE_PERMISSION_DENIED");

        let response = client.get("/api/jobs?q=initech").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["total_count"], 1);
    }

    fn scouted(title: &str, company: &str, location: &str) -> Value {
        json!({
            "title": title,
            "company": company,
            "location": location,
            "type": "Full-time",
            "category": "Tech",
            "experienceLevel": "Fresher",
            "description": "Scouted posting."
        })
    }

    #[rocket::async_test]
    async fn test_accept_scouted_rejects_blank_fields() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let jobs = json!({ "jobs": [
            scouted("Writer", "Pocket", "Remote"),
            scouted("", "  ", ""),
        ] });
        let response = client
            .post("/api/admin/ai/scout/accept")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(jobs.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(
            body["suggestions"],
            json!(["Job 2 needs a title, company and location"])
        );

        let response = client.get("/api/jobs").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["total_count"], 3);
    }

    #[rocket::async_test]
    async fn test_accept_scouted_adds_valid_batch() {
        let client = client_with(ScriptedGenerator::default()).await;
        let token = token(&client).await;

        let jobs = json!({ "jobs": [scouted("Writer", "Pocket", "Remote")] });
        let response = client
            .post("/api/admin/ai/scout/accept")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(jobs.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/jobs?q=pocket").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["total_count"], 1);
        assert_eq!(body["data"]["items"][0]["url"], "#");
    }
}
