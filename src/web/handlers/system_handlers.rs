// src/web/handlers/system_handlers.rs
use crate::auth::OptionalAdmin;
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn health_handler(auth: OptionalAdmin, state: &State<ServerState>) -> Json<TextResponse> {
    match auth.user {
        Some(user) => info!("Health check by admin: {}", user.email),
        None => info!("Health check by anonymous user"),
    }

    let loaded = state.board.is_loaded().await;
    let message = if loaded {
        format!("OK ({} jobs)", state.board.jobs().await.len())
    } else {
        "OK (jobs not loaded)".to_string()
    };
    Json(TextResponse::success(message))
}
