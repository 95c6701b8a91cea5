// src/app/mod.rs
pub mod controller;
pub mod state;

pub use controller::Controller;
pub use state::{AppState, Effect, Intent, ADMIN_EMPTY_MESSAGE, DELETE_CONFIRMATION};
