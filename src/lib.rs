//! Job board: public listing, admin workflow and AI-drafted postings on
//! top of a hosted row store.

pub mod ai;
pub mod app;
pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod form;
pub mod listing;
pub mod router;
pub mod scout;
pub mod session;
pub mod store;
pub mod types;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

pub use web::start_web_server;
