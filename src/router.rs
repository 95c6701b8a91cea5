// src/router.rs
//! Fragment routing and the view state machine.
//!
//! The active view is derived, never stored: it is a function of the
//! location fragment, whether an auth session is present, the admin
//! sub-view and whether the first fetch has completed.

use crate::types::JobPosting;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed location fragment. Unknown fragments fall back to `Root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Root,
    Job(i64),
    Admin,
}

impl Route {
    pub fn parse(fragment: &str) -> Self {
        let path = fragment.trim();
        let path = path.strip_prefix('#').unwrap_or(path);

        if path == "/admin" {
            return Route::Admin;
        }

        if let Some(id) = path.strip_prefix("/job/") {
            if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(id) = id.parse::<i64>() {
                    return Route::Job(id);
                }
            }
        }

        Route::Root
    }

    pub fn fragment(&self) -> String {
        match self {
            Route::Root => "#".to_string(),
            Route::Job(id) => format!("#/job/{}", id),
            Route::Admin => "#/admin".to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Route::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminView {
    #[default]
    Panel,
    Form,
    Scout,
}

impl AdminView {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "panel" => Some(AdminView::Panel),
            "form" => Some(AdminView::Form),
            "scout" => Some(AdminView::Scout),
            _ => None,
        }
    }
}

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Loading,
    Listing,
    Detail(&'a JobPosting),
    AdminGate,
    AdminPanel,
    AdminForm,
    AdminScout,
}

impl View<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading => "loading",
            View::Listing => "listing",
            View::Detail(_) => "detail",
            View::AdminGate => "admin_gate",
            View::AdminPanel => "admin_panel",
            View::AdminForm => "admin_form",
            View::AdminScout => "admin_scout",
        }
    }
}

/// Inputs of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub route: Route,
    pub jobs: &'a [JobPosting],
    pub has_session: bool,
    pub admin_view: AdminView,
    pub loading: bool,
}

pub fn resolve_view(ctx: RouteContext<'_>) -> View<'_> {
    if ctx.loading {
        return View::Loading;
    }

    match ctx.route {
        Route::Job(id) => match ctx.jobs.iter().find(|job| job.id == id) {
            Some(job) => View::Detail(job),
            // stale or not-yet-loaded id
            None => View::Listing,
        },
        Route::Admin if !ctx.has_session => View::AdminGate,
        Route::Admin => match ctx.admin_view {
            AdminView::Panel => View::AdminPanel,
            AdminView::Form => View::AdminForm,
            AdminView::Scout => View::AdminScout,
        },
        Route::Root => View::Listing,
    }
}
