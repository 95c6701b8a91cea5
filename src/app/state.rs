// src/app/state.rs
//! Explicit application state, updated only through [`Intent`]s.
//!
//! `apply` is synchronous and never performs I/O. When an intent needs the
//! store or the generator it returns an [`Effect`]; the controller runs it
//! and feeds the outcome back as another intent.

use crate::ai::{AiError, DescriptionDraft};
use crate::board::SaveJob;
use crate::form::JobForm;
use crate::listing::{ListingIntent, ListingState, ListingView};
use crate::router::{resolve_view, AdminView, Route, RouteContext, View};
use crate::scout::ScoutWorkspace;
use crate::session::Session;
use crate::types::{JobDraft, JobPosting};
use tracing::{debug, warn};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this job posting?";
pub const ADMIN_EMPTY_MESSAGE: &str = "No jobs to display. Add one to get started!";

#[derive(Debug)]
pub enum Intent {
    JobsLoaded(Vec<JobPosting>),
    LoadFailed,
    FragmentChanged(String),
    Navigate(Route),
    SessionChanged(Option<Session>),
    Listing(ListingIntent),

    SubmitLogin { email: String, password: String },
    LoginFailed(String),
    Logout,
    LoggedOut,

    AddNew,
    Edit(i64),
    OpenScout,
    CancelAdminView,

    UpdateForm(JobForm),
    SubmitForm,
    JobSaved,
    SaveFailed(String),

    RequestDelete(i64),
    ConfirmDelete,
    CancelDelete,
    DeleteFailed(String),

    GenerateDescription,
    DescriptionGenerated(Result<DescriptionDraft, AiError>),

    RunScout(String),
    ScoutFinished(Result<Vec<JobDraft>, AiError>),
    AddScouted(usize),
    ScoutedAdded(JobDraft),
    ScoutAddFailed(String),
}

/// Remote work requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SignIn { email: String, password: String },
    SignOut,
    Save(SaveJob),
    Delete(i64),
    GenerateDescription(String),
    Scout(String),
    AddScouted(JobDraft),
}

#[derive(Debug)]
pub struct AppState {
    pub jobs: Vec<JobPosting>,
    pub loading: bool,
    pub session: Option<Session>,
    pub route: Route,
    pub admin_view: AdminView,
    pub job_to_edit: Option<JobPosting>,
    pub listing: ListingState,
    pub form: JobForm,
    pub scout: ScoutWorkspace,
    pub login_error: Option<String>,
    pub pending_delete: Option<i64>,
    pub admin_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            loading: true,
            session: None,
            route: Route::Root,
            admin_view: AdminView::Panel,
            job_to_edit: None,
            listing: ListingState::default(),
            form: JobForm::blank(),
            scout: ScoutWorkspace::default(),
            login_error: None,
            pending_delete: None,
            admin_error: None,
        }
    }
}

impl AppState {
    pub fn view(&self) -> View<'_> {
        resolve_view(RouteContext {
            route: self.route,
            jobs: &self.jobs,
            has_session: self.session.is_some(),
            admin_view: self.admin_view,
            loading: self.loading,
        })
    }

    pub fn listing_view(&self) -> ListingView<'_> {
        self.listing.view(&self.jobs)
    }

    /// Prompt shown while a delete awaits confirmation.
    pub fn delete_prompt(&self) -> Option<&'static str> {
        self.pending_delete.map(|_| DELETE_CONFIRMATION)
    }

    pub fn apply(&mut self, intent: Intent) -> Option<Effect> {
        // credentials stay out of the log
        if !matches!(intent, Intent::SubmitLogin { .. }) {
            debug!("Applying intent: {:?}", intent);
        }
        match intent {
            Intent::JobsLoaded(jobs) => {
                self.jobs = jobs;
                self.loading = false;
                None
            }
            Intent::LoadFailed => {
                self.loading = false;
                None
            }
            Intent::FragmentChanged(fragment) => self.apply(Intent::Navigate(Route::parse(&fragment))),
            Intent::Navigate(route) => {
                if route.is_admin() != self.route.is_admin() {
                    self.reset_admin_area();
                }
                self.route = route;
                None
            }
            Intent::SessionChanged(session) => {
                if session.is_none() {
                    self.reset_admin_area();
                }
                self.session = session;
                None
            }
            Intent::Listing(listing_intent) => {
                self.listing.apply(listing_intent, &self.jobs);
                None
            }

            Intent::SubmitLogin { email, password } => {
                self.login_error = None;
                Some(Effect::SignIn { email, password })
            }
            Intent::LoginFailed(message) => {
                self.login_error = Some(message);
                None
            }
            Intent::Logout => Some(Effect::SignOut),
            Intent::LoggedOut => {
                self.session = None;
                self.reset_admin_area();
                self.route = Route::Root;
                None
            }

            Intent::AddNew => {
                self.job_to_edit = None;
                self.form = JobForm::blank();
                self.admin_view = AdminView::Form;
                None
            }
            Intent::Edit(id) => {
                match self.jobs.iter().find(|j| j.id == id) {
                    Some(job) => {
                        self.form = JobForm::from_job(job);
                        self.job_to_edit = Some(job.clone());
                        self.admin_view = AdminView::Form;
                    }
                    None => warn!("Edit requested for unknown job {}", id),
                }
                None
            }
            Intent::OpenScout => {
                self.admin_view = AdminView::Scout;
                None
            }
            Intent::CancelAdminView => {
                self.admin_view = AdminView::Panel;
                self.job_to_edit = None;
                None
            }

            Intent::UpdateForm(mut form) => {
                form.editing_id = self.form.editing_id;
                form.generating = self.form.generating;
                form.error = self.form.error.take();
                self.form = form;
                None
            }
            Intent::SubmitForm => self.form.submit().ok().map(Effect::Save),
            Intent::JobSaved => {
                self.admin_view = AdminView::Panel;
                self.job_to_edit = None;
                self.form = JobForm::blank();
                None
            }
            Intent::SaveFailed(message) => {
                self.form.error = Some(message);
                None
            }

            Intent::RequestDelete(id) => {
                self.pending_delete = Some(id);
                None
            }
            Intent::ConfirmDelete => {
                self.admin_error = None;
                self.pending_delete.take().map(Effect::Delete)
            }
            Intent::CancelDelete => {
                self.pending_delete = None;
                None
            }
            Intent::DeleteFailed(message) => {
                self.admin_error = Some(message);
                None
            }

            Intent::GenerateDescription => self
                .form
                .begin_generating()
                .ok()
                .map(Effect::GenerateDescription),
            Intent::DescriptionGenerated(result) => {
                self.form.finish_generating(result);
                None
            }

            Intent::RunScout(query) => self.scout.begin(&query).map(Effect::Scout),
            Intent::ScoutFinished(result) => {
                self.scout.finish(result);
                None
            }
            Intent::AddScouted(index) => match self.scout.results.get(index) {
                Some(job) if !self.scout.is_added(job) => Some(Effect::AddScouted(job.clone())),
                _ => None,
            },
            Intent::ScoutedAdded(job) => {
                self.scout.mark_added(&job);
                None
            }
            Intent::ScoutAddFailed(message) => {
                self.scout.error = Some(message);
                None
            }
        }
    }

    fn reset_admin_area(&mut self) {
        self.admin_view = AdminView::Panel;
        self.job_to_edit = None;
        self.pending_delete = None;
    }
}
