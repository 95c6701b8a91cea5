// src/app/controller.rs
use super::state::{AppState, Effect, Intent};
use crate::ai::{generate_description, generate_job_batch, TextGenerator};
use crate::board::JobBoard;
use crate::session::{Session, Subscription};
use crate::store::Caller;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

/// Owns the [`AppState`] and runs the effects its transitions request.
///
/// Session and fragment notifications may arrive at any time from other
/// tasks; they are queued and applied one at a time, in order, between
/// intents.
pub struct Controller {
    board: Arc<JobBoard>,
    generator: Arc<dyn TextGenerator>,
    state: AppState,
    events_tx: UnboundedSender<Intent>,
    events_rx: UnboundedReceiver<Intent>,
    _session: Subscription,
}

impl Controller {
    pub fn new(board: Arc<JobBoard>, generator: Arc<dyn TextGenerator>) -> Self {
        let (events_tx, events_rx) = unbounded_channel();

        let tx = events_tx.clone();
        let subscription = board
            .store()
            .on_session_change(Box::new(move |session: Option<&Session>| {
                if tx.send(Intent::SessionChanged(session.cloned())).is_err() {
                    debug!("Controller gone, dropping session change");
                }
            }));

        let mut state = AppState::default();
        state.apply(Intent::SessionChanged(board.store().get_session()));

        Self {
            board,
            generator,
            state,
            events_tx,
            events_rx,
            _session: subscription,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle for posting notifications (e.g. fragment changes) from elsewhere.
    pub fn sender(&self) -> UnboundedSender<Intent> {
        self.events_tx.clone()
    }

    /// Initial fetch. The loading view ends whether or not it succeeds.
    pub async fn load(&mut self) {
        let intent = match self.board.refresh().await {
            Ok(()) => Intent::JobsLoaded(self.board.jobs().await),
            Err(_) => Intent::LoadFailed,
        };
        self.dispatch(intent).await;
    }

    pub async fn navigate(&mut self, fragment: &str) {
        self.dispatch(Intent::FragmentChanged(fragment.to_string()))
            .await;
    }

    pub async fn login(&mut self, email: &str, password: &str) {
        self.dispatch(Intent::SubmitLogin {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await;
    }

    pub async fn logout(&mut self) {
        self.dispatch(Intent::Logout).await;
    }

    /// Apply an intent, run any effect it requests and apply the outcome,
    /// interleaving queued notifications between steps.
    pub async fn dispatch(&mut self, intent: Intent) {
        let mut queue = VecDeque::from([intent]);
        while let Some(intent) = queue.pop_front() {
            if let Some(effect) = self.state.apply(intent) {
                queue.extend(self.run_effect(effect).await);
            }
            while let Ok(event) = self.events_rx.try_recv() {
                queue.push_back(event);
            }
        }
    }

    /// Apply every queued notification. Returns how many were applied.
    pub async fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            applied += 1;
            self.dispatch(event).await;
        }
        applied
    }

    async fn run_effect(&self, effect: Effect) -> Vec<Intent> {
        match effect {
            Effect::SignIn { email, password } => {
                match self.board.store().sign_in(&email, &password).await {
                    Ok(session) => {
                        info!("Admin {} signed in", session.email);
                        Vec::new()
                    }
                    Err(e) => {
                        error!("Sign-in failed: {}", e);
                        vec![Intent::LoginFailed(e.to_string())]
                    }
                }
            }
            Effect::SignOut => {
                if let Err(e) = self.board.store().sign_out(Caller::Session).await {
                    error!("Sign-out failed: {}", e);
                }
                vec![Intent::LoggedOut]
            }
            Effect::Save(request) => match self.board.save(request, Caller::Session).await {
                Ok(()) => vec![Intent::JobsLoaded(self.board.jobs().await), Intent::JobSaved],
                Err(e) => vec![Intent::SaveFailed(format!("Failed to save job: {}", e))],
            },
            Effect::Delete(id) => match self.board.delete(id, Caller::Session).await {
                Ok(()) => vec![Intent::JobsLoaded(self.board.jobs().await)],
                Err(e) => vec![Intent::DeleteFailed(format!("Failed to delete job: {}", e))],
            },
            Effect::GenerateDescription(title) => {
                let result = generate_description(self.generator.as_ref(), &title).await;
                vec![Intent::DescriptionGenerated(result)]
            }
            Effect::Scout(query) => {
                let result = generate_job_batch(self.generator.as_ref(), &query).await;
                vec![Intent::ScoutFinished(result)]
            }
            Effect::AddScouted(job) => match self
                .board
                .bulk_add(vec![job.clone()], Caller::Session)
                .await
            {
                Ok(()) => vec![
                    Intent::JobsLoaded(self.board.jobs().await),
                    Intent::ScoutedAdded(job),
                ],
                Err(e) => vec![Intent::ScoutAddFailed(format!("Failed to add job: {}", e))],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::scripted::ScriptedGenerator;
    use crate::ai::{AiError, CREDENTIAL_MESSAGE};
    use crate::form::JobForm;
    use crate::router::{AdminView, Route, View};
    use crate::store::{MemoryStore, RemoteStore};
    use crate::test_support::job;

    const SCOUTED: &str = r##"```json
[{"title": "Writer", "company": "Pocket FM", "location": "Remote", "type": "Part-time",
  "category": "Non-Tech", "experienceLevel": "Fresher", "description": "Write.",
  "url": "#", "requirements": ["Hindi"], "qualifications": []}]
```"##;

    fn setup(generator: ScriptedGenerator) -> (Arc<MemoryStore>, Controller) {
        let store = Arc::new(
            MemoryStore::new("secret")
                .with_admin("admin@example.com", "hunter2")
                .with_jobs(vec![job(1, "Dev", "Acme", "Pune"), job(2, "Ops", "Acme", "Remote")]),
        );
        let board = Arc::new(JobBoard::new(store.clone()));
        let controller = Controller::new(board, Arc::new(generator));
        (store, controller)
    }

    #[tokio::test]
    async fn test_load_then_detail() {
        let (_, mut app) = setup(ScriptedGenerator::default());
        assert_eq!(app.state().view(), View::Loading);
        app.load().await;
        app.navigate("#/job/2").await;
        match app.state().view() {
            View::Detail(found) => assert_eq!(found.id, 2),
            other => panic!("expected detail, got {:?}", other),
        }
        app.navigate("#/job/99").await;
        assert_eq!(app.state().view(), View::Listing);
    }

    #[tokio::test]
    async fn test_login_flows_through_session_queue() {
        let (_, mut app) = setup(ScriptedGenerator::default());
        app.load().await;
        app.navigate("#/admin").await;

        app.login("admin@example.com", "wrong").await;
        assert_eq!(app.state().view(), View::AdminGate);
        assert_eq!(
            app.state().login_error.as_deref(),
            Some("Invalid login credentials")
        );

        app.login("admin@example.com", "hunter2").await;
        assert_eq!(app.state().view(), View::AdminPanel);
        assert!(app.state().login_error.is_none());

        app.logout().await;
        assert!(app.state().session.is_none());
        assert_eq!(app.state().route, Route::Root);
        assert_eq!(app.state().admin_view, AdminView::Panel);
    }

    #[tokio::test]
    async fn test_external_session_change_is_queued() {
        let (store, mut app) = setup(ScriptedGenerator::default());
        app.load().await;

        store.sign_in("admin@example.com", "hunter2").await.unwrap();
        assert!(app.state().session.is_none());
        assert_eq!(app.drain_events().await, 1);
        assert!(app.state().session.is_some());

        app.sender()
            .send(Intent::FragmentChanged("#/admin".to_string()))
            .unwrap();
        app.drain_events().await;
        assert_eq!(app.state().view(), View::AdminPanel);
    }

    #[tokio::test]
    async fn test_confirmed_delete_refetches() {
        let (store, mut app) = setup(ScriptedGenerator::default());
        app.load().await;

        app.dispatch(Intent::RequestDelete(1)).await;
        assert_eq!(app.state().jobs.len(), 2);
        app.dispatch(Intent::ConfirmDelete).await;
        assert_eq!(app.state().jobs.len(), 1);
        assert_eq!(store.list_jobs().await.unwrap().len(), 1);

        store.set_unavailable(true);
        app.dispatch(Intent::RequestDelete(2)).await;
        app.dispatch(Intent::ConfirmDelete).await;
        assert_eq!(app.state().jobs.len(), 1);
        assert!(app.state().admin_error.is_some());
    }

    #[tokio::test]
    async fn test_generate_description_into_form() {
        let reply = r#"{"description": "Lead the kitchen.", "requirements": ["Menus"], "qualifications": ["Diploma"], "category": "Non-Tech", "experienceLevel": "Experienced"}"#;
        let (_, mut app) = setup(ScriptedGenerator::new(vec![
            Ok(reply.to_string()),
            Err(AiError::CredentialMissing),
        ]));
        app.load().await;
        app.dispatch(Intent::AddNew).await;

        let mut form = JobForm::blank();
        form.title = "Head Chef".to_string();
        app.dispatch(Intent::UpdateForm(form)).await;
        app.dispatch(Intent::GenerateDescription).await;
        assert_eq!(app.state().form.description, "Lead the kitchen.");
        assert!(!app.state().form.generating);

        app.dispatch(Intent::GenerateDescription).await;
        assert_eq!(app.state().form.error.as_deref(), Some(CREDENTIAL_MESSAGE));
        assert_eq!(app.state().form.description, "Lead the kitchen.");
    }

    #[tokio::test]
    async fn test_scout_and_add_once() {
        let (store, mut app) = setup(ScriptedGenerator::replying(SCOUTED));
        app.load().await;
        app.dispatch(Intent::OpenScout).await;
        app.dispatch(Intent::RunScout("writing internships".to_string()))
            .await;
        assert_eq!(app.state().scout.results.len(), 1);

        app.dispatch(Intent::AddScouted(0)).await;
        app.dispatch(Intent::AddScouted(0)).await;
        assert_eq!(store.list_jobs().await.unwrap().len(), 3);
        assert_eq!(app.state().jobs.len(), 3);
        assert!(app.state().scout.pending().is_empty());
    }

    #[tokio::test]
    async fn test_save_form_returns_to_panel() {
        let (_, mut app) = setup(ScriptedGenerator::default());
        app.load().await;
        app.dispatch(Intent::Edit(1)).await;

        let mut form = app.state().form.clone();
        form.title = "Senior Dev".to_string();
        app.dispatch(Intent::UpdateForm(form)).await;
        app.dispatch(Intent::SubmitForm).await;

        assert_eq!(app.state().admin_view, AdminView::Panel);
        assert!(app.state().job_to_edit.is_none());
        let edited = app.state().jobs.iter().find(|j| j.id == 1).unwrap();
        assert_eq!(edited.title, "Senior Dev");
    }
}
