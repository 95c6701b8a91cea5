// src/session.rs
//! Auth session and change notification.
//!
//! Listeners are registered with [`SessionEvents::subscribe`] and stay
//! registered until the returned [`Subscription`] is unsubscribed or dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

type Listener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    current: Option<Session>,
    listeners: HashMap<u64, Listener>,
}

/// Holds the current session and fans out changes to subscribers.
#[derive(Clone, Default)]
pub struct SessionEvents {
    inner: Arc<Mutex<Registry>>,
}

/// Registration handle. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().current.clone()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Arc::new(listener));
        debug!("Session listener {} subscribed", id);

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Replace the current session and notify every listener.
    pub fn set(&self, session: Option<Session>) {
        let listeners: Vec<Listener> = {
            let mut registry = self.lock();
            registry.current = session.clone();
            registry.listeners.values().cloned().collect()
        };

        // called outside the lock so a listener may unsubscribe
        for listener in listeners {
            listener(session.as_ref());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(|p| p.into_inner());
            registry.listeners.remove(&self.id);
            debug!("Session listener {} unsubscribed", self.id);
        }
    }
}
