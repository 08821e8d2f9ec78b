//! Shared state for the dashboard handlers

use dashmap::DashMap;
use intel_stock::{AnalysisSnapshot, Dashboard, SessionState};
use minijinja::Environment;
use std::sync::Arc;
use uuid::Uuid;

/// Cookie naming the browser session
pub const SESSION_COOKIE: &str = "intel_sid";

pub const DASHBOARD_TEMPLATE: &str = "dashboard.html";

/// Cloned into every handler; everything inside is shared
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    dashboard: Dashboard,
    /// One entry per session cookie; sessions never see each other's state
    sessions: DashMap<String, SessionState>,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template(
            DASHBOARD_TEMPLATE,
            include_str!("../templates/dashboard.html"),
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                dashboard,
                sessions: DashMap::new(),
                templates,
            }),
        })
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.inner.dashboard
    }

    pub fn templates(&self) -> &Environment<'static> {
        &self.inner.templates
    }

    /// Copy of the session's state; unknown ids get an empty session
    pub fn session(&self, id: Option<&str>) -> SessionState {
        id.and_then(|id| self.inner.sessions.get(id).map(|entry| entry.value().clone()))
            .unwrap_or_default()
    }

    /// Replace the session's snapshot, creating the session when needed.
    /// Returns the session id to hand back to the browser.
    pub fn store_snapshot(&self, id: Option<&str>, snapshot: AnalysisSnapshot) -> String {
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        self.inner
            .sessions
            .entry(id.clone())
            .or_default()
            .store(snapshot);
        id
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }
}
