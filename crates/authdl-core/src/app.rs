//! Application context: everything one front end needs to drive downloads.

use anyhow::{Context, Result};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::{self, LoginOutcome};
use crate::config::AuthdlConfig;
use crate::downloader::{self, DownloadOutcome};
use crate::error::LoginError;
use crate::history::{HistoryEntry, HistoryRepository, HistoryStore};
use crate::http::{CurlTransport, Method, Transport};
use crate::session::{SessionRepository, SessionStore, UserProfile};
use crate::storage::{DirectorySaver, SaveAction};
use crate::store::DirStore;
use crate::ui::{Notification, UiEvents};

/// The last download attempted, kept so it can be replayed after a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub url: String,
    pub method: Method,
}

/// Collaborators an [`App`] is assembled from.
pub struct AppParts {
    pub transport: Arc<dyn Transport>,
    pub sessions: Arc<dyn SessionRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub saver: Arc<dyn SaveAction>,
    pub ui: Arc<dyn UiEvents>,
}

pub struct App {
    pub(crate) config: AuthdlConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) sessions: Arc<dyn SessionRepository>,
    pub(crate) history: Arc<dyn HistoryRepository>,
    pub(crate) saver: Arc<dyn SaveAction>,
    pub(crate) ui: Arc<dyn UiEvents>,
    pending: Mutex<Option<PendingRequest>>,
    pub(crate) in_flight: AtomicBool,
}

impl App {
    pub fn new(config: AuthdlConfig, parts: AppParts) -> Self {
        Self {
            config,
            transport: parts.transport,
            sessions: parts.sessions,
            history: parts.history,
            saver: parts.saver,
            ui: parts.ui,
            pending: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Production wiring: curl transport, session in the XDG runtime dir,
    /// history in the XDG state dir, downloads saved to `download_dir` (or the
    /// current directory).
    pub fn from_config(config: AuthdlConfig, ui: Arc<dyn UiEvents>) -> Result<Self> {
        let download_dir = match &config.download_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("resolve current directory")?,
        };
        let sessions = SessionStore::new(DirStore::runtime_default().context("session store")?);
        let history = HistoryStore::new(DirStore::state_default().context("history store")?);
        tracing::debug!(dir = %download_dir.display(), "download directory");

        let parts = AppParts {
            transport: Arc::new(CurlTransport::from_config(&config)),
            sessions: Arc::new(sessions),
            history: Arc::new(history),
            saver: Arc::new(DirectorySaver::new(download_dir).overwrite(config.overwrite)),
            ui,
        };
        Ok(Self::new(config, parts))
    }

    pub fn config(&self) -> &AuthdlConfig {
        &self.config
    }

    pub fn download(&self, url: &str, method: Method) -> DownloadOutcome {
        downloader::download(self, url, method)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        auth::login(self, email, password)
    }

    pub fn logout(&self) -> bool {
        auth::logout(self)
    }

    /// Replays the pending request without clearing it. None when nothing is pending.
    pub fn retry(&self) -> Option<DownloadOutcome> {
        let Some(pending) = self.pending() else {
            self.ui
                .notify(Notification::error("No recent download to retry."));
            return None;
        };
        self.ui.notify(Notification::info(format!(
            "Retrying download for: {}",
            pending.url
        )));
        Some(downloader::download(self, &pending.url, pending.method))
    }

    /// Startup: shows the logged-in view when a session exists and draws the history.
    pub fn initialize(&self) {
        if let Some(user) = self.current_user() {
            self.ui.logged_in(&user);
        }
        self.render_history();
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        match self.sessions.get() {
            Ok(session) => session.map(|s| s.user),
            Err(e) => {
                tracing::warn!("could not read session: {:#}", e);
                None
            }
        }
    }

    pub fn history_entries(&self) -> Result<Vec<HistoryEntry>> {
        self.history.list()
    }

    pub fn clear_history(&self) -> Result<()> {
        self.history.clear()?;
        self.render_history();
        Ok(())
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.lock_pending().clone()
    }

    pub fn clear_pending(&self) {
        *self.lock_pending() = None;
    }

    pub(crate) fn set_pending(&self, url: &str, method: Method) {
        *self.lock_pending() = Some(PendingRequest {
            url: url.to_string(),
            method,
        });
    }

    pub(crate) fn render_history(&self) {
        match self.history.list() {
            Ok(entries) => self.ui.render_history(&entries),
            Err(e) => tracing::warn!("could not load history: {:#}", e),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingRequest>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}
