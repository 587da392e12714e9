//! Authenticated streaming download.
//!
//! One call to [`download`] is one attempt: the request goes out with the
//! stored bearer token, the body is streamed into memory with progress
//! reports, and the payload is handed to the save action. A 401 ends the
//! attempt early and asks the UI for a login; the login flow replays the
//! pending request afterwards.

mod error_body;
mod guard;
mod stream;

pub use error_body::{message_for, server_message};
pub(crate) use guard::InFlightGuard;

use std::path::PathBuf;

use crate::app::App;
use crate::error::DownloadError;
use crate::history::HistoryEntry;
use crate::http::{HttpRequest, Method};
use crate::ui::{Notification, Progress};
use crate::url_model::{parse_download_url, resolve_filename};

/// Description shown when the response has no `Content-Description`.
pub const DEFAULT_DESCRIPTION: &str = "Downloaded file";

/// A download that reached the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub path: PathBuf,
    pub description: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(SavedFile),
    /// 401: the UI was asked to show the login prompt.
    AuthRequired,
    Failed { message: String },
    /// Rejected because another download is still running.
    Busy,
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved(_))
    }
}

/// Runs one download attempt for `url` with `method` and reports it through the UI port.
pub fn download(app: &App, url: &str, method: Method) -> DownloadOutcome {
    let Some(_in_flight) = InFlightGuard::acquire(&app.in_flight) else {
        tracing::warn!(url, "download rejected: another one is in progress");
        app.ui.notify(
            Notification::error("Download Failed").with_detail(DownloadError::Busy.to_string()),
        );
        return DownloadOutcome::Busy;
    };

    app.set_pending(url, method);
    app.ui.set_busy(true);
    app.ui
        .update_progress(Progress::percent(0, "Preparing to download..."));
    tracing::info!(url, %method, "download started");

    match attempt(app, url, method) {
        Ok(saved) => {
            finish_saved(app, url, method, &saved);
            DownloadOutcome::Saved(saved)
        }
        Err(DownloadError::AuthRequired) => {
            tracing::info!(url, "server requires authentication");
            if app.config.clear_session_on_401 {
                if let Err(e) = app.sessions.clear() {
                    tracing::warn!("could not clear session after 401: {:#}", e);
                }
            }
            app.ui.show_login_prompt();
            DownloadOutcome::AuthRequired
        }
        Err(e) => {
            tracing::warn!(url, "download failed: {}", e);
            let message = e.to_string();
            app.ui
                .notify(Notification::error("Download Failed").with_detail(message.clone()));
            app.ui.update_progress(Progress::Hidden);
            app.ui.set_busy(false);
            DownloadOutcome::Failed { message }
        }
    }
}

fn attempt(app: &App, url: &str, method: Method) -> Result<SavedFile, DownloadError> {
    let parsed = parse_download_url(url)?;

    let mut request = HttpRequest::new(method, parsed.as_str());
    match app.sessions.token() {
        Ok(Some(token)) => request = request.bearer(&token),
        Ok(None) => {}
        Err(e) => tracing::warn!("could not read session, sending without token: {:#}", e),
    }

    let response = app.transport.send(request).map_err(DownloadError::Network)?;
    tracing::debug!(status = response.status, "response head received");

    if response.status == 401 {
        return Err(DownloadError::AuthRequired);
    }
    if !response.is_success() {
        let status = response.status;
        let body = response
            .read_to_end(app.config.max_error_body_bytes)
            .unwrap_or_else(|e| {
                tracing::debug!("could not read error body: {}", e);
                Vec::new()
            });
        return Err(DownloadError::RequestFailed {
            status,
            message: message_for(status, &body),
        });
    }

    let filename = resolve_filename(
        response.header("content-disposition"),
        &app.config.default_filename,
    );
    let description = response
        .header("content-description")
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let total = response.content_length();

    let label = format!("Downloading {}...", filename);
    let payload = stream::collect_body(response.body, total, &label, app.ui.as_ref())
        .map_err(DownloadError::Stream)?;

    let path = app
        .saver
        .save(&filename, &payload)
        .map_err(|e| DownloadError::SaveFailed(format!("{:#}", e)))?;

    Ok(SavedFile {
        filename,
        path,
        description,
        bytes: payload.len() as u64,
    })
}

fn finish_saved(app: &App, url: &str, method: Method, saved: &SavedFile) {
    tracing::info!(
        url,
        path = %saved.path.display(),
        bytes = saved.bytes,
        "download complete"
    );
    app.ui.update_progress(Progress::percent(100, "Completed!"));
    app.ui.notify(
        Notification::success("Download Successful!")
            .with_detail(saved.description.clone())
            .with_filename(saved.filename.clone()),
    );
    app.ui.update_progress(Progress::Hidden);

    if let Err(e) = app.history.record(HistoryEntry::new(url, method)) {
        tracing::warn!("could not record history: {:#}", e);
    }
    app.render_history();
    app.ui.set_busy(false);
}
