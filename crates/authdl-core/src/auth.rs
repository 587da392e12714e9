//! Login and logout.
//!
//! A successful login stores the session and, when a download was cut short
//! by a 401, replays it exactly once.

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::downloader::{self, server_message, DownloadOutcome};
use crate::error::LoginError;
use crate::http::{HttpRequest, Method};
use crate::session::{Session, UserProfile};
use crate::ui::Notification;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// `{"data": {...}}` from the API, or the same fields unwrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoginBody {
    Wrapped { data: LoginData },
    Bare(LoginData),
}

#[derive(Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: UserProfile,
}

/// What a successful login did.
#[derive(Debug)]
pub struct LoginOutcome {
    pub session: Session,
    /// Result of replaying the download that was waiting on this login.
    pub replayed: Option<DownloadOutcome>,
}

pub fn login(app: &App, email: &str, password: &str) -> Result<LoginOutcome, LoginError> {
    let session = match authenticate(app, email, password) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("login failed: {}", e);
            app.ui
                .notify(Notification::error("Login Failed").with_detail(e.to_string()));
            return Err(e);
        }
    };
    tracing::info!(user = session.user.display_name(), "logged in");
    app.ui.hide_login_prompt();
    app.ui.logged_in(&session.user);

    let replayed = app.pending().map(|pending| {
        app.ui
            .notify(Notification::info("Login successful! Retrying download..."));
        let outcome = downloader::download(app, &pending.url, pending.method);
        app.clear_pending();
        outcome
    });

    Ok(LoginOutcome { session, replayed })
}

fn authenticate(app: &App, email: &str, password: &str) -> Result<Session, LoginError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    let request = HttpRequest::new(Method::Post, app.config.login_url.as_str())
        .json(&Credentials { email, password })
        .map_err(LoginError::Encode)?;
    tracing::debug!(url = %app.config.login_url, "sending login request");
    let response = app.transport.send(request)?;

    let status = response.status;
    let success = response.is_success();
    let body = response.read_to_end(app.config.max_error_body_bytes)?;
    if !success {
        tracing::debug!(status, "login rejected");
        return Err(LoginError::Rejected(
            server_message(&body).unwrap_or_else(|| "Login failed.".to_string()),
        ));
    }

    let data = match serde_json::from_slice::<LoginBody>(&body) {
        Ok(LoginBody::Wrapped { data }) | Ok(LoginBody::Bare(data)) => data,
        Err(e) => {
            tracing::debug!("unreadable login body: {}", e);
            return Err(LoginError::Malformed);
        }
    };
    let token = data
        .token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(LoginError::Malformed)?;

    let session = Session {
        token,
        user: data.user,
    };
    app.sessions
        .set(&session)
        .map_err(|e| LoginError::Storage(format!("{:#}", e)))?;
    Ok(session)
}

/// Asks for confirmation, then drops the session. Returns whether it logged out.
pub fn logout(app: &App) -> bool {
    if !app.ui.confirm("Are you sure you want to log out?") {
        tracing::debug!("logout cancelled");
        return false;
    }
    if let Err(e) = app.sessions.clear() {
        tracing::warn!("logout failed: {:#}", e);
        app.ui
            .notify(Notification::error("Logout Failed").with_detail(format!("{:#}", e)));
        return false;
    }
    tracing::info!("logged out");
    app.ui.logged_out();
    app.ui.notify(Notification::info("You have been logged out."));
    true
}
