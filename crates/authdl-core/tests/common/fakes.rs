//! In-process fakes: a UI that records every event and a transport that
//! replays scripted responses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use authdl_core::config::AuthdlConfig;
use authdl_core::error::TransportError;
use authdl_core::history::{HistoryEntry, HistoryStore};
use authdl_core::http::{Headers, HttpRequest, HttpResponse, Transport};
use authdl_core::session::{Session, SessionRepository, SessionStore, UserProfile};
use authdl_core::storage::DirectorySaver;
use authdl_core::store::MemoryStore;
use authdl_core::ui::{NoticeKind, Notification, Progress, UiEvents};
use authdl_core::{App, AppParts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Busy(bool),
    Progress(Progress),
    Notify(Notification),
    ShowLogin,
    HideLogin,
    LoggedIn(UserProfile),
    LoggedOut,
    History(Vec<HistoryEntry>),
    Confirm(String),
}

pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
    confirm_answer: AtomicBool,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        }
    }

    pub fn answer_confirm(&self, yes: bool) {
        self.confirm_answer.store(yes, Ordering::SeqCst);
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.kind == NoticeKind::Error)
            .collect()
    }

    pub fn progress(&self) -> Vec<Progress> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &UiEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn last_busy(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::Busy(b) => Some(b),
            _ => None,
        })
    }
}

impl UiEvents for RecordingUi {
    fn set_busy(&self, busy: bool) {
        self.push(UiEvent::Busy(busy));
    }

    fn update_progress(&self, progress: Progress) {
        self.push(UiEvent::Progress(progress));
    }

    fn notify(&self, notification: Notification) {
        self.push(UiEvent::Notify(notification));
    }

    fn show_login_prompt(&self) {
        self.push(UiEvent::ShowLogin);
    }

    fn hide_login_prompt(&self) {
        self.push(UiEvent::HideLogin);
    }

    fn logged_in(&self, user: &UserProfile) {
        self.push(UiEvent::LoggedIn(user.clone()));
    }

    fn logged_out(&self) {
        self.push(UiEvent::LoggedOut);
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        self.push(UiEvent::History(entries.to_vec()));
    }

    fn confirm(&self, question: &str) -> bool {
        self.push(UiEvent::Confirm(question.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

/// One scripted answer.
pub enum Reply {
    Respond {
        status: u32,
        headers: Vec<(String, String)>,
        chunks: Vec<Vec<u8>>,
    },
    /// Head arrives, then the body breaks after `chunks`.
    BrokenBody {
        status: u32,
        headers: Vec<(String, String)>,
        chunks: Vec<Vec<u8>>,
    },
    /// No response at all.
    Unreachable,
}

impl Reply {
    pub fn ok(headers: &[(&str, &str)], chunks: Vec<Vec<u8>>) -> Self {
        Reply::Respond {
            status: 200,
            headers: owned(headers),
            chunks,
        }
    }

    pub fn status(status: u32, body: &str) -> Self {
        Reply::Respond {
            status,
            headers: owned(&[("Content-Type", "application/json")]),
            chunks: vec![body.as_bytes().to_vec()],
        }
    }

    /// Login success in the API's `{"data": ...}` shape.
    pub fn login_ok(token: &str, name: &str, email: &str) -> Self {
        let body = serde_json::json!({
            "data": {"token": token, "user": {"name": name, "email": email}}
        });
        Reply::status(200, &body.to_string())
    }
}

fn owned(headers: &[(&str, &str)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Answers requests from a queue and remembers what was sent.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request: no scripted reply left");
        match reply {
            Reply::Respond {
                status,
                headers,
                chunks,
            } => Ok(HttpResponse::from_chunks(
                status,
                headers.into_iter().collect::<Headers>(),
                chunks,
            )),
            Reply::BrokenBody {
                status,
                headers,
                chunks,
            } => {
                let body = chunks.into_iter().map(Ok).chain(std::iter::once(Err(
                    TransportError::Malformed("connection reset".to_string()),
                )));
                Ok(HttpResponse {
                    status,
                    headers: headers.into_iter().collect::<Headers>(),
                    body: Box::new(body),
                })
            }
            Reply::Unreachable => Err(TransportError::NoResponse),
        }
    }
}

/// An [`App`] over in-memory stores, a scripted transport and a recording UI.
pub struct Harness {
    pub app: App,
    pub ui: Arc<RecordingUi>,
    pub transport: Arc<ScriptedTransport>,
    pub sessions: Arc<SessionStore<MemoryStore>>,
    pub history: Arc<HistoryStore<MemoryStore>>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self::with_config(AuthdlConfig::default(), replies)
    }

    pub fn with_config(config: AuthdlConfig, replies: Vec<Reply>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ui = Arc::new(RecordingUi::new());
        let transport = Arc::new(ScriptedTransport::new(replies));
        let sessions = Arc::new(SessionStore::new(MemoryStore::new()));
        let history = Arc::new(HistoryStore::new(MemoryStore::new()));
        let saver = DirectorySaver::new(dir.path()).overwrite(config.overwrite);
        let app = App::new(
            config,
            AppParts {
                transport: transport.clone(),
                sessions: sessions.clone(),
                history: history.clone(),
                saver: Arc::new(saver),
                ui: ui.clone(),
            },
        );
        Self {
            app,
            ui,
            transport,
            sessions,
            history,
            dir,
        }
    }

    pub fn logged_in(self, token: &str) -> Self {
        self.sessions
            .set(&Session {
                token: token.to_string(),
                user: UserProfile {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
            })
            .unwrap();
        self
    }
}
