//! UI event port.
//!
//! The core never renders anything. It reports state changes through
//! [`UiEvents`] and the front end decides how to show them (terminal bar,
//! toast, modal...).

use crate::history::HistoryEntry;
use crate::session::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A user-visible message. `filename` is set on successful downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
    pub detail: Option<String>,
    pub filename: Option<String>,
}

impl Notification {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            detail: None,
            filename: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Progress indicator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// No progress shown.
    Hidden,
    /// Size known: percent in 0..=100.
    Percent { percent: u8, label: String },
    /// Size unknown: bytes received so far.
    Bytes { loaded: u64, label: String },
}

impl Progress {
    pub fn percent(percent: u8, label: impl Into<String>) -> Self {
        Progress::Percent {
            percent: percent.min(100),
            label: label.into(),
        }
    }
}

pub trait UiEvents: Send + Sync {
    /// `true` while a download runs (trigger disabled), `false` once idle again.
    fn set_busy(&self, busy: bool);
    fn update_progress(&self, progress: Progress);
    fn notify(&self, notification: Notification);
    fn show_login_prompt(&self);
    fn hide_login_prompt(&self);
    fn logged_in(&self, user: &UserProfile);
    fn logged_out(&self);
    fn render_history(&self, entries: &[HistoryEntry]);
    /// Yes/no gate; `false` cancels the guarded action.
    fn confirm(&self, question: &str) -> bool;
}
