//! [`UiEvents`] for a terminal: indicatif progress on stderr, messages on stderr.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use authdl_core::history::HistoryEntry;
use authdl_core::session::UserProfile;
use authdl_core::ui::{NoticeKind, Notification, Progress, UiEvents};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarKind {
    Percent,
    Bytes,
}

pub struct TerminalUi {
    bar: Mutex<Option<(ProgressBar, BarKind)>>,
    assume_yes: bool,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            assume_yes: false,
        }
    }

    /// Answer every confirmation with yes.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Option<(ProgressBar, BarKind)>> {
        self.bar.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bar_for(&self, kind: BarKind) -> ProgressBar {
        let mut slot = self.lock();
        if let Some((bar, current)) = slot.as_ref() {
            if *current == kind {
                return bar.clone();
            }
            bar.finish_and_clear();
        }
        let bar = make_bar(kind);
        *slot = Some((bar.clone(), kind));
        bar
    }

    fn clear_bar(&self) {
        if let Some((bar, _)) = self.lock().take() {
            bar.finish_and_clear();
        }
    }

    /// Prints above the bar when one is drawn.
    fn println(&self, line: &str) {
        match self.lock().as_ref() {
            Some((bar, _)) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

fn make_bar(kind: BarKind) -> ProgressBar {
    let (bar, template) = match kind {
        BarKind::Percent => (
            ProgressBar::new(100),
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}",
        ),
        BarKind::Bytes => (
            ProgressBar::new_spinner(),
            "{spinner:.cyan} {bytes} {wide_msg}",
        ),
    };
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╌");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// One line per notification: `[kind] message (filename): detail`.
pub(crate) fn render_notice(n: &Notification) -> String {
    let tag = match n.kind {
        NoticeKind::Info => "info",
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
    };
    let mut line = format!("[{}] {}", tag, n.message);
    if let Some(filename) = &n.filename {
        line.push_str(&format!(" ({})", filename));
    }
    if let Some(detail) = &n.detail {
        line.push_str(&format!(": {}", detail));
    }
    line
}

impl UiEvents for TerminalUi {
    fn set_busy(&self, busy: bool) {
        if !busy {
            self.clear_bar();
        }
    }

    fn update_progress(&self, progress: Progress) {
        match progress {
            Progress::Hidden => self.clear_bar(),
            Progress::Percent { percent, label } => {
                let bar = self.bar_for(BarKind::Percent);
                bar.set_position(u64::from(percent));
                bar.set_message(label);
            }
            Progress::Bytes { loaded, label } => {
                let bar = self.bar_for(BarKind::Bytes);
                bar.set_position(loaded);
                bar.set_message(label);
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.println(&render_notice(&notification));
    }

    fn show_login_prompt(&self) {
        self.clear_bar();
        eprintln!("Authentication required.");
    }

    fn hide_login_prompt(&self) {}

    fn logged_in(&self, user: &UserProfile) {
        self.println(&format!("Logged in as {}", user.display_name()));
    }

    fn logged_out(&self) {
        tracing::debug!("terminal: logged out");
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        tracing::debug!(entries = entries.len(), "history updated");
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.clear_bar();
        super::prompt::confirm(question)
    }
}
