//! CLI command handlers. Each command is in its own file.

mod completions;
pub(crate) mod get;
mod history;
mod login;
mod logout;
mod whoami;

pub use completions::{run_completions, run_man};
pub use get::run_get;
pub use history::run_history;
pub use login::run_login;
pub use logout::run_logout;
pub use whoami::run_whoami;

use anyhow::{Context, Result};
use authdl_core::config::AuthdlConfig;
use authdl_core::App;
use std::sync::Arc;

use super::terminal::TerminalUi;

/// Builds the application context with a terminal UI.
fn open_app(cfg: AuthdlConfig, ui: TerminalUi) -> Result<Arc<App>> {
    Ok(Arc::new(App::from_config(cfg, Arc::new(ui))?))
}

/// Runs blocking core work (curl, file IO, stdin) on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.context("worker task join")
}
