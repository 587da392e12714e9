//! `authdl history` – list or clear recent downloads.

use anyhow::Result;
use authdl_core::config::AuthdlConfig;

use super::{blocking, open_app};
use crate::cli::terminal::TerminalUi;

pub async fn run_history(cfg: AuthdlConfig, clear: bool) -> Result<()> {
    let app = open_app(cfg, TerminalUi::new())?;
    if clear {
        blocking(move || app.clear_history()).await??;
        println!("History cleared.");
        return Ok(());
    }

    let entries = blocking(move || app.history_entries()).await??;
    if entries.is_empty() {
        println!("No recent downloads.");
    } else {
        println!("{:<3} {:<7} {}", "#", "METHOD", "URL");
        for (i, e) in entries.iter().enumerate() {
            println!("{:<3} {:<7} {}", i + 1, e.method.as_str(), e.url);
        }
    }
    Ok(())
}
