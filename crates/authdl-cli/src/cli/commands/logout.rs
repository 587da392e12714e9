//! `authdl logout` – drop the stored session.

use anyhow::Result;
use authdl_core::config::AuthdlConfig;

use super::{blocking, open_app};
use crate::cli::terminal::TerminalUi;

pub async fn run_logout(cfg: AuthdlConfig, yes: bool) -> Result<()> {
    let app = open_app(cfg, TerminalUi::new().assume_yes(yes))?;
    blocking(move || {
        if app.current_user().is_none() {
            println!("Not logged in.");
        } else if !app.logout() {
            eprintln!("Logout cancelled.");
        }
    })
    .await
}
