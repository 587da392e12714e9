//! `authdl login` – log in and store the session.

use anyhow::{Context, Result};
use authdl_core::config::AuthdlConfig;

use super::{blocking, open_app};
use crate::cli::prompt;
use crate::cli::terminal::TerminalUi;

pub async fn run_login(cfg: AuthdlConfig, email: Option<String>, password_stdin: bool) -> Result<()> {
    let creds = blocking(move || prompt::credentials(email, password_stdin)).await??;
    let app = open_app(cfg, TerminalUi::new())?;
    blocking(move || app.login(&creds.email, &creds.password))
        .await?
        .context("login failed")?;
    Ok(())
}
