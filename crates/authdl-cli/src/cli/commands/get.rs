//! `authdl get <url>` – download, logging in when the server asks for it.

use anyhow::{bail, Context, Result};
use authdl_core::auth::LoginOutcome;
use authdl_core::config::AuthdlConfig;
use authdl_core::http::Method;
use authdl_core::DownloadOutcome;

use super::{blocking, open_app};
use crate::cli::prompt;
use crate::cli::terminal::TerminalUi;

pub async fn run_get(cfg: AuthdlConfig, url: &str, method: Method) -> Result<()> {
    let app = open_app(cfg, TerminalUi::new())?;

    let mut outcome = blocking({
        let app = app.clone();
        let url = url.to_string();
        move || app.download(&url, method)
    })
    .await?;

    loop {
        outcome = match outcome {
            DownloadOutcome::Saved(file) => {
                println!("{}", file.path.display());
                return Ok(());
            }
            DownloadOutcome::Busy => bail!("a download is already in progress"),
            DownloadOutcome::AuthRequired => {
                if !prompt::is_interactive() {
                    bail!("authentication required: run `authdl login` first");
                }
                let creds = blocking(|| prompt::credentials(None, false)).await??;
                let app = app.clone();
                let login = blocking(move || app.login(&creds.email, &creds.password))
                    .await?
                    .context("login failed")?;
                after_login(login)?
            }
            DownloadOutcome::Failed { message } => {
                let again = blocking(|| prompt::confirm("Try again?")).await?;
                if !again {
                    bail!("download failed: {}", message);
                }
                let app = app.clone();
                blocking(move || app.retry())
                    .await?
                    .context("no recent download to retry")?
            }
        };
    }
}

/// The outcome to continue with once a login has replayed the download.
///
/// A fresh session that is still refused ends the command instead of prompting
/// again.
pub(crate) fn after_login(login: LoginOutcome) -> Result<DownloadOutcome> {
    match login.replayed {
        Some(DownloadOutcome::AuthRequired) => bail!("authentication failed after login"),
        Some(replayed) => Ok(replayed),
        None => bail!("logged in, but the download was not retried"),
    }
}
