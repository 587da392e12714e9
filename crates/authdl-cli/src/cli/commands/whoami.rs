//! `authdl whoami` – show the logged-in user.

use anyhow::Result;
use authdl_core::config::AuthdlConfig;

use super::{blocking, open_app};
use crate::cli::terminal::TerminalUi;

pub async fn run_whoami(cfg: AuthdlConfig) -> Result<()> {
    let app = open_app(cfg, TerminalUi::new())?;
    match blocking(move || app.current_user()).await? {
        Some(user) if !user.email.is_empty() => {
            println!("{} <{}>", user.display_name(), user.email)
        }
        Some(user) => println!("{}", user.display_name()),
        None => println!("Not logged in."),
    }
    Ok(())
}
