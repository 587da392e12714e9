//! CLI for authdl.

mod commands;
mod prompt;
mod terminal;

use anyhow::Result;
use authdl_core::config;
use authdl_core::http::Method;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{
    run_completions, run_get, run_history, run_login, run_logout, run_man, run_whoami,
};

/// Top-level CLI for authdl.
#[derive(Debug, Parser)]
#[command(name = "authdl")]
#[command(about = "authdl: authenticated file downloads with login and retry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file; logs in and retries when the server answers 401.
    Get {
        /// HTTP/HTTPS URL to download.
        url: String,
        /// HTTP method (GET, POST, PUT, PATCH, DELETE).
        #[arg(short = 'X', long, default_value = "GET", value_name = "METHOD")]
        method: Method,
        /// Save into this directory instead of the configured one.
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Replace an existing file instead of saving as `name (1).ext`.
        #[arg(long)]
        overwrite: bool,
    },

    /// Log in and store the session.
    Login {
        /// Account email (prompted when omitted).
        #[arg(long)]
        email: Option<String>,
        /// Read the password from the first line of stdin.
        #[arg(long)]
        password_stdin: bool,
    },

    /// Drop the stored session.
    Logout {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the logged-in user.
    Whoami,

    /// List recent downloads, most recent first.
    History {
        /// Forget all recent downloads.
        #[arg(long)]
        clear: bool,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff).
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => {
                run_completions(shell);
                return Ok(());
            }
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                method,
                output_dir,
                overwrite,
            } => {
                if output_dir.is_some() {
                    cfg.download_dir = output_dir;
                }
                cfg.overwrite |= overwrite;
                run_get(cfg, &url, method).await?;
            }
            CliCommand::Login {
                email,
                password_stdin,
            } => run_login(cfg, email, password_stdin).await?,
            CliCommand::Logout { yes } => run_logout(cfg, yes).await?,
            CliCommand::Whoami => run_whoami(cfg).await?,
            CliCommand::History { clear } => run_history(cfg, clear).await?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
