//! Line-based terminal prompts.

use anyhow::{bail, Context, Result};
use std::io::{self, IsTerminal, Write};

/// Environment variable consulted for the login password.
pub const PASSWORD_ENV: &str = "AUTHDL_PASSWORD";

/// Both ends of the conversation are a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Prints `prompt` to stderr and reads one line from stdin, without the line ending.
pub fn read_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush().ok();
    let mut line = String::new();
    let n = io::stdin().read_line(&mut line).context("read from stdin")?;
    if n == 0 {
        bail!("stdin closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// `question [y/N]`; anything but yes, or no terminal at all, is a no.
pub fn confirm(question: &str) -> bool {
    if !is_interactive() {
        return false;
    }
    read_line(&format!("{} [y/N]: ", question))
        .map(|answer| parse_yes(&answer))
        .unwrap_or(false)
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PasswordSource {
    Stdin,
    Env,
    Prompt,
}

/// `--password-stdin` wins over the environment, which wins over prompting.
pub(crate) fn password_source(
    password_stdin: bool,
    env_set: bool,
    interactive: bool,
) -> Option<PasswordSource> {
    if password_stdin {
        Some(PasswordSource::Stdin)
    } else if env_set {
        Some(PasswordSource::Env)
    } else if interactive {
        Some(PasswordSource::Prompt)
    } else {
        None
    }
}

/// Collects login credentials from flags, the environment and the terminal.
pub fn credentials(email: Option<String>, password_stdin: bool) -> Result<Credentials> {
    let interactive = is_interactive();
    let email = match email {
        Some(email) => email,
        None if interactive => read_line("Email: ")?,
        None => bail!("--email is required when not running in a terminal"),
    };

    let env_password = std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty());
    let password = match password_source(password_stdin, env_password.is_some(), interactive) {
        Some(PasswordSource::Stdin) => {
            let mut line = String::new();
            io::stdin()
                .read_line(&mut line)
                .context("read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
        Some(PasswordSource::Env) => env_password.unwrap_or_default(),
        Some(PasswordSource::Prompt) => {
            rpassword::prompt_password("Password: ").context("read password")?
        }
        None => bail!(
            "no password: set {} or pass --password-stdin",
            PASSWORD_ENV
        ),
    };

    Ok(Credentials { email, password })
}
