use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::url_model::DEFAULT_FILENAME;

/// Login endpoint used when the config file does not name one.
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:3000/v1/auth/login";

/// Global configuration loaded from `~/.config/authdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthdlConfig {
    /// Login endpoint (POST, JSON body `{email, password}`).
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Where downloads are saved. None = current directory of the CLI.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Filename used when the response carries no usable Content-Disposition.
    #[serde(default = "default_filename")]
    pub default_filename: String,
    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Drop the stored session when a download answers 401.
    #[serde(default = "default_true")]
    pub clear_session_on_401: bool,
    /// Replace an existing file instead of saving as `name (1).ext`.
    #[serde(default)]
    pub overwrite: bool,
    /// Upper bound on error/login bodies kept in memory.
    #[serde(default = "default_max_error_body_bytes")]
    pub max_error_body_bytes: usize,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_error_body_bytes() -> usize {
    64 * 1024
}

impl Default for AuthdlConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            download_dir: None,
            default_filename: default_filename(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            clear_session_on_401: true,
            overwrite: false,
            max_error_body_bytes: default_max_error_body_bytes(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("authdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AuthdlConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<AuthdlConfig> {
    if !path.exists() {
        let default_cfg = AuthdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AuthdlConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
