pub mod app;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod error;
pub mod history;
pub mod http;
pub mod logging;
pub mod progress;
pub mod session;
pub mod storage;
pub mod store;
pub mod ui;
pub mod url_model;

pub use app::{App, AppParts, PendingRequest};
pub use downloader::{DownloadOutcome, SavedFile};
pub use http::Method;
