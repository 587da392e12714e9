//! Error types shared by the transport, the downloader and the login flow.
//!
//! Storage, config and CLI plumbing use `anyhow` with context; the kinds a
//! caller has to branch on live here.

/// Failure inside the HTTP transport (before or while streaming a response).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error (DNS, connect, timeout, aborted read...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server sent something that does not parse as an HTTP response head.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The worker thread that drives the transfer could not be started.
    #[error("could not start transfer thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The transfer ended without producing a response head or an error.
    #[error("transfer ended before a response arrived")]
    NoResponse,
}

/// Why a single download attempt did not produce a saved file.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered 401; the caller has to log in and replay.
    #[error("authentication required")]
    AuthRequired,
    /// Non-2xx answer other than 401. `message` is what the user sees.
    #[error("{message}")]
    RequestFailed { status: u32, message: String },
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(#[source] TransportError),
    /// The response started but the body could not be read to the end.
    #[error("error while reading response: {0}")]
    Stream(#[source] TransportError),
    /// The payload arrived but could not be written to disk.
    #[error("could not save file: {0}")]
    SaveFailed(String),
    /// The URL is not an absolute http(s) URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Another download is still running in this context.
    #[error("a download is already in progress")]
    Busy,
}

/// Why a login attempt did not produce a session.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("email and password are required")]
    MissingCredentials,
    /// The endpoint refused the credentials; carries the server's message.
    #[error("{0}")]
    Rejected(String),
    /// 2xx answer without a usable token.
    #[error("login response did not contain a token")]
    Malformed,
    #[error("could not encode login request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    #[error("could not store session: {0}")]
    Storage(String),
}

/// Returned when parsing a method name the downloader does not support.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);
