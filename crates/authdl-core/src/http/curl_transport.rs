//! libcurl-backed [`Transport`].
//!
//! The transfer runs on its own thread. Header lines are buffered until the
//! first body byte (or the end of the transfer) arrives, then the head and each
//! body chunk are pushed through a bounded channel. Dropping the response body
//! closes the channel, which makes the write callback abort the transfer.

use std::cell::{Cell, RefCell};
use std::str;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::Duration;

use curl::easy::{Easy, List};

use super::{parse, HttpRequest, HttpResponse, Method, Transport};
use crate::config::AuthdlConfig;
use crate::error::TransportError;

/// Chunks buffered between the transfer thread and the reader.
const CHANNEL_DEPTH: usize = 16;

enum Event {
    Head(Vec<String>),
    Chunk(Vec<u8>),
    Failed(curl::Error),
}

/// Transport that performs requests with libcurl's easy interface.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
        }
    }

    pub fn from_config(cfg: &AuthdlConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    fn prepare(&self, request: &HttpRequest) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(&request.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        match (request.method, &request.body) {
            (Method::Get, _) => easy.get(true)?,
            (Method::Post, Some(body)) => {
                easy.post(true)?;
                easy.post_fields_copy(body)?;
            }
            // A bodiless POST goes out as a custom verb: `post(true)` would add a
            // form Content-Type and an empty body.
            (other, body) => {
                easy.custom_request(other.as_str())?;
                if let Some(body) = body {
                    easy.post_fields_copy(body)?;
                }
            }
        }

        if !request.headers.is_empty() {
            let mut list = List::new();
            for (name, value) in request.headers.iter() {
                list.append(&format!("{}: {}", name.trim(), value.trim()))?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from_config(&AuthdlConfig::default())
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let easy = self.prepare(&request)?;
        let (tx, rx) = mpsc::sync_channel::<Event>(CHANNEL_DEPTH);

        thread::Builder::new()
            .name("authdl-transfer".to_string())
            .spawn(move || perform(easy, tx))
            .map_err(TransportError::Spawn)?;

        match rx.recv() {
            Ok(Event::Head(lines)) => {
                let (status, headers) = parse::parse_head(&lines)?;
                tracing::debug!(status, url = %request.url, "response head received");
                Ok(HttpResponse {
                    status,
                    headers,
                    body: Box::new(ChunkReceiver { rx, done: false }),
                })
            }
            Ok(Event::Failed(e)) => Err(TransportError::Curl(e)),
            Ok(Event::Chunk(_)) | Err(_) => Err(TransportError::NoResponse),
        }
    }
}

/// Runs on the transfer thread until libcurl is done or the reader goes away.
fn perform(mut easy: Easy, tx: SyncSender<Event>) {
    let lines = RefCell::new(Vec::new());
    let head_sent = Cell::new(false);

    match run_transfer(&mut easy, &tx, &lines, &head_sent) {
        // Empty bodies never hit the write callback.
        Ok(()) => {
            flush_head(&tx, &lines, &head_sent);
        }
        Err(e) => {
            if tx.send(Event::Failed(e)).is_err() {
                tracing::debug!("transfer abandoned by reader");
            }
        }
    }
}

fn run_transfer(
    easy: &mut Easy,
    tx: &SyncSender<Event>,
    lines: &RefCell<Vec<String>>,
    head_sent: &Cell<bool>,
) -> Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        if let Ok(line) = str::from_utf8(data) {
            let line = line.trim_end();
            let mut buf = lines.borrow_mut();
            // A new status line starts a new block (redirect, 100-continue).
            if line.starts_with("HTTP/") {
                buf.clear();
            }
            if !line.is_empty() {
                buf.push(line.to_string());
            }
        }
        true
    })?;
    transfer.write_function(|data| {
        if !flush_head(tx, lines, head_sent) {
            return Ok(0);
        }
        match tx.send(Event::Chunk(data.to_vec())) {
            Ok(()) => Ok(data.len()),
            // Reader dropped the body; returning short aborts the transfer.
            Err(_) => Ok(0),
        }
    })?;
    transfer.perform()
}

/// Sends the buffered head once. Returns false when the reader is gone.
fn flush_head(tx: &SyncSender<Event>, lines: &RefCell<Vec<String>>, head_sent: &Cell<bool>) -> bool {
    if head_sent.get() {
        return true;
    }
    head_sent.set(true);
    tx.send(Event::Head(lines.take())).is_ok()
}

struct ChunkReceiver {
    rx: Receiver<Event>,
    done: bool,
}

impl Iterator for ChunkReceiver {
    type Item = Result<Vec<u8>, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.rx.recv() {
                Ok(Event::Chunk(chunk)) => return Some(Ok(chunk)),
                Ok(Event::Failed(e)) => {
                    self.done = true;
                    return Some(Err(TransportError::Curl(e)));
                }
                Ok(Event::Head(_)) => continue,
                Err(_) => self.done = true,
            }
        }
        None
    }
}
