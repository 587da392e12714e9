//! Minimal HTTP/1.1 API server for end-to-end tests over real sockets.
//!
//! Routes:
//! - `POST /v1/auth/login`: JSON `{email, password}`; 200 with a token for the
//!   known account, 401 `{"message": "Invalid credentials"}` otherwise.
//! - `GET /files/report`: needs `Authorization: Bearer <token>`; serves the body
//!   as `report.xlsx`. 401 without a valid token.
//! - `/files/plain` (any method): public, no Content-Disposition.
//! - `GET /broken`: 500 `{"message": "server error"}`.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter2";
pub const TOKEN: &str = "tok-e2e";

/// One received request.
#[derive(Debug, Clone)]
pub struct Hit {
    /// `"<METHOD> <path>"`.
    pub line: String,
    pub headers: Vec<(String, String)>,
}

impl Hit {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct ApiServer {
    pub base: String,
    /// Every request, in arrival order.
    pub received: Arc<Mutex<Vec<Hit>>>,
}

impl ApiServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// `"<METHOD> <path>"` of every request.
    pub fn hits(&self) -> Vec<String> {
        self.received().into_iter().map(|h| h.line).collect()
    }

    pub fn received(&self) -> Vec<Hit> {
        self.received.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `file` on the file routes.
/// The server runs until the process exits.
pub fn start(file: Vec<u8>) -> ApiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let file = Arc::new(file);
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_srv = Arc::clone(&received);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let file = Arc::clone(&file);
            let received = Arc::clone(&received_srv);
            thread::spawn(move || handle(stream, &file, &received));
        }
    });
    ApiServer {
        base: format!("http://127.0.0.1:{}", port),
        received,
    }
}

struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn handle(mut stream: TcpStream, file: &[u8], received: &Mutex<Vec<Hit>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    received.lock().unwrap().push(Hit {
        line: format!("{} {}", req.method, req.path),
        headers: req.headers.clone(),
    });

    let expected = format!("Bearer {}", TOKEN);
    let authorized = req.header("authorization") == Some(expected.as_str());
    match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/v1/auth/login") => {
            let creds: serde_json::Value =
                serde_json::from_slice(&req.body).unwrap_or(serde_json::Value::Null);
            if creds["email"] == EMAIL && creds["password"] == PASSWORD {
                let body = serde_json::json!({
                    "data": {"token": TOKEN, "user": {"name": "Ada", "email": EMAIL}}
                });
                respond(&mut stream, "200 OK", &[], body.to_string().as_bytes());
            } else {
                respond(
                    &mut stream,
                    "401 Unauthorized",
                    &[],
                    br#"{"message":"Invalid credentials"}"#,
                );
            }
        }
        ("GET", "/files/report") if authorized => respond(
            &mut stream,
            "200 OK",
            &[
                ("Content-Disposition", "attachment; filename=\"report.xlsx\""),
                ("Content-Description", "Quarterly report"),
            ],
            file,
        ),
        ("GET", "/files/report") => respond(
            &mut stream,
            "401 Unauthorized",
            &[],
            br#"{"message":"Unauthorized"}"#,
        ),
        (_, "/files/plain") => respond(&mut stream, "200 OK", &[], file),
        ("GET", "/broken") => respond(
            &mut stream,
            "500 Internal Server Error",
            &[],
            br#"{"message":"server error"}"#,
        ),
        _ => respond(&mut stream, "404 Not Found", &[], b""),
    }
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, &str)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (k, v) in headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Reads one request: head up to the blank line, then `Content-Length` bytes of body.
fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..head_end]).ok()?;
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
