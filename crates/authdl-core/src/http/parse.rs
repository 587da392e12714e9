//! Parse raw response header lines into a status code and header list.

use crate::error::TransportError;

use super::Headers;

/// Parse collected header lines (as delivered by libcurl) into status + headers.
///
/// When redirects were followed the lines contain one block per hop; only the
/// block after the last status line is kept.
pub fn parse_head(lines: &[String]) -> Result<(u32, Headers), TransportError> {
    let start = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with("HTTP/"))
        .ok_or_else(|| TransportError::Malformed("missing status line".to_string()))?;

    let status = parse_status_line(&lines[start])?;

    let mut headers = Headers::new();
    for line in &lines[start + 1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim(), value.trim());
        }
    }

    Ok((status, headers))
}

/// `HTTP/1.1 200 OK` or `HTTP/2 404` -> status code.
fn parse_status_line(line: &str) -> Result<u32, TransportError> {
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u32>().ok())
        .filter(|code| (100..1000).contains(code))
        .ok_or_else(|| TransportError::Malformed(format!("bad status line: {}", line.trim())))
}
