//! URL validation and output filename resolution.

mod content_disposition;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use sanitize::sanitize_filename;

use crate::error::DownloadError;

/// Filename used when the response names none.
pub const DEFAULT_FILENAME: &str = "downloaded.xlsx";

/// Checks that `raw` is an absolute http(s) URL before any request is built.
pub fn parse_download_url(raw: &str) -> Result<url::Url, DownloadError> {
    let invalid = |reason: String| DownloadError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

/// Picks the name a finished download is saved under.
///
/// Uses the Content-Disposition filename when present and still non-empty after
/// sanitizing; otherwise `fallback`.
///
/// # Examples
///
/// - `resolve_filename(Some("attachment; filename=\"report.xlsx\""), "downloaded.xlsx")` → `"report.xlsx"`
/// - `resolve_filename(None, "downloaded.xlsx")` → `"downloaded.xlsx"`
pub fn resolve_filename(content_disposition: Option<&str>, fallback: &str) -> String {
    content_disposition
        .and_then(parse_content_disposition_filename)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_from_content_disposition() {
        assert_eq!(
            resolve_filename(Some("attachment; filename=\"report.xlsx\""), DEFAULT_FILENAME),
            "report.xlsx"
        );
    }

    #[test]
    fn resolve_without_header_uses_default() {
        assert_eq!(resolve_filename(None, DEFAULT_FILENAME), "downloaded.xlsx");
    }

    #[test]
    fn resolve_unparsable_header_uses_default() {
        assert_eq!(resolve_filename(Some("attachment"), DEFAULT_FILENAME), "downloaded.xlsx");
        assert_eq!(
            resolve_filename(Some("attachment; filename=\"..\""), DEFAULT_FILENAME),
            "downloaded.xlsx"
        );
    }

    #[test]
    fn resolve_never_escapes_directory() {
        assert_eq!(
            resolve_filename(Some("attachment; filename=\"../../.bashrc\""), "x.bin"),
            "bashrc"
        );
    }

    #[test]
    fn parse_url_accepts_http_and_https() {
        assert!(parse_download_url("https://api.example.com/x").is_ok());
        assert!(parse_download_url("http://localhost:3000/v1/export?id=3").is_ok());
    }

    #[test]
    fn parse_url_rejects_other_input() {
        assert!(matches!(
            parse_download_url("ftp://example.com/file"),
            Err(DownloadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_download_url("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }
}
