//! User-facing message for a non-2xx download response.

use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Non-blank `message` field of a JSON body, if there is one.
pub fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// The server's `message`, else `HTTP error! Status: <code>`.
pub fn message_for(status: u32, body: &[u8]) -> String {
    server_message(body).unwrap_or_else(|| format!("HTTP error! Status: {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_server_message() {
        assert_eq!(
            message_for(500, br#"{"message":"server error"}"#),
            "server error"
        );
    }

    #[test]
    fn falls_back_to_status() {
        assert_eq!(message_for(404, b"<html>nope</html>"), "HTTP error! Status: 404");
        assert_eq!(message_for(502, b""), "HTTP error! Status: 502");
        assert_eq!(message_for(400, br#"{"error":"x"}"#), "HTTP error! Status: 400");
        assert_eq!(message_for(400, br#"{"message":"  "}"#), "HTTP error! Status: 400");
    }
}
