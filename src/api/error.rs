/// Status used for failures that never reached the backend.
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// A failed HTTP exchange: backend status plus a user-presentable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build from a non-2xx response body. Prefers the backend's `error`
    /// field, then `message`, then a generic fallback.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|payload| {
                ["error", "message"].iter().find_map(|key| {
                    payload
                        .get(*key)
                        .and_then(|v| v.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| format!("Request failed with status {status}"));

        Self { status, message }
    }

    pub fn network(err: &reqwest::Error) -> Self {
        Self::new(NETWORK_ERROR_STATUS, format!("Network error: {err}"))
    }

    pub fn is_network(&self) -> bool {
        self.status == NETWORK_ERROR_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_error_field() {
        let err = HttpError::from_response(
            401,
            r#"{"error":"Invalid credentials","message":"ignored"}"#,
        );
        assert_eq!(err, HttpError::new(401, "Invalid credentials"));
    }

    #[test]
    fn falls_back_to_message_field() {
        let err = HttpError::from_response(404, r#"{"message":"Book not found"}"#);
        assert_eq!(err.message, "Book not found");
    }

    #[test]
    fn generic_fallback_when_payload_has_no_message() {
        for body in ["", "<html>oops</html>", "{}", r#"{"error":""}"#, r#"{"error":42}"#] {
            let err = HttpError::from_response(500, body);
            assert_eq!(err.message, "Request failed with status 500", "body: {body}");
            assert!(!err.is_network());
        }
    }
}
