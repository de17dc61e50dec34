use thiserror::Error;

/// Errors that can occur while talking to the console backend.
#[derive(Error, Debug)]
pub enum CommonRequestError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status returned by the backend
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not what the endpoint promises
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// UTF-8 conversion error while reading a streamed body
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Turn a non-2xx response into a [`CommonRequestError::Api`].
///
/// The backend reports failures either as `{"detail": "..."}` or as
/// `{"error": {"message": "..."}}` depending on which router produced them;
/// anything else falls back to the raw body.
pub fn parse_error_response(status: reqwest::StatusCode, body: &bytes::Bytes) -> CommonRequestError {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|json| extract_error_message(&json))
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    CommonRequestError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pull a human-readable message out of the backend's known error shapes.
fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(detail) = json.get("detail").and_then(|v| v.as_str()) {
        return Some(detail.to_string());
    }

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    json.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detail_shape() {
        let body = bytes::Bytes::from_static(br#"{"detail": "agent not found"}"#);
        let err = parse_error_response(reqwest::StatusCode::NOT_FOUND, &body);
        match err {
            CommonRequestError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "agent not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_error_shape() {
        let body = bytes::Bytes::from_static(br#"{"error": {"message": "invalid model"}}"#);
        let err = parse_error_response(reqwest::StatusCode::BAD_REQUEST, &body);
        match err {
            CommonRequestError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid model");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_raw_body() {
        let body = bytes::Bytes::from_static(b"upstream timeout");
        let err = parse_error_response(reqwest::StatusCode::BAD_GATEWAY, &body);
        match err {
            CommonRequestError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream timeout");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
