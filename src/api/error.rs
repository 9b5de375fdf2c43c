use std::fmt;

use reqwest::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Unprocessable,
    Server,
    Other(u16),
}

impl From<StatusCode> for ErrorCode {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ErrorCode::BadRequest,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorCode::Unauthorized,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::Unprocessable,
            s if s.is_server_error() => ErrorCode::Server,
            s => ErrorCode::Other(s.as_u16()),
        }
    }
}

/// Non-2xx answer from the backend. `message` carries the `detail` field of
/// the error body when the backend sent one.
pub struct ApiError {
    code: ErrorCode,
    message: Option<String>,
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code: {:?}, Message: {:?}", self.code, self.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, message: Option<String>) -> Self {
        ApiError {
            code: status.into(),
            message,
        }
    }

    /// Builds the error from a raw response body. FastAPI puts a string in
    /// `detail` for raised errors and a list of objects for validation
    /// failures; the latter is kept as its JSON text.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("detail") {
                Some(serde_json::Value::String(detail)) => Some(detail.clone()),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            });

        ApiError::new(status, message)
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_is_kept_verbatim() {
        let err = ApiError::from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Bucket not found"}"#,
        );

        assert_eq!(err.code(), &ErrorCode::Server);
        assert_eq!(err.message(), Some("Bucket not found"));
    }

    #[test]
    fn test_validation_detail_is_serialized() {
        let err = ApiError::from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "file"], "msg": "field required"}]}"#,
        );

        assert_eq!(err.code(), &ErrorCode::Unprocessable);
        assert!(err.message().unwrap().contains("field required"));
    }

    #[test]
    fn test_non_json_body_has_no_message() {
        let err = ApiError::from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");

        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "Server");
    }
}
