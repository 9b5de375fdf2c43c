use std::time::Duration;

/// Backend used when `--api-url` is not given
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Fixed account standing in for authentication
pub const DEFAULT_USER_ID: &str = "cdbcbf1c-d8b2-4d1d-82be-43dc7498354e";

/// How long the "saved" indicator stays visible
pub const SAVE_SUCCESS_TTL: Duration = Duration::from_secs(3);

pub const GENERIC_UPLOAD_ERROR: &str = "Failed to process the report.";
