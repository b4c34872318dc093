use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Source string is not a well-formed URL (scheme + host)
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    /// Network request failed or the server answered with a non-success status
    #[error("Fetch error: {0}")]
    Fetch(String),
    /// Payload is not well-formed XML
    #[error("Malformed XML: {0}")]
    MalformedXml(String),
    /// Collection requested from a document of the other kind
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    /// Returns `true` when repeating the fetch might succeed.
    ///
    /// Transport failures, timeouts and 5xx responses are retryable. 4xx responses
    /// and every non-fetch error are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Fetch(msg) => match extract_status_code(msg) {
                Some(status_code) => status_code >= 500,
                None => !msg.contains("client error"),
            },
            _ => false,
        }
    }
}

/// Extracts the HTTP status code from a fetch error message.
///
/// Looks for the pattern "HTTP {status_code}:" produced by the HTTP fetcher.
pub(crate) fn extract_status_code(msg: &str) -> Option<u16> {
    let prefix = "HTTP ";
    let start = msg.find(prefix)? + prefix.len();
    let end = msg[start..].find(':').unwrap_or(msg[start..].len());
    msg[start..start + end].trim().parse().ok()
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Fetch(format!("HTTP {}: {err}", status.as_u16())),
            None => AppError::Fetch(err.to_string()),
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidSource(err.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::MalformedXml(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON serialization failed: {err}"))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::InvalidInput(format!("CSV serialization failed: {err}"))
    }
}

// Custom type alias for Results in this library
pub type AppResult<T> = Result<T, AppError>;
