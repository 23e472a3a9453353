// src/error.rs

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{source_name} returned error status: {status}")]
    Status {
        source_name: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Source not configured: {0}")]
    NotConfigured(&'static str),

    /// The upstream service answered but could not complete the request.
    #[error("{source_name}: {message}")]
    Upstream {
        source_name: &'static str,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SourceError {
    /// Short classifier used in log fields and aggregation reports.
    pub fn code_str(&self) -> &'static str {
        match self {
            SourceError::HttpRequest(e) if e.is_timeout() => "timeout",
            SourceError::HttpRequest(_) => "upstream_error",
            SourceError::Status { .. } => "upstream_status",
            SourceError::SerdeJson(_) | SourceError::MalformedPayload(_) => "parse_error",
            SourceError::NotConfigured(_) => "not_configured",
            SourceError::Upstream { .. } => "upstream_error",
            SourceError::InvalidInput(_) => "invalid_input",
            SourceError::Other(_) => "internal_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("persist error: {0}")]
    Persist(String),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
