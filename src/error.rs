use crate::transport::UpstreamResponse;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Invalid base URL for {role}: {url}")]
    InvalidBaseUrl { role: String, url: String },

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),

    #[error("Invalid maximum body size: {0}")]
    InvalidBodySize(String),

    #[error("Editor and publisher must not share base URL and credential")]
    ConflatedRoles,

    #[error("Failed to read configuration file: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("Invalid hostname {0}")]
    InvalidIdentifier(String),

    #[error("Request body of {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Upstream validation failed: {}", .0.summary())]
    UpstreamValidation(UpstreamResponse),

    #[error("Upstream error: {}", .0.summary())]
    Upstream(UpstreamResponse),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("JSON error: {0}")]
    Decode(String),

    #[error("RRset {name} does not belong to zone {zone}")]
    ForeignRrset { name: String, zone: String },
}

impl SyncError {
    /// Status the API layer should answer with when this error reaches it
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) | Self::UpstreamValidation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_)
            | Self::Connection(_)
            | Self::Decode(_)
            | Self::ForeignRrset { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the end user can fix the request and try again
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::PayloadTooLarge { .. } | Self::UpstreamValidation(_)
        )
    }

    /// Raw upstream response, for the two kinds that carry one
    pub fn response(&self) -> Option<&UpstreamResponse> {
        match self {
            Self::UpstreamValidation(r) | Self::Upstream(r) => Some(r),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
