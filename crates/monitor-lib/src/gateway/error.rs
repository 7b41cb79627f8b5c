//! Gateway error taxonomy

use reqwest::StatusCode;

/// Coarse error class, used for metric labels and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Status,
    Parse,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Status => "status",
            ErrorKind::Parse => "parse",
            ErrorKind::Validation => "validation",
        }
    }
}

/// Client-side rejection of an inspection image
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Please select a valid image file (got content type `{0}`)")]
    NotAnImage(String),

    #[error("Image file size must be at most 10MB (got {size} bytes)")]
    TooLarge { size: usize },

    #[error("Image file is empty")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid backend URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to reach backend for {resource}: {source}")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {resource}: HTTP {status}")]
    Status {
        resource: &'static str,
        status: StatusCode,
    },

    #[error("failed to parse {resource} response: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] UploadError),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::InvalidUrl { .. }
            | GatewayError::Client(_)
            | GatewayError::Transport { .. } => ErrorKind::Transport,
            GatewayError::Status { .. } => ErrorKind::Status,
            GatewayError::Parse { .. } => ErrorKind::Parse,
            GatewayError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Resource the failed request was for, when there was one
    pub fn resource(&self) -> Option<&'static str> {
        match self {
            GatewayError::Transport { resource, .. }
            | GatewayError::Status { resource, .. }
            | GatewayError::Parse { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
