use thiserror::Error;

/// Result type for client construction and delivery.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors surfaced to the caller of the delivery client.
///
/// Remote-side failures never show up here; they are absorbed by falling back
/// to local delivery and only reported through the diagnostics sink.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeliveryError {
    /// Invalid client or request options.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Local delivery was asked for a window that starts before the retrieved
    /// insertions.
    #[error(
        "paging offset {offset} must be >= retrieval insertion offset {retrieval_insertion_offset}"
    )]
    FallbackPaging {
        offset: i32,
        retrieval_insertion_offset: i32,
    },
}

impl DeliveryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Outcome of a failed remote call.
///
/// The client treats every variant the same way; the detail only ends up in
/// log messages.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("unsuccessful status {status}")]
    Status { status: u16 },

    #[error("request failed: {message}")]
    Request { message: String },

    #[error("could not decode payload: {message}")]
    Decode { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
            },
            None => Self::Request {
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

/// Errors loading client configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
