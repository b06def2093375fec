//! Shared error type across tailgate crates.

use thiserror::Error;

/// Locale attached to every human-readable error detail.
pub const DETAIL_LOCALE: &str = "en-US";

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientCode {
    /// No verified identity on the connection.
    Unauthenticated,
    /// Peer metadata could not be retrieved at all.
    Unknown,
    /// Denied by policy.
    PermissionDenied,
    /// Lookup of a missing key.
    NotFound,
    /// One-shot read past the end of the log.
    OutOfRange,
    /// Create with an id that is already taken.
    FailedPrecondition,
    /// Malformed request.
    InvalidArgument,
    /// Server is draining; retry elsewhere or later.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::Unknown => "UNKNOWN",
            ClientCode::PermissionDenied => "PERMISSION_DENIED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::OutOfRange => "OUT_OF_RANGE",
            ClientCode::FailedPrecondition => "FAILED_PRECONDITION",
            ClientCode::InvalidArgument => "INVALID_ARGUMENT",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TailgateError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum TailgateError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("unknown: {0}")]
    Unknown(String),
    #[error("{subject} not permitted to {action} to {object}")]
    PermissionDenied {
        subject: String,
        action: String,
        object: String,
    },
    #[error("{id} not found")]
    NotFound { id: String },
    #[error("offset out of range: {offset}")]
    OffsetOutOfRange { offset: u64, len: u64 },
    #[error("{id} already exists")]
    AlreadyExists { id: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TailgateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TailgateError::Unauthenticated(_) => ClientCode::Unauthenticated,
            TailgateError::Unknown(_) => ClientCode::Unknown,
            TailgateError::PermissionDenied { .. } => ClientCode::PermissionDenied,
            TailgateError::NotFound { .. } => ClientCode::NotFound,
            TailgateError::OffsetOutOfRange { .. } => ClientCode::OutOfRange,
            TailgateError::AlreadyExists { .. } => ClientCode::FailedPrecondition,
            TailgateError::InvalidArgument(_) => ClientCode::InvalidArgument,
            TailgateError::BadConfig(_) | TailgateError::UnsupportedVersion => {
                ClientCode::FailedPrecondition
            }
            TailgateError::Unavailable(_) => ClientCode::Unavailable,
            TailgateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Human-readable detail shipped next to the code (locale [`DETAIL_LOCALE`]).
    pub fn localized_message(&self) -> String {
        match self {
            TailgateError::NotFound { id } => {
                format!("The requested profile does not exist: {id}")
            }
            TailgateError::AlreadyExists { id } => {
                format!("A profile with this id already exists: {id}")
            }
            TailgateError::OffsetOutOfRange { offset, len } => {
                format!(
                    "The requested offset {offset} is beyond the end of the log ({len} records)"
                )
            }
            TailgateError::PermissionDenied { subject, action, object } => {
                format!("{subject} is not permitted to {action} to {object}")
            }
            TailgateError::Unauthenticated(_) => {
                "A verified client certificate is required".to_string()
            }
            other => other.to_string(),
        }
    }
}
