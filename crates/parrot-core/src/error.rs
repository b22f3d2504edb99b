//! Error types for parrot operations.
//!
//! Every fallible operation in the core returns [`ParrotResult`]. Errors carry an
//! [`ErrorCode`] so the bot layer can translate them into user-facing replies
//! without matching on message strings.

use thiserror::Error;

/// Result type alias for parrot operations.
pub type ParrotResult<T> = Result<T, ParrotError>;

/// Reasons a stored entry could not be turned back into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The entry did not split into four fields.
    #[error("malformed entry: expected 4 fields, found {fields}")]
    Malformed { fields: usize },

    /// The trigger field is empty.
    #[error("entry has an empty trigger")]
    EmptyTrigger,

    /// The media kind field names no known kind.
    #[error("unknown media kind '{0}'")]
    UnknownMediaKind(String),

    /// A media kind was stored without its media reference.
    #[error("media kind '{kind}' has no media reference")]
    MissingMediaRef { kind: String },

    /// The stored bytes are not valid UTF-8.
    #[error("entry is not valid UTF-8")]
    InvalidUtf8,
}

/// Main error type for all parrot operations.
#[derive(Error, Debug)]
pub enum ParrotError {
    /// A trigger with this text is already registered.
    #[error("Trigger already exists: {trigger}")]
    AlreadyExists { trigger: String },

    /// No trigger with this text is registered.
    #[error("Trigger not found: {trigger}")]
    NotFound { trigger: String },

    /// A record violates the data model invariants.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// A stored entry could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Trigger (TRG_xxx)
    TrgAlreadyExists,
    TrgNotFound,

    // Validation (VAL_xxx)
    ValEmptyTrigger,
    ValInvalidTrigger,
    ValMissingMediaRef,

    // Storage (STO_xxx)
    StoDecodeFailed,
    StoIoFailed,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Configuration (CFG_xxx)
    CfgInvalid,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TrgAlreadyExists => "TRG_001",
            ErrorCode::TrgNotFound => "TRG_002",
            ErrorCode::ValEmptyTrigger => "VAL_001",
            ErrorCode::ValInvalidTrigger => "VAL_002",
            ErrorCode::ValMissingMediaRef => "VAL_003",
            ErrorCode::StoDecodeFailed => "STO_001",
            ErrorCode::StoIoFailed => "STO_002",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl ParrotError {
    /// Create an already-exists error.
    pub fn already_exists(trigger: impl Into<String>) -> Self {
        Self::AlreadyExists {
            trigger: trigger.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(trigger: impl Into<String>) -> Self {
        Self::NotFound {
            trigger: trigger.into(),
        }
    }

    /// Create a validation error with a specific code.
    pub fn validation(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Validation {
            message: message.into(),
            code,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create an error for a poisoned lock.
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Internal(format!("{} lock poisoned", what))
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyExists { .. } => ErrorCode::TrgAlreadyExists,
            Self::NotFound { .. } => ErrorCode::TrgNotFound,
            Self::Validation { code, .. } => *code,
            Self::Decode(_) => ErrorCode::StoDecodeFailed,
            Self::Database { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Io(_) => ErrorCode::StoIoFailed,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether this error comes from the storage layer rather than from the
    /// caller's input.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Io(_) | Self::Decode(_))
    }
}

impl From<rusqlite::Error> for ParrotError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
