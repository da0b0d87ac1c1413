//! Error types for pairwallet-core
//!
//! Most ledger operations cannot fail: missing ids are silent no-ops and
//! debt amounts clamp. Errors here come from catalog invariants and from the
//! remote store.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AccountNotFound,
    GoalNotFound,
    LastAccount,
    ValidationError,
    RemoteError,
    SerializationError,
    Timeout,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::GoalNotFound => write!(f, "GOAL_NOT_FOUND"),
            ErrorCode::LastAccount => write!(f, "LAST_ACCOUNT"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::RemoteError => write!(f, "REMOTE_ERROR"),
            ErrorCode::SerializationError => write!(f, "SERIALIZATION_ERROR"),
            ErrorCode::Timeout => write!(f, "TIMEOUT"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for pairwallet-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Account not found: {id}")]
    AccountNotFound { id: String },

    #[error("Savings goal not found: {id}")]
    GoalNotFound { id: String },

    #[error("The last account cannot be deleted")]
    LastAccount,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Remote store error: {message}")]
    Remote { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Timed out: {operation}")]
    Timeout { operation: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::GoalNotFound { .. } => ErrorCode::GoalNotFound,
            CoreError::LastAccount => ErrorCode::LastAccount,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Remote { .. } => ErrorCode::RemoteError,
            CoreError::Serialization { .. } => ErrorCode::SerializationError,
            CoreError::Timeout { .. } => ErrorCode::Timeout,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::AccountNotFound { .. } | CoreError::GoalNotFound { .. } => {
                ErrorSeverity::Info
            }
            CoreError::LastAccount | CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::Remote { .. } | CoreError::Timeout { .. } => ErrorSeverity::Warning,
            CoreError::Serialization { .. } | CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Persistence failures leave the in-memory state authoritative
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.severity(), ErrorSeverity::Critical)
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::LastAccount => {
                details = details.with_suggestion(
                    "Create another account before deleting this one.".to_string(),
                );
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::Remote { .. } | CoreError::Timeout { .. } => {
                details = details
                    .with_suggestion(
                        "Changes are kept locally and will be sent with the next save.".to_string(),
                    )
                    .with_suggestion("Check that the state server is reachable.".to_string());
            }
            CoreError::Serialization { message } => {
                details = details.with_detail(serde_json::json!({ "serde_message": message }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError { message: error.to_string() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::Serialization { message: error.to_string() }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CoreError::Timeout { operation: "remote request".to_string() }
        } else {
            CoreError::Remote { message: error.to_string() }
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub user_id: Option<String>,
    pub operation: String,
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            user_id: None,
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => log::info!(
                target: "pairwallet::error",
                "[{}] {} - Operation: {} - User: {:?}",
                error.code(), error, context.operation, context.user_id
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "pairwallet::error",
                "[{}] {} - Operation: {} - User: {:?}",
                error.code(), error, context.operation, context.user_id
            ),
            _ => log::error!(
                target: "pairwallet::error",
                "[{}] {} - Operation: {} - User: {:?}",
                error.code(), error.to_details(), context.operation, context.user_id
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "pairwallet::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message, context.operation, context.user_id
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::LastAccount.to_string(), "LAST_ACCOUNT");
        assert_eq!(ErrorCode::RemoteError.to_string(), "REMOTE_ERROR");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::GoalNotFound { id: "goal_1".to_string() };
        assert_eq!(error.code(), ErrorCode::GoalNotFound);
        assert_eq!(error.severity(), ErrorSeverity::Info);

        let error = CoreError::Remote { message: "503".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(error.is_recoverable());

        let error = CoreError::InternalError { message: "boom".to_string() };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_details_remote() {
        let details = CoreError::Timeout { operation: "load".to_string() }.to_details();
        assert_eq!(details.code, ErrorCode::Timeout);
        assert_eq!(details.suggestions.len(), 2);
        assert!(details.to_string().contains("TIMEOUT"));
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let core: CoreError = err.into();
        assert_eq!(core.code(), ErrorCode::SerializationError);
        assert!(core.to_details().details.is_some());
    }

    #[test]
    fn test_from_io_error_keeps_cause() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system");
        let core: CoreError = err.into();
        assert_eq!(core.code(), ErrorCode::IoError);
        assert!(core.to_string().contains("read-only file system"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("sync.save")
            .with_user_id("42")
            .with_data("attempt", serde_json::json!(1));
        assert_eq!(context.operation, "sync.save");
        assert_eq!(context.user_id.as_deref(), Some("42"));
        assert_eq!(context.data["attempt"], 1);
    }
}
