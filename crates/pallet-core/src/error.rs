//! Unified error handling for Pallet Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with a category the host can branch on and user-actionable
//! suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Pallet Core operations.
///
/// Every lifecycle phase returns this type unchanged to its caller; the
/// [`category`](Self::category) tells the host whether it is looking at an
/// I/O failure, a configuration problem, or a lifecycle ordering mistake.
#[derive(Debug, Error, Clone)]
pub enum PalletError {
    /// Errors from the domain layer (invalid recipe declarations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (filesystem, lifecycle state).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl PalletError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check the recipe declaration and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Pallet".into(),
                "Please report this issue at: https://github.com/pallet-pm/pallet/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Pallet never retries on its own; the host may retry transient I/O.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Io)
    }
}

/// Error categories for UI display and host dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Filesystem access or copy failure.
    Io,
    /// Invalid declaration, pattern, or a declared path missing at publish time.
    Configuration,
    /// A lifecycle phase was invoked out of order.
    State,
    /// A package or recipe the caller asked for does not exist.
    NotFound,
    Internal,
}

/// Convenient result type alias.
pub type PalletResult<T> = Result<T, PalletError>;
