// ============================================================================
// domain/error.rs - RECIPE DECLARATION ERRORS
// ============================================================================

use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (the host may keep them around for reporting)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Identity
    // ========================================================================
    #[error("Invalid package name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid recipe reference '{0}': expected <name>/<version>")]
    InvalidReference(String),

    // ========================================================================
    // Patterns and paths
    // ========================================================================
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Empty path not allowed")]
    EmptyPath,

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes its root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Duplicate path in {category}: {path}")]
    DuplicatePath { category: String, path: String },

    // ========================================================================
    // Declaration
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Malformed package manifest at line {line}: {reason}")]
    MalformedManifest { line: usize, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidName { .. } => vec![
                "Package names use lowercase letters, digits, '-', '_', '.', '+'".into(),
                "Examples: ecms, fmt, nlohmann_json".into(),
            ],
            Self::InvalidVersion { .. } => vec![
                "Versions may not contain whitespace, '/' or '@'".into(),
                "Examples: 1.0, 2.3.1, 1.0-rc1".into(),
            ],
            Self::InvalidPattern { pattern, .. } => vec![
                format!("Pattern '{}' is not a valid glob", pattern),
                "Use '*' to match any characters, e.g. \"src/*\" or \"*.hpp\"".into(),
            ],
            Self::AbsolutePathNotAllowed { path } | Self::PathEscapesRoot { path } => vec![
                format!("'{}' must be relative to the package root", path),
                "Declare directories such as \"include\" or \"src\"".into(),
            ],
            Self::MissingRequiredField { field } => vec![
                format!("Add '{}' to the [recipe] section", field),
            ],
            Self::MalformedManifest { .. } => vec![
                "The package manifest is damaged".into(),
                "Re-run 'pallet create' to rebuild the package".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Every declaration error is a configuration problem for the host.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}
