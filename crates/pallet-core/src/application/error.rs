//! Application layer errors.
//!
//! These errors represent failures while running a lifecycle phase, not
//! invalid declarations. Declaration errors are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DirCategory, Phase, RelativePath};
use crate::error::ErrorCategory;

/// Errors that occur while exporting, packaging, or describing a recipe.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A filesystem operation failed.
    #[error("Failed to {operation} {path}: {reason}")]
    Filesystem {
        path: PathBuf,
        operation: &'static str,
        reason: String,
    },

    /// The host source tree handed to a phase does not exist.
    #[error("Source root does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// A phase was invoked out of order.
    #[error("Cannot run {phase} for {recipe}: recipe is {state}")]
    InvalidState {
        recipe: String,
        phase: Phase,
        state: &'static str,
    },

    /// A declared descriptor directory is absent from the package root.
    #[error("{recipe}: declared {category} entry '{path}' does not exist under {root}")]
    MissingDirectory {
        recipe: String,
        category: DirCategory,
        path: RelativePath,
        root: PathBuf,
    },

    /// The package root carries no manifest to verify against.
    #[error("No package manifest in {root}")]
    ManifestMissing { root: PathBuf },

    /// No recipe declaration where one was expected.
    #[error("No recipe found at {path}")]
    RecipeNotFound { path: PathBuf },

    /// No package root exists for the recipe.
    #[error("Package {recipe} not found at {path}")]
    PackageNotFound { recipe: String, path: PathBuf },

    /// Shared adapter state is unusable (lock poisoned).
    #[error("Filesystem store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Convenience constructor for I/O failures.
    pub fn filesystem(
        path: impl Into<PathBuf>,
        operation: &'static str,
        reason: impl ToString,
    ) -> Self {
        Self::Filesystem {
            path: path.into(),
            operation,
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
                "Ensure there is enough free disk space".into(),
            ],
            Self::SourceMissing { path } => vec![
                format!("Directory not found: {}", path.display()),
                "Point the command at the directory holding recipe.toml".into(),
            ],
            Self::InvalidState { phase, .. } => match phase {
                Phase::Package => vec!["Run the export phase before packaging".into()],
                _ => vec!["Run 'pallet create' to export and package the recipe".into()],
            },
            Self::MissingDirectory { path, .. } => vec![
                format!("Make sure package patterns stage files under '{}'", path),
                "Or remove the directory from [info] in recipe.toml".into(),
            ],
            Self::ManifestMissing { .. } => vec![
                "The package was not sealed by pallet".into(),
                "Re-run 'pallet create' to rebuild it".into(),
            ],
            Self::RecipeNotFound { path } => vec![
                format!("Expected a recipe file at {}", path.display()),
                "Create recipe.toml with a [recipe] section".into(),
            ],
            Self::PackageNotFound { recipe, .. } => vec![
                format!("{} has not been packaged yet", recipe),
                "Run 'pallet create' first".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Filesystem { .. } | Self::SourceMissing { .. } => ErrorCategory::Io,
            Self::InvalidState { .. } => ErrorCategory::State,
            Self::MissingDirectory { .. } | Self::ManifestMissing { .. } => {
                ErrorCategory::Configuration
            }
            Self::RecipeNotFound { .. } | Self::PackageNotFound { .. } => ErrorCategory::NotFound,
            Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
