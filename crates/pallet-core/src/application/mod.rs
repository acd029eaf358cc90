//! Application layer for Pallet.
//!
//! This layer contains:
//! - **Services**: Lifecycle orchestration (LifecycleController, StagingEngine,
//!   MetadataPublisher, ManifestService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Declaration rules live in `crate::domain`; this layer sequences phases
//! and talks to the filesystem through ports.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DEFAULT_PACKAGE_PATTERN, HostDefaults, IntegrityFailure, IntegrityIssue, LifecycleController,
    ManifestService, MetadataPublisher, RecipeInstance, StagingEngine, VerifyReport,
};

// Re-export port traits (for adapter implementation)
pub use ports::{CacheLayout, Filesystem};

pub use error::ApplicationError;
