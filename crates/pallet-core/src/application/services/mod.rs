//! Application services - orchestrate the recipe lifecycle.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! export, package and info phases.

pub mod lifecycle;
pub mod manifest;
pub mod publisher;
pub mod staging;

pub use lifecycle::{DEFAULT_PACKAGE_PATTERN, HostDefaults, LifecycleController, RecipeInstance};
pub use manifest::{IntegrityFailure, IntegrityIssue, ManifestService, VerifyReport};
pub use publisher::MetadataPublisher;
pub use staging::StagingEngine;
