//! Core domain layer for Pallet.
//!
//! Pure recipe logic: identity, pattern sets, artifact layouts, descriptors,
//! manifests and the lifecycle state machine. No filesystem access happens
//! here; I/O goes through the ports defined in the application layer.
//!
//! - **No I/O**: path handling is lexical only
//! - **Immutable recipes**: built once through [`RecipeBuilder`]
//! - **Validated on construction**: names, versions, patterns, relative paths

pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{
    common::RelativePath,
    descriptor::{ArtifactLayout, DirCategory, PackageDescriptor},
    lifecycle::{PackageRoot, Phase, RecipeState, SourceRoot},
    manifest::{MANIFEST_FILE, PackageManifest},
    recipe::{Recipe, RecipeBuilder, RecipeMetadata},
    staged::{StagedFile, StagedFileSet},
};

pub use error::DomainError;

pub use value_objects::{PackageName, PatternSet, RecipeRef, Version};
