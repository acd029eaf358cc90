//! Pallet Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Pallet, the
//! recipe engine that turns a header-only library's source tree into a
//! sealed, versioned package and publishes consumer metadata for it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           pallet-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (LifecycleController, StagingEngine,   │
//! │   MetadataPublisher, ManifestService)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Driven: Filesystem, CacheLayout)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    pallet-adapters (Infrastructure)     │
//! │ (LocalFilesystem, DirectoryCache, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Recipe, PatternSet, PackageDescriptor) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! A recipe instance moves through `Uninitialized -> Exported -> Packaged`.
//! Export snapshots the recipe's sources, package stages the matching files
//! into a fresh package root and seals it, and describe publishes the
//! [`PackageDescriptor`](domain::PackageDescriptor) consumers resolve against.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pallet_core::{
//!     application::LifecycleController,
//!     domain::{ArtifactLayout, Recipe},
//! };
//!
//! let recipe = Recipe::builder()
//!     .name("ecms")
//!     .version("1.0")
//!     .exports_sources(["src/EC/*"])
//!     .no_copy_source(true)
//!     .layout(ArtifactLayout::header_only(["src"]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! // Adapters are injected by the host (see `pallet-adapters`).
//! let controller = LifecycleController::new(filesystem, cache);
//! let mut instance = controller.instance(recipe);
//! instance.export("./ecms".as_ref()).unwrap();
//! instance.package().unwrap();
//! let descriptor = instance.describe().unwrap();
//! assert!(descriptor.is_header_only());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        HostDefaults, LifecycleController, ManifestService, MetadataPublisher, RecipeInstance,
        StagingEngine, VerifyReport,
        ports::{CacheLayout, Filesystem},
    };
    pub use crate::domain::{
        ArtifactLayout, DirCategory, PackageDescriptor, PackageManifest, PackageRoot,
        PatternSet, Phase, Recipe, RecipeBuilder, RecipeRef, RecipeState, RelativePath,
        SourceRoot, StagedFileSet,
    };
    pub use crate::error::{ErrorCategory, PalletError, PalletResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
