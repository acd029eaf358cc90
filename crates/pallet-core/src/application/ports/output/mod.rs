//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `pallet-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{RecipeRef, RelativePath};
use crate::error::PalletResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `pallet_adapters::filesystem::LocalFilesystem` (production)
/// - `pallet_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Synchronous and blocking; no suspension points
/// - Failures are reported as `ApplicationError::Filesystem` with the path
///   and operation that failed
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> PalletResult<()>;

    /// Copy one file, creating nothing. Returns the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> PalletResult<u64>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> PalletResult<Vec<u8>>;

    /// Create or truncate a file with the given content.
    fn write_file(&self, path: &Path, content: &[u8]) -> PalletResult<()>;

    /// Every regular file under `root`, relative to it, sorted.
    fn walk_files(&self, root: &Path) -> PalletResult<Vec<RelativePath>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Rename a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> PalletResult<()>;

    /// Remove a directory and all contents, including read-only files.
    fn remove_dir_all(&self, path: &Path) -> PalletResult<()>;

    /// Mark a file read-only.
    fn set_readonly(&self, path: &Path) -> PalletResult<()>;
}

/// Port for the host's cache layout.
///
/// Implemented by:
/// - `pallet_adapters::cache::DirectoryCache` (`<root>/<name>/<version>/...`)
#[cfg_attr(test, mockall::automock)]
pub trait CacheLayout: Send + Sync {
    /// Where the export phase places a copied source snapshot.
    fn export_root(&self, recipe: &RecipeRef) -> PathBuf;

    /// Where the package phase publishes the sealed package.
    fn package_root(&self, recipe: &RecipeRef) -> PathBuf;
}
