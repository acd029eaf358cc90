//! Infrastructure adapters for Pallet.
//!
//! This crate implements the ports defined in `pallet-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod cache;
pub mod filesystem;
pub mod recipe_loader;

// Re-export commonly used adapters
pub use cache::DirectoryCache;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use recipe_loader::{RECIPE_FILE, RecipeLoader, parse_recipe};
