//! On-disk cache layout.
//!
//! ```text
//! <root>/
//! └── ecms/
//!     └── 1.0/
//!         ├── export/     ← copied source snapshot
//!         └── package/    ← sealed package root
//! ```

use std::path::{Path, PathBuf};

use pallet_core::{application::ports::CacheLayout, domain::RecipeRef};

/// Cache rooted at a single directory, one subtree per `name/version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every root for `recipe`.
    pub fn recipe_dir(&self, recipe: &RecipeRef) -> PathBuf {
        self.root
            .join(recipe.name().as_str())
            .join(recipe.version().as_str())
    }
}

impl CacheLayout for DirectoryCache {
    fn export_root(&self, recipe: &RecipeRef) -> PathBuf {
        self.recipe_dir(recipe).join("export")
    }

    fn package_root(&self, recipe: &RecipeRef) -> PathBuf {
        self.recipe_dir(recipe).join("package")
    }
}
