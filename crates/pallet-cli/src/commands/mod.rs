//! Command handlers.
//!
//! Each submodule exposes an `execute` function called from `main::run`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use pallet_adapters::{DirectoryCache, LocalFilesystem, RecipeLoader};
use pallet_core::application::{LifecycleController, ports::Filesystem};
use pallet_core::domain::Recipe;

use crate::{config::AppConfig, error::CliResult};

pub mod completions;
pub mod config;
pub mod create;
pub mod export;
pub mod inspect;
pub mod verify;

/// A loaded recipe plus a controller wired to the local disk and cache.
pub struct RecipeSession {
    pub recipe: Recipe,
    /// Absolute recipe directory, also the host source tree.
    pub dir: PathBuf,
    pub controller: LifecycleController,
}

impl RecipeSession {
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn open(dir: &Path, config: &AppConfig) -> CliResult<Self> {
        let dir = std::path::absolute(dir)?;
        let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());

        let recipe = RecipeLoader::new(filesystem.as_ref()).load_dir(&dir)?;
        let defaults = config.host_defaults()?;
        let cache = Arc::new(DirectoryCache::new(&config.cache.root));

        debug!(
            recipe = %recipe,
            cache = %config.cache.root.display(),
            "Recipe session opened"
        );

        Ok(Self {
            recipe,
            dir,
            controller: LifecycleController::new(filesystem, cache).with_defaults(defaults),
        })
    }
}
