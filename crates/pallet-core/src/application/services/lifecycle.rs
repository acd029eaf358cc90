//! Recipe Lifecycle Controller - main application orchestrator.
//!
//! The controller owns the injected host context (filesystem, cache layout,
//! defaults) and hands out one [`RecipeInstance`] per recipe. An instance
//! runs the ordered phases:
//!
//! 1. `export` - snapshot the recipe's sources (or reuse the host tree)
//! 2. `package` - stage matching files into a fresh package root and seal it
//! 3. `describe` - publish the consumer descriptor
//!
//! Both mutating phases publish through a sibling `<root>.partial`
//! directory, so a failed phase never leaves a half-populated root behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CacheLayout, Filesystem},
        services::{
            manifest::{ManifestService, VerifyReport},
            publisher::MetadataPublisher,
            staging::StagingEngine,
        },
    },
    domain::{
        PackageDescriptor, PackageRoot, PatternSet, Phase, Recipe, RecipeRef, RecipeState,
        SourceRoot,
    },
    error::{PalletError, PalletResult},
};

/// Package pattern applied when a recipe declares none.
pub const DEFAULT_PACKAGE_PATTERN: &str = "*.hpp";

/// Host-wide settings the package manager injects into every recipe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDefaults {
    pub package_patterns: PatternSet,
}

impl Default for HostDefaults {
    fn default() -> Self {
        Self {
            package_patterns: PatternSet::parse([DEFAULT_PACKAGE_PATTERN]).unwrap_or_default(),
        }
    }
}

/// Runs recipe lifecycles against an injected filesystem and cache layout.
///
/// `Send + Sync`: independent recipes may run on separate threads, each
/// through its own [`RecipeInstance`].
pub struct LifecycleController {
    filesystem: Arc<dyn Filesystem>,
    cache: Arc<dyn CacheLayout>,
    defaults: HostDefaults,
    staging: StagingEngine,
    publisher: MetadataPublisher,
    manifests: ManifestService,
}

impl LifecycleController {
    /// Create a controller with the given adapters and default host settings.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use pallet_core::application::{LifecycleController, ports::*};
    ///
    /// let controller = LifecycleController::new(
    ///     filesystem, // Arc<dyn Filesystem>
    ///     cache,      // Arc<dyn CacheLayout>
    /// );
    /// ```
    pub fn new(filesystem: Arc<dyn Filesystem>, cache: Arc<dyn CacheLayout>) -> Self {
        Self {
            staging: StagingEngine::new(Arc::clone(&filesystem)),
            publisher: MetadataPublisher::new(Arc::clone(&filesystem)),
            manifests: ManifestService::new(Arc::clone(&filesystem)),
            filesystem,
            cache,
            defaults: HostDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: HostDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &HostDefaults {
        &self.defaults
    }

    pub fn cache(&self) -> &dyn CacheLayout {
        self.cache.as_ref()
    }

    pub fn staging(&self) -> &StagingEngine {
        &self.staging
    }

    pub fn publisher(&self) -> &MetadataPublisher {
        &self.publisher
    }

    pub fn manifests(&self) -> &ManifestService {
        &self.manifests
    }

    /// Start a lifecycle for `recipe` in the `Uninitialized` state.
    pub fn instance(&self, recipe: Recipe) -> RecipeInstance<'_> {
        RecipeInstance {
            controller: self,
            recipe,
            state: RecipeState::Uninitialized,
        }
    }

    /// Patterns the package phase applies for `recipe`.
    pub fn package_patterns<'r>(&'r self, recipe: &'r Recipe) -> &'r PatternSet {
        recipe
            .package_patterns()
            .unwrap_or(&self.defaults.package_patterns)
    }

    /// Describe a package sealed by an earlier run.
    pub fn describe_cached(&self, recipe: &Recipe) -> PalletResult<PackageDescriptor> {
        let root = self.cache.package_root(recipe.reference());
        self.publisher.describe(recipe, &root)
    }

    /// Verify a package sealed by an earlier run against its manifest.
    pub fn verify_cached(&self, recipe: &RecipeRef) -> PalletResult<VerifyReport> {
        let root = self.cache.package_root(recipe);
        if !self.filesystem.is_dir(&root) {
            return Err(ApplicationError::PackageNotFound {
                recipe: recipe.to_string(),
                path: root,
            }
            .into());
        }
        self.manifests.verify(&root)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Populate `<root>.partial`, then swap it into place.
    ///
    /// A previous `root` is kept aside as `<root>.old` until the swap
    /// succeeds and restored if it does not.
    fn publish_atomically<T>(
        &self,
        root: &Path,
        populate: impl FnOnce(&Path) -> PalletResult<T>,
    ) -> PalletResult<T> {
        let partial = sibling(root, ".partial");
        let previous = sibling(root, ".old");

        for stale in [&partial, &previous] {
            if self.filesystem.exists(stale) {
                debug!(path = %stale.display(), "Removing stale directory");
                self.filesystem.remove_dir_all(stale)?;
            }
        }

        let value = match populate(&partial) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Phase failed, attempting rollback");
                self.rollback(&partial);
                return Err(e);
            }
        };

        let had_previous = self.filesystem.exists(root);
        if had_previous {
            if let Err(e) = self.filesystem.rename(root, &previous) {
                self.rollback(&partial);
                return Err(e);
            }
        }

        if let Err(e) = self.filesystem.rename(&partial, root) {
            warn!(error = %e, "Publish failed, attempting rollback");
            if had_previous {
                if let Err(restore) = self.filesystem.rename(&previous, root) {
                    warn!(error = %restore, path = %root.display(), "Restore failed");
                }
            }
            self.rollback(&partial);
            return Err(e);
        }

        if had_previous {
            self.rollback(&previous);
        }
        Ok(value)
    }

    /// Drop the cached package root for `recipe` and any publish leftovers.
    ///
    /// Runs after every successful export, whichever instance sealed the
    /// package, so a stale package never outlives the sources it came from.
    fn invalidate_package(&self, recipe: &RecipeRef) {
        let root = self.cache.package_root(recipe);
        for path in [sibling(&root, ".partial"), sibling(&root, ".old"), root] {
            if !self.filesystem.exists(&path) {
                continue;
            }
            match self.filesystem.remove_dir_all(&path) {
                Ok(()) => debug!(path = %path.display(), "Previous package invalidated"),
                Err(e) => warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove previous package root"
                ),
            }
        }
    }

    /// Best-effort removal of a directory.
    fn rollback(&self, path: &Path) {
        if !self.filesystem.exists(path) {
            return;
        }
        if let Err(e) = self.filesystem.remove_dir_all(path) {
            warn!(
                error = %e,
                path = %path.display(),
                "Rollback failed"
            );
        } else {
            debug!(path = %path.display(), "Rollback successful");
        }
    }
}

fn sibling(root: &Path, suffix: &str) -> PathBuf {
    let mut name = root
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    root.with_file_name(name)
}

/// One recipe moving through `Uninitialized -> Exported -> Packaged`.
///
/// `export` and `package` take `&mut self`, so phases on one instance run
/// strictly in sequence. A failed phase leaves the state untouched.
pub struct RecipeInstance<'c> {
    controller: &'c LifecycleController,
    recipe: Recipe,
    state: RecipeState,
}

impl RecipeInstance<'_> {
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn state(&self) -> &RecipeState {
        &self.state
    }

    /// Export phase: materialize the source root from `host_tree`.
    ///
    /// With `no_copy_source` the host tree itself becomes the source root
    /// and nothing is copied. A successful export drops any cached package
    /// root for the recipe, including one sealed by an earlier run.
    #[instrument(
        skip_all,
        fields(recipe = %self.recipe, phase = %Phase::Export, host = %host_tree.display())
    )]
    pub fn export(&mut self, host_tree: &Path) -> PalletResult<SourceRoot> {
        let controller = self.controller;
        if !controller.filesystem.is_dir(host_tree) {
            return Err(ApplicationError::SourceMissing {
                path: host_tree.to_path_buf(),
            }
            .into());
        }

        let source = if self.recipe.no_copy_source() {
            info!("Reusing host tree as source root");
            SourceRoot::reused(host_tree)
        } else {
            let root = controller.cache.export_root(self.recipe.reference());
            let files = controller.publish_atomically(&root, |partial| {
                controller
                    .staging
                    .stage(host_tree, partial, self.recipe.exports_sources())
            })?;
            info!(files = files.len(), root = %root.display(), "Sources exported");
            SourceRoot::copied(root, files)
        };

        controller.invalidate_package(self.recipe.reference());

        self.state = RecipeState::Exported {
            source: source.clone(),
        };
        Ok(source)
    }

    /// Package phase: stage the source root into a fresh, sealed package root.
    #[instrument(skip_all, fields(recipe = %self.recipe, phase = %Phase::Package))]
    pub fn package(&mut self) -> PalletResult<PackageRoot> {
        let controller = self.controller;
        let source = match &self.state {
            RecipeState::Uninitialized => return Err(self.invalid_state(Phase::Package)),
            RecipeState::Exported { source } | RecipeState::Packaged { source, .. } => {
                source.clone()
            }
        };

        let patterns = controller.package_patterns(&self.recipe);
        let root = controller.cache.package_root(self.recipe.reference());

        let (files, manifest) = controller.publish_atomically(&root, |partial| {
            let files = if source.is_reused() {
                controller.staging.stage_scoped(
                    source.path(),
                    partial,
                    self.recipe.exports_sources(),
                    patterns,
                )?
            } else {
                controller.staging.stage(source.path(), partial, patterns)?
            };
            let manifest = controller.manifests.seal(partial)?;
            Ok((files, manifest))
        })?;

        info!(
            files = files.len(),
            bytes = files.total_bytes(),
            root = %root.display(),
            "Package sealed"
        );

        let package = PackageRoot::new(root, files, manifest);
        self.state = RecipeState::Packaged {
            source,
            package: package.clone(),
        };
        Ok(package)
    }

    /// Info phase: describe the sealed package root.
    pub fn describe(&self) -> PalletResult<PackageDescriptor> {
        match &self.state {
            RecipeState::Packaged { package, .. } => self
                .controller
                .publisher
                .describe(&self.recipe, package.path()),
            _ => Err(self.invalid_state(Phase::Info)),
        }
    }

    /// Run export, package and describe in order.
    pub fn create(&mut self, host_tree: &Path) -> PalletResult<PackageDescriptor> {
        self.export(host_tree)?;
        self.package()?;
        self.describe()
    }

    fn invalid_state(&self, phase: Phase) -> PalletError {
        ApplicationError::InvalidState {
            recipe: self.recipe.reference().to_string(),
            phase,
            state: self.state.name(),
        }
        .into()
    }
}
