//! Package Metadata Publisher - derives the consumer descriptor from a
//! sealed package root.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{ArtifactLayout, DirCategory, MANIFEST_FILE, PackageDescriptor, Recipe, RelativePath},
    error::PalletResult,
};

/// Builds [`PackageDescriptor`]s. Read-only; safe to share across threads.
pub struct MetadataPublisher {
    filesystem: Arc<dyn Filesystem>,
}

impl MetadataPublisher {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Describe the package at `package_root`.
    ///
    /// Every directory listed in the returned descriptor exists under the
    /// root at call time. A header-only layout with no declared include
    /// directories gets the top-level directories that hold files, plus `.`
    /// when files sit directly in the root or nothing was staged at all.
    #[instrument(
        skip_all,
        fields(recipe = %recipe, phase = "info", root = %package_root.display())
    )]
    pub fn describe(&self, recipe: &Recipe, package_root: &Path) -> PalletResult<PackageDescriptor> {
        if !self.filesystem.is_dir(package_root) {
            return Err(ApplicationError::PackageNotFound {
                recipe: recipe.reference().to_string(),
                path: package_root.to_path_buf(),
            }
            .into());
        }

        let layout = recipe.layout();
        let includedirs = match layout {
            ArtifactLayout::HeaderOnly { includedirs } if includedirs.is_empty() => {
                self.infer_includedirs(package_root)?
            }
            _ => layout.includedirs().to_vec(),
        };

        let descriptor = PackageDescriptor {
            recipe: recipe.reference().clone(),
            includedirs,
            libdirs: layout.libdirs().to_vec(),
            bindirs: layout.bindirs().to_vec(),
        };

        self.check_dirs(recipe, package_root, &descriptor)?;

        debug!(
            includedirs = descriptor.includedirs.len(),
            header_only = descriptor.is_header_only(),
            "Descriptor published"
        );
        Ok(descriptor)
    }

    fn infer_includedirs(&self, package_root: &Path) -> PalletResult<Vec<RelativePath>> {
        let mut dirs = BTreeSet::new();
        for file in self.filesystem.walk_files(package_root)? {
            if file.depth() > 1 {
                dirs.extend(file.top_level());
            } else if file.as_path() != Path::new(MANIFEST_FILE) {
                dirs.insert(RelativePath::root());
            }
        }
        if dirs.is_empty() {
            dirs.insert(RelativePath::root());
        }

        debug!(count = dirs.len(), "Inferred include directories");
        Ok(dirs.into_iter().collect())
    }

    fn check_dirs(
        &self,
        recipe: &Recipe,
        package_root: &Path,
        descriptor: &PackageDescriptor,
    ) -> PalletResult<()> {
        for (category, dir) in descriptor.entries() {
            let path = if dir.is_root() {
                package_root.to_path_buf()
            } else {
                package_root.join(dir.as_path())
            };
            if !self.filesystem.is_dir(&path) {
                return Err(missing(recipe, category, dir, package_root).into());
            }
        }
        Ok(())
    }
}

fn missing(
    recipe: &Recipe,
    category: DirCategory,
    dir: &RelativePath,
    root: &Path,
) -> ApplicationError {
    ApplicationError::MissingDirectory {
        recipe: recipe.reference().to_string(),
        category,
        path: dir.clone(),
        root: root.to_path_buf(),
    }
}
