//! Lifecycle phases, roots, and the per-instance state machine.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::entities::{manifest::PackageManifest, staged::StagedFileSet};

/// A recipe lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Export,
    Package,
    Info,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Package => write!(f, "package"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Snapshot (or reference) of a recipe's sources used as packaging input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    path: PathBuf,
    reused: bool,
    files: StagedFileSet,
}

impl SourceRoot {
    /// A snapshot the export phase copied into the cache.
    pub fn copied(path: impl Into<PathBuf>, files: StagedFileSet) -> Self {
        Self {
            path: path.into(),
            reused: false,
            files,
        }
    }

    /// The host tree itself, used in place (`no_copy_source`).
    pub fn reused(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reused: true,
            files: StagedFileSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when no files were copied.
    pub fn is_reused(&self) -> bool {
        self.reused
    }

    /// Files copied during export. Empty for a reused host tree.
    pub fn files(&self) -> &StagedFileSet {
        &self.files
    }
}

/// A sealed package directory and what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRoot {
    path: PathBuf,
    files: StagedFileSet,
    manifest: PackageManifest,
}

impl PackageRoot {
    pub fn new(path: impl Into<PathBuf>, files: StagedFileSet, manifest: PackageManifest) -> Self {
        Self {
            path: path.into(),
            files,
            manifest,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn files(&self) -> &StagedFileSet {
        &self.files
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }
}

/// `Uninitialized -> Exported -> Packaged`.
///
/// Re-exporting a packaged recipe drops the package root and returns to
/// `Exported`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecipeState {
    #[default]
    Uninitialized,
    Exported {
        source: SourceRoot,
    },
    Packaged {
        source: SourceRoot,
        package: PackageRoot,
    },
}

impl RecipeState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Exported { .. } => "exported",
            Self::Packaged { .. } => "packaged",
        }
    }

    pub fn source_root(&self) -> Option<&SourceRoot> {
        match self {
            Self::Uninitialized => None,
            Self::Exported { source } | Self::Packaged { source, .. } => Some(source),
        }
    }

    pub fn package_root(&self) -> Option<&PackageRoot> {
        match self {
            Self::Packaged { package, .. } => Some(package),
            _ => None,
        }
    }
}

impl fmt::Display for RecipeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
