//! Artifact layouts and the consumer-facing package descriptor.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::common::RelativePath, error::DomainError, value_objects::RecipeRef,
};

/// Capability category of a published directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirCategory {
    Include,
    Lib,
    Bin,
}

impl DirCategory {
    pub const ALL: [DirCategory; 3] = [Self::Include, Self::Lib, Self::Bin];

    /// Descriptor key, e.g. `includedirs`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Include => "includedirs",
            Self::Lib => "libdirs",
            Self::Bin => "bindirs",
        }
    }
}

impl fmt::Display for DirCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What kind of artifacts a package exposes.
///
/// `HeaderOnly` is the zero-binary case: consumers get include paths and
/// nothing to link or run. An empty `includedirs` list asks the publisher
/// to infer them from the packaged layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ArtifactLayout {
    HeaderOnly {
        #[serde(default)]
        includedirs: Vec<RelativePath>,
    },
    Compiled {
        #[serde(default)]
        includedirs: Vec<RelativePath>,
        #[serde(default)]
        libdirs: Vec<RelativePath>,
        #[serde(default)]
        bindirs: Vec<RelativePath>,
    },
}

impl ArtifactLayout {
    /// Header-only layout with explicit include directories.
    pub fn header_only<I, S>(includedirs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::HeaderOnly {
            includedirs: parse_dirs(includedirs)?,
        })
    }

    /// Header-only layout whose include directories are inferred at publish time.
    pub fn inferred_headers() -> Self {
        Self::HeaderOnly {
            includedirs: Vec::new(),
        }
    }

    pub fn is_header_only(&self) -> bool {
        matches!(self, Self::HeaderOnly { .. })
    }

    pub fn includedirs(&self) -> &[RelativePath] {
        match self {
            Self::HeaderOnly { includedirs } | Self::Compiled { includedirs, .. } => includedirs,
        }
    }

    /// Always empty for header-only layouts.
    pub fn libdirs(&self) -> &[RelativePath] {
        match self {
            Self::HeaderOnly { .. } => &[],
            Self::Compiled { libdirs, .. } => libdirs,
        }
    }

    /// Always empty for header-only layouts.
    pub fn bindirs(&self) -> &[RelativePath] {
        match self {
            Self::HeaderOnly { .. } => &[],
            Self::Compiled { bindirs, .. } => bindirs,
        }
    }

    pub fn dirs(&self, category: DirCategory) -> &[RelativePath] {
        match category {
            DirCategory::Include => self.includedirs(),
            DirCategory::Lib => self.libdirs(),
            DirCategory::Bin => self.bindirs(),
        }
    }

    /// Rejects a directory listed twice within one category.
    pub fn validate(&self) -> Result<(), DomainError> {
        for category in DirCategory::ALL {
            let mut seen = HashSet::new();
            for dir in self.dirs(category) {
                if !seen.insert(dir) {
                    return Err(DomainError::DuplicatePath {
                        category: category.to_string(),
                        path: dir.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::inferred_headers()
    }
}

pub(crate) fn parse_dirs<I, S>(dirs: I) -> Result<Vec<RelativePath>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dirs.into_iter()
        .map(|d| RelativePath::try_new(d.as_ref()))
        .collect()
}

/// Metadata handed to consumers of a sealed package.
///
/// Each list holds paths relative to the package root. Empty lists are
/// meaningful: they declare that no artifacts of that category exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub recipe: RecipeRef,
    pub includedirs: Vec<RelativePath>,
    pub libdirs: Vec<RelativePath>,
    pub bindirs: Vec<RelativePath>,
}

impl PackageDescriptor {
    /// No library or binary directories to search.
    pub fn is_header_only(&self) -> bool {
        self.libdirs.is_empty() && self.bindirs.is_empty()
    }

    pub fn dirs(&self, category: DirCategory) -> &[RelativePath] {
        match category {
            DirCategory::Include => &self.includedirs,
            DirCategory::Lib => &self.libdirs,
            DirCategory::Bin => &self.bindirs,
        }
    }

    /// Every (category, directory) pair in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (DirCategory, &RelativePath)> {
        DirCategory::ALL
            .into_iter()
            .flat_map(move |c| self.dirs(c).iter().map(move |d| (c, d)))
    }
}
