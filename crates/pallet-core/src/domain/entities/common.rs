use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A filesystem path guaranteed to be **relative** to some root.
///
/// Staged file sets, manifests and package descriptors only ever name
/// locations inside a source or package root. An absolute path or a `..`
/// segment would point outside that root, so both are rejected at
/// construction.
///
/// `RelativePath` is a *semantic guardrail*, not a filesystem abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Try to create a relative path.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let display = path.display().to_string();

        if path.as_os_str().is_empty() {
            return Err(DomainError::EmptyPath);
        }

        let mut normal_segments = 0usize;
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(DomainError::AbsolutePathNotAllowed { path: display });
                }
                Component::ParentDir => {
                    return Err(DomainError::PathEscapesRoot { path: display });
                }
                Component::CurDir => {}
                Component::Normal(_) => normal_segments += 1,
            }
        }

        if normal_segments == 0 {
            return Err(DomainError::EmptyPath);
        }

        Ok(Self(path))
    }

    /// The root itself, written `.`.
    ///
    /// Never produced by [`try_new`](Self::try_new), which requires at least
    /// one normal segment.
    pub fn root() -> Self {
        Self(PathBuf::from("."))
    }

    pub fn is_root(&self) -> bool {
        self.depth() == 0
    }

    /// Join a path segment onto this relative path.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment))
    }

    /// Borrow as a `Path`.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume into a `PathBuf`.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// `/`-separated form, independent of the platform separator.
    ///
    /// Pattern matching and manifests always work on this form.
    pub fn to_slash_string(&self) -> String {
        let joined = self
            .0
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        if joined.is_empty() {
            ".".to_owned()
        } else {
            joined
        }
    }

    /// The first normal component, e.g. `src` for `src/EC/Manager.hpp`.
    pub fn top_level(&self) -> Option<RelativePath> {
        self.0.components().find_map(|c| match c {
            Component::Normal(s) => Some(RelativePath(PathBuf::from(s))),
            _ => None,
        })
    }

    /// Number of normal components.
    pub fn depth(&self) -> usize {
        self.0
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        RelativePath::try_new(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "." {
            return Ok(RelativePath::root());
        }
        RelativePath::try_new(s)
    }
}

impl From<RelativePath> for String {
    fn from(p: RelativePath) -> Self {
        p.to_slash_string()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_slash_string())
    }
}
