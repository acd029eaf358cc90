//! File Staging Engine - pattern-driven copies between roots.
//!
//! Staging is additive: files already in the destination are overwritten
//! only when a matched source file lands on the same relative path, and
//! everything else in the destination is left alone.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{PatternSet, RelativePath, StagedFileSet},
    error::PalletResult,
};

/// Copies files matching a [`PatternSet`] from a source root into a
/// destination root, preserving relative paths.
pub struct StagingEngine {
    filesystem: Arc<dyn Filesystem>,
}

impl StagingEngine {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Stage every file under `source_root` that matches `patterns`.
    ///
    /// The destination is created if absent. An empty pattern set, or
    /// patterns that match nothing, stage nothing and succeed.
    pub fn stage(
        &self,
        source_root: &Path,
        dest_root: &Path,
        patterns: &PatternSet,
    ) -> PalletResult<StagedFileSet> {
        self.stage_with_excludes(source_root, dest_root, patterns, &PatternSet::empty())
    }

    /// Like [`stage`](Self::stage), dropping files that match any of
    /// `excludes` after inclusion.
    pub fn stage_with_excludes(
        &self,
        source_root: &Path,
        dest_root: &Path,
        patterns: &PatternSet,
        excludes: &PatternSet,
    ) -> PalletResult<StagedFileSet> {
        self.stage_filtered(source_root, dest_root, patterns, |path| {
            !excludes.matches(path)
        })
    }

    /// Stage files matching `patterns` that also fall inside `scope`.
    ///
    /// Used when a recipe packages straight from the host tree: only the
    /// files the recipe exports are candidates.
    pub fn stage_scoped(
        &self,
        source_root: &Path,
        dest_root: &Path,
        scope: &PatternSet,
        patterns: &PatternSet,
    ) -> PalletResult<StagedFileSet> {
        self.stage_filtered(source_root, dest_root, patterns, |path| scope.matches(path))
    }

    #[instrument(
        skip_all,
        fields(
            source = %source_root.display(),
            dest = %dest_root.display(),
            patterns = %patterns
        )
    )]
    fn stage_filtered(
        &self,
        source_root: &Path,
        dest_root: &Path,
        patterns: &PatternSet,
        keep: impl Fn(&RelativePath) -> bool,
    ) -> PalletResult<StagedFileSet> {
        if !self.filesystem.is_dir(source_root) {
            return Err(ApplicationError::SourceMissing {
                path: source_root.to_path_buf(),
            }
            .into());
        }

        self.filesystem.create_dir_all(dest_root)?;

        let mut staged = StagedFileSet::new();
        if patterns.is_empty() {
            debug!("Empty pattern set, nothing to stage");
            return Ok(staged);
        }

        for relative in self.filesystem.walk_files(source_root)? {
            if !patterns.matches(&relative) || !keep(&relative) {
                continue;
            }

            let from = source_root.join(relative.as_path());
            let to = dest_root.join(relative.as_path());
            if let Some(parent) = to.parent() {
                self.filesystem.create_dir_all(parent)?;
            }

            let size = self.filesystem.copy_file(&from, &to)?;
            trace!(path = %relative, size, "Staged file");
            staged.push(relative, size);
        }

        debug!(
            files = staged.len(),
            bytes = staged.total_bytes(),
            "Staging complete"
        );
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mockall::predicate::eq;

    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::error::{ErrorCategory, PalletError};

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    #[test]
    fn missing_source_is_io_error() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| false);
        fs.expect_create_dir_all().never();

        let engine = StagingEngine::new(Arc::new(fs));
        let err = engine
            .stage(
                Path::new("/missing"),
                Path::new("/dest"),
                &PatternSet::parse(["*.hpp"]).unwrap(),
            )
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(matches!(
            err,
            PalletError::Application(ApplicationError::SourceMissing { .. })
        ));
    }

    #[test]
    fn empty_patterns_create_destination_and_stage_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_create_dir_all()
            .with(eq(PathBuf::from("/dest")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_walk_files().never();

        let engine = StagingEngine::new(Arc::new(fs));
        let staged = engine
            .stage(Path::new("/src"), Path::new("/dest"), &PatternSet::empty())
            .unwrap();

        assert!(staged.is_empty());
    }

    #[test]
    fn only_matching_files_are_copied() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_walk_files().returning(|_| {
            Ok(vec![
                rel("src/EC/foo.hpp"),
                rel("src/EC/readme.txt"),
                rel("src/EC/sub/bar.hpp"),
            ])
        });
        fs.expect_copy_file()
            .with(
                eq(PathBuf::from("/src/src/EC/foo.hpp")),
                eq(PathBuf::from("/dest/src/EC/foo.hpp")),
            )
            .times(1)
            .returning(|_, _| Ok(3));
        fs.expect_copy_file()
            .with(
                eq(PathBuf::from("/src/src/EC/sub/bar.hpp")),
                eq(PathBuf::from("/dest/src/EC/sub/bar.hpp")),
            )
            .times(1)
            .returning(|_, _| Ok(4));

        let engine = StagingEngine::new(Arc::new(fs));
        let staged = engine
            .stage(
                Path::new("/src"),
                Path::new("/dest"),
                &PatternSet::parse(["*.hpp"]).unwrap(),
            )
            .unwrap();

        let paths: Vec<_> = staged.paths().map(ToString::to_string).collect();
        assert_eq!(paths, ["src/EC/foo.hpp", "src/EC/sub/bar.hpp"]);
        assert_eq!(staged.total_bytes(), 7);
    }

    #[test]
    fn excludes_apply_after_inclusion() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_walk_files()
            .returning(|_| Ok(vec![rel("src/EC/detail/impl.hpp"), rel("src/EC/api.hpp")]));
        fs.expect_copy_file().times(1).returning(|_, _| Ok(1));

        let engine = StagingEngine::new(Arc::new(fs));
        let staged = engine
            .stage_with_excludes(
                Path::new("/src"),
                Path::new("/dest"),
                &PatternSet::parse(["*.hpp"]).unwrap(),
                &PatternSet::parse(["*/detail/*"]).unwrap(),
            )
            .unwrap();

        assert_eq!(staged.len(), 1);
        assert!(staged.contains(&rel("src/EC/api.hpp")));
    }

    #[test]
    fn copy_failure_surfaces_unchanged() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_walk_files()
            .returning(|_| Ok(vec![rel("a.hpp"), rel("b.hpp")]));
        fs.expect_copy_file().times(1).returning(|from, _| {
            Err(ApplicationError::filesystem(from, "read", "permission denied").into())
        });

        let engine = StagingEngine::new(Arc::new(fs));
        let err = engine
            .stage(
                Path::new("/src"),
                Path::new("/dest"),
                &PatternSet::parse(["*.hpp"]).unwrap(),
            )
            .unwrap_err();

        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn scoped_staging_requires_both_sets() {
        let mut fs = MockFilesystem::new();
        fs.expect_is_dir().returning(|_| true);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_walk_files()
            .returning(|_| Ok(vec![rel("src/EC/a.hpp"), rel("tests/helper.hpp")]));
        fs.expect_copy_file().times(1).returning(|_, _| Ok(1));

        let engine = StagingEngine::new(Arc::new(fs));
        let staged = engine
            .stage_scoped(
                Path::new("/src"),
                Path::new("/dest"),
                &PatternSet::parse(["src/EC/*"]).unwrap(),
                &PatternSet::parse(["*.hpp"]).unwrap(),
            )
            .unwrap();

        let paths: Vec<_> = staged.paths().map(ToString::to_string).collect();
        assert_eq!(paths, ["src/EC/a.hpp"]);
    }
}
