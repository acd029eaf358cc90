//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use pallet_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::RelativePath,
    error::{PalletError, PalletResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> PalletResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    /// `fs::copy` carries permission bits over, so a read-only source
    /// would leave a destination the next copy cannot overwrite.
    fn copy_file(&self, from: &Path, to: &Path) -> PalletResult<u64> {
        if to.is_file() {
            ensure_writable(to)?;
        }
        let bytes = fs::copy(from, to).map_err(|e| map_io_error(from, e, "copy file"))?;
        ensure_writable(to)?;
        Ok(bytes)
    }

    fn read_file(&self, path: &Path) -> PalletResult<Vec<u8>> {
        fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> PalletResult<()> {
        fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn walk_files(&self, root: &Path) -> PalletResult<Vec<RelativePath>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ApplicationError::filesystem(path, "walk directory", e)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).map_err(|e| {
                ApplicationError::filesystem(entry.path(), "resolve relative path", e)
            })?;
            files.push(RelativePath::try_new(relative)?);
        }

        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn rename(&self, from: &Path, to: &Path) -> PalletResult<()> {
        fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn remove_dir_all(&self, path: &Path) -> PalletResult<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                debug!(path = %path.display(), "Clearing read-only flags before removal");
                make_writable(path)?;
                fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
            }
            Err(e) => Err(map_io_error(path, e, "remove directory")),
        }
    }

    fn set_readonly(&self, path: &Path) -> PalletResult<()> {
        let mut perms = fs::metadata(path)
            .map_err(|e| map_io_error(path, e, "read metadata"))?
            .permissions();
        perms.set_readonly(true);
        fs::set_permissions(path, perms).map_err(|e| map_io_error(path, e, "set permissions"))
    }
}

fn make_writable(root: &Path) -> PalletResult<()> {
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        ensure_writable(entry.path())?;
    }
    Ok(())
}

fn ensure_writable(path: &Path) -> PalletResult<()> {
    let mut perms = fs::metadata(path)
        .map_err(|e| map_io_error(path, e, "read metadata"))?
        .permissions();
    if !perms.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
    }

    fs::set_permissions(path, perms).map_err(|e| map_io_error(path, e, "set permissions"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &'static str) -> PalletError {
    ApplicationError::filesystem(path, operation, e).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn walk_files_is_sorted_and_relative() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/EC/sub")).unwrap();
        fs::write(dir.path().join("src/EC/sub/b.hpp"), "b").unwrap();
        fs::write(dir.path().join("src/EC/a.hpp"), "a").unwrap();
        fs::write(dir.path().join("top.txt"), "t").unwrap();

        let files: Vec<String> = LocalFilesystem
            .walk_files(dir.path())
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(files, ["src/EC/a.hpp", "src/EC/sub/b.hpp", "top.txt"]);
    }

    #[test]
    fn walk_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(LocalFilesystem.walk_files(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn readonly_tree_can_be_removed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pkg");
        fs::create_dir_all(root.join("src")).unwrap();
        let file = root.join("src/a.hpp");
        fs::write(&file, "a").unwrap();

        LocalFilesystem.set_readonly(&file).unwrap();
        assert!(fs::metadata(&file).unwrap().permissions().readonly());

        LocalFilesystem.remove_dir_all(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn copy_reports_bytes() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.hpp");
        fs::write(&from, "12345").unwrap();

        let copied = LocalFilesystem
            .copy_file(&from, &dir.path().join("b.hpp"))
            .unwrap();
        assert_eq!(copied, 5);
    }

    #[test]
    fn copy_of_readonly_source_yields_writable_destination() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.hpp");
        let to = dir.path().join("b.hpp");
        fs::write(&from, "a").unwrap();
        LocalFilesystem.set_readonly(&from).unwrap();

        LocalFilesystem.copy_file(&from, &to).unwrap();
        assert!(!fs::metadata(&to).unwrap().permissions().readonly());
    }

    #[cfg(unix)]
    #[test]
    fn repeated_copy_over_readonly_destination_succeeds() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.hpp");
        let to = dir.path().join("b.hpp");
        fs::write(&from, "first").unwrap();
        fs::write(&to, "stale").unwrap();
        fs::set_permissions(&to, fs::Permissions::from_mode(0o444)).unwrap();

        // Root ignores mode bits, so the overwrite would pass regardless.
        if fs::OpenOptions::new().write(true).open(&to).is_ok() {
            return;
        }

        assert_eq!(LocalFilesystem.copy_file(&from, &to).unwrap(), 5);
        assert_eq!(fs::read_to_string(&to).unwrap(), "first");

        fs::write(&from, "second").unwrap();
        LocalFilesystem.copy_file(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "second");
    }

    #[test]
    fn io_errors_carry_path_and_operation() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.hpp");

        let err = LocalFilesystem.read_file(&missing).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("read file"));
        assert!(message.contains("missing.hpp"));
    }
}
