//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use pallet_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::RelativePath,
    error::PalletResult,
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can keep a handle while the controller
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    readonly: HashSet<PathBuf>,
    failing_reads: HashSet<PathBuf>,
    failing_renames: bool,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn require_parent(&self, path: &Path, operation: &'static str) -> PalletResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.directories.contains(parent) {
                return Err(ApplicationError::filesystem(
                    path,
                    operation,
                    "parent directory does not exist",
                )
                .into());
            }
        }
        Ok(())
    }

    fn require_writable(&self, path: &Path, operation: &'static str) -> PalletResult<()> {
        if self.readonly.contains(path) {
            return Err(ApplicationError::filesystem(path, operation, "permission denied").into());
        }
        Ok(())
    }

    fn read(&self, path: &Path, operation: &'static str) -> PalletResult<Vec<u8>> {
        if self.failing_reads.contains(path) {
            return Err(ApplicationError::filesystem(path, operation, "injected read failure").into());
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, operation, "no such file").into())
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Add a file, creating its parent directories (testing helper).
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        let path = path.as_ref();
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(parent) = path.parent() {
            inner.add_dirs(parent);
        }
        inner.files.insert(path.to_path_buf(), content.as_ref().to_vec());
    }

    /// Read a file's content (testing helper).
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// Check if a file is marked read-only.
    pub fn is_readonly(&self, path: impl AsRef<Path>) -> bool {
        self.inner
            .read()
            .map(|inner| inner.readonly.contains(path.as_ref()))
            .unwrap_or(false)
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every later read or copy of `path` fail.
    pub fn inject_read_failure(&self, path: impl AsRef<Path>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_reads.insert(path.as_ref().to_path_buf());
        }
    }

    /// Make every later rename fail.
    pub fn inject_rename_failure(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_renames = true;
        }
    }

    /// Clear all contents and injected failures.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = MemoryFilesystemInner::default();
        }
    }

    fn read_guard(&self) -> PalletResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn write_guard(&self) -> PalletResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> PalletResult<()> {
        let mut inner = self.write_guard()?;
        if inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem(path, "create directory", "file exists").into());
        }
        inner.add_dirs(path);
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> PalletResult<u64> {
        let mut inner = self.write_guard()?;
        let content = inner.read(from, "copy file")?;
        inner.require_parent(to, "copy file")?;
        inner.require_writable(to, "copy file")?;

        let size = content.len() as u64;
        inner.files.insert(to.to_path_buf(), content);
        Ok(size)
    }

    fn read_file(&self, path: &Path) -> PalletResult<Vec<u8>> {
        self.read_guard()?.read(path, "read file")
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> PalletResult<()> {
        let mut inner = self.write_guard()?;
        inner.require_parent(path, "write file")?;
        inner.require_writable(path, "write file")?;
        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn walk_files(&self, root: &Path) -> PalletResult<Vec<RelativePath>> {
        let inner = self.read_guard()?;
        if !inner.directories.contains(root) {
            return Err(ApplicationError::filesystem(root, "walk directory", "no such directory").into());
        }

        let mut files = Vec::new();
        for path in inner.files.keys() {
            if let Ok(relative) = path.strip_prefix(root) {
                files.push(RelativePath::try_new(relative)?);
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn rename(&self, from: &Path, to: &Path) -> PalletResult<()> {
        let mut inner = self.write_guard()?;
        if inner.failing_renames {
            return Err(ApplicationError::filesystem(from, "rename", "injected rename failure").into());
        }
        if inner.files.contains_key(to) || inner.directories.contains(to) {
            return Err(ApplicationError::filesystem(to, "rename", "destination exists").into());
        }
        inner.require_parent(to, "rename")?;

        let rebase = |p: &Path| -> Option<PathBuf> { p.strip_prefix(from).ok().map(|r| to.join(r)) };

        if let Some(content) = inner.files.remove(from) {
            if inner.readonly.remove(from) {
                inner.readonly.insert(to.to_path_buf());
            }
            inner.files.insert(to.to_path_buf(), content);
            return Ok(());
        }

        if !inner.directories.contains(from) {
            return Err(ApplicationError::filesystem(from, "rename", "no such file or directory").into());
        }

        let directories: Vec<PathBuf> = inner.directories.iter().cloned().collect();
        for dir in directories {
            if let Some(new) = rebase(&dir) {
                inner.directories.remove(&dir);
                inner.directories.insert(new);
            }
        }

        let files: Vec<PathBuf> = inner.files.keys().cloned().collect();
        for file in files {
            if let Some(new) = rebase(&file) {
                if let Some(content) = inner.files.remove(&file) {
                    inner.files.insert(new.clone(), content);
                }
                if inner.readonly.remove(&file) {
                    inner.readonly.insert(new);
                }
            }
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> PalletResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "remove directory", "no such directory").into());
        }

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.readonly.retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn set_readonly(&self, path: &Path) -> PalletResult<()> {
        let mut inner = self.write_guard()?;
        if !inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem(path, "set permissions", "no such file").into());
        }
        inner.readonly.insert(path.to_path_buf());
        Ok(())
    }
}
