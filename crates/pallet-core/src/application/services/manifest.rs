//! Package manifests: sealing a package root and verifying it later.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DomainError, MANIFEST_FILE, PackageManifest, RelativePath},
    error::PalletResult,
};

/// Result of checking a package root against its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Manifest entries examined.
    pub checked: usize,
    /// Entries whose content still matches.
    pub passed: usize,
    pub failures: Vec<IntegrityFailure>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityFailure {
    pub path: RelativePath,
    pub issue: IntegrityIssue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Listed in the manifest, absent on disk.
    Missing,
    /// Content differs from the recorded digest.
    Modified { expected: String, actual: String },
    /// Present on disk, not listed in the manifest.
    Unexpected,
}

impl fmt::Display for IntegrityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            IntegrityIssue::Missing => write!(f, "{}: missing", self.path),
            IntegrityIssue::Modified { expected, actual } => {
                write!(f, "{}: expected {expected}, got {actual}", self.path)
            }
            IntegrityIssue::Unexpected => write!(f, "{}: not in manifest", self.path),
        }
    }
}

/// Computes, writes and checks [`PackageManifest`]s.
pub struct ManifestService {
    filesystem: Arc<dyn Filesystem>,
}

impl ManifestService {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Hash every file under `root` except the manifest itself.
    pub fn compute(&self, root: &Path) -> PalletResult<PackageManifest> {
        let mut manifest = PackageManifest::new();
        for relative in self.content_files(root)? {
            let digest = self.digest(&root.join(relative.as_path()))?;
            manifest.insert(relative, digest);
        }
        Ok(manifest)
    }

    pub fn write(&self, root: &Path, manifest: &PackageManifest) -> PalletResult<()> {
        self.filesystem
            .write_file(&root.join(MANIFEST_FILE), manifest.render().as_bytes())
    }

    pub fn load(&self, root: &Path) -> PalletResult<PackageManifest> {
        let path = root.join(MANIFEST_FILE);
        if !self.filesystem.exists(&path) {
            return Err(ApplicationError::ManifestMissing {
                root: root.to_path_buf(),
            }
            .into());
        }

        let bytes = self.filesystem.read_file(&path)?;
        let content = String::from_utf8(bytes).map_err(|_| DomainError::MalformedManifest {
            line: 0,
            reason: "manifest is not valid UTF-8".into(),
        })?;
        Ok(PackageManifest::parse(&content)?)
    }

    /// Write the manifest for `root` and make every file read-only.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn seal(&self, root: &Path) -> PalletResult<PackageManifest> {
        let manifest = self.compute(root)?;
        self.write(root, &manifest)?;

        for relative in self.filesystem.walk_files(root)? {
            self.filesystem.set_readonly(&root.join(relative.as_path()))?;
        }

        debug!(files = manifest.len(), "Package sealed");
        Ok(manifest)
    }

    /// Re-hash `root` and compare against its manifest.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn verify(&self, root: &Path) -> PalletResult<VerifyReport> {
        let manifest = self.load(root)?;
        let on_disk: BTreeSet<RelativePath> = self.content_files(root)?.into_iter().collect();

        let mut report = VerifyReport {
            checked: manifest.len(),
            ..Default::default()
        };

        for (path, expected) in manifest.iter() {
            if !on_disk.contains(path) {
                report.failures.push(IntegrityFailure {
                    path: path.clone(),
                    issue: IntegrityIssue::Missing,
                });
                continue;
            }

            let actual = self.digest(&root.join(path.as_path()))?;
            if actual == expected {
                report.passed += 1;
            } else {
                report.failures.push(IntegrityFailure {
                    path: path.clone(),
                    issue: IntegrityIssue::Modified {
                        expected: expected.to_string(),
                        actual,
                    },
                });
            }
        }

        for path in on_disk.iter().filter(|p| manifest.get(p).is_none()) {
            report.failures.push(IntegrityFailure {
                path: path.clone(),
                issue: IntegrityIssue::Unexpected,
            });
        }

        if !report.is_clean() {
            warn!(failures = report.failures.len(), "Package failed verification");
        }
        Ok(report)
    }

    fn content_files(&self, root: &Path) -> PalletResult<Vec<RelativePath>> {
        Ok(self
            .filesystem
            .walk_files(root)?
            .into_iter()
            .filter(|p| p.as_path() != Path::new(MANIFEST_FILE))
            .collect())
    }

    fn digest(&self, path: &Path) -> PalletResult<String> {
        let bytes = self.filesystem.read_file(path)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
