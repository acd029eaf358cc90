//! Package manifest: the per-file digest list sealed into a package root.
//!
//! # Format
//!
//! One line per file, sorted by path, `/` separated:
//!
//! ```text
//! src/EC/Bitset.hpp: 3b1f...e9
//! src/EC/Manager.hpp: 9a0c...41
//! ```
//!
//! Blank lines are ignored. Digests are lowercase hex SHA-256.

use std::collections::BTreeMap;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// File name of the manifest inside a package root.
pub const MANIFEST_FILE: &str = ".pallet-manifest";

const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    entries: BTreeMap<RelativePath, String>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath, digest: impl Into<String>) {
        self.entries.insert(path, digest.into());
    }

    pub fn get(&self, path: &RelativePath) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &str)> {
        self.entries.iter().map(|(p, d)| (p, d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render in the on-disk format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (path, digest) in &self.entries {
            out.push_str(&format!("{path}: {digest}\n"));
        }
        out
    }

    /// Parse the on-disk format.
    pub fn parse(content: &str) -> Result<Self, DomainError> {
        let mut manifest = Self::new();

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = |reason: &str| DomainError::MalformedManifest {
                line: line_no,
                reason: reason.into(),
            };

            let (path, digest) = line
                .rsplit_once(": ")
                .ok_or_else(|| malformed("expected '<path>: <digest>'"))?;

            if digest.len() != DIGEST_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed("digest is not a sha256 hex string"));
            }

            let path = RelativePath::try_new(path)
                .map_err(|e| malformed(&format!("invalid path: {e}")))?;

            if manifest.entries.contains_key(&path) {
                return Err(malformed(&format!("duplicate entry for {path}")));
            }
            manifest.insert(path, digest.to_ascii_lowercase());
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST_A: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const DIGEST_B: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

    #[test]
    fn render_is_sorted_by_path() {
        let mut manifest = PackageManifest::new();
        manifest.insert(RelativePath::try_new("src/EC/b.hpp").unwrap(), DIGEST_B);
        manifest.insert(RelativePath::try_new("src/EC/a.hpp").unwrap(), DIGEST_A);

        let rendered = manifest.render();
        assert_eq!(
            rendered,
            format!("src/EC/a.hpp: {DIGEST_A}\nsrc/EC/b.hpp: {DIGEST_B}\n")
        );
        assert_eq!(PackageManifest::parse(&rendered).unwrap(), manifest);
    }

    #[test]
    fn parse_skips_blank_lines() {
        let manifest = PackageManifest::parse(&format!("\nfoo.hpp: {DIGEST_A}\n\n")).unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn parse_rejects_short_digest() {
        let err = PackageManifest::parse("foo.hpp: abc123").unwrap_err();
        assert!(matches!(err, DomainError::MalformedManifest { line: 1, .. }));
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let err = PackageManifest::parse(&format!("foo.hpp {DIGEST_A}")).unwrap_err();
        assert!(matches!(err, DomainError::MalformedManifest { .. }));
    }

    #[test]
    fn parse_rejects_escaping_paths() {
        let err = PackageManifest::parse(&format!("../foo.hpp: {DIGEST_A}")).unwrap_err();
        assert!(matches!(err, DomainError::MalformedManifest { .. }));
    }

    #[test]
    fn parse_rejects_duplicates() {
        let content = format!("a.hpp: {DIGEST_A}\na.hpp: {DIGEST_B}\n");
        let err = PackageManifest::parse(&content).unwrap_err();
        assert!(matches!(err, DomainError::MalformedManifest { line: 2, .. }));
    }
}
