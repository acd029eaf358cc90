//! Value objects for recipe identity and file selection.
//!
//! All types here validate on construction; once built they cannot hold an
//! invalid name, version, or glob.

use std::{fmt, str::FromStr};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::domain::{entities::common::RelativePath, error::DomainError};

const MAX_IDENTIFIER_LEN: usize = 64;

// ============================================================================
// PackageName
// ============================================================================

/// Name of a packaged library, e.g. `ecms`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    pub fn parse(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let invalid = |reason: &str| DomainError::InvalidName {
            name: name.clone(),
            reason: reason.into(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("name is longer than 64 characters"));
        }
        if !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(invalid("must start with a lowercase letter or digit"));
        }
        if let Some(bad) = name.chars().find(|c| {
            !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '+'))
        }) {
            return Err(invalid(&format!("character '{bad}' is not allowed")));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PackageName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<PackageName> for String {
    fn from(n: PackageName) -> Self {
        n.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Version
// ============================================================================

/// Recipe version string, e.g. `1.0`.
///
/// Versions are opaque labels here; ordering and constraint solving belong
/// to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    pub fn parse(version: impl Into<String>) -> Result<Self, DomainError> {
        let version = version.into();
        let invalid = |reason: &str| DomainError::InvalidVersion {
            version: version.clone(),
            reason: reason.into(),
        };

        if version.is_empty() {
            return Err(invalid("version is empty"));
        }
        if version.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("version is longer than 64 characters"));
        }
        if version.chars().any(char::is_whitespace) {
            return Err(invalid("whitespace is not allowed"));
        }
        if version.contains(['/', '@', '\\']) {
            return Err(invalid("'/', '\\' and '@' are reserved"));
        }

        Ok(Self(version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RecipeRef
// ============================================================================

/// Recipe identity, displayed as `name/version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeRef {
    name: PackageName,
    version: Version,
}

impl RecipeRef {
    pub fn new(name: PackageName, version: Version) -> Self {
        Self { name, version }
    }

    /// Parse `name/version`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (name, version) = s
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidReference(s.to_string()))?;
        Ok(Self::new(PackageName::parse(name)?, Version::parse(version)?))
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl FromStr for RecipeRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecipeRef {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RecipeRef> for String {
    fn from(r: RecipeRef) -> Self {
        r.to_string()
    }
}

impl fmt::Display for RecipeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

// ============================================================================
// PatternSet
// ============================================================================

/// `*` crosses directory separators, so `*.hpp` selects headers at any
/// depth and `src/EC/*` selects the whole `src/EC` subtree.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Ordered set of validated glob patterns, evaluated against `/`-separated
/// relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// A set that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a list of glob patterns.
    ///
    /// Empty strings and invalid glob syntax are rejected.
    pub fn parse<I, S>(patterns: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                return Err(DomainError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: "pattern is empty".into(),
                });
            }
            if raw.starts_with('/') {
                return Err(DomainError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: "patterns are relative to the source root".into(),
                });
            }
            let pattern = Pattern::new(raw).map_err(|e| DomainError::InvalidPattern {
                pattern: raw.to_string(),
                reason: e.to_string(),
            })?;
            if !compiled.contains(&pattern) {
                compiled.push(pattern);
            }
        }
        Ok(Self { patterns: compiled })
    }

    /// `true` if any pattern matches the path.
    pub fn matches(&self, path: &RelativePath) -> bool {
        let candidate = path.to_slash_string();
        self.patterns
            .iter()
            .any(|p| p.matches_with(&candidate, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// The patterns as originally written.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }
}

impl TryFrom<Vec<String>> for PatternSet {
    type Error = DomainError;

    fn try_from(v: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(v)
    }
}

impl From<PatternSet> for Vec<String> {
    fn from(set: PatternSet) -> Self {
        set.iter().map(str::to_string).collect()
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(", ");
        write!(f, "[{joined}]")
    }
}
