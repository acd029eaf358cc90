//! The recipe aggregate: a declarative description of how one library's
//! files are exported and packaged.
//!
//! A `Recipe` is immutable once built. It is constructed through
//! [`RecipeBuilder`], which performs all validation in `build()` so a
//! loaded or hand-written declaration fails in one place.

use std::fmt;

use crate::domain::{
    entities::descriptor::ArtifactLayout,
    error::DomainError,
    value_objects::{PackageName, PatternSet, RecipeRef, Version},
};

/// Free-form recipe metadata carried through for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeMetadata {
    pub description: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
}

/// A header-only (or compiled) library recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    reference: RecipeRef,
    metadata: RecipeMetadata,
    exports_sources: PatternSet,
    no_copy_source: bool,
    package_patterns: Option<PatternSet>,
    layout: ArtifactLayout,
}

impl Recipe {
    pub fn builder() -> RecipeBuilder {
        RecipeBuilder::default()
    }

    pub fn reference(&self) -> &RecipeRef {
        &self.reference
    }

    pub fn name(&self) -> &PackageName {
        self.reference.name()
    }

    pub fn version(&self) -> &Version {
        self.reference.version()
    }

    pub fn metadata(&self) -> &RecipeMetadata {
        &self.metadata
    }

    /// Patterns selecting the files the export phase snapshots.
    pub fn exports_sources(&self) -> &PatternSet {
        &self.exports_sources
    }

    /// When set, the host source tree is used directly as the source root.
    pub fn no_copy_source(&self) -> bool {
        self.no_copy_source
    }

    /// Recipe-level package patterns; `None` defers to the host default.
    pub fn package_patterns(&self) -> Option<&PatternSet> {
        self.package_patterns.as_ref()
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Builder for [`Recipe`].
///
/// Setters take raw strings; parsing and validation happen in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RecipeBuilder {
    name: Option<String>,
    version: Option<String>,
    metadata: RecipeMetadata,
    exports_sources: Vec<String>,
    no_copy_source: bool,
    package_patterns: Option<Vec<String>>,
    layout: Option<ArtifactLayout>,
}

impl RecipeBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.metadata.license = Some(license.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.metadata.url = Some(url.into());
        self
    }

    pub fn exports_sources<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports_sources = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn no_copy_source(mut self, no_copy_source: bool) -> Self {
        self.no_copy_source = no_copy_source;
        self
    }

    pub fn package_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.package_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self) -> Result<Recipe, DomainError> {
        let name = self
            .name
            .ok_or(DomainError::MissingRequiredField { field: "name" })?;
        let version = self
            .version
            .ok_or(DomainError::MissingRequiredField { field: "version" })?;

        let reference = RecipeRef::new(PackageName::parse(name)?, Version::parse(version)?);
        let exports_sources = PatternSet::parse(&self.exports_sources)?;
        let package_patterns = self
            .package_patterns
            .map(|p| PatternSet::parse(&p))
            .transpose()?;

        let layout = self.layout.unwrap_or_default();
        layout.validate()?;

        Ok(Recipe {
            reference,
            metadata: self.metadata,
            exports_sources,
            no_copy_source: self.no_copy_source,
            package_patterns,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ecms() -> RecipeBuilder {
        Recipe::builder()
            .name("ecms")
            .version("1.0")
            .exports_sources(["src/EC/*"])
            .no_copy_source(true)
    }

    #[test]
    fn builder_success() {
        let recipe = ecms()
            .layout(ArtifactLayout::header_only(["src"]).unwrap())
            .build()
            .unwrap();

        assert_eq!(recipe.reference().to_string(), "ecms/1.0");
        assert!(recipe.no_copy_source());
        assert_eq!(recipe.exports_sources().len(), 1);
        assert!(recipe.package_patterns().is_none());
        assert!(recipe.layout().is_header_only());
    }

    #[test]
    fn default_layout_infers_headers() {
        let recipe = ecms().build().unwrap();
        assert_eq!(recipe.layout(), &ArtifactLayout::inferred_headers());
    }

    #[test]
    fn missing_name_is_reported() {
        let result = Recipe::builder().version("1.0").build();
        assert_eq!(
            result.unwrap_err(),
            DomainError::MissingRequiredField { field: "name" }
        );
    }

    #[test]
    fn missing_version_is_reported() {
        let result = Recipe::builder().name("ecms").build();
        assert_eq!(
            result.unwrap_err(),
            DomainError::MissingRequiredField { field: "version" }
        );
    }

    #[test]
    fn invalid_export_pattern_fails_build() {
        let result = ecms().exports_sources(["src/[EC"]).build();
        assert!(matches!(result, Err(DomainError::InvalidPattern { .. })));
    }

    #[test]
    fn explicit_package_patterns_are_kept() {
        let recipe = ecms().package_patterns(["*.hpp", "*.h"]).build().unwrap();
        let patterns: Vec<_> = recipe.package_patterns().unwrap().iter().collect();
        assert_eq!(patterns, ["*.hpp", "*.h"]);
    }

    #[test]
    fn metadata_is_carried() {
        let recipe = ecms()
            .description("Entity component system")
            .license("MIT")
            .build()
            .unwrap();
        assert_eq!(
            recipe.metadata().description.as_deref(),
            Some("Entity component system")
        );
        assert_eq!(recipe.metadata().license.as_deref(), Some("MIT"));
        assert!(recipe.metadata().url.is_none());
    }
}
