//! Filesystem-based recipe loader.
//!
//! Reads a `recipe.toml` declaration and turns it into a domain [`Recipe`]
//! through [`RecipeBuilder`](pallet_core::domain::RecipeBuilder), so every
//! validation rule applies exactly as it does for recipes built in code.
//!
//! # `recipe.toml` format
//!
//! ```toml
//! [recipe]
//! name            = "ecms"
//! version         = "1.0"
//! description     = "Entity component system, header only"   # optional
//! license         = "MIT"                                    # optional
//! url             = "https://example.com/ecms"               # optional
//! exports_sources = ["src/EC/*"]
//! no_copy_source  = true
//!
//! [package]                  # optional
//! patterns = ["*.hpp"]       # defaults to the host default
//!
//! [info]                     # optional, defaults to inferred headers
//! kind        = "header-only"   # header-only | compiled
//! includedirs = ["src"]
//! # libdirs / bindirs only for kind = "compiled"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use pallet_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{ArtifactLayout, DomainError, Recipe},
    error::{PalletError, PalletResult},
};

/// File name the loader looks for inside a recipe directory.
pub const RECIPE_FILE: &str = "recipe.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `recipe.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RecipeManifest {
    pub recipe: RecipeSection,
    pub package: Option<PackageSection>,
    /// Artifact layout; see [`ArtifactLayout`] for the `kind` tag.
    pub info: Option<ArtifactLayout>,
}

/// `[recipe]` section - identity and export rules.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RecipeSection {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub exports_sources: Vec<String>,
    #[serde(default)]
    pub no_copy_source: bool,
}

/// `[package]` section - which files the package phase stages.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub patterns: Vec<String>,
}

impl RecipeManifest {
    /// Convert into a validated domain recipe.
    pub fn into_recipe(self) -> Result<Recipe, DomainError> {
        let RecipeSection {
            name,
            version,
            description,
            license,
            url,
            exports_sources,
            no_copy_source,
        } = self.recipe;

        let mut builder = Recipe::builder()
            .name(name)
            .version(version)
            .exports_sources(exports_sources)
            .no_copy_source(no_copy_source);

        if let Some(description) = description {
            builder = builder.description(description);
        }
        if let Some(license) = license {
            builder = builder.license(license);
        }
        if let Some(url) = url {
            builder = builder.url(url);
        }
        if let Some(package) = self.package {
            builder = builder.package_patterns(package.patterns);
        }
        if let Some(layout) = self.info {
            builder = builder.layout(layout);
        }

        builder.build()
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Recipe`]s from `recipe.toml` files.
///
/// Reads go through the [`Filesystem`] port so tests can feed declarations
/// from a `MemoryFilesystem`.
pub struct RecipeLoader<'fs> {
    filesystem: &'fs dyn Filesystem,
}

impl<'fs> RecipeLoader<'fs> {
    pub fn new(filesystem: &'fs dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Load `<dir>/recipe.toml`.
    pub fn load_dir(&self, dir: &Path) -> PalletResult<Recipe> {
        self.load_file(&dir.join(RECIPE_FILE))
    }

    /// Load a recipe declaration from an explicit path.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_file(&self, path: &Path) -> PalletResult<Recipe> {
        if !self.filesystem.exists(path) {
            return Err(ApplicationError::RecipeNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let bytes = self.filesystem.read_file(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|_| invalid(path, "file is not valid UTF-8"))?;

        let recipe = parse_recipe(&content, path)?;
        debug!(recipe = %recipe, "Recipe loaded");
        Ok(recipe)
    }
}

/// Parse `recipe.toml` content. `origin` names the file in error messages.
pub fn parse_recipe(content: &str, origin: &Path) -> PalletResult<Recipe> {
    let manifest: RecipeManifest =
        toml::from_str(content).map_err(|e| invalid(origin, e.to_string().trim()))?;

    manifest
        .into_recipe()
        .map_err(|e| invalid(origin, &e.to_string()))
}

fn invalid(origin: &Path, reason: &str) -> PalletError {
    PalletError::Configuration {
        message: format!("{}: {}", origin.display(), reason),
    }
}
