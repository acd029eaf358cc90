//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "pallet",
    bin_name = "pallet",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Header-only package recipes: export, package, publish",
    long_about = "Pallet turns a recipe.toml declaration into a sealed, \
                  versioned package root and publishes the include \
                  directories consumers build against.",
    after_help = "EXAMPLES:\n\
        \x20 pallet create ./ecms\n\
        \x20 pallet create ./ecms --output-format json\n\
        \x20 pallet inspect ./ecms\n\
        \x20 pallet verify ./ecms\n\
        \x20 pallet completions bash > /usr/share/bash-completion/completions/pallet",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export, package, and describe a recipe.
    #[command(
        about = "Export, package and describe a recipe",
        after_help = "EXAMPLES:\n\
            \x20 pallet create              # recipe.toml in the current directory\n\
            \x20 pallet create ./ecms\n\
            \x20 pallet create ./ecms --cache-dir /tmp/pallet-cache"
    )]
    Create(RecipeArgs),

    /// Run only the export phase.
    #[command(about = "Export a recipe's sources into the cache")]
    Export(RecipeArgs),

    /// Describe a package sealed by an earlier `create`.
    #[command(
        visible_alias = "info",
        about = "Describe a packaged recipe",
        after_help = "EXAMPLES:\n\
            \x20 pallet inspect ./ecms\n\
            \x20 pallet inspect ./ecms --output-format json"
    )]
    Inspect(RecipeArgs),

    /// Check a sealed package against its manifest.
    #[command(about = "Verify a packaged recipe against its manifest")]
    Verify(RecipeArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 pallet completions bash > ~/.local/share/bash-completion/completions/pallet\n\
            \x20 pallet completions zsh  > ~/.zfunc/_pallet\n\
            \x20 pallet completions fish > ~/.config/fish/completions/pallet.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Pallet configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 pallet config get cache.root\n\
            \x20 pallet config list\n\
            \x20 pallet config path"
    )]
    Config(ConfigCommands),
}

// ── recipe commands ───────────────────────────────────────────────────────────

/// Arguments shared by every command that operates on one recipe.
#[derive(Debug, Args)]
pub struct RecipeArgs {
    /// Directory holding `recipe.toml` and the library sources.
    #[arg(
        value_name = "RECIPE_DIR",
        default_value = ".",
        help = "Directory containing recipe.toml"
    )]
    pub recipe_dir: PathBuf,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `pallet completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `pallet config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `cache.root`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
