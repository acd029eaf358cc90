//! `pallet inspect` - describe a package sealed by an earlier run.

use tracing::instrument;

use crate::{
    cli::RecipeArgs,
    commands::RecipeSession,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(recipe_dir = %args.recipe_dir.display()))]
pub fn execute(args: RecipeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let session = RecipeSession::open(&args.recipe_dir, &config)?;
    let descriptor = session.controller.describe_cached(&session.recipe)?;
    output.descriptor(&descriptor)?;
    Ok(())
}
