//! `pallet export` - run only the export phase.

use serde_json::json;
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
    let RecipeSession {
        recipe,
        dir,
        controller,
    } = RecipeSession::open(&args.recipe_dir, &config)?;

    let reference = recipe.reference().clone();
    let package_root = controller.cache().package_root(&reference);
    let had_package = package_root.is_dir();

    let mut instance = controller.instance(recipe);
    let source = instance.export(&dir)?;

    if output.is_json() {
        output.json(&json!({
            "recipe": reference,
            "path": source.path(),
            "reused": source.is_reused(),
            "files": source.files().paths().collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    if source.is_reused() {
        output.success(&format!(
            "Exported {reference}: reusing {} (no_copy_source)",
            source.path().display()
        ))?;
    } else {
        output.success(&format!(
            "Exported {reference}: {} files ({} bytes) into {}",
            source.files().len(),
            source.files().total_bytes(),
            source.path().display()
        ))?;
    }
    if had_package {
        output.info(&format!(
            "Dropped the sealed package at {}; run `pallet create` to rebuild it",
            package_root.display()
        ))?;
    }
    Ok(())
}
