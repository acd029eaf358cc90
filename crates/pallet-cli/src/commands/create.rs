//! `pallet create` - export, package and describe a recipe.

use tracing::{info, instrument};

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
    let mut instance = controller.instance(recipe);
    let descriptor = instance.create(&dir)?;

    if let Some(package) = instance.state().package_root() {
        info!(
            recipe = %reference,
            files = package.files().len(),
            "Package sealed"
        );
        if !output.is_json() {
            output.success(&format!(
                "Packaged {reference} ({} files) into {}",
                package.files().len(),
                package.path().display()
            ))?;
        }
    }

    output.descriptor(&descriptor)?;
    Ok(())
}
