//! `pallet verify` - check a sealed package against its manifest.

use serde_json::json;
use tracing::{info, instrument};

use crate::{
    cli::RecipeArgs,
    commands::RecipeSession,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(recipe_dir = %args.recipe_dir.display()))]
pub fn execute(args: RecipeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let session = RecipeSession::open(&args.recipe_dir, &config)?;
    let reference = session.recipe.reference();
    let report = session.controller.verify_cached(reference)?;
    let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();

    info!(
        recipe = %reference,
        checked = report.checked,
        failed = failures.len(),
        "Package verified"
    );

    if output.is_json() {
        output.json(&json!({
            "recipe": reference,
            "checked": report.checked,
            "passed": report.passed,
            "failures": failures,
        }))?;
    } else if report.is_clean() {
        output.success(&format!(
            "{reference}: {} files verified",
            report.checked
        ))?;
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::VerificationFailed {
            recipe: reference.to_string(),
            failures,
        })
    }
}
