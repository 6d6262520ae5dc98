//! Validate command implementation.

use md_model::EntityType;

use super::{read_json, Context};
use crate::cli::ValidateArgs;
use crate::output::success;

/// Runs the validate command.
pub fn run_validate(args: ValidateArgs, ctx: &Context) -> crate::CliResult<()> {
    let registry = ctx.registry()?;
    let entity_type = EntityType::from(args.entity_type);
    let document = read_json(&args.file)?;

    registry.validate(&document, entity_type.as_str())?;

    if ctx.verbose_output() {
        success(&format!("{} is a valid {} document", args.file.display(), entity_type));
    }
    Ok(())
}
