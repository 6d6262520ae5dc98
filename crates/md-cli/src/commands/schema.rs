//! Schema introspection commands.

use std::collections::BTreeMap;

use md_model::EntityType;
use serde_json::json;

use super::Context;
use crate::cli::SchemaCommand;
use crate::config::OutputFormat;
use crate::output::output_single;

/// Runs a schema command.
pub fn run_schema(cmd: SchemaCommand, ctx: &Context) -> crate::CliResult<()> {
    let registry = ctx.registry()?;
    match cmd {
        SchemaCommand::List => {
            let types: Vec<&str> = registry.types().collect();
            match ctx.output {
                OutputFormat::Text => types.iter().for_each(|name| println!("{name}")),
                _ => output_single(&types, ctx.output)?,
            }
            Ok(())
        }
        SchemaCommand::Show { entity_type } => {
            let entity_type = EntityType::from(entity_type);
            let descriptor = registry.schema(entity_type.as_str())?;
            let multiplicities: BTreeMap<&str, usize> = descriptor.multiplicities().collect();
            let summary = json!({
                "entityType": descriptor.entity_type(),
                "path": descriptor.path().display().to_string(),
                "multiplicities": multiplicities,
                "indexes": descriptor.indexes(),
            });
            output_single(&summary, ctx.output)
        }
        SchemaCommand::Template { entity_type } => {
            let entity_type = EntityType::from(entity_type);
            output_single(&registry.template(entity_type.as_str())?, ctx.output)
        }
    }
}
