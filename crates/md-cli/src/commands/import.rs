//! Import command implementations.

use std::fs::File;
use std::io::BufReader;

use md_core::Value;
use md_model::EntityType;

use super::{read_json, Context};
use crate::cli::{ImportFeedArgs, ImportJsonArgs, ImportXmlArgs};
use crate::output::{info, output_single, warning};

/// Runs the import-xml command.
pub fn run_import_xml(args: ImportXmlArgs, ctx: &Context) -> crate::CliResult<()> {
    let importer = ctx.importer()?;
    let entity_type = EntityType::from(args.entity_type);
    let reader = BufReader::new(File::open(&args.file)?);

    let mut imported = importer.import_xml(reader, entity_type, args.entity_id.as_deref())?;
    if args.defaults {
        imported = importer.with_defaults(entity_type, imported)?;
    }
    output_single(&imported, ctx.output)
}

/// Runs the import-feed command.
///
/// Entities that fail to import are skipped by the feed reader; a syntax
/// error stops the import but the entities read so far are still printed.
pub fn run_import_feed(args: ImportFeedArgs, ctx: &Context) -> crate::CliResult<()> {
    let importer = ctx.importer()?;
    let entity_type = EntityType::from(args.entity_type);
    let reader = BufReader::new(File::open(&args.file)?);

    let mut entities = importer.import_feed_of(reader, entity_type)?;
    let mut imported = Vec::new();
    let mut failure = None;
    for result in &mut entities {
        match result {
            Ok(map) => imported.push(Value::Object(map)),
            Err(err) => failure = Some(err),
        }
    }

    output_single(&imported, ctx.output)?;
    let summary = entities.summary();
    if ctx.verbose_output() {
        info(&format!(
            "{} {} entit(ies) imported, {} skipped",
            summary.imported, entity_type, summary.skipped
        ));
        if summary.skipped > 0 {
            warning("Skipped entities are listed in the log (RUST_LOG=warn)");
        }
    }
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Runs the import-json command.
pub fn run_import_json(args: ImportJsonArgs, ctx: &Context) -> crate::CliResult<()> {
    let importer = ctx.importer()?;
    let entity_type = EntityType::from(args.entity_type);
    let nested = read_json(&args.file)?;

    let mut imported = importer.import_json(entity_type, &nested)?;
    if args.defaults {
        imported = importer.with_defaults(entity_type, imported)?;
    }
    output_single(&imported, ctx.output)
}
