//! Export command implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use md_codec::MetadataExporter;
use md_core::Value;
use md_model::{EntityType, MetaDataDocument};

use super::{read_json, Context};
use crate::cli::{ExportArgs, ExportFormat};
use crate::output::output_single;
use crate::CliError;

/// Runs the export command.
pub fn run_export(args: ExportArgs, ctx: &Context) -> crate::CliResult<()> {
    let entity_type = EntityType::from(args.entity_type);
    let as_of = parse_as_of(args.as_of.as_deref())?;
    let docs = args
        .files
        .iter()
        .map(|path| load_document(path, entity_type))
        .collect::<crate::CliResult<Vec<_>>>()?;
    let exporter = MetadataExporter::from_config(&ctx.config.export);

    match args.format {
        ExportFormat::Xml => {
            let xml = match docs.as_slice() {
                [single] => exporter.export_to_xml(single, as_of)?,
                many => exporter.export_feed(many, as_of)?,
            };
            if ctx.verbose_output() {
                println!("{xml}");
            }
            Ok(())
        }
        ExportFormat::Json | ExportFormat::Flat => {
            let flatten = args.format == ExportFormat::Flat;
            let mut maps = docs
                .iter()
                .map(|doc| exporter.export_to_map(doc, flatten).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()?;
            if maps.len() == 1 {
                output_single(&maps.remove(0), ctx.output)
            } else {
                output_single(&maps, ctx.output)
            }
        }
    }
}

fn parse_as_of(as_of: Option<&str>) -> crate::CliResult<DateTime<Utc>> {
    match as_of {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|e| CliError::InvalidArgument(format!("--as-of '{text}': {e}"))),
        None => Ok(Utc::now()),
    }
}

fn load_document(path: &Path, entity_type: EntityType) -> crate::CliResult<MetaDataDocument> {
    match read_json(path)? {
        Value::Object(data) => Ok(MetaDataDocument::new(entity_type, data)),
        _ => Err(CliError::InvalidArgument(format!(
            "{} does not hold a JSON object",
            path.display()
        ))),
    }
}
