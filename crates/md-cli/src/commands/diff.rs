//! Diff command implementation.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use md_core::Value;
use md_push::{LogSink, PushDiffer, PushSnapshot};

use super::{read_json, Context};
use crate::cli::DiffArgs;
use crate::config::OutputFormat;
use crate::output::{output_single, success};
use crate::CliError;

/// Runs the diff command. Returns true if anything changed.
pub async fn run_diff(args: DiffArgs, ctx: &Context) -> crate::CliResult<bool> {
    let pre = read_snapshot(&args.pre)?;
    let post = read_snapshot(&args.post)?;

    let differ = PushDiffer::new(Arc::new(LogSink));
    let deltas = differ.push(&pre, &post).await?;

    match ctx.output {
        OutputFormat::Json => output_single(&deltas, ctx.output)?,
        OutputFormat::Text if deltas.is_empty() => success("No changes"),
        OutputFormat::Text => {
            for delta in &deltas {
                println!(
                    "{} {} {}: {} -> {}",
                    "~".yellow().bold(),
                    delta.entity_id,
                    delta.attribute.bold(),
                    delta.pre_push_value,
                    delta.post_push_value
                );
            }
        }
        OutputFormat::Quiet => {}
    }
    Ok(!deltas.is_empty())
}

fn read_snapshot(path: &Path) -> crate::CliResult<PushSnapshot> {
    let Value::Array(items) = read_json(path)? else {
        return Err(CliError::InvalidArgument(format!(
            "{} does not hold a JSON array of records",
            path.display()
        )));
    };
    let maps = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(CliError::InvalidArgument(format!(
                "record {index} of {} is not an object",
                path.display()
            ))),
        })
        .collect::<crate::CliResult<Vec<_>>>()?;
    Ok(PushSnapshot::from_maps(maps)?)
}
