//! # mdctl
//!
//! Main entry point for the metadata command-line tool.

#![forbid(unsafe_code)]

use clap::Parser;
use md_cli::cli::{Cli, Command};
use md_cli::commands::{
    run_arp, run_diff, run_export, run_import_feed, run_import_json, run_import_xml, run_schema,
    run_validate,
};
use md_cli::output::{error, violations};
use md_cli::{config, CliError, Context};
use md_core::Config;
use md_schema::SchemaError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit status of `diff --fail-on-change` when deltas were found.
const CHANGED: i32 = 2;

fn init_tracing(config: &Config, verbose: bool) {
    let directive = if verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(err: &CliError) {
    match err {
        CliError::Schema(SchemaError::Validation(validation)) => violations(validation),
        CliError::Import(md_codec::ImportError::Schema(SchemaError::Validation(validation))) => {
            violations(validation);
        }
        other => error(&other.to_string()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };
    init_tracing(&config, cli.verbose);
    let ctx = Context::new(config, cli.output);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args, &ctx).map(|()| 0),
        Command::ImportXml(args) => run_import_xml(args, &ctx).map(|()| 0),
        Command::ImportFeed(args) => run_import_feed(args, &ctx).map(|()| 0),
        Command::ImportJson(args) => run_import_json(args, &ctx).map(|()| 0),
        Command::Export(args) => run_export(args, &ctx).map(|()| 0),
        Command::Diff(args) => {
            let fail_on_change = args.fail_on_change;
            run_diff(args, &ctx)
                .await
                .map(|changed| if changed && fail_on_change { CHANGED } else { 0 })
        }
        Command::Arp(cmd) => run_arp(cmd, &ctx).map(|()| 0),
        Command::Schema(cmd) => run_schema(cmd, &ctx).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}
