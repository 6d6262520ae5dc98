//! Attribute release policy commands.

use md_arp::{ArpAttributes, ArpCodec};

use super::{read_json, Context};
use crate::cli::ArpCommand;
use crate::output::output_single;
use crate::CliError;

/// Runs an ARP command.
pub fn run_arp(cmd: ArpCommand, ctx: &Context) -> crate::CliResult<()> {
    match cmd {
        ArpCommand::Decode { serialized } => {
            let arp = ArpCodec::decode(&serialized)?;
            output_single(&arp.to_value(), ctx.output)
        }
        ArpCommand::Encode { file } => {
            let value = read_json(&file)?;
            let arp = ArpAttributes::from_value(&value).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "{} is not a policy of the form {{\"enabled\": bool, \"attributes\": {{...}}}}",
                    file.display()
                ))
            })?;
            println!("{}", ArpCodec::encode(&arp));
            Ok(())
        }
    }
}
