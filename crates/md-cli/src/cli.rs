//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use md_model::EntityType;

use crate::config::OutputFormat;

/// mdctl - federation metadata tool.
#[derive(Debug, Parser)]
#[command(name = "mdctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(short, long, env = "MDCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Schema directory (overrides config).
    #[arg(long, global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a canonical JSON document against its schema.
    Validate(ValidateArgs),

    /// Import one entity from SAML metadata XML.
    ImportXml(ImportXmlArgs),

    /// Import every entity of an aggregate feed.
    ImportFeed(ImportFeedArgs),

    /// Import a nested JSON document.
    ImportJson(ImportJsonArgs),

    /// Export canonical documents as XML or JSON.
    Export(ExportArgs),

    /// Compare pre/post push snapshots.
    Diff(DiffArgs),

    /// Attribute release policy utilities.
    #[command(subcommand)]
    Arp(ArpCommand),

    /// Schema registry introspection.
    #[command(subcommand)]
    Schema(SchemaCommand),
}

/// Entity type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// SAML service provider.
    #[value(name = "saml20_sp")]
    SamlSp,
    /// SAML identity provider.
    #[value(name = "saml20_idp")]
    SamlIdp,
    /// OpenID Connect relying party.
    #[value(name = "oidc10_rp")]
    OidcRp,
}

impl From<TypeArg> for EntityType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::SamlSp => Self::SamlSp,
            TypeArg::SamlIdp => Self::SamlIdp,
            TypeArg::OidcRp => Self::OidcRp,
        }
    }
}

/// Arguments of `validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Entity type.
    #[arg(short = 't', long = "type", value_enum, default_value = "saml20_sp")]
    pub entity_type: TypeArg,

    /// Canonical JSON document.
    pub file: PathBuf,
}

/// Arguments of `import-xml`.
#[derive(Debug, Args)]
pub struct ImportXmlArgs {
    /// Entity type.
    #[arg(short = 't', long = "type", value_enum, default_value = "saml20_sp")]
    pub entity_type: TypeArg,

    /// Entity to import when the file holds several.
    #[arg(long)]
    pub entity_id: Option<String>,

    /// Merge the result into the type's template.
    #[arg(long)]
    pub defaults: bool,

    /// Metadata XML file.
    pub file: PathBuf,
}

/// Arguments of `import-feed`.
#[derive(Debug, Args)]
pub struct ImportFeedArgs {
    /// Entity type.
    #[arg(short = 't', long = "type", value_enum, default_value = "saml20_sp")]
    pub entity_type: TypeArg,

    /// Aggregate feed XML file.
    pub file: PathBuf,
}

/// Arguments of `import-json`.
#[derive(Debug, Args)]
pub struct ImportJsonArgs {
    /// Entity type.
    #[arg(short = 't', long = "type", value_enum, default_value = "saml20_sp")]
    pub entity_type: TypeArg,

    /// Merge the result into the type's template.
    #[arg(long)]
    pub defaults: bool,

    /// Nested JSON document.
    pub file: PathBuf,
}

/// Export target format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// SAML metadata XML.
    #[default]
    Xml,
    /// Nested JSON.
    Json,
    /// Flat JSON with dotted keys.
    Flat,
}

/// Arguments of `export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Entity type of the documents.
    #[arg(short = 't', long = "type", value_enum, default_value = "saml20_sp")]
    pub entity_type: TypeArg,

    /// Target format.
    #[arg(short, long, value_enum, default_value = "xml")]
    pub format: ExportFormat,

    /// Export clock as RFC 3339 (defaults to now).
    #[arg(long)]
    pub as_of: Option<String>,

    /// Canonical JSON documents. Several documents export as one feed.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments of `diff`.
#[derive(Debug, Args)]
pub struct DiffArgs {
    /// JSON array of flat records before the push.
    pub pre: PathBuf,

    /// JSON array of flat records after the push.
    pub post: PathBuf,

    /// Exit with status 2 when deltas were found.
    #[arg(long)]
    pub fail_on_change: bool,
}

/// ARP commands.
#[derive(Debug, Subcommand)]
pub enum ArpCommand {
    /// Decode a serialized policy to JSON.
    Decode {
        /// Serialized policy (`N;` for none).
        serialized: String,
    },

    /// Encode a JSON policy (`{enabled, attributes}`).
    Encode {
        /// JSON file holding the policy.
        file: PathBuf,
    },
}

/// Schema commands.
#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// List registered entity types.
    List,

    /// Show multiplicities and index hints of a type.
    Show {
        /// Entity type.
        #[arg(value_enum)]
        entity_type: TypeArg,
    },

    /// Print the default document of a type.
    Template {
        /// Entity type.
        #[arg(value_enum)]
        entity_type: TypeArg,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_import_with_global_flags() {
        let cli = Cli::try_parse_from([
            "mdctl",
            "import-xml",
            "--type",
            "saml20_idp",
            "--entity-id",
            "https://idp.example.org",
            "idp.xml",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::ImportXml(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(EntityType::from(args.entity_type), EntityType::SamlIdp);
        assert_eq!(args.entity_id.as_deref(), Some("https://idp.example.org"));
        assert!(!args.defaults);
    }

    #[test]
    fn export_requires_files() {
        assert!(Cli::try_parse_from(["mdctl", "export"]).is_err());
        let cli = Cli::try_parse_from(["mdctl", "export", "-f", "flat", "a.json", "b.json"]).unwrap();
        let Command::Export(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.format, ExportFormat::Flat);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn arp_subcommands() {
        let cli = Cli::try_parse_from(["mdctl", "arp", "decode", "N;"]).unwrap();
        assert!(matches!(cli.command, Command::Arp(ArpCommand::Decode { ref serialized }) if serialized == "N;"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
