//! Clap derive structures for the `ibmtf` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ibmtf -- drive IBM Cloud data sources and resources from the shell
#[derive(Debug, Parser)]
#[command(
    name = "ibmtf",
    version,
    about = "Read and manage IBM Cloud CBR, VPC and Schematics objects",
    long_about = "Runs the provider's data sources and resources outside Terraform.\n\n\
        Inputs are passed as --set key=value pairs or a JSON file; results are\n\
        printed as the state Terraform would record.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "IBMTF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Region for regional services such as VPC (overrides profile)
    #[arg(long, short = 'r', env = "IBMTF_REGION", global = true)]
    pub region: Option<String>,

    /// IBM Cloud API key
    #[arg(long, env = "IBMTF_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IBMTF_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, env = "IBMTF_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', env = "IBMTF_QUIET", global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', env = "IBMTF_YES", global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "IBMTF_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print data source and resource schemas
    Schema(SchemaArgs),

    /// Read a data source
    #[command(alias = "ds")]
    Data(DataArgs),

    /// Create, read, update or delete a resource
    #[command(alias = "res")]
    Resource(ResourceArgs),

    /// Browse Context-Based Restrictions objects directly
    Cbr(CbrArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Input Arguments ───────────────────────────────────────────

/// Attribute inputs for a data source or resource.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Set an attribute: key=value. Lists, sets and maps take JSON.
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// JSON object of attributes; --set entries override it
    #[arg(long, short = 'f', value_name = "FILE")]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCHEMA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Data source or resource type (e.g. ibm_cbr_zone); all when omitted
    pub name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DATA SOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Data source type (e.g. ibm_is_instance_network_interface)
    pub name: String,

    #[command(flatten)]
    pub input: InputArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Create a resource from the given inputs
    Create {
        /// Resource type (e.g. ibm_cbr_zone)
        name: String,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Refresh a resource from the server
    Read {
        name: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Replace a resource with the given inputs
    Update {
        name: String,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Delete a resource
    #[command(alias = "rm")]
    Delete {
        name: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Which existing object a resource command acts on.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Object ID
    #[arg(long)]
    pub id: Option<String>,

    /// Prior state as printed by `-o json` (supplies id and attributes)
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CBR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CbrArgs {
    #[command(subcommand)]
    pub command: CbrCommand,
}

#[derive(Debug, Subcommand)]
pub enum CbrCommand {
    /// Network zones
    Zones {
        #[command(subcommand)]
        command: CbrZonesCommand,
    },

    /// Restriction rules
    Rules {
        #[command(subcommand)]
        command: CbrRulesCommand,
    },

    /// Services that can be referenced from a serviceRef address
    Targets {
        /// Only platform services
        #[arg(long)]
        platform: bool,
    },

    /// Account quotas and usage
    Settings {
        #[command(flatten)]
        account: AccountArgs,
    },
}

#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account ID (overrides profile account_id)
    #[arg(long, env = "IBMTF_ACCOUNT_ID")]
    pub account_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CbrZonesCommand {
    /// List zones in the account
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        account: AccountArgs,

        /// Only zones with this exact name
        #[arg(long)]
        name: Option<String>,

        /// Sort field, e.g. name or -created_at
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show one zone
    Get {
        /// Zone ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CbrRulesCommand {
    /// List rules in the account
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        account: AccountArgs,

        /// Only rules protecting this service
        #[arg(long)]
        service_name: Option<String>,

        /// Only rules referencing this zone
        #[arg(long)]
        zone_id: Option<String>,
    },

    /// Show one rule
    Get {
        /// Rule ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Store an API key in the system keyring
    SetKey {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
