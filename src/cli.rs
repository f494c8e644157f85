use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "owrt")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage OpenWrt configuration sections over LuCI JSON-RPC", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/owrt/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use a local file-backed device (~/.local/state/owrt/offline.toml) instead of connecting
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the supported resource types
    ListTypes,

    /// Show the schema of a resource type (or all of them)
    Schema {
        /// Resource type, e.g. openwrt_firewall_zone
        type_name: Option<String>,

        /// Show the data source schema instead
        #[arg(long)]
        data_source: bool,
    },

    /// Create a new section
    Create {
        /// Resource type
        type_name: String,

        #[command(flatten)]
        input: ModelInput,
    },

    /// Read a section into resource state
    Read {
        /// Resource type
        type_name: String,

        /// Resource identifier, e.g. firewall.zone.lan or firewall.zone.@0
        id: String,
    },

    /// Rewrite every attribute of an existing section
    Update {
        /// Resource type
        type_name: String,

        /// Resource identifier
        id: String,

        #[command(flatten)]
        input: ModelInput,
    },

    /// Delete a section (succeeds if it is already gone)
    Delete {
        /// Resource type
        type_name: String,

        /// Resource identifier
        id: String,
    },

    /// Import existing sections by identifier
    Import {
        /// Resource type
        type_name: String,

        /// One or more resource identifiers
        #[arg(required = true)]
        ids: Vec<String>,

        /// Number of parallel imports
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },

    /// Look up a section through the read-only data source
    Lookup {
        /// Resource type
        type_name: String,

        /// Resource identifier
        id: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where the planned model comes from.
#[derive(Args, Debug, Default)]
pub struct ModelInput {
    /// JSON file holding the model
    #[arg(short, long, value_name = "FILE", conflicts_with = "set")]
    pub file: Option<PathBuf>,

    /// Attribute assignment; lists are comma-separated
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}
