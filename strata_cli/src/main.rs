use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::init_config::CmdConfig;

mod cmd;
mod config;
mod helpers;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// which client profile this command should use
    #[arg(short, long, value_name = "NAME", default_value = "default")]
    profile: String,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the client config of this profile
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Create a new storage instance
    Create {
        /// Store the returned token in this profile
        #[arg(long, action = ArgAction::SetTrue)]
        save: bool,
    },
    /// Print the id of the instance
    Id,
    /// List wallet addresses of the instance
    Addrs,
    /// Create a wallet address
    NewAddr {
        name: String,
        /// Key type, e.g. "bls" or "secp256k1"
        #[arg(long = "type", value_name = "TYPE")]
        addr_type: Option<String>,
        /// Use the address to fund cold storage by default
        #[arg(long, action = ArgAction::SetTrue)]
        make_default: bool,
    },
    /// Print the default storage config, or replace it
    DefaultConfig {
        /// TOML file with `[hot]` and `[cold]` tables
        #[arg(long, value_name = "FILE")]
        set: Option<PathBuf>,
    },
    /// Print the storage config of a content address
    CidConfig {
        cid: String,
        /// Print the default config prepared for the address instead
        #[arg(long, action = ArgAction::SetTrue)]
        default: bool,
    },
    /// Push a storage config for a content address
    Push {
        cid: String,
        /// TOML file with `[hot]` and `[cold]` tables; the default config
        /// applies if omitted
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Replace an existing custom config
        #[arg(long = "override", action = ArgAction::SetTrue)]
        override_config: bool,
        /// Follow the job until it finishes
        #[arg(short, long, action = ArgAction::SetTrue)]
        watch: bool,
    },
    /// Move the config of one content address to another
    Replace {
        from: String,
        to: String,
        #[arg(short, long, action = ArgAction::SetTrue)]
        watch: bool,
    },
    /// Stop tracking a content address whose storage is disabled
    Remove { cid: String },
    /// Show storage state of a content address
    Show { cid: String },
    /// Show instance balances, default config and pinned addresses
    Info,
    /// Upload a local file to hot storage and print its content address
    Add { path: PathBuf },
    /// Download hot-stored content into a local file
    Get {
        cid: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Follow job status updates; all jobs of the instance if none given
    Watch { jids: Vec<String> },
    /// Follow log messages for a content address
    Logs {
        cid: String,
        /// Only messages of this job
        #[arg(long, value_name = "JOB_ID")]
        jid: Option<String>,
    },
    /// Transfer funds between addresses
    Send { from: String, to: String, amount: u64 },
    /// Shut the instance down
    Close,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // Config layout:
    // - Default profile: ~/.config/strata/client.toml
    // - Other profiles:  ~/.config/strata/profiles/<name>.toml
    let dirs = ProjectDirs::from("", "", "strata")
        .context("failed to determine config directory path")?;

    let config_root = dirs.config_dir();
    let config_file = if cli.profile == "default" {
        config_root.join("client.toml")
    } else {
        config_root
            .join("profiles")
            .join(&cli.profile)
            .with_extension("toml")
    };

    cmd::run_command(config_file, cli.cmd).await
}
