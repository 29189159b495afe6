//! Command-line interface.

pub mod context;
pub mod init;
pub mod login;
pub mod machines;
pub mod org;
pub mod output;
pub mod prompt;
pub mod pull;
pub mod push;
pub mod settings;
pub mod sync;
pub mod whoami;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::core::config;
use crate::error::Result;

/// nvolt - client-side encrypted secrets for machine fleets.
#[derive(Parser)]
#[command(
    name = "nvolt",
    about = "Client-side encrypted secrets for machine fleets",
    version
)]
pub struct Cli {
    /// Identity directory (default: ~/.nvolt)
    #[arg(long, global = true, env = "NVOLT_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create this machine's identity
    Init {
        /// Server base URL
        #[arg(long, env = "SERVER_BASE_URL")]
        server: Option<String>,
    },

    /// Show this machine's identity
    Whoami {
        /// Print the public key PEM instead
        #[arg(long)]
        public_key: bool,
    },

    /// Authenticate this machine with the server
    Login,

    /// Forget the session token
    Logout,

    /// List your organizations
    Orgs,

    /// Select the organization to work in
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// List machines enrolled in an organization
    Machines {
        #[arg(long)]
        org: Option<String>,
    },

    /// Enrol this machine (or another machine's public key)
    Enrol {
        #[arg(long)]
        org: Option<String>,
        /// Machine id of the key being enrolled
        #[arg(long, requires = "public_key")]
        machine_id: Option<String>,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// PEM file holding the machine's public key
        #[arg(long)]
        public_key: Option<PathBuf>,
    },

    /// List project environments with stored secrets
    Envs {
        #[arg(long)]
        org: Option<String>,
    },

    /// Encrypt and upload variables
    Push {
        /// KEY=VALUE pairs
        vars: Vec<String>,
        /// Read variables from a .env file
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        target: Target,
        /// Replace the scope instead of merging into it
        #[arg(long)]
        replace: bool,
    },

    /// Download and decrypt variables
    Pull {
        /// Only this variable
        key: Option<String>,
        #[command(flatten)]
        target: Target,
        /// Print as JSON
        #[arg(long, conflicts_with = "output")]
        json: bool,
        /// Print variable names and timestamps only
        #[arg(long, conflicts_with_all = ["json", "output", "key"])]
        list: bool,
        /// Write a .env file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-wrap scope keys for the current set of machines
    Sync {
        #[command(flatten)]
        target: Target,
        /// Every project environment in the organization
        #[arg(long)]
        all: bool,
    },

    /// View or change identity settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Which scope a command addresses.
#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    /// Project name (default: current directory name)
    #[arg(short, long)]
    pub project: Option<String>,
    /// Environment (default: configured default environment)
    #[arg(short, long)]
    pub env: Option<String>,
    /// Organization (default: active organization)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(Subcommand)]
pub enum OrgAction {
    /// Remember an organization as the active one
    Use { org_id: String },
    /// Forget the active organization
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set the server base URL
    Server { url: String },
    /// Set the default environment
    Env { name: String },
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    let root = match cli.config.as_deref() {
        Some(path) => config::resolve_root(Some(path), dirs::home_dir().as_deref())?,
        None => config::config_root()?,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        run(cli.command, root, cancel).await
    })
}

async fn run(command: Command, root: PathBuf, cancel: CancellationToken) -> Result<()> {
    use Command::*;

    let open = || context::open(&root, cancel.clone());

    match command {
        Init { server } => init::execute(&root, server),
        Whoami { public_key } => whoami::execute(&root, public_key),
        Login => login::login(open()?).await,
        Logout => login::logout(open()?),
        Orgs => org::list(open()?).await,
        Org { action } => match action {
            OrgAction::Use { org_id } => org::select(open()?, &org_id).await,
            OrgAction::Clear => org::clear(open()?),
        },
        Machines { org } => machines::list(open()?, org).await,
        Enrol {
            org,
            machine_id,
            name,
            public_key,
        } => machines::enrol(open()?, org, machine_id, name, public_key).await,
        Envs { org } => org::environments(open()?, org).await,
        Push {
            vars,
            file,
            target,
            replace,
        } => push::execute(open()?, &target, &vars, file.as_deref(), replace).await,
        Pull {
            key,
            target,
            json,
            list,
            output,
        } => {
            let format = match (output, json, list) {
                (Some(path), _, _) => pull::Format::File(path),
                (None, true, _) => pull::Format::Json,
                (None, false, true) => pull::Format::List,
                (None, false, false) => pull::Format::Env,
            };
            pull::execute(open()?, &target, key.as_deref(), format).await
        }
        Sync { target, all } => sync::execute(open()?, &target, all).await,
        Config { action } => settings::execute(&root, action),
    }
}
