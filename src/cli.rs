use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sshdeploy::ConfigOverrides;

/// sshdeploy - push a build output tree to a remote host over SSH
#[derive(Parser, Debug)]
#[command(name = "sshdeploy")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Settings not given on the command line are read from SSHDEPLOY_* variables and ./sshdeploy.toml.")]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the source directory once
    Push {
        #[command(flatten)]
        deploy: DeployArgs,

        /// Run the pipeline against an in-memory remote
        #[arg(long)]
        dry_run: bool,
    },

    /// Keep a session open and redeploy whenever the source changes
    Monitor {
        #[command(flatten)]
        deploy: DeployArgs,

        /// Redeploy only when this file changes
        #[arg(long)]
        trigger_file: Option<PathBuf>,

        /// Quiet period before a burst of changes is deployed
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Wait for the first change instead of deploying at startup
        #[arg(long)]
        no_initial_deploy: bool,
    },
}

/// Options shared by `push` and `monitor`
#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Project config file (default: ./sshdeploy.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local directory to deploy
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Remote directory to deploy into
    #[arg(short, long)]
    pub target: Option<String>,

    /// Remote host name or address
    #[arg(long)]
    pub host: Option<String>,

    /// Remote SSH port
    #[arg(short = 'o', long)]
    pub port: Option<u16>,

    /// Remote user name
    #[arg(short, long)]
    pub username: Option<String>,

    /// Private key file passed to ssh
    #[arg(short, long)]
    pub identity: Option<PathBuf>,

    /// Command run on the remote host before uploading
    #[arg(long = "pre")]
    pub pre_command: Option<String>,

    /// Command started in a remote shell after uploading
    #[arg(long = "post")]
    pub post_command: Option<String>,

    /// Delete the target directory contents before uploading
    #[arg(long)]
    pub clean: bool,

    /// File name suffixes to skip, separated by '|'
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,

    /// Build configuration label
    #[arg(short, long)]
    pub configuration: Option<String>,

    /// Target framework label
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Runtime identifier used to select the dependency graph
    #[arg(long)]
    pub runtime: Option<String>,

    /// Package store holding dependency files
    #[arg(long)]
    pub package_store: Option<PathBuf>,
}

impl DeployArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            identity_file: self.identity.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            exclude: self.exclude.as_deref().map(|list| {
                list.split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            pre_command: self.pre_command.clone(),
            post_command: self.post_command.clone(),
            clean: self.clean.then_some(true),
            configuration: self.configuration.clone(),
            framework: self.framework.clone(),
            runtime_identifier: self.runtime.clone(),
            package_store: self.package_store.clone(),
            trigger_file: None,
        }
    }
}
