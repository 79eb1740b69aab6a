use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use edfs_tree::{Client, Config};
use tracing::debug;
use url::Url;

mod browse;
mod cat;
mod logging;
mod tree;
mod upload;

use browse::*;
use cat::*;
use logging::*;
use tree::*;
use upload::*;

#[derive(Debug, Clone, Subcommand)]
pub enum CliSubcommand {
    Tree(TreeCommand),
    Upload(UploadCommand),
    Cat(CatCommand),
    Browse(BrowseCommand),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Connection {
    /// Settings as JSON, for example '{"server": "http://127.0.0.1:8080/", "maxDepth": 64}'
    #[arg(long, global = true)]
    pub settings: Option<Config>,

    /// Base URL of the service, takes precedence over the settings
    #[arg(long, global = true, env = "EDFS_SERVER")]
    pub server: Option<Url>,
}

impl Connection {
    pub fn config(&self) -> Config {
        let config = self.settings.clone().unwrap_or_default();
        match &self.server {
            Some(server) => config.with_server(server.clone()),
            None => config,
        }
    }

    pub fn client(&self) -> Client {
        let config = self.config();
        debug!("Using config: {config:#?}");
        Client::new(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    connection: Connection,

    #[clap(subcommand)]
    subcommand: CliSubcommand,
}

impl Cli {
    pub fn new() -> Self {
        Self::parse()
    }

    pub async fn run(self) -> Result<()> {
        setup_tracing();

        let client = self.connection.client();
        match self.subcommand {
            CliSubcommand::Tree(cmd) => cmd.run(client).await,
            CliSubcommand::Upload(cmd) => cmd.run(client).await,
            CliSubcommand::Cat(cmd) => cmd.run(client).await,
            CliSubcommand::Browse(cmd) => cmd.run(client).await,
        }
    }
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn server_flag_overrides_settings() {
    let cli = Cli::parse_from([
        "edfs-tree",
        "--settings",
        r#"{"server": "http://a.example/", "maxDepth": 3}"#,
        "--server",
        "http://b.example/edfs",
        "tree",
    ]);
    let config = cli.connection.config();
    assert_eq!(config.server.as_str(), "http://b.example/edfs/");
    assert_eq!(config.max_depth, 3);
}
