use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use edfs_tree::{Client, Element};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// Indented text, `+` marks directories
    #[default]
    Outline,
    /// Nested `ul` lists inside a `div`
    Html,
}

/// Fetch the file tree and print it
#[derive(Debug, Clone, Parser)]
pub struct TreeCommand {
    #[arg(long, value_enum, default_value_t)]
    pub format: TreeFormat,

    /// Id of the container element in HTML output
    #[arg(long, default_value = "tree")]
    pub container_id: String,
}

impl TreeCommand {
    pub async fn run(self, client: Client) -> Result<()> {
        let mut container = Element::container(self.container_id);
        client
            .fetch_tree(&mut container)
            .await
            .with_context(|| format!("Failed to load the file tree from {}", client.config().server))?;
        debug!("Rendered {} top level lists", container.lists().count());

        match self.format {
            TreeFormat::Outline => print!("{}", container.outline()),
            TreeFormat::Html => println!("{}", container.to_html()),
        }
        Ok(())
    }
}
