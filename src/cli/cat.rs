use anyhow::{bail, Context, Result};
use clap::Parser;
use edfs_tree::{Client, RemotePath};

/// Print the content of a file stored in the service
#[derive(Debug, Clone, Parser)]
pub struct CatCommand {
    /// Path of the file in the service, for example `user/notes.txt`
    pub path: RemotePath,
}

impl CatCommand {
    pub async fn run(self, client: Client) -> Result<()> {
        let content = client
            .fetch_file(&self.path)
            .await
            .with_context(|| format!("Failed to fetch {}", self.path))?;
        let Some(content) = content else {
            bail!("{} does not exist", self.path);
        };
        print!("{content}");
        Ok(())
    }
}
