use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use edfs_tree::{Client, RemotePath, Upload};
use futures::future::join_all;
use tracing::{error, info, warn};

/// Upload local files to the service
#[derive(Debug, Clone, Parser)]
pub struct UploadCommand {
    /// Local files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Destination path in the service.
    ///
    /// A directory when it is empty, ends with `/` or more than one file is given,
    /// the local file name is appended then.
    #[arg(long = "to", value_name = "REMOTE_PATH", default_value = "")]
    pub remote_path: String,
}

impl UploadCommand {
    pub async fn run(self, client: Client) -> Result<()> {
        let into_directory = self.files.len() > 1
            || self.remote_path.is_empty()
            || self.remote_path.ends_with('/');
        let destinations = self
            .files
            .iter()
            .map(|file| destination(&self.remote_path, file, into_directory))
            .collect::<Result<Vec<_>>>()?;

        // Every file is a separate request, they run concurrently
        let uploads = self.files.iter().zip(&destinations).map(|(file, remote_path)| {
            let client = client.clone();
            let remote_path = remote_path.clone();
            async move {
                let upload = Upload::from_path(file, remote_path)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                client
                    .upload(upload)
                    .await
                    .with_context(|| format!("Failed to upload {}", file.display()))
            }
        });
        let results = join_all(uploads).await;

        let mut failed = 0;
        for ((file, remote_path), result) in self.files.iter().zip(&destinations).zip(results) {
            match result {
                Ok(response) => match response.succeeded() {
                    Some(true) => info!("Uploaded {} to {remote_path}", file.display()),
                    Some(false) => {
                        failed += 1;
                        warn!("Service rejected {} for {remote_path}", file.display());
                    }
                    None => info!("Uploaded {}, answer: {}", file.display(), response.json()),
                },
                Err(err) => {
                    failed += 1;
                    error!("{err:?}");
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} uploads failed", self.files.len());
        }
        Ok(())
    }
}

/// Where `file` is stored: `remote_path` itself or, for a directory, the file name below it.
fn destination(remote_path: &str, file: &Path, into_directory: bool) -> Result<RemotePath> {
    let path = RemotePath::new(remote_path)?;
    if !into_directory {
        return Ok(path);
    }
    let Some(name) = file.file_name() else {
        bail!("{} has no file name", file.display());
    };
    Ok(path.join(&name.to_string_lossy())?)
}

#[test]
fn single_file_goes_to_given_path() {
    let path = destination("user/notes.txt", Path::new("local.txt"), false).unwrap();
    assert_eq!(path.to_string(), "/user/notes.txt");
}

#[test]
fn directory_gets_file_name_appended() {
    let path = destination("user/", Path::new("/tmp/notes.txt"), true).unwrap();
    assert_eq!(path.to_string(), "/user/notes.txt");

    let path = destination("", Path::new("notes.txt"), true).unwrap();
    assert_eq!(path.to_string(), "/notes.txt");
}

#[test]
fn dot_segments_in_destination_fail() {
    assert!(destination("../files", Path::new("a.txt"), false).is_err());
    assert!(destination("user", Path::new(".."), true).is_err());
}
