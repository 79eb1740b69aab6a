use thiserror::Error;

/// Everything that can go wrong while fetching, rendering or uploading.
///
/// Each flow fails on its own: a failed upload does not affect a rendered tree and vice versa.
#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "client")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: url::Url, status: u16 },

    #[error("malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid tree: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("remote path {path:?} contains the segment {segment:?}")]
    RemotePath { path: String, segment: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Well formed JSON which is not a tree of `name` + `children` nodes.
    #[error("{0}")]
    Shape(String),

    #[error("nodes are nested deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },
}
