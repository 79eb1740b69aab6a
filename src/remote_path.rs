use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Destination path of an upload or path of a file on the service.
///
/// Stored as segments so they can be percent-encoded one by one before they end up in a URL.
/// Empty segments are dropped: leading, trailing and repeated slashes have no meaning.
///
/// `.` and `..` segments are rejected.
/// Joining the request URL would resolve them and the request could end up on another endpoint.
///
/// # Example
///
/// ```
/// # use edfs_tree::RemotePath;
/// let path = RemotePath::new("/my docs//report #1.txt")?;
/// assert_eq!(path.segments(), ["my docs", "report #1.txt"]);
/// assert_eq!(path.encoded(), "my%20docs/report%20%231.txt");
///
/// assert!(RemotePath::new("../files").is_err());
/// # Ok::<(), edfs_tree::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// # Errors
    ///
    /// [`Error::RemotePath`] when a segment is `.` or `..`.
    pub fn new(path: &str) -> Result<Self, Error> {
        Self::default().join(path)
    }

    /// Append the segments of `path`.
    ///
    /// # Errors
    ///
    /// [`Error::RemotePath`] when a segment is `.` or `..`.
    pub fn join(mut self, path: &str) -> Result<Self, Error> {
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            if matches!(segment, "." | "..") {
                return Err(Error::RemotePath {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                });
            }
            self.segments.push(segment.to_owned());
        }
        Ok(self)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Percent-encode every segment and join them with `/`.
    #[must_use]
    pub fn encoded(&self) -> String {
        self.segments
            .iter()
            .map(|segment| urlencoding::encode(segment))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl FromStr for RemotePath {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[test]
fn plain_path_stays_as_is() {
    let path = RemotePath::new("user/notes.txt").unwrap();
    assert_eq!(path.encoded(), "user/notes.txt");
    assert_eq!(path.to_string(), "/user/notes.txt");
}

#[test]
fn segments_are_encoded_one_by_one() {
    let path = RemotePath::new("a?b/c%d/e f").unwrap();
    assert_eq!(path.encoded(), "a%3Fb/c%25d/e%20f");
}

#[test]
fn encoded_dots_stay_literal() {
    let path = RemotePath::new("%2e%2e/files").unwrap();
    assert_eq!(path.encoded(), "%252e%252e/files");
}

#[test]
fn unicode_is_encoded() {
    let path = RemotePath::new("über.txt").unwrap();
    assert_eq!(path.encoded(), "%C3%BCber.txt");
}

#[test]
fn empty_segments_are_dropped() {
    let path = RemotePath::new("//user///notes.txt/").unwrap();
    assert_eq!(path.segments(), ["user", "notes.txt"]);
}

#[test]
fn empty_path_is_root() {
    let path: RemotePath = "".parse().unwrap();
    assert!(path.is_root());
    assert_eq!(path.encoded(), "");
    assert_eq!(path.to_string(), "/");
}

#[test]
fn dot_segments_are_rejected() {
    for path in ["../files", "user/..", "./notes.txt", "a/./b", ".."] {
        let result = RemotePath::new(path);
        assert!(
            matches!(&result, Err(Error::RemotePath { path: given, .. }) if given == path),
            "{path} gave {result:?}"
        );
    }
}

#[test]
fn names_starting_with_dots_are_fine() {
    let path = RemotePath::new(".config/.../a..b").unwrap();
    assert_eq!(path.segments(), [".config", "...", "a..b"]);
}

#[test]
fn join_appends_and_checks_segments() {
    let directory = RemotePath::new("user").unwrap();
    let path = directory.clone().join("docs/notes.txt").unwrap();
    assert_eq!(path.segments(), ["user", "docs", "notes.txt"]);
    assert!(directory.join("..").is_err());
}
