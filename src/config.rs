use std::str::FromStr;

use serde::Deserialize;
use url::Url;

use crate::render::DEFAULT_MAX_DEPTH;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8080/";

/**
    Configuration for talking to the service and rendering its tree.

    All fields are optional for parsing from a JSON string:

    - `server` defaults to `http://127.0.0.1:8080/`
    - `maxDepth` defaults to [`DEFAULT_MAX_DEPTH`]

    The server URL always ends with a slash so endpoint paths can be joined onto it,
    a server mounted below some path keeps that path.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: Url,
    pub max_depth: usize,
}

impl Config {
    /// Replace the server, keeping the other settings.
    #[must_use]
    pub fn with_server(mut self, server: Url) -> Self {
        self.server = with_trailing_slash(server);
        self
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigDeserializable::default().into()
    }
}

impl From<ConfigDeserializable> for Config {
    fn from(value: ConfigDeserializable) -> Self {
        let server = value.server.unwrap_or_else(default_server);
        Self {
            server: with_trailing_slash(server),
            max_depth: value.max_depth,
        }
    }
}

impl FromStr for Config {
    type Err = serde_json::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = ['\'', '"']
            .into_iter()
            .find_map(|quote| trimmed.strip_prefix(quote)?.strip_suffix(quote))
            .unwrap_or(trimmed);
        if trimmed.is_empty() || trimmed == "null" {
            Ok(Self::default())
        } else {
            let this = serde_json::from_str::<ConfigDeserializable>(trimmed)?;
            Ok(this.into())
        }
    }
}

/// Proxy struct for parsing a [`Config`], all fields are optional.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct ConfigDeserializable {
    server: Option<Url>,
    max_depth: usize,
}

impl Default for ConfigDeserializable {
    fn default() -> Self {
        Self {
            server: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_server() -> Url {
    Url::parse(DEFAULT_SERVER).expect("default server is a valid URL")
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[test]
fn parse_config() {
    let full_conf = r#"
    {
        "server": "http://localhost:9000/",
        "maxDepth": 8
    }
    "#;
    assert!("".parse::<Config>().is_ok());
    assert!("''".parse::<Config>().is_ok());
    assert!("null".parse::<Config>().is_ok());
    assert!("{}".parse::<Config>().is_ok());
    assert!("'{}'".parse::<Config>().is_ok());
    assert!(r#""{}""#.parse::<Config>().is_ok());

    // A lone quote is no quoted string
    assert!("'".parse::<Config>().is_err());
    assert!(" \" ".parse::<Config>().is_err());

    let config = full_conf.parse::<Config>().unwrap();
    assert_eq!(config.server.as_str(), "http://localhost:9000/");
    assert_eq!(config.max_depth, 8);
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.server.as_str(), DEFAULT_SERVER);
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
}

#[test]
fn server_path_gets_trailing_slash() {
    let config = r#"{"server": "http://localhost:9000/edfs"}"#
        .parse::<Config>()
        .unwrap();
    assert_eq!(config.server.as_str(), "http://localhost:9000/edfs/");
    assert_eq!(
        config.server.join("files").unwrap().as_str(),
        "http://localhost:9000/edfs/files"
    );
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(r#"{"sever": "http://localhost/"}"#.parse::<Config>().is_err());
}

#[test]
fn with_server_overrides() {
    let config = Config::default().with_server(Url::parse("http://example.com").unwrap());
    assert_eq!(config.server.as_str(), "http://example.com/");
}
