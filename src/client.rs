use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::document::Element;
use crate::error::Error;
use crate::remote_path::RemotePath;
use crate::render::Renderer;
use crate::tree_node::FileListing;

/// HTTP client for the file listing, file download and upload endpoints of the service.
///
/// Holds no mutable state, clones share the connection pool and can be used concurrently.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Config,
}

impl Client {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.config.server.join(path)?)
    }

    /// Fetch the file tree from `GET /files`.
    ///
    /// # Errors
    ///
    /// Errors when the request fails, the service answers with an error status or the body is no valid listing.
    pub async fn list_files(&self) -> Result<FileListing, Error> {
        let url = self.endpoint("files")?;
        debug!(%url, "fetching file listing");
        let response = success(self.http.get(url).send().await?)?;
        let body = response.bytes().await?;
        FileListing::from_slice_bounded(&body, self.config.max_depth)
    }

    /// Fetch the file tree and render it into `container`.
    ///
    /// The container is only changed when fetching and rendering both succeeded.
    ///
    /// # Errors
    ///
    /// See [`list_files`](Self::list_files) and [`Renderer::render`].
    pub async fn fetch_tree(&self, container: &mut Element) -> Result<(), Error> {
        let listing = self.list_files().await?;
        Renderer::new()
            .max_depth(self.config.max_depth)
            .render(container, &listing.children)
    }

    /// Download the content of a single file from `GET /file/{path}`.
    ///
    /// Returns `None` when the service does not know the file.
    ///
    /// # Errors
    ///
    /// Errors when the request fails or the service answers with an error status other than 404.
    pub async fn fetch_file(&self, path: &RemotePath) -> Result<Option<String>, Error> {
        let url = self.endpoint(&format!("file/{}", path.encoded()))?;
        debug!(%url, "fetching file");
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let content = success(response)?.text().await?;
        Ok(Some(content))
    }

    /// Send one file to `POST /upload/{remote path}` as multipart field `file`.
    ///
    /// The JSON answer is logged and returned, it has no further meaning to this client.
    ///
    /// # Errors
    ///
    /// Errors when the request fails, the service answers with an error status or the answer is no JSON.
    pub async fn upload(&self, upload: Upload) -> Result<UploadResponse, Error> {
        let url = self.endpoint(&format!("upload/{}", upload.remote_path.encoded()))?;
        debug!(%url, file_name = %upload.file_name, bytes = upload.contents.len(), "uploading");

        let part = Part::bytes(upload.contents).file_name(upload.file_name);
        let form = Form::new().part("file", part);
        let response = success(self.http.post(url.clone()).multipart(form).send().await?)?;
        let body = response.bytes().await?;
        let json = serde_json::from_slice::<Value>(&body).map_err(Error::Decode)?;

        info!(%url, response = %json, "upload answered");
        Ok(UploadResponse(json))
    }
}

fn success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            url: response.url().clone(),
            status: status.as_u16(),
        })
    }
}

/// A file to be sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name of the multipart part.
    pub file_name: String,
    pub contents: Vec<u8>,
    /// Where the service should store the file.
    pub remote_path: RemotePath,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, contents: Vec<u8>, remote_path: RemotePath) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
            remote_path,
        }
    }

    /// Read a local file to upload it to `remote_path`.
    ///
    /// # Errors
    ///
    /// Errors when the file can not be read.
    pub async fn from_path(local: impl AsRef<Path>, remote_path: RemotePath) -> Result<Self, Error> {
        let local = local.as_ref();
        let contents = tokio::fs::read(local).await?;
        let file_name = local
            .file_name()
            .map_or_else(|| "file".to_owned(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, contents, remote_path))
    }
}

/// Whatever JSON the service answered an upload with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse(pub Value);

impl UploadResponse {
    /// The `success` flag the service reports, if any.
    #[must_use]
    pub fn succeeded(&self) -> Option<bool> {
        self.0.get("success").and_then(Value::as_bool)
    }

    #[must_use]
    pub const fn json(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
use crate::error::ValidationError;

#[cfg(test)]
struct Recorded {
    method: tiny_http::Method,
    url: String,
    body: Vec<u8>,
}

/// Answer exactly one request with `status` and `body`, returning what was requested.
#[cfg(test)]
fn serve_once(status: u16, body: &'static str) -> (Client, std::thread::JoinHandle<Recorded>) {
    use std::io::Read;

    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut received = Vec::new();
        request.as_reader().read_to_end(&mut received).unwrap();
        let recorded = Recorded {
            method: request.method().clone(),
            url: request.url().to_owned(),
            body: received,
        };
        let response = tiny_http::Response::from_string(body).with_status_code(status);
        request.respond(response).unwrap();
        recorded
    });
    let server = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let client = Client::new(Config::default().with_server(server));
    (client, handle)
}

#[cfg(test)]
const LISTING: &str = r#"{"name": "/", "children": [
    {"name": "a", "children": []},
    {"name": "b", "children": [{"name": "c", "children": []}]}
]}"#;

#[tokio::test]
async fn lists_files() {
    let (client, server) = serve_once(200, LISTING);
    let listing = client.list_files().await.unwrap();
    let recorded = server.join().unwrap();

    assert_eq!(recorded.method, tiny_http::Method::Get);
    assert_eq!(recorded.url, "/files");
    assert_eq!(listing.children.len(), 2);
    assert_eq!(listing.children[1].children[0].name, "c");
}

#[tokio::test]
async fn fetch_tree_renders_into_container() {
    let (client, server) = serve_once(200, LISTING);
    let mut container = Element::container("tree");
    client.fetch_tree(&mut container).await.unwrap();
    server.join().unwrap();

    assert_eq!(container.outline(), "- a\n+ b\n  - c\n");
}

#[tokio::test]
async fn error_status_is_reported() {
    let (client, server) = serve_once(500, "oops");
    let result = client.list_files().await;
    server.join().unwrap();

    assert!(matches!(result, Err(Error::Status { status: 500, .. })));
}

#[tokio::test]
async fn invalid_listing_keeps_container_untouched() {
    let (client, server) = serve_once(200, r#"{"children": [{"name": "a"}]}"#);
    let mut container = Element::container("tree");
    let result = client.fetch_tree(&mut container).await;
    server.join().unwrap();

    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(container.children().is_empty());
}

#[tokio::test]
async fn uploads_to_literal_path_as_multipart_file() {
    let (client, server) = serve_once(200, r#"{"success": true}"#);
    let upload = Upload::new(
        "notes.txt",
        b"hello edfs".to_vec(),
        RemotePath::new("user/notes.txt").unwrap(),
    );
    let response = client.upload(upload).await.unwrap();
    let recorded = server.join().unwrap();

    assert_eq!(recorded.method, tiny_http::Method::Post);
    assert_eq!(recorded.url, "/upload/user/notes.txt");
    let body = String::from_utf8_lossy(&recorded.body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="notes.txt""#));
    assert!(body.contains("hello edfs"));
    assert_eq!(response.succeeded(), Some(true));
}

#[tokio::test]
async fn upload_path_segments_are_encoded() {
    let (client, server) = serve_once(200, r#"{"success": false}"#);
    let upload = Upload::new("a.txt", Vec::new(), RemotePath::new("my docs/a?.txt").unwrap());
    let response = client.upload(upload).await.unwrap();
    let recorded = server.join().unwrap();

    assert_eq!(recorded.url, "/upload/my%20docs/a%3F.txt");
    assert_eq!(response.succeeded(), Some(false));
}

#[tokio::test]
async fn upload_stays_below_upload_endpoint() {
    let (client, server) = serve_once(200, r#"{"success": true}"#);
    let remote_path = RemotePath::new("%2e%2e/.../files").unwrap();
    let upload = Upload::new("files", Vec::new(), remote_path);
    client.upload(upload).await.unwrap();
    let recorded = server.join().unwrap();

    assert_eq!(recorded.method, tiny_http::Method::Post);
    assert_eq!(recorded.url, "/upload/%252e%252e/.../files");
}

#[tokio::test]
async fn deep_listing_within_configured_depth_is_rendered() {
    let (client, server) = serve_once(
        200,
        r#"{"children": [{"name": "a", "children": [{"name": "b", "children": []}]}]}"#,
    );
    let client = Client::new(client.config().clone().with_max_depth(1));
    let mut container = Element::container("tree");
    client.fetch_tree(&mut container).await.unwrap();
    server.join().unwrap();

    assert_eq!(container.outline(), "+ a\n  - b\n");
}

#[tokio::test]
async fn listing_deeper_than_configured_depth_is_rejected() {
    let (client, server) = serve_once(
        200,
        r#"{"children": [{"name": "a", "children": [{"name": "b", "children": []}]}]}"#,
    );
    let client = Client::new(client.config().clone().with_max_depth(0));
    let mut container = Element::container("tree");
    let result = client.fetch_tree(&mut container).await;
    server.join().unwrap();

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::TooDeep { max_depth: 0 }))
    ));
    assert!(container.children().is_empty());
}

#[tokio::test]
async fn upload_answer_must_be_json() {
    let (client, server) = serve_once(200, "stored");
    let upload = Upload::new("a.txt", Vec::new(), RemotePath::new("a.txt").unwrap());
    let result = client.upload(upload).await;
    server.join().unwrap();

    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn fetch_file_returns_content() {
    let (client, server) = serve_once(200, "print('hello')");
    let content = client
        .fetch_file(&RemotePath::new("user/edfs.py").unwrap())
        .await
        .unwrap();
    let recorded = server.join().unwrap();

    assert_eq!(recorded.url, "/file/user/edfs.py");
    assert_eq!(content.as_deref(), Some("print('hello')"));
}

#[tokio::test]
async fn fetch_missing_file_is_none() {
    let (client, server) = serve_once(404, "");
    let content = client
        .fetch_file(&RemotePath::new("nope").unwrap())
        .await
        .unwrap();
    server.join().unwrap();

    assert_eq!(content, None);
}

#[tokio::test]
async fn upload_from_path_uses_file_name() {
    let directory = std::env::temp_dir().join(format!("edfs-tree-{}", std::process::id()));
    tokio::fs::create_dir_all(&directory).await.unwrap();
    let local = directory.join("report.csv");
    tokio::fs::write(&local, b"a,b\n1,2\n").await.unwrap();

    let upload = Upload::from_path(&local, RemotePath::new("reports/").unwrap())
        .await
        .unwrap();
    tokio::fs::remove_dir_all(&directory).await.unwrap();

    assert_eq!(upload.file_name, "report.csv");
    assert_eq!(upload.contents, b"a,b\n1,2\n");
    assert_eq!(upload.remote_path.segments(), ["reports"]);
}

#[tokio::test]
async fn upload_from_missing_path_is_io_error() {
    let result = Upload::from_path("/definitely/not/here.txt", RemotePath::default()).await;
    assert!(matches!(result, Err(Error::Io(_))));
}
