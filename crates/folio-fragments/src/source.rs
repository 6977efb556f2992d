//! Fragment transports
//!
//! A [`FragmentSource`] resolves a root-relative fragment path into a status
//! code and a body. Unsuccessful statuses are still `Ok`; only failures to
//! obtain a response at all are `Err`.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::RwLock;
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;
use crate::Result;

/// Raw response for one fragment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait FragmentSource: Send + Sync {
    /// Fetch the fragment stored at `path` relative to the source root
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FetchResponse>>;

    /// Human-readable root, for logs
    fn describe(&self) -> String;
}

/// Fragments served over HTTP(S) below a base URL
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        // Without the trailing slash `Url::join` would replace the last segment
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };

        let base = Url::parse(&normalized)
            .map_err(|e| TransportError::InvalidRoot(format!("{}: {}", base, e)))?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(TransportError::InvalidRoot(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .redirect(Policy::limited(5))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl FragmentSource for HttpSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FetchResponse>> {
        async move {
            let url = self
                .base
                .join(path)
                .map_err(|e| TransportError::InvalidRoot(e.to_string()))?;

            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            Ok(FetchResponse { status, body })
        }
        .boxed()
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Fragments read from a directory on disk
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FragmentSource for DirSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FetchResponse>> {
        async move {
            match tokio::fs::read_to_string(self.root.join(path)).await {
                Ok(body) => Ok(FetchResponse::ok(body)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Ok(FetchResponse::not_found())
                }
                Err(e) => Err(e.into()),
            }
        }
        .boxed()
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory fragments, keyed by root-relative path
#[derive(Default)]
pub struct StaticSource {
    fragments: RwLock<HashMap<String, String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert(path, html);
        self
    }

    pub fn insert(&self, path: impl Into<String>, html: impl Into<String>) {
        self.fragments.write().insert(path.into(), html.into());
    }

    pub fn remove(&self, path: &str) -> Option<String> {
        self.fragments.write().remove(path)
    }
}

impl FragmentSource for StaticSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<FetchResponse>> {
        let response = match self.fragments.read().get(path) {
            Some(html) => FetchResponse::ok(html.clone()),
            None => FetchResponse::not_found(),
        };
        futures_util::future::ready(Ok(response)).boxed()
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Pick a transport for a configured root: HTTP(S) URLs are fetched over
/// the network, anything else is treated as a directory.
pub fn source_for_root(root: &str, timeout: Duration) -> Result<Arc<dyn FragmentSource>> {
    if root.starts_with("http://") || root.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(root, timeout)?))
    } else {
        Ok(Arc::new(DirSource::new(root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new().with("home.html", "<h1>Home</h1>");

        let found = source.fetch("home.html").await.unwrap();
        assert!(found.is_success());
        assert_eq!(found.body, "<h1>Home</h1>");

        let missing = source.fetch("missing.html").await.unwrap();
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_dir_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("foundations")).unwrap();
        std::fs::write(dir.path().join("foundations/colors.html"), "<p>colors</p>").unwrap();

        let source = DirSource::new(dir.path());

        let found = source.fetch("foundations/colors.html").await.unwrap();
        assert_eq!(found, FetchResponse::ok("<p>colors</p>"));

        let missing = source.fetch("foundations/type.html").await.unwrap();
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn test_http_source_base_normalized() {
        let source = HttpSource::new("https://docs.example.com/pages", Duration::from_secs(1))
            .unwrap();
        assert_eq!(source.base().as_str(), "https://docs.example.com/pages/");
        assert_eq!(
            source.base().join("foundations/colors.html").unwrap().as_str(),
            "https://docs.example.com/pages/foundations/colors.html"
        );
    }

    #[test]
    fn test_http_source_rejects_bad_roots() {
        assert!(matches!(
            HttpSource::new("not a url", Duration::from_secs(1)),
            Err(TransportError::InvalidRoot(_))
        ));
        assert!(matches!(
            HttpSource::new("ftp://example.com/pages", Duration::from_secs(1)),
            Err(TransportError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_source_for_root() {
        let http = source_for_root("http://localhost:8000/pages/", Duration::from_secs(1)).unwrap();
        assert_eq!(http.describe(), "http://localhost:8000/pages/");

        let dir = source_for_root("site/pages", Duration::from_secs(1)).unwrap();
        assert_eq!(dir.describe(), "site/pages");
    }
}
