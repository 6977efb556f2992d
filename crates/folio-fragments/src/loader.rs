//! Fragment loader
//!
//! Resolves a [`ViewName`] into a [`FragmentResult`]. Nothing escapes this
//! boundary: unsafe names, missing fragments, bad statuses, transport
//! failures and timeouts all become result variants.

use std::sync::Arc;
use std::time::Duration;

use crate::source::{FetchResponse, FragmentSource};
use crate::view::ViewName;

pub const DEFAULT_EXTENSION: &str = ".html";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

/// Outcome of loading one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentResult {
    /// Markup to inject verbatim
    Ok { html: String },
    /// No fragment exists for the view
    NotFound { view: ViewName },
    /// The fragment could not be retrieved
    NetworkError { view: ViewName, detail: String },
}

impl FragmentResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, FragmentResult::Ok { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FragmentResult::Ok { .. } => "ok",
            FragmentResult::NotFound { .. } => "not_found",
            FragmentResult::NetworkError { .. } => "network_error",
        }
    }
}

pub struct FragmentLoader {
    source: Arc<dyn FragmentSource>,
    extension: String,
    timeout: Duration,
}

impl FragmentLoader {
    pub fn new(source: Arc<dyn FragmentSource>) -> Self {
        Self {
            source,
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Root-relative path for a view, `None` when the name is unsafe
    pub fn path_for(&self, view: &ViewName) -> Option<String> {
        view.fragment_path(&self.extension)
    }

    /// Load the fragment for `view`
    pub async fn load(&self, view: &ViewName) -> FragmentResult {
        let Some(path) = self.path_for(view) else {
            tracing::warn!(view = %view, "Refusing to load unsafe view name");
            return FragmentResult::NotFound { view: view.clone() };
        };

        let fetched = tokio::time::timeout(self.timeout, self.source.fetch(&path)).await;

        let result = match fetched {
            Ok(Ok(response)) => classify_response(view, &path, response),
            Ok(Err(e)) => FragmentResult::NetworkError {
                view: view.clone(),
                detail: format!("{} ({}) loading {}", e, e.kind(), path),
            },
            Err(_) => FragmentResult::NetworkError {
                view: view.clone(),
                detail: format!(
                    "Timed out after {} ms loading {}",
                    self.timeout.as_millis(),
                    path
                ),
            },
        };

        match &result {
            FragmentResult::Ok { html } => {
                tracing::debug!(view = %view, path = %path, bytes = html.len(), "Loaded fragment");
            }
            FragmentResult::NotFound { .. } => {
                tracing::warn!(
                    view = %view,
                    path = %path,
                    root = %self.source.describe(),
                    "Fragment not found"
                );
            }
            FragmentResult::NetworkError { detail, .. } => {
                tracing::warn!(
                    view = %view,
                    path = %path,
                    root = %self.source.describe(),
                    detail = %detail,
                    "Fragment load failed"
                );
            }
        }

        result
    }
}

/// Map a transport response onto a result: 2xx is content, 404 is a
/// missing view, every other status is a network error.
pub fn classify_response(view: &ViewName, path: &str, response: FetchResponse) -> FragmentResult {
    if response.is_success() {
        return FragmentResult::Ok {
            html: response.body,
        };
    }

    if response.status == 404 {
        return FragmentResult::NotFound { view: view.clone() };
    }

    FragmentResult::NetworkError {
        view: view.clone(),
        detail: format!("HTTP {} loading {}", response.status, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::source::StaticSource;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts fetches and answers with a fixed outcome
    struct ScriptedSource {
        calls: AtomicUsize,
        outcome: Option<crate::Result<FetchResponse>>,
    }

    impl ScriptedSource {
        fn answering(outcome: crate::Result<FetchResponse>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Some(outcome),
            }
        }

        fn hanging() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: None,
            }
        }
    }

    impl FragmentSource for ScriptedSource {
        fn fetch<'a>(&'a self, _path: &'a str) -> BoxFuture<'a, crate::Result<FetchResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome.clone() {
                Some(outcome) => futures_util::future::ready(outcome).boxed(),
                None => futures_util::future::pending().boxed(),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_ok() {
        let source = StaticSource::new().with("foundations/colors.html", "<section id=\"a\"></section>");
        let loader = FragmentLoader::new(Arc::new(source));

        let result = loader.load(&ViewName::new("foundations/colors")).await;
        assert_eq!(
            result,
            FragmentResult::Ok {
                html: "<section id=\"a\"></section>".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let loader = FragmentLoader::new(Arc::new(StaticSource::new()));

        let result = loader.load(&ViewName::new("nonexistent")).await;
        assert_eq!(
            result,
            FragmentResult::NotFound {
                view: ViewName::new("nonexistent")
            }
        );
    }

    #[tokio::test]
    async fn test_traversal_is_not_found_without_fetch() {
        let source = Arc::new(ScriptedSource::answering(Ok(FetchResponse::ok("secret"))));
        let loader = FragmentLoader::new(source.clone());

        let result = loader.load(&ViewName::new("../../etc/passwd")).await;
        assert_eq!(result.kind(), "not_found");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let source = ScriptedSource::answering(Ok(FetchResponse {
            status: 500,
            body: "boom".to_string(),
        }));
        let loader = FragmentLoader::new(Arc::new(source));

        match loader.load(&ViewName::new("home")).await {
            FragmentResult::NetworkError { view, detail } => {
                assert_eq!(view, "home");
                assert_eq!(detail, "HTTP 500 loading home.html");
            }
            other => panic!("Expected NetworkError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let source = ScriptedSource::answering(Err(TransportError::Dns(
            "failed to lookup address".to_string(),
        )));
        let loader = FragmentLoader::new(Arc::new(source));

        match loader.load(&ViewName::new("home")).await {
            FragmentResult::NetworkError { detail, .. } => {
                assert!(detail.contains("(dns)"));
                assert!(detail.contains("home.html"));
            }
            other => panic!("Expected NetworkError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hanging_fetch_times_out() {
        let loader = FragmentLoader::new(Arc::new(ScriptedSource::hanging()))
            .with_timeout(Duration::from_millis(20));

        match loader.load(&ViewName::new("home")).await {
            FragmentResult::NetworkError { detail, .. } => {
                assert!(detail.starts_with("Timed out after 20 ms"));
            }
            other => panic!("Expected NetworkError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_extension() {
        let source = StaticSource::new().with("home.htm", "<p>legacy</p>");
        let loader = FragmentLoader::new(Arc::new(source)).with_extension(".htm");

        assert!(loader.load(&ViewName::new("home")).await.is_ok());
    }

    #[test]
    fn test_classify_redirect_status_is_error() {
        let result = classify_response(
            &ViewName::new("home"),
            "home.html",
            FetchResponse {
                status: 304,
                body: String::new(),
            },
        );
        assert_eq!(result.kind(), "network_error");
    }
}
