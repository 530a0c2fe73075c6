use async_trait::async_trait;
use serde_json::Value;

use mymatch_core::AppResult;

/// HTTP verbs used against the admin backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// Read.
    Get,
    /// Create or invoke.
    Post,
    /// Full update.
    Put,
    /// Remove.
    Delete,
}

impl ApiMethod {
    /// Returns the HTTP method token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Backend call described independently of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: ApiMethod,
    /// Path relative to the API root, starting with `/`.
    pub path: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Whether the stored bearer credential is attached and refreshed on 401.
    pub authenticated: bool,
}

impl ApiRequest {
    fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    /// Builds a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, path)
    }

    /// Builds a `POST` request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Post, path).with_body(body)
    }

    /// Builds a `PUT` request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Put, path).with_body(body)
    }

    /// Builds a `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, path)
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends query string pairs.
    #[must_use]
    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Sends the request without credentials and without the refresh protocol.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Port for the authenticated HTTP client core.
///
/// Successful calls return the decoded JSON body (`null` for empty bodies).
/// Failures are reported as `AppError::Network`, `AppError::SessionExpired`,
/// or `AppError::Http`.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends one request, refreshing the access credential at most once.
    async fn send(&self, request: ApiRequest) -> AppResult<Value>;
}
