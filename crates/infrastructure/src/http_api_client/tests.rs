use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use mymatch_application::{ApiRequest, ApiTransport, CredentialStore};
use mymatch_core::{AppError, AppResult, NETWORK_ERROR_MESSAGE};
use mymatch_domain::CredentialPair;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

use crate::InMemoryCredentialStore;

use super::{HttpApiClient, parse_refreshed_tokens};

const FRESH_TOKEN: &str = "access-fresh";

#[derive(Debug, Clone, Copy)]
enum RefreshBehavior {
    Issue,
    IssueNested,
    IssueRejected,
    Fail,
    Malformed,
}

struct FakeBackend {
    refresh_behavior: RefreshBehavior,
    item_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    seen_bearers: Mutex<Vec<Option<String>>>,
    refresh_bodies: Mutex<Vec<Value>>,
}

impl FakeBackend {
    fn new(refresh_behavior: RefreshBehavior) -> Arc<Self> {
        Arc::new(Self {
            refresh_behavior,
            item_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            seen_bearers: Mutex::new(Vec::new()),
            refresh_bodies: Mutex::new(Vec::new()),
        })
    }
}

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

async fn items(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    backend.item_calls.fetch_add(1, Ordering::SeqCst);
    let token = bearer(&headers);
    backend.seen_bearers.lock().await.push(token.clone());

    if token.as_deref() == Some(FRESH_TOKEN) || token.as_deref() == Some("access-valid") {
        return (
            StatusCode::OK,
            Json(json!({ "code": 1000, "result": ["FPT University"] })),
        );
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthenticated" })),
    )
}

async fn refresh(
    State(backend): State<Arc<FakeBackend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    backend.refresh_bodies.lock().await.push(body);

    match backend.refresh_behavior {
        RefreshBehavior::Issue => (StatusCode::OK, Json(json!({ "accessToken": FRESH_TOKEN }))),
        RefreshBehavior::IssueNested => (
            StatusCode::OK,
            Json(json!({
                "code": 1000,
                "result": { "accessToken": FRESH_TOKEN, "refreshToken": "refresh-rotated" }
            })),
        ),
        RefreshBehavior::IssueRejected => {
            (StatusCode::OK, Json(json!({ "accessToken": "access-still-bad" })))
        }
        RefreshBehavior::Fail => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "refresh token revoked" })),
        ),
        RefreshBehavior::Malformed => (StatusCode::OK, Json(json!({ "code": 1000 }))),
    }
}

async fn missing() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": 404, "message": "University not found" })),
    )
}

async fn plain_failure() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({ "result": "late" }))
}

async fn bind_listener() -> (TcpListener, SocketAddr) {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(error) => panic!("failed to bind test listener: {error}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(error) => panic!("failed to read listener address: {error}"),
    };
    (listener, addr)
}

async fn spawn_backend(backend: Arc<FakeBackend>) -> TestServer {
    let router = Router::new()
        .route("/api/items", get(items))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/missing", get(missing))
        .route("/api/plain", get(plain_failure))
        .route("/api/empty", get(no_content))
        .route("/api/slow", get(slow))
        .with_state(backend);

    let (listener, addr) = bind_listener().await;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    TestServer {
        base_url: format!("http://{addr}/api"),
        shutdown: Some(shutdown_tx),
    }
}

fn client(base_url: &str, store: Arc<dyn CredentialStore>) -> HttpApiClient {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .no_proxy()
        .build()
        .unwrap_or_else(|_| unreachable!());

    match HttpApiClient::with_http_client(http_client, base_url, store) {
        Ok(client) => client,
        Err(error) => panic!("failed to build client: {error}"),
    }
}

fn stale_session() -> Arc<InMemoryCredentialStore> {
    Arc::new(InMemoryCredentialStore::with_credentials(CredentialPair::new(
        "access-expired",
        Some("refresh-1".to_owned()),
    )))
}

#[tokio::test]
async fn attaches_stored_access_credential() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let store = Arc::new(InMemoryCredentialStore::with_credentials(CredentialPair::new(
        "access-valid",
        None,
    )));
    let client = client(&server.base_url, store);

    let result = client.send(ApiRequest::get("/items")).await;

    assert_eq!(
        result.ok(),
        Some(json!({ "code": 1000, "result": ["FPT University"] }))
    );
    assert_eq!(
        backend.seen_bearers.lock().await.clone(),
        vec![Some("access-valid".to_owned())]
    );
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_access_credential_is_refreshed_once_and_request_replayed() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let store = stale_session();
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert_eq!(
        result.ok(),
        Some(json!({ "code": 1000, "result": ["FPT University"] }))
    );
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        backend.refresh_bodies.lock().await.clone(),
        vec![json!({ "refreshToken": "refresh-1" })]
    );
    assert_eq!(
        backend.seen_bearers.lock().await.clone(),
        vec![
            Some("access-expired".to_owned()),
            Some(FRESH_TOKEN.to_owned())
        ]
    );
    assert_eq!(
        store.load().await.ok().flatten(),
        Some(CredentialPair::new(FRESH_TOKEN, Some("refresh-1".to_owned())))
    );
}

#[tokio::test]
async fn nested_refresh_response_rotates_both_credentials() {
    let backend = FakeBackend::new(RefreshBehavior::IssueNested);
    let server = spawn_backend(backend.clone()).await;
    let store = stale_session();
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(result.is_ok());
    assert_eq!(
        store.load().await.ok().flatten(),
        Some(CredentialPair::new(
            FRESH_TOKEN,
            Some("refresh-rotated".to_owned())
        ))
    );
}

struct ReadOnlyCredentialStore {
    inner: InMemoryCredentialStore,
}

#[async_trait]
impl CredentialStore for ReadOnlyCredentialStore {
    async fn load(&self) -> AppResult<Option<CredentialPair>> {
        self.inner.load().await
    }

    async fn store(&self, _credentials: CredentialPair) -> AppResult<()> {
        Err(AppError::Internal("credential storage is read-only".to_owned()))
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }
}

#[tokio::test]
async fn unpersisted_refresh_still_replays_and_next_request_refreshes_again() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let store = Arc::new(ReadOnlyCredentialStore {
        inner: InMemoryCredentialStore::with_credentials(CredentialPair::new(
            "access-expired",
            Some("refresh-1".to_owned()),
        )),
    });
    let client = client(&server.base_url, store.clone());

    let first = client.send(ApiRequest::get("/items")).await;
    let second = client.send(ApiRequest::get("/items")).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        store.load().await.ok().flatten(),
        Some(CredentialPair::new(
            "access-expired",
            Some("refresh-1".to_owned())
        ))
    );
}

#[tokio::test]
async fn second_unauthorized_response_is_returned_without_another_refresh() {
    let backend = FakeBackend::new(RefreshBehavior::IssueRejected);
    let server = spawn_backend(backend.clone()).await;
    let client = client(&server.base_url, stale_session());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(matches!(result, Err(AppError::Http { status: 401, .. })));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.item_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_refresh_clears_both_credentials() {
    let backend = FakeBackend::new(RefreshBehavior::Fail);
    let server = spawn_backend(backend.clone()).await;
    let store = stale_session();
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(matches!(result, Err(AppError::SessionExpired(_))));
    assert_eq!(store.load().await.ok(), Some(None));
    assert_eq!(backend.item_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_response_without_token_clears_both_credentials() {
    let backend = FakeBackend::new(RefreshBehavior::Malformed);
    let server = spawn_backend(backend.clone()).await;
    let store = stale_session();
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(matches!(result, Err(AppError::SessionExpired(_))));
    assert_eq!(store.load().await.ok(), Some(None));
}

#[tokio::test]
async fn missing_refresh_credential_ends_session_without_refresh_call() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let store = Arc::new(InMemoryCredentialStore::with_credentials(CredentialPair::new(
        "access-expired",
        None,
    )));
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(matches!(result, Err(AppError::SessionExpired(_))));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.load().await.ok(), Some(None));
}

#[tokio::test]
async fn anonymous_requests_are_never_refreshed() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let store = stale_session();
    let client = client(&server.base_url, store.clone());

    let result = client.send(ApiRequest::get("/items").anonymous()).await;

    assert!(matches!(result, Err(AppError::Http { status: 401, .. })));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.seen_bearers.lock().await.clone(), vec![None]);
    assert!(store.load().await.ok().flatten().is_some());
}

#[tokio::test]
async fn concurrent_unauthorized_requests_each_recover() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let client = client(&server.base_url, stale_session());

    let (first, second) = tokio::join!(
        client.send(ApiRequest::get("/items")),
        client.send(ApiRequest::get("/items"))
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    let refresh_calls = backend.refresh_calls.load(Ordering::SeqCst);
    assert!((1..=2).contains(&refresh_calls));
}

#[tokio::test]
async fn server_error_payload_is_propagated() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend.clone()).await;
    let client = client(&server.base_url, stale_session());

    let result = client.send(ApiRequest::get("/missing")).await;

    let error = result.err();
    assert_eq!(error.as_ref().and_then(AppError::status), Some(404));
    assert_eq!(
        error.as_ref().and_then(AppError::server_message),
        Some("University not found")
    );
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend).await;
    let client = client(&server.base_url, stale_session());

    let result = client.send(ApiRequest::get("/plain")).await;

    assert!(matches!(
        result,
        Err(AppError::Http { status: 502, payload: Value::String(ref text) })
            if text == "upstream unavailable"
    ));
}

#[tokio::test]
async fn empty_success_body_decodes_as_null() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend).await;
    let client = client(&server.base_url, stale_session());

    let result = client.send(ApiRequest::get("/empty")).await;

    assert_eq!(result.ok(), Some(Value::Null));
}

#[tokio::test]
async fn unreachable_backend_maps_to_network_error() {
    let (listener, addr) = bind_listener().await;
    drop(listener);
    let store = stale_session();
    let client = client(&format!("http://{addr}/api"), store.clone());

    let result = client.send(ApiRequest::get("/items")).await;

    assert!(matches!(
        result,
        Err(AppError::Network { ref message, .. }) if message == NETWORK_ERROR_MESSAGE
    ));
    assert!(store.load().await.ok().flatten().is_some());
}

#[tokio::test]
async fn timeout_maps_to_network_error() {
    let backend = FakeBackend::new(RefreshBehavior::Issue);
    let server = spawn_backend(backend).await;
    let client = client(&server.base_url, stale_session());

    let result = client.send(ApiRequest::get("/slow")).await;

    assert!(matches!(result, Err(AppError::Network { .. })));
}

#[test]
fn relative_request_paths_are_rejected() {
    let client = client("http://127.0.0.1:9/api/", stale_session());

    let endpoint = client.endpoint("items", &[]);

    assert!(matches!(endpoint, Err(AppError::Validation(_))));
    assert_eq!(
        client
            .endpoint("/items", &[("page".to_owned(), "2".to_owned())])
            .map(|url| url.to_string())
            .ok(),
        Some("http://127.0.0.1:9/api/items?page=2".to_owned())
    );
}

#[test]
fn path_segments_cannot_escape_the_record_path() {
    let client = client("http://127.0.0.1:9/api", stale_session());

    for path in [
        "/reviews/%2e%2e",
        "/reviews/..",
        "/reviews/./5",
        "/reviews/5?page=9",
        "/reviews/5#x",
        "/reviews//5",
    ] {
        assert!(
            matches!(client.endpoint(path, &[]), Err(AppError::Validation(_))),
            "accepted {path}"
        );
    }
    assert_eq!(
        client
            .endpoint("/reviews/5/verify", &[])
            .map(|url| url.to_string())
            .ok(),
        Some("http://127.0.0.1:9/api/reviews/5/verify".to_owned())
    );
}

#[test]
fn refresh_tokens_are_read_from_top_level_or_envelope() {
    let top_level = parse_refreshed_tokens(&json!({ "accessToken": "a" }));
    let enveloped = parse_refreshed_tokens(&json!({ "data": { "accessToken": "b" } }));
    let blank = parse_refreshed_tokens(&json!({ "accessToken": " " }));

    assert_eq!(top_level.map(|tokens| tokens.access_token), Some("a".to_owned()));
    assert_eq!(enveloped.map(|tokens| tokens.access_token), Some("b".to_owned()));
    assert!(blank.is_none());
}
