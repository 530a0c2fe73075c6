use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mymatch_application::{ApiMethod, ApiRequest, ApiTransport, CredentialStore};
use mymatch_core::{AppError, AppResult};
use mymatch_domain::CredentialPair;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

#[cfg(test)]
mod tests;

const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedTokens {
    #[serde(alias = "token")]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Where a request stands in the refresh-and-retry cycle.
///
/// A request is dispatched at most twice: once as issued and once after a
/// successful credential refresh.
#[derive(Debug)]
enum RequestPhase {
    Initial { bearer: Option<String> },
    Replayed { bearer: String },
}

enum AttemptOutcome {
    Completed(Value),
    Unauthorized(Value),
}

/// `reqwest` implementation of the console's HTTP client core.
///
/// Attaches the stored access credential, transparently refreshes it once
/// on `401 Unauthorized` and replays the original request.
pub struct HttpApiClient {
    http_client: reqwest::Client,
    api_root: Url,
    credential_store: Arc<dyn CredentialStore>,
}

impl HttpApiClient {
    /// Creates a client with its own connection pool and per-request timeout.
    pub fn new(
        api_root: &str,
        timeout: Duration,
        credential_store: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Self::with_http_client(http_client, api_root, credential_store)
    }

    /// Creates a client around an existing `reqwest` client.
    pub fn with_http_client(
        http_client: reqwest::Client,
        api_root: &str,
        credential_store: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let api_root = Url::parse(api_root.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid API root '{api_root}': {error}"))
        })?;
        if api_root.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API root '{api_root}' cannot be used as a base URL"
            )));
        }

        Ok(Self {
            http_client,
            api_root,
            credential_store,
        })
    }

    /// Returns the configured API root.
    #[must_use]
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    /// Resolves a request path against the API root.
    ///
    /// Each path segment is appended as an opaque segment, so ids can never
    /// introduce a query, a fragment or a dot segment.
    fn endpoint(&self, path: &str, query: &[(String, String)]) -> AppResult<Url> {
        let Some(relative) = path.strip_prefix('/') else {
            return Err(AppError::Validation(format!(
                "request path '{path}' must start with '/'"
            )));
        };

        let mut url = self.api_root.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AppError::Internal(format!("API root '{}' cannot take a path", self.api_root))
            })?;
            segments.pop_if_empty();
            for segment in relative.split('/') {
                if !is_plain_segment(segment) {
                    return Err(AppError::Validation(format!(
                        "invalid request path '{path}': segment '{segment}' is not allowed"
                    )));
                }
                segments.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    async fn stored_credentials(&self) -> Option<CredentialPair> {
        match self.credential_store.load().await {
            Ok(credentials) => credentials,
            Err(error) => {
                warn!(error = %error, "credential store unreadable, sending without credentials");
                None
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> AppResult<AttemptOutcome> {
        let url = self.endpoint(&request.path, &request.query)?;
        let mut builder = self.http_client.request(reqwest_method(request.method), url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| transport_error(request, &error))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| transport_error(request, &error))?;

        debug!(
            method = request.method.as_str(),
            path = %request.path,
            status = status.as_u16(),
            "admin api call completed"
        );

        if status.is_success() {
            return Ok(AttemptOutcome::Completed(parse_body(&text)));
        }

        let payload = parse_body(&text);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(AttemptOutcome::Unauthorized(payload));
        }

        Err(AppError::Http {
            status: status.as_u16(),
            payload,
        })
    }

    /// Exchanges the stored refresh credential for a new access credential.
    ///
    /// Any failure clears both stored credentials and ends the session.
    async fn refresh_access_token(&self) -> AppResult<String> {
        let Some(stored) = self.stored_credentials().await else {
            return Err(self.expire_session("no stored credentials").await);
        };
        let Some(refresh_token) = stored.refresh_token() else {
            return Err(self.expire_session("no refresh credential stored").await);
        };

        let refreshed = match self.request_refresh(refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(reason) => return Err(self.expire_session(&reason).await),
        };

        let rotated = stored.rotated(refreshed.access_token, refreshed.refresh_token);
        let access_token = rotated.access_token().to_owned();
        // The replay still uses the new token. Storage keeps the old pair, so
        // the next request refreshes again.
        if let Err(error) = self.credential_store.store(rotated).await {
            warn!(error = %error, "failed to persist refreshed credentials");
        }

        info!("access credential refreshed");
        Ok(access_token)
    }

    /// Calls the refresh endpoint directly, outside the refresh-and-retry cycle.
    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, String> {
        let url = self
            .endpoint(REFRESH_PATH, &[])
            .map_err(|error| error.to_string())?;
        let response = self
            .http_client
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|error| format!("refresh request failed: {error}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        if !status.is_success() {
            return Err(format!("refresh rejected with status {status}: {text}"));
        }

        parse_refreshed_tokens(&parse_body(&text))
            .ok_or_else(|| "refresh response did not include an access token".to_owned())
    }

    async fn expire_session(&self, reason: &str) -> AppError {
        warn!(reason, "session expired, clearing stored credentials");
        if let Err(error) = self.credential_store.clear().await {
            warn!(error = %error, "failed to clear stored credentials");
        }

        AppError::SessionExpired(reason.to_owned())
    }
}

#[async_trait]
impl ApiTransport for HttpApiClient {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        let bearer = if request.authenticated {
            self.stored_credentials()
                .await
                .map(|credentials| credentials.access_token().to_owned())
        } else {
            None
        };
        let mut phase = RequestPhase::Initial { bearer };

        loop {
            let bearer = match &phase {
                RequestPhase::Initial { bearer } => bearer.as_deref(),
                RequestPhase::Replayed { bearer } => Some(bearer.as_str()),
            };

            let payload = match self.dispatch(&request, bearer).await? {
                AttemptOutcome::Completed(value) => return Ok(value),
                AttemptOutcome::Unauthorized(payload) => payload,
            };

            phase = match phase {
                RequestPhase::Initial { .. } if request.authenticated => {
                    debug!(path = %request.path, "access credential rejected, refreshing");
                    RequestPhase::Replayed {
                        bearer: self.refresh_access_token().await?,
                    }
                }
                RequestPhase::Initial { .. } | RequestPhase::Replayed { .. } => {
                    return Err(AppError::Http {
                        status: reqwest::StatusCode::UNAUTHORIZED.as_u16(),
                        payload,
                    });
                }
            };
        }
    }
}

fn reqwest_method(method: ApiMethod) -> reqwest::Method {
    match method {
        ApiMethod::Get => reqwest::Method::GET,
        ApiMethod::Post => reqwest::Method::POST,
        ApiMethod::Put => reqwest::Method::PUT,
        ApiMethod::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(request: &ApiRequest, error: &reqwest::Error) -> AppError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "transport failed"
    };
    warn!(
        method = request.method.as_str(),
        path = %request.path,
        error = %error,
        "admin api call {kind}"
    );

    AppError::network(format!(
        "{} {} {kind}: {error}",
        request.method.as_str(),
        request.path
    ))
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment
            .chars()
            .any(|character| matches!(character, '?' | '#' | '%' | '\\') || character.is_control())
}

/// Decodes a response body as JSON, keeping non-JSON text as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

fn parse_refreshed_tokens(body: &Value) -> Option<RefreshedTokens> {
    [Some(body), body.get("result"), body.get("data")]
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_value::<RefreshedTokens>(candidate.clone()).ok())
        .filter(|tokens| !tokens.access_token.trim().is_empty())
}
