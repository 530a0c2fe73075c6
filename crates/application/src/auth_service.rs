//! Session lifecycle against the admin backend.
//!
//! Login writes the credential pair, logout invalidates the server session
//! on a best-effort basis and always clears local storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mymatch_core::{AppError, AppResult, NonEmptyString};
use mymatch_domain::CredentialPair;

use crate::api_ports::{ApiRequest, ApiTransport, CredentialStore, decode_result};


#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    #[serde(alias = "accessToken")]
    token: String,
    #[serde(default, alias = "refresh_token")]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct LogoutRequest<'a> {
    token: &'a str,
}

/// Result of a logout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The backend invalidated the session.
    Acknowledged,
    /// Local credentials were cleared but the backend call did not succeed.
    LocalOnly {
        /// Why the backend call was skipped or failed.
        reason: String,
    },
}

/// Application service for login, logout, and session inspection.
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<dyn ApiTransport>,
    credential_store: Arc<dyn CredentialStore>,
}

impl AuthService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            transport,
            credential_store,
        }
    }

    /// Exchanges username and password for a credential pair and stores it.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        let username = NonEmptyString::new(username.trim())
            .map_err(|_| AppError::Validation("username must not be empty".to_owned()))?;
        if password.is_empty() {
            return Err(AppError::Validation(
                "password must not be empty".to_owned(),
            ));
        }

        let body = serde_json::to_value(LoginRequest {
            username: username.as_str(),
            password,
        })
        .map_err(|error| AppError::Internal(format!("failed to encode login body: {error}")))?;

        let value = self
            .transport
            .send(ApiRequest::post("/auth/login", body).anonymous())
            .await?;
        let result = decode_result::<LoginResult>(value, "login")?;
        if result.token.trim().is_empty() {
            return Err(AppError::Internal(
                "login response did not include an access token".to_owned(),
            ));
        }

        self.credential_store
            .store(CredentialPair::new(result.token, result.refresh_token))
            .await
    }

    /// Invalidates the server session when possible and clears local credentials.
    pub async fn logout(&self) -> AppResult<LogoutOutcome> {
        let credentials = self.credential_store.load().await?;

        let outcome = match credentials {
            None => LogoutOutcome::LocalOnly {
                reason: "no stored session".to_owned(),
            },
            Some(credentials) => {
                let body = serde_json::to_value(LogoutRequest {
                    token: credentials.access_token(),
                })
                .map_err(|error| {
                    AppError::Internal(format!("failed to encode logout body: {error}"))
                })?;

                match self
                    .transport
                    .send(ApiRequest::post("/auth/logout", body))
                    .await
                {
                    Ok(_) => LogoutOutcome::Acknowledged,
                    Err(error) => LogoutOutcome::LocalOnly {
                        reason: error.to_string(),
                    },
                }
            }
        };

        self.credential_store.clear().await?;
        Ok(outcome)
    }

    /// Returns whether an access credential is stored.
    pub async fn has_session(&self) -> AppResult<bool> {
        Ok(self.credential_store.load().await?.is_some())
    }
}
