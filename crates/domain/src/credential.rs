use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

/// Storage key of the access credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Access and refresh credentials persisted between runs.
///
/// The pair is always replaced or cleared as a unit so the refresh token never
/// drifts from the access token it was issued with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl CredentialPair {
    /// Creates a credential pair issued at login.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Returns the bearer credential attached to requests.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the refresh credential, when the backend issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the pair after an access token rotation.
    ///
    /// A rotated refresh token replaces the stored one; otherwise the current
    /// refresh token is kept.
    #[must_use]
    pub fn rotated(&self, access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self::new(
            access_token,
            refresh_token
                .filter(|token| !token.trim().is_empty())
                .or_else(|| self.refresh_token.clone()),
        )
    }
}

impl Debug for CredentialPair {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
