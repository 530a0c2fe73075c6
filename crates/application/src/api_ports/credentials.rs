use async_trait::async_trait;

use mymatch_core::AppResult;
use mymatch_domain::CredentialPair;

/// Port for the process-wide durable credential storage.
///
/// Implementations replace and clear the pair as a unit.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential pair, if any.
    async fn load(&self) -> AppResult<Option<CredentialPair>>;

    /// Replaces the stored credential pair.
    async fn store(&self, credentials: CredentialPair) -> AppResult<()>;

    /// Removes both credentials.
    async fn clear(&self) -> AppResult<()>;
}
