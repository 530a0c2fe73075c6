use async_trait::async_trait;
use mymatch_application::CredentialStore;
use mymatch_core::AppResult;
use mymatch_domain::CredentialPair;
use tokio::sync::RwLock;

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Option<CredentialPair>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding an existing session.
    #[must_use]
    pub fn with_credentials(credentials: CredentialPair) -> Self {
        Self {
            credentials: RwLock::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> AppResult<Option<CredentialPair>> {
        Ok(self.credentials.read().await.clone())
    }

    async fn store(&self, credentials: CredentialPair) -> AppResult<()> {
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.credentials.write().await.take();
        Ok(())
    }
}
