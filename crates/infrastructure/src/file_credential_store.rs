use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mymatch_application::CredentialStore;
use mymatch_core::{AppError, AppResult};
use mymatch_domain::CredentialPair;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Credential store persisted as a JSON file with `access_token` and
/// `refresh_token` keys.
///
/// Writes go through a sibling temporary file and a rename so readers never
/// observe a partial document.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn staging_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    fn io_error(&self, action: &str, error: &std::io::Error) -> AppError {
        AppError::Internal(format!(
            "failed to {action} credentials file '{}': {error}",
            self.path.display()
        ))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> AppResult<Option<CredentialPair>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error("read", &error)),
        };

        let credentials: CredentialPair = serde_json::from_str(&contents).map_err(|error| {
            AppError::Internal(format!(
                "credentials file '{}' is malformed: {error}",
                self.path.display()
            ))
        })?;
        if credentials.access_token().trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(credentials))
    }

    async fn store(&self, credentials: CredentialPair) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error("create directory for", &error))?;
        }

        let document = serde_json::to_vec_pretty(&credentials).map_err(|error| {
            AppError::Internal(format!("failed to encode credentials: {error}"))
        })?;

        let staging_path = self.staging_path();
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&staging_path)
            .await
            .map_err(|error| self.io_error("open", &error))?;
        file.write_all(&document)
            .await
            .map_err(|error| self.io_error("write", &error))?;
        file.sync_all()
            .await
            .map_err(|error| self.io_error("flush", &error))?;
        drop(file);

        tokio::fs::rename(&staging_path, &self.path)
            .await
            .map_err(|error| self.io_error("replace", &error))?;

        debug!(path = %self.path.display(), "credentials stored");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "credentials cleared");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error("remove", &error)),
        }
    }
}
