//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_credential_store;
mod http_api_client;
mod in_memory_credential_store;

pub use file_credential_store::FileCredentialStore;
pub use http_api_client::HttpApiClient;
pub use in_memory_credential_store::InMemoryCredentialStore;
