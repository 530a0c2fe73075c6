mod credentials;
mod envelope;
mod transport;

pub use credentials::CredentialStore;
pub use envelope::{ApiEnvelope, Page, PageEnvelope, decode_page, decode_result};
pub use transport::{ApiMethod, ApiRequest, ApiTransport};
