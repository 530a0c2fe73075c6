//! Application services and ports.

#![forbid(unsafe_code)]

mod api_ports;
mod auth_service;
mod catalog_service;
mod permission_matrix_service;

pub use api_ports::{
    ApiEnvelope, ApiMethod, ApiRequest, ApiTransport, CredentialStore, Page, PageEnvelope,
    decode_page, decode_result,
};
pub use auth_service::{AuthService, LogoutOutcome};
pub use catalog_service::CatalogService;
pub use permission_matrix_service::PermissionMatrixService;
