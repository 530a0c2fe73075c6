//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod credential;
mod permission_matrix;
mod security;

pub use catalog::{CatalogResource, ListQuery, SortOrder};
pub use credential::{ACCESS_TOKEN_KEY, CredentialPair, REFRESH_TOKEN_KEY};
pub use permission_matrix::{MatrixRow, PermissionMatrix};
pub use security::{Permission, PermissionDraft, PermissionId, Role, RoleDraft, RoleId};
