use std::sync::Arc;

use mymatch_core::AppResult;
use mymatch_domain::{Permission, PermissionMatrix, Role};

use crate::api_ports::{ApiRequest, ApiTransport, decode_page};

mod lifecycle;
mod matrix;
mod wire;


/// Application service backing the role × permission matrix editor.
#[derive(Clone)]
pub struct PermissionMatrixService {
    transport: Arc<dyn ApiTransport>,
}

impl PermissionMatrixService {
    /// Creates a new service from the HTTP client core.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Returns every permission known to the backend.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let value = self
            .transport
            .send(ApiRequest::get("/permissions"))
            .await?;

        decode_page::<wire::PermissionResponse>(value, "permission list")
            .map(|page| page.items.into_iter().map(Permission::from).collect())
    }

    /// Returns every role with its current grants.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let value = self.transport.send(ApiRequest::get("/roles")).await?;

        decode_page::<wire::RoleResponse>(value, "role list")
            .map(|page| page.items.into_iter().map(Role::from).collect())
    }

    /// Fetches both collections and builds a fresh matrix.
    pub async fn load_matrix(&self) -> AppResult<PermissionMatrix> {
        let permissions = self.list_permissions().await?;
        let roles = self.list_roles().await?;

        PermissionMatrix::load(permissions, roles)
    }
}
