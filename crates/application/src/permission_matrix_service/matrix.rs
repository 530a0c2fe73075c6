use super::*;

use mymatch_domain::RoleId;

use super::wire::{RoleWriteRequest, encode};

impl PermissionMatrixService {
    /// Commits one role's complete grant set.
    ///
    /// The role snapshot is taken before the request is sent and returned on
    /// success so the caller can record it with `PermissionMatrix::mark_saved`.
    /// On failure the matrix is left exactly as it was.
    pub async fn save_role(&self, matrix: &PermissionMatrix, role_id: RoleId) -> AppResult<Role> {
        let snapshot = matrix.role_for_save(role_id)?;
        self.replace_role(&snapshot).await?;
        Ok(snapshot)
    }

    /// Sends `PUT /roles/:id` with the role's full state.
    pub async fn replace_role(&self, role: &Role) -> AppResult<()> {
        let body = encode(&RoleWriteRequest::replacing(role), "role update")?;

        self.transport
            .send(ApiRequest::put(format!("/roles/{}", role.id()), body))
            .await?;

        Ok(())
    }
}
