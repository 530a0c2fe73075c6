use super::*;

use mymatch_domain::{PermissionDraft, PermissionId, RoleDraft};
use crate::api_ports::decode_result;

use super::wire::{
    PermissionResponse, PermissionWriteRequest, RoleResponse, RoleWriteRequest, encode,
};

impl PermissionMatrixService {
    /// Creates a permission and marks the loaded matrix stale.
    pub async fn create_permission(
        &self,
        matrix: &mut PermissionMatrix,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        let body = encode(
            &PermissionWriteRequest {
                id: None,
                name: draft.name().to_owned(),
                description: draft.description().to_owned(),
            },
            "permission create",
        )?;

        let value = self
            .transport
            .send(ApiRequest::post("/permissions", body))
            .await?;
        matrix.invalidate();

        decode_result::<PermissionResponse>(value, "permission create").map(Permission::from)
    }

    /// Updates a permission's name and description and marks the matrix stale.
    pub async fn update_permission(
        &self,
        matrix: &mut PermissionMatrix,
        permission_id: PermissionId,
        draft: PermissionDraft,
    ) -> AppResult<Permission> {
        let body = encode(
            &PermissionWriteRequest {
                id: Some(permission_id.as_i64()),
                name: draft.name().to_owned(),
                description: draft.description().to_owned(),
            },
            "permission update",
        )?;

        let value = self
            .transport
            .send(ApiRequest::put(
                format!("/permissions/{permission_id}"),
                body,
            ))
            .await?;
        matrix.invalidate();

        decode_result::<PermissionResponse>(value, "permission update").map(Permission::from)
    }

    /// Deletes a permission and marks the matrix stale.
    pub async fn delete_permission(
        &self,
        matrix: &mut PermissionMatrix,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.transport
            .send(ApiRequest::delete(format!("/permissions/{permission_id}")))
            .await?;
        matrix.invalidate();

        Ok(())
    }

    /// Creates a role with initial grants and marks the matrix stale.
    pub async fn create_role(
        &self,
        matrix: &mut PermissionMatrix,
        draft: RoleDraft,
    ) -> AppResult<Role> {
        let body = encode(
            &RoleWriteRequest {
                id: None,
                name: draft.name().to_owned(),
                description: draft.description().to_owned(),
                permissions: draft
                    .permission_ids()
                    .iter()
                    .map(PermissionId::as_i64)
                    .collect(),
            },
            "role create",
        )?;

        let value = self
            .transport
            .send(ApiRequest::post("/roles", body))
            .await?;
        matrix.invalidate();

        decode_result::<RoleResponse>(value, "role create").map(Role::from)
    }
}
