use super::*;

use mymatch_domain::{PermissionDraft, PermissionId, PermissionMatrix, Role, RoleDraft, RoleId};

impl ConsoleContext {
    pub(super) async fn show_matrix(&self) -> AppResult<Value> {
        let matrix = self.matrix_service.load_matrix().await?;

        Ok(matrix_view(&matrix))
    }

    /// Toggles one cell and commits the role's full permission set.
    pub(super) async fn set_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted: bool,
    ) -> AppResult<Value> {
        let mut matrix = self.matrix_service.load_matrix().await?;
        if matrix.toggle(role_id, permission_id, granted).is_none() {
            return Err(AppError::NotFound(format!(
                "role {role_id} or permission {permission_id} is not in the matrix"
            )));
        }

        let unknown = matrix.unknown_permission_ids(role_id);
        if !unknown.is_empty() {
            warn!(
                role_id = %role_id,
                unknown = ?unknown,
                "role references permissions missing from the permission list"
            );
        }

        if !matrix.dirty_roles().contains(&role_id) {
            info!(role_id = %role_id, permission_id = %permission_id, granted, "role unchanged");
            return Ok(matrix.role(role_id).map(role_view).unwrap_or(Value::Null));
        }

        let saved = self.matrix_service.save_role(&matrix, role_id).await?;
        matrix.mark_saved(&saved);
        info!(
            role_id = %role_id,
            permission_id = %permission_id,
            granted,
            permission_count = saved.permission_ids().len(),
            "role saved"
        );

        Ok(role_view(&saved))
    }

    pub(super) async fn create_permission(
        &self,
        name: String,
        description: String,
    ) -> AppResult<Value> {
        let draft = PermissionDraft::new(name, description)?;
        // Nothing to check against existing rows, and this process holds no
        // matrix that needs invalidating.
        let mut matrix = PermissionMatrix::load(Vec::new(), Vec::new())?;

        let created = self
            .matrix_service
            .create_permission(&mut matrix, draft)
            .await?;
        info!(permission_id = %created.id(), name = created.name(), "permission created");

        to_json(&created)
    }

    pub(super) async fn update_permission(
        &self,
        permission_id: PermissionId,
        name: String,
        description: String,
    ) -> AppResult<Value> {
        let draft = PermissionDraft::new(name, description)?;
        let mut matrix = self.matrix_service.load_matrix().await?;
        require_permission(&matrix, permission_id)?;

        let updated = self
            .matrix_service
            .update_permission(&mut matrix, permission_id, draft)
            .await?;
        info!(permission_id = %permission_id, "permission updated");

        to_json(&updated)
    }

    pub(super) async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<Value> {
        let mut matrix = self.matrix_service.load_matrix().await?;
        require_permission(&matrix, permission_id)?;

        self.matrix_service
            .delete_permission(&mut matrix, permission_id)
            .await?;
        info!(permission_id = %permission_id, "permission deleted");

        Ok(json!({ "deleted": permission_id }))
    }

    pub(super) async fn create_role(
        &self,
        name: String,
        description: String,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<Value> {
        let draft = RoleDraft::new(name, description, permission_ids)?;
        let mut matrix = self.matrix_service.load_matrix().await?;
        if let Some(missing) = draft
            .permission_ids()
            .iter()
            .find(|permission_id| matrix.permission(**permission_id).is_none())
        {
            return Err(AppError::NotFound(format!("permission {missing} does not exist")));
        }

        let created = self.matrix_service.create_role(&mut matrix, draft).await?;
        info!(role_id = %created.id(), name = created.name(), "role created");

        Ok(role_view(&created))
    }
}

fn require_permission(matrix: &PermissionMatrix, permission_id: PermissionId) -> AppResult<()> {
    match matrix.permission(permission_id) {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!(
            "permission {permission_id} does not exist"
        ))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))
}

pub(super) fn role_view(role: &Role) -> Value {
    json!({
        "id": role.id(),
        "name": role.name(),
        "description": role.description(),
        "permissions": role.permission_ids(),
    })
}

/// Renders the matrix as role columns and permission rows keyed by role id.
pub(super) fn matrix_view(matrix: &PermissionMatrix) -> Value {
    let rows: Vec<Value> = matrix
        .rows()
        .into_iter()
        .map(|row| {
            let grants: serde_json::Map<String, Value> = matrix
                .roles()
                .iter()
                .zip(row.grants)
                .map(|(role, granted)| (role.id().to_string(), Value::Bool(granted)))
                .collect();

            json!({ "permission": row.permission, "grants": grants })
        })
        .collect();

    json!({
        "roles": matrix.roles().iter().map(role_view).collect::<Vec<_>>(),
        "rows": rows,
    })
}
