//! Editable Roles × Permissions cross product.
//!
//! The matrix is loaded wholesale from the backend, mutated locally by
//! toggles, and committed one role at a time. Permission or role lifecycle
//! changes make the loaded state stale until the next full load.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use mymatch_core::{AppError, AppResult};

use crate::{Permission, PermissionId, Role, RoleId};

/// One matrix row: a permission and its membership flag per role column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow<'a> {
    /// Permission rendered by this row.
    pub permission: &'a Permission,
    /// Membership flags in role column order.
    pub grants: Vec<bool>,
}

/// In-memory role/permission assignment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    baseline: BTreeMap<RoleId, BTreeSet<PermissionId>>,
    stale: bool,
}

impl PermissionMatrix {
    /// Builds the matrix from the full permission and role collections.
    pub fn load(permissions: Vec<Permission>, roles: Vec<Role>) -> AppResult<Self> {
        let mut seen_permissions = HashSet::new();
        for permission in &permissions {
            if !seen_permissions.insert(permission.id()) {
                return Err(AppError::Validation(format!(
                    "duplicate permission id '{}' in permission collection",
                    permission.id()
                )));
            }
        }

        let mut baseline = BTreeMap::new();
        for role in &roles {
            if baseline
                .insert(role.id(), role.permission_ids().clone())
                .is_some()
            {
                return Err(AppError::Validation(format!(
                    "duplicate role id '{}' in role collection",
                    role.id()
                )));
            }
        }

        Ok(Self {
            permissions,
            roles,
            baseline,
            stale: false,
        })
    }

    /// Returns the permission rows in load order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns the role columns in load order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Looks up a role column.
    #[must_use]
    pub fn role(&self, role_id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id() == role_id)
    }

    /// Looks up a permission row.
    #[must_use]
    pub fn permission(&self, permission_id: PermissionId) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.id() == permission_id)
    }

    /// Returns the cell value for a permission row and role column.
    #[must_use]
    pub fn is_granted(&self, role_id: RoleId, permission_id: PermissionId) -> bool {
        self.role(role_id)
            .is_some_and(|role| role.has_permission(permission_id))
    }

    /// Returns every row with its per-role membership flags.
    #[must_use]
    pub fn rows(&self) -> Vec<MatrixRow<'_>> {
        self.permissions
            .iter()
            .map(|permission| MatrixRow {
                permission,
                grants: self
                    .roles
                    .iter()
                    .map(|role| role.has_permission(permission.id()))
                    .collect(),
            })
            .collect()
    }

    /// Sets a single cell and returns the updated role.
    ///
    /// Unknown role or permission ids and stale matrices leave the state
    /// untouched and return `None`.
    pub fn toggle(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted: bool,
    ) -> Option<&Role> {
        if self.stale || self.permission(permission_id).is_none() {
            return None;
        }

        let role = self.roles.iter_mut().find(|role| role.id() == role_id)?;
        role.set_permission(permission_id, granted);
        Some(&*role)
    }

    /// Returns a snapshot of the role ready to be committed.
    pub fn role_for_save(&self, role_id: RoleId) -> AppResult<Role> {
        if self.stale {
            return Err(AppError::Conflict(
                "permission matrix is stale; reload permissions and roles before saving"
                    .to_owned(),
            ));
        }

        self.role(role_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' is not loaded")))
    }

    /// Records a committed snapshot as the role's new baseline.
    pub fn mark_saved(&mut self, saved: &Role) {
        if self.role(saved.id()).is_some() {
            self.baseline
                .insert(saved.id(), saved.permission_ids().clone());
        }
    }

    /// Returns roles whose local grants differ from the last loaded or saved state.
    #[must_use]
    pub fn dirty_roles(&self) -> Vec<RoleId> {
        self.roles
            .iter()
            .filter(|role| self.baseline.get(&role.id()) != Some(role.permission_ids()))
            .map(Role::id)
            .collect()
    }

    /// Returns grants of a role that reference permissions missing from this matrix.
    #[must_use]
    pub fn unknown_permission_ids(&self, role_id: RoleId) -> Vec<PermissionId> {
        self.role(role_id)
            .map(|role| {
                role.permission_ids()
                    .iter()
                    .copied()
                    .filter(|permission_id| self.permission(*permission_id).is_none())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Marks the loaded collections as outdated.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Returns whether a full reload is required before further edits.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
