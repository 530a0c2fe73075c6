use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mymatch_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Backend identifier of a permission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Wraps a backend permission id.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric id used on the wire.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for PermissionId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(Self).map_err(|error| {
            AppError::Validation(format!("invalid permission id '{value}': {error}"))
        })
    }
}

/// Backend identifier of a role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Wraps a backend role id.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric id used on the wire.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")))
    }
}

/// Atomic named capability managed by administrators.
///
/// The matrix editor never mutates permissions; they change only through the
/// permission lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: String,
    #[serde(default)]
    description: String,
}

impl Permission {
    /// Creates a permission from backend data.
    #[must_use]
    pub fn new(id: PermissionId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the human readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: RoleId,
    name: String,
    description: String,
    permission_ids: BTreeSet<PermissionId>,
}

impl Role {
    /// Creates a role with its current grant set.
    #[must_use]
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            permission_ids: permission_ids.into_iter().collect(),
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the granted permission ids.
    #[must_use]
    pub fn permission_ids(&self) -> &BTreeSet<PermissionId> {
        &self.permission_ids
    }

    /// Returns whether the permission is granted to this role.
    #[must_use]
    pub fn has_permission(&self, permission_id: PermissionId) -> bool {
        self.permission_ids.contains(&permission_id)
    }

    /// Adds or removes a grant. Returns whether the set changed.
    pub fn set_permission(&mut self, permission_id: PermissionId, granted: bool) -> bool {
        if granted {
            self.permission_ids.insert(permission_id)
        } else {
            self.permission_ids.remove(&permission_id)
        }
    }
}

/// Validated input for a new permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDraft {
    name: NonEmptyString,
    description: String,
}

impl PermissionDraft {
    /// Validates permission form values.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> AppResult<Self> {
        let name = NonEmptyString::new(name.into().trim().to_owned()).map_err(|_| {
            AppError::Validation("permission name must not be empty".to_owned())
        })?;

        Ok(Self {
            name,
            description: description.into().trim().to_owned(),
        })
    }

    /// Returns the validated name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Validated input for a new role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    name: NonEmptyString,
    description: String,
    permission_ids: BTreeSet<PermissionId>,
}

impl RoleDraft {
    /// Validates role form values.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name.into().trim().to_owned())
            .map_err(|_| AppError::Validation("role name must not be empty".to_owned()))?;

        Ok(Self {
            name,
            description: description.into().trim().to_owned(),
            permission_ids: permission_ids.into_iter().collect(),
        })
    }

    /// Returns the validated name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the initial grants.
    #[must_use]
    pub fn permission_ids(&self) -> &BTreeSet<PermissionId> {
        &self.permission_ids
    }
}
