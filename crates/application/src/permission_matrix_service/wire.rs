use serde::{Deserialize, Serialize};
use serde_json::Value;

use mymatch_core::{AppError, AppResult};
use mymatch_domain::{Permission, PermissionId, Role, RoleId};

/// Permission as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct PermissionResponse {
    pub(super) id: i64,
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: Option<String>,
}

impl From<PermissionResponse> for Permission {
    fn from(value: PermissionResponse) -> Self {
        Permission::new(
            PermissionId::new(value.id),
            value.name,
            value.description.unwrap_or_default(),
        )
    }
}

/// Role grants may arrive as nested permissions or as bare ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum RoleGrant {
    Id(i64),
    Nested { id: i64 },
}

impl RoleGrant {
    fn id(&self) -> PermissionId {
        match self {
            Self::Id(id) | Self::Nested { id } => PermissionId::new(*id),
        }
    }
}

/// Role as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct RoleResponse {
    pub(super) id: i64,
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: Option<String>,
    #[serde(default)]
    pub(super) permissions: Option<Vec<RoleGrant>>,
}

impl From<RoleResponse> for Role {
    fn from(value: RoleResponse) -> Self {
        let grants = value
            .permissions
            .unwrap_or_default()
            .iter()
            .map(RoleGrant::id)
            .collect::<Vec<_>>();

        Role::new(
            RoleId::new(value.id),
            value.name,
            value.description.unwrap_or_default(),
            grants,
        )
    }
}

/// Full replacement body for `PUT /roles/:id` and `POST /roles`.
#[derive(Debug, Clone, Serialize)]
pub(super) struct RoleWriteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<i64>,
    pub(super) name: String,
    pub(super) description: String,
    pub(super) permissions: Vec<i64>,
}

impl RoleWriteRequest {
    pub(super) fn replacing(role: &Role) -> Self {
        Self {
            id: Some(role.id().as_i64()),
            name: role.name().to_owned(),
            description: role.description().to_owned(),
            permissions: role
                .permission_ids()
                .iter()
                .map(PermissionId::as_i64)
                .collect(),
        }
    }
}

/// Body for permission create and update calls.
#[derive(Debug, Clone, Serialize)]
pub(super) struct PermissionWriteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<i64>,
    pub(super) name: String,
    pub(super) description: String,
}

pub(super) fn encode<T: Serialize>(body: &T, context: &str) -> AppResult<Value> {
    serde_json::to_value(body)
        .map_err(|error| AppError::Internal(format!("failed to encode {context} body: {error}")))
}
