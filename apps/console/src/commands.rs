//! Command execution against the application services.

use std::sync::Arc;

use mymatch_application::{
    ApiTransport, AuthService, CatalogService, CredentialStore, PermissionMatrixService,
};
use mymatch_core::{AppError, AppResult};
use mymatch_infrastructure::{FileCredentialStore, HttpApiClient};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::cli::{Commands, MatrixAction, PermissionAction, ReviewAction, RoleAction, UserAction};
use crate::console_config::ConsoleConfig;

mod catalog;
mod matrix;
mod session;

/// Services shared by every command.
#[derive(Clone)]
pub struct ConsoleContext {
    auth_service: AuthService,
    matrix_service: PermissionMatrixService,
    catalog_service: CatalogService,
}

impl ConsoleContext {
    pub fn build(config: &ConsoleConfig) -> AppResult<Self> {
        let credential_store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        let transport: Arc<dyn ApiTransport> = Arc::new(HttpApiClient::new(
            config.api_root.as_str(),
            config.http_timeout,
            credential_store.clone(),
        )?);

        Ok(Self::from_parts(transport, credential_store))
    }

    fn from_parts(
        transport: Arc<dyn ApiTransport>,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(transport.clone(), credential_store),
            matrix_service: PermissionMatrixService::new(transport.clone()),
            catalog_service: CatalogService::new(transport),
        }
    }

    pub async fn run(&self, command: Commands) -> AppResult<Value> {
        match command {
            Commands::Login { username, password } => self.login(&username, &password).await,
            Commands::Logout => self.logout().await,
            Commands::Status => self.status().await,
            Commands::Matrix { action } => match action {
                MatrixAction::Show => self.show_matrix().await,
                MatrixAction::Grant { role, permission } => {
                    self.set_grant(role, permission, true).await
                }
                MatrixAction::Revoke { role, permission } => {
                    self.set_grant(role, permission, false).await
                }
            },
            Commands::Permission { action } => match action {
                PermissionAction::Create { name, description } => {
                    self.create_permission(name, description).await
                }
                PermissionAction::Update {
                    id,
                    name,
                    description,
                } => self.update_permission(id, name, description).await,
                PermissionAction::Delete { id } => self.delete_permission(id).await,
            },
            Commands::Role { action } => match action {
                RoleAction::Create {
                    name,
                    description,
                    permissions,
                } => self.create_role(name, description, permissions).await,
            },
            Commands::List {
                resource,
                page,
                size,
                sort_by,
                sort_order,
                filters,
            } => {
                self.list_records(resource, page, size, sort_by, sort_order, filters)
                    .await
            }
            Commands::Get { resource, id } => self.catalog_service.get(resource, &id).await,
            Commands::Create {
                resource,
                json_body,
            } => {
                self.catalog_service
                    .create(resource, parse_json_body(&json_body)?)
                    .await
            }
            Commands::Update {
                resource,
                id,
                json_body,
            } => {
                self.catalog_service
                    .update(resource, &id, parse_json_body(&json_body)?)
                    .await
            }
            Commands::Delete { resource, id } => {
                self.catalog_service.delete(resource, &id).await?;
                info!(resource = resource.as_str(), record_id = %id, "record deleted");
                Ok(json!({ "deleted": id }))
            }
            Commands::Review { action } => match action {
                ReviewAction::Verify { id } => {
                    self.catalog_service.set_review_verified(&id, true).await
                }
                ReviewAction::Unverify { id } => {
                    self.catalog_service.set_review_verified(&id, false).await
                }
            },
            Commands::User { action } => match action {
                UserAction::Ban { id } => self.catalog_service.set_user_banned(&id, true).await,
                UserAction::Unban { id } => self.catalog_service.set_user_banned(&id, false).await,
            },
        }
    }
}

fn parse_json_body(raw: &str) -> AppResult<Value> {
    serde_json::from_str(raw)
        .map_err(|error| AppError::Validation(format!("--json is not valid JSON: {error}")))
}
