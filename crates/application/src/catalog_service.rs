use std::sync::Arc;

use serde_json::Value;

use mymatch_core::{AppError, AppResult};
use mymatch_domain::{CatalogResource, ListQuery};

use crate::api_ports::{ApiRequest, ApiTransport, Page, decode_page, decode_result};

/// Application service for the paged record screens of the console.
///
/// Records are passed through as JSON objects.
#[derive(Clone)]
pub struct CatalogService {
    transport: Arc<dyn ApiTransport>,
}

impl CatalogService {
    /// Creates a new service from the HTTP client core.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Lists one page of records.
    pub async fn list(&self, resource: CatalogResource, query: &ListQuery) -> AppResult<Page<Value>> {
        let value = self
            .transport
            .send(ApiRequest::get(resource.collection_path()).with_query(query.to_query_pairs()))
            .await?;

        decode_page(value, resource.as_str())
    }

    /// Fetches one record.
    pub async fn get(&self, resource: CatalogResource, record_id: &str) -> AppResult<Value> {
        let path = resource.record_path(record_id)?;
        let value = self.transport.send(ApiRequest::get(path)).await?;

        decode_result(value, resource.as_str())
    }

    /// Creates a record from a JSON object.
    pub async fn create(&self, resource: CatalogResource, record: Value) -> AppResult<Value> {
        require_object(&record)?;
        let value = self
            .transport
            .send(ApiRequest::post(resource.collection_path(), record))
            .await?;

        decode_result(value, resource.as_str())
    }

    /// Replaces a record with a JSON object.
    pub async fn update(
        &self,
        resource: CatalogResource,
        record_id: &str,
        record: Value,
    ) -> AppResult<Value> {
        require_object(&record)?;
        let path = resource.record_path(record_id)?;
        let value = self.transport.send(ApiRequest::put(path, record)).await?;

        decode_result(value, resource.as_str())
    }

    /// Deletes a record.
    pub async fn delete(&self, resource: CatalogResource, record_id: &str) -> AppResult<()> {
        let path = resource.record_path(record_id)?;
        self.transport.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Marks a review as verified or reverts it to unverified.
    pub async fn set_review_verified(&self, review_id: &str, verified: bool) -> AppResult<Value> {
        let action = if verified { "verify" } else { "unverify" };
        self.record_action(CatalogResource::Reviews, review_id, action)
            .await
    }

    /// Bans or unbans a platform user.
    pub async fn set_user_banned(&self, user_id: &str, banned: bool) -> AppResult<Value> {
        let action = if banned { "ban" } else { "unban" };
        self.record_action(CatalogResource::Users, user_id, action)
            .await
    }

    async fn record_action(
        &self,
        resource: CatalogResource,
        record_id: &str,
        action: &str,
    ) -> AppResult<Value> {
        let path = format!("{}/{action}", resource.record_path(record_id)?);
        let value = self
            .transport
            .send(ApiRequest::put(path, Value::Object(serde_json::Map::new())))
            .await?;

        decode_result::<Option<Value>>(value, resource.as_str())
            .map(Option::unwrap_or_default)
    }
}

fn require_object(record: &Value) -> AppResult<()> {
    if record.is_object() {
        return Ok(());
    }

    Err(AppError::Validation(
        "record payload must be a JSON object".to_owned(),
    ))
}
