use super::*;

use mymatch_domain::{CatalogResource, ListQuery, SortOrder};

impl ConsoleContext {
    pub(super) async fn list_records(
        &self,
        resource: CatalogResource,
        page: u32,
        size: u32,
        sort_by: String,
        sort_order: SortOrder,
        filters: Vec<(String, String)>,
    ) -> AppResult<Value> {
        let mut query = ListQuery::new(page, size)?.sorted_by(sort_by, sort_order)?;
        for (key, value) in filters {
            query = query.with_filter(key, value)?;
        }

        let page = self.catalog_service.list(resource, &query).await?;
        let total_pages = page.total_pages();

        Ok(json!({
            "items": page.items,
            "currentPage": page.current_page,
            "pageSize": page.page_size,
            "totalElements": page.total_elements,
            "totalPages": total_pages,
        }))
    }
}
