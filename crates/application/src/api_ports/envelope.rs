use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use mymatch_core::{AppError, AppResult};

/// Response wrapper returned by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Backend status code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Endpoint payload.
    pub result: T,
}

/// Paged payload returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// 1-based page number.
    #[serde(default)]
    pub current_page: u32,
    /// Requested page size.
    #[serde(default)]
    pub page_size: u32,
    /// Total records across all pages.
    #[serde(default)]
    pub total_elements: u64,
}

/// One page of decoded records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub current_page: u32,
    /// Page size reported by the backend.
    pub page_size: u32,
    /// Total records across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Returns the number of pages implied by the totals.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return u64::from(!self.items.is_empty());
        }

        self.total_elements.div_ceil(u64::from(self.page_size))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageShape<T> {
    Bare(Vec<T>),
    Paged(PageEnvelope<T>),
}

/// Decodes `{code, result}` and returns the typed `result`.
pub fn decode_result<T: DeserializeOwned>(value: Value, context: &str) -> AppResult<T> {
    serde_json::from_value::<ApiEnvelope<T>>(value)
        .map(|envelope| envelope.result)
        .map_err(|error| {
            AppError::Internal(format!("malformed {context} response envelope: {error}"))
        })
}

/// Decodes a list envelope into a page.
///
/// A bare array `result` is accepted and treated as a single complete page.
pub fn decode_page<T: DeserializeOwned>(value: Value, context: &str) -> AppResult<Page<T>> {
    let shape = decode_result::<PageShape<T>>(value, context)?;

    Ok(match shape {
        PageShape::Bare(items) => {
            let count = items.len();
            Page {
                current_page: 1,
                page_size: u32::try_from(count).unwrap_or(u32::MAX),
                total_elements: u64::try_from(count).unwrap_or(u64::MAX),
                items,
            }
        }
        PageShape::Paged(page) => Page {
            items: page.data,
            current_page: page.current_page,
            page_size: page.page_size,
            total_elements: page.total_elements,
        },
    })
}
