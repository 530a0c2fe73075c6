use std::collections::BTreeMap;
use std::str::FromStr;

use mymatch_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Administrative record collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogResource {
    /// Universities.
    Universities,
    /// Campuses of a university.
    Campuses,
    /// Courses.
    Courses,
    /// Lecturers.
    Lecturers,
    /// Students.
    Students,
    /// Platform user accounts.
    Users,
    /// Uploaded study materials.
    Materials,
    /// Lecturer reviews.
    Reviews,
    /// Criteria reviews are scored on.
    ReviewCriteria,
    /// Swap-class requests.
    SwapRequests,
    /// Matchmaking teams.
    Teams,
    /// Member requests posted to matchmaking.
    StudentRequests,
}

impl CatalogResource {
    /// Returns the collection path segment and CLI name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Universities => "universities",
            Self::Campuses => "campuses",
            Self::Courses => "courses",
            Self::Lecturers => "lecturers",
            Self::Students => "students",
            Self::Users => "users",
            Self::Materials => "materials",
            Self::Reviews => "reviews",
            Self::ReviewCriteria => "review-criteria",
            Self::SwapRequests => "swap-requests",
            Self::Teams => "teams",
            Self::StudentRequests => "student-requests",
        }
    }

    /// Returns the collection path.
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Returns the path of a single record.
    ///
    /// The id must be one plain path segment: no separators, query or
    /// fragment markers, percent escapes, or dot segments.
    pub fn record_path(&self, record_id: &str) -> AppResult<String> {
        let record_id = record_id.trim();
        let is_plain_segment = !record_id.is_empty()
            && record_id != "."
            && record_id != ".."
            && !record_id.chars().any(|character| {
                matches!(character, '/' | '\\' | '?' | '#' | '%')
                    || character.is_whitespace()
                    || character.is_control()
            });
        if !is_plain_segment {
            return Err(AppError::Validation(format!(
                "invalid {} record id '{record_id}'",
                self.as_str()
            )));
        }

        Ok(format!("/{}/{record_id}", self.as_str()))
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CatalogResource] = &[
            CatalogResource::Universities,
            CatalogResource::Campuses,
            CatalogResource::Courses,
            CatalogResource::Lecturers,
            CatalogResource::Students,
            CatalogResource::Users,
            CatalogResource::Materials,
            CatalogResource::Reviews,
            CatalogResource::ReviewCriteria,
            CatalogResource::SwapRequests,
            CatalogResource::Teams,
            CatalogResource::StudentRequests,
        ];

        ALL
    }
}

impl FromStr for CatalogResource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown catalog resource '{value}'")))
    }
}

/// Sort direction accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!("unknown sort order '{value}'"))),
        }
    }
}

const RESERVED_QUERY_KEYS: &[&str] = &["page", "size", "sortBy", "sortOrder"];

/// Pagination, sorting, and filtering parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    size: u32,
    sort_by: String,
    sort_order: SortOrder,
    filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            sort_by: "id".to_owned(),
            sort_order: SortOrder::Desc,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    /// Creates a query for a 1-based page.
    pub fn new(page: u32, size: u32) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::Validation(
                "page must be greater than zero".to_owned(),
            ));
        }

        if size == 0 {
            return Err(AppError::Validation(
                "size must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            page,
            size,
            ..Self::default()
        })
    }

    /// Sets the sort column and direction.
    pub fn sorted_by(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> AppResult<Self> {
        let sort_by = sort_by.into();
        if sort_by.trim().is_empty() {
            return Err(AppError::Validation(
                "sort column must not be empty".to_owned(),
            ));
        }

        self.sort_by = sort_by.trim().to_owned();
        self.sort_order = sort_order;
        Ok(self)
    }

    /// Adds an entity-specific filter parameter.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> AppResult<Self> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Validation(
                "filter name must not be empty".to_owned(),
            ));
        }

        if RESERVED_QUERY_KEYS.contains(&key) {
            return Err(AppError::Validation(format!(
                "filter name '{key}' is reserved for paging and sorting"
            )));
        }

        self.filters.insert(key.to_owned(), value.into());
        Ok(self)
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns query string pairs in a stable order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_owned(), self.page.to_string()),
            ("size".to_owned(), self.size.to_string()),
            ("sortBy".to_owned(), self.sort_by.clone()),
            ("sortOrder".to_owned(), self.sort_order.as_str().to_owned()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}
