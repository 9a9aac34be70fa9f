//! Pagination utilities for list endpoints.
//!
//! Lists accept either offset-based (`limit` + `offset`) or page-based
//! (`limit` + `page`) parameters. When `page` is provided it takes precedence
//! over `offset`.
//!
//! ```ignore
//! let limit = params.limit();
//! let offset = params.offset();
//! let rows = fetch(limit, offset).await?;
//! let total = count().await?;
//! Ok(Json(Paginated { data: rows, meta: params.meta(total) }))
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters arrive as strings and may be empty, which is treated as
/// `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
///
/// ```json
/// { "total": 100, "limit": 10, "offset": 20, "page": 3, "total_pages": 10, "has_more": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page number (only present if page-based pagination was used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Number of pages at the applied limit
    pub total_pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

/// A page of rows plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Query parameters for pagination.
///
/// - `limit` is clamped to `[1, 100]` (default 10)
/// - `offset` is clamped to a minimum of 0
/// - `page` is clamped to a minimum of 1
#[derive(Debug, Clone, Hash, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            offset: Some(0),
            page: None,
        }
    }
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the effective offset, derived from `page` when present.
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            let page = page.max(1);
            (page - 1).saturating_mul(self.limit())
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    /// Returns the page number if provided, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }

    /// Builds the response metadata for a list with `total` matching rows.
    #[must_use]
    pub fn meta(&self, total: i64) -> PaginationMeta {
        let limit = self.limit();
        let offset = self.offset();
        let total = total.max(0);

        PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            page: self.page(),
            total_pages: (total + limit - 1) / limit,
            has_more: offset + limit < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        for (input, expected) in [
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(101), 100),
            (Some(0), 1),
            (Some(-1), 1),
            (None, 10),
        ] {
            assert_eq!(params(input, None, None).limit(), expected);
        }
    }

    #[test]
    fn test_negative_offset_is_zero() {
        assert_eq!(params(Some(10), Some(-5), None).offset(), 0);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(7), Some(3));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page(), Some(3));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let p = params(Some(20), None, Some(0));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), Some(1));
    }

    #[test]
    fn test_meta_middle_page() {
        let meta = params(Some(10), None, Some(2)).meta(35);
        assert_eq!(meta.total, 35);
        assert_eq!(meta.offset, Some(10));
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_more);
    }

    #[test]
    fn test_meta_last_page() {
        let meta = params(Some(10), None, Some(4)).meta(35);
        assert_eq!(meta.offset, Some(30));
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_exact_multiple() {
        let meta = params(Some(10), Some(10), None).meta(20);
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_empty() {
        let meta = PaginationParams::default().meta(0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_empty_strings() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"","offset":""}"#).unwrap();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_deserialize_values() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"25","page":"2"}"#).unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 25);
    }

    #[test]
    fn test_meta_serialization_skips_missing_page() {
        let meta = params(Some(10), Some(0), None).meta(5);
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("\"page\""));
        assert!(json.contains(r#""total_pages":1"#));
    }
}
