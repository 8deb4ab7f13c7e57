//! Pagination, sorting and result metadata for list queries
//!
//! Caller-supplied page/page_size/sort values are validated here and turned
//! into [`FilterParams`]. The sort column handed to the store is always the
//! safelist's own `&'static str`, so no caller text can reach the ORDER BY
//! clause.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::validator::Validator;

/// Highest page number accepted
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page size accepted
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Columns a song listing may be sorted by
///
/// A leading `-` on the requested sort selects descending order.
pub static SONG_SORT_SAFELIST: &[&str] = &["id", "title", "artist", "year", "length"];

/// Sort order of a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Raw list-query inputs as read from a request
#[derive(Debug, Clone)]
pub struct Filters {
    /// Page number (1-indexed)
    pub page: i64,
    pub page_size: i64,
    /// Column name, optionally prefixed with `-` for descending order
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safelist: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist,
        }
    }

    /// First page, default page size, ascending by id
    pub fn default_for(sort_safelist: &'static [&'static str]) -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE, "id", sort_safelist)
    }

    /// Validate and derive the bounded query parameters
    ///
    /// Every failing field is reported together as `Error::Validation`.
    pub fn resolve(&self) -> Result<FilterParams> {
        let mut v = Validator::new();
        match validate_filters(&mut v, self) {
            Some((sort_column, sort_direction)) if v.valid() => Ok(FilterParams {
                page: self.page,
                page_size: self.page_size,
                limit: self.page_size,
                offset: (self.page - 1) * self.page_size,
                sort_column,
                sort_direction,
            }),
            _ => Err(Error::Validation(v.into_errors())),
        }
    }
}

/// Apply the page, page_size and sort rules to `v`
///
/// Returns the matched safelist entry and direction, or `None` after
/// recording a `sort` error.
pub fn validate_filters(
    v: &mut Validator,
    f: &Filters,
) -> Option<(&'static str, SortDirection)> {
    v.check(
        (1..=MAX_PAGE).contains(&f.page),
        "page",
        "must be between 1 and 10,000,000",
    );
    v.check(
        (1..=MAX_PAGE_SIZE).contains(&f.page_size),
        "page_size",
        "must be between 1 and 100",
    );

    let sort = lookup_sort(&f.sort, f.sort_safelist);
    v.check(sort.is_some(), "sort", "invalid sort value");
    sort
}

/// Strip one leading `-` and find the remaining key in `safelist`
fn lookup_sort(
    sort: &str,
    safelist: &'static [&'static str],
) -> Option<(&'static str, SortDirection)> {
    let (key, direction) = match sort.strip_prefix('-') {
        Some(key) => (key, SortDirection::Desc),
        None => (sort, SortDirection::Asc),
    };
    safelist
        .iter()
        .copied()
        .find(|column| *column == key)
        .map(|column| (column, direction))
}

/// Validated pagination and ordering parameters for the store
///
/// Only obtainable from [`Filters::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    page: i64,
    page_size: i64,
    limit: i64,
    offset: i64,
    sort_column: &'static str,
    sort_direction: SortDirection,
}

impl FilterParams {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows per page (LIMIT)
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows skipped before this page (OFFSET)
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn sort_column(&self) -> &'static str {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}

/// Pagination metadata for a list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Calculate pagination metadata from the total number of matching records
///
/// An empty result yields all-zero metadata.
///
/// # Examples
/// ```
/// use songs_data::filters::calculate_metadata;
///
/// // 45 records at 20 per page = 3 pages (20 + 20 + 5)
/// let m = calculate_metadata(45, 2, 20);
/// assert_eq!(m.current_page, 2);
/// assert_eq!(m.last_page, 3);
///
/// assert_eq!(calculate_metadata(0, 1, 20).last_page, 0);
/// ```
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size < 1 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters::new(page, page_size, sort, SONG_SORT_SAFELIST)
    }

    fn validation_keys(err: Error) -> Vec<String> {
        match err {
            Error::Validation(errors) => errors.iter().map(|(k, _)| k.to_string()).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_filters_resolve() {
        let p = Filters::default_for(SONG_SORT_SAFELIST).resolve().unwrap();
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.sort_column(), "id");
        assert_eq!(p.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_offset_and_limit() {
        let p = filters(3, 25, "title").resolve().unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
        assert_eq!(p.page(), 3);
        assert_eq!(p.page_size(), 25);
    }

    #[test]
    fn test_descending_sort() {
        let p = filters(1, 20, "-year").resolve().unwrap();
        assert_eq!(p.sort_column(), "year");
        assert_eq!(p.sort_direction(), SortDirection::Desc);
        assert_eq!(p.sort_direction().as_sql(), "DESC");
    }

    #[test]
    fn test_page_zero_rejected() {
        let keys = validation_keys(filters(0, 20, "id").resolve().unwrap_err());
        assert_eq!(keys, vec!["page"]);
    }

    #[test]
    fn test_page_upper_bound() {
        assert!(filters(MAX_PAGE, 20, "id").resolve().is_ok());
        let keys = validation_keys(filters(MAX_PAGE + 1, 20, "id").resolve().unwrap_err());
        assert_eq!(keys, vec!["page"]);
    }

    #[test]
    fn test_page_size_bounds() {
        let keys = validation_keys(filters(1, 0, "id").resolve().unwrap_err());
        assert_eq!(keys, vec!["page_size"]);

        let keys = validation_keys(filters(1, 101, "id").resolve().unwrap_err());
        assert_eq!(keys, vec!["page_size"]);

        assert!(filters(1, 100, "id").resolve().is_ok());
        assert!(filters(1, 1, "id").resolve().is_ok());
    }

    #[test]
    fn test_unknown_sort_rejected() {
        for sort in ["genres", "created_at", "id; DROP TABLE songs", "--year", "", "-", "YEAR"] {
            let keys = validation_keys(filters(1, 20, sort).resolve().unwrap_err());
            assert_eq!(keys, vec!["sort"], "sort {:?} should be rejected", sort);
        }
    }

    #[test]
    fn test_all_violations_reported_together() {
        let err = filters(0, 500, "bogus").resolve().unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors.get("page"), Some("must be between 1 and 10,000,000"));
                assert_eq!(errors.get("page_size"), Some("must be between 1 and 100"));
                assert_eq!(errors.get("sort"), Some("invalid sort value"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_column_is_safelist_entry() {
        let requested = String::from("-artist");
        let p = filters(1, 20, &requested).resolve().unwrap();
        let entry = SONG_SORT_SAFELIST.iter().find(|c| **c == "artist").unwrap();
        assert!(std::ptr::eq(p.sort_column(), *entry));
    }

    #[test]
    fn test_validate_filters_returns_matched_entry() {
        let mut v = Validator::new();
        let sort = validate_filters(&mut v, &filters(1, 20, "-title"));
        assert!(v.valid());
        assert_eq!(sort, Some(("title", SortDirection::Desc)));

        let mut v = Validator::new();
        let sort = validate_filters(&mut v, &filters(1, 20, "genres"));
        assert_eq!(sort, None);
        assert_eq!(v.errors().get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn test_valid_sort_with_bad_page_still_rejected() {
        let keys = validation_keys(filters(0, 20, "-year").resolve().unwrap_err());
        assert_eq!(keys, vec!["page"]);
    }

    #[test]
    fn test_metadata_normal() {
        let m = calculate_metadata(45, 2, 20);
        assert_eq!(
            m,
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 3,
                total_records: 45,
            }
        );
    }

    #[test]
    fn test_metadata_exact_page_boundary() {
        let m = calculate_metadata(40, 1, 20);
        assert_eq!(m.last_page, 2);
    }

    #[test]
    fn test_metadata_empty() {
        assert_eq!(calculate_metadata(0, 1, 20), Metadata::default());
    }
}
