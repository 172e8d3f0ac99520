//! Filters, ordering and pagination for the customer list.
//!
//! Query-string values arrive as free text. They are normalised here into
//! closed types so nothing user-supplied reaches SQL except as a bound value.

use serde::{Deserialize, Serialize};

use super::validation::non_blank;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Raw query string of `GET /api/customers`.
///
/// Everything is optional text so that malformed numbers fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersQuery {
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListCustomersQuery {
    /// Split into normalised filters, sort and pagination.
    #[must_use]
    pub fn into_parts(self) -> (CustomerFilters, CustomerSort, Pagination) {
        let filters = CustomerFilters {
            search: non_blank(self.search),
            city: non_blank(self.city),
            state: non_blank(self.state),
            pin_code: non_blank(self.pin_code),
        };
        let sort = CustomerSort {
            field: SortField::parse(self.sort_by.as_deref()),
            order: SortOrder::parse(self.order.as_deref()),
        };
        let pagination = Pagination::from_raw(self.page.as_deref(), self.limit.as_deref());
        (filters, sort, pagination)
    }
}

/// Optional, AND-combined filters. Matching is a case-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilters {
    /// First name, last name, phone number or any owned address's details.
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
}

/// Columns the customer list may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    FirstName,
    LastName,
    PhoneNumber,
    AddressCount,
}

impl SortField {
    /// Map client input onto the allow-list; anything unknown sorts by id.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("first_name") => Self::FirstName,
            Some("last_name") => Self::LastName,
            Some("phone_number") => Self::PhoneNumber,
            Some("address_count") => Self::AddressCount,
            _ => Self::Id,
        }
    }

    /// The SQL expression this field orders by.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "c.id",
            Self::FirstName => "c.first_name",
            Self::LastName => "c.last_name",
            Self::PhoneNumber => "c.phone_number",
            Self::AddressCount => "address_count",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` (any case) sorts descending; anything else ascending.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort key plus direction. Ties always break on `id ASC`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// A normalised page request: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Clamp numeric input into range.
    #[must_use]
    pub fn new(page: i64, limit: i64) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let limit = u32::try_from(limit.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// Parse query-string text; unparseable values take the defaults.
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or_else(|| i64::from(DEFAULT_LIMIT));
        Self::new(page, limit)
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// One page of results with the totals a client needs to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, pagination: Pagination, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(pagination.limit));
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages,
            has_next: u64::from(pagination.page) < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::from_raw(None, None);
        assert_eq!((p.page(), p.limit()), (1, 10));
    }

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(Pagination::from_raw(Some("0"), Some("0")), Pagination::new(1, 1));
        assert_eq!(Pagination::from_raw(Some("-3"), Some("500")).limit(), 100);
        assert_eq!(Pagination::from_raw(Some("-3"), Some("500")).page(), 1);
        assert_eq!(Pagination::from_raw(Some("abc"), Some("x")), Pagination::default());
    }

    #[test]
    fn test_pagination_offset() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_page_totals() {
        let page = Page::new(vec![0; 5], Pagination::new(2, 10), 15);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);

        let page = Page::new(vec![0; 10], Pagination::new(1, 10), 15);
        assert!(page.has_next);

        let page: Page<u8> = Page::new(vec![], Pagination::new(1, 10), 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
    }

    #[test]
    fn test_sort_allow_list() {
        assert_eq!(SortField::parse(Some("last_name")), SortField::LastName);
        assert_eq!(SortField::parse(Some("address_count")), SortField::AddressCount);
        assert_eq!(SortField::parse(Some("id; DROP TABLE customers")), SortField::Id);
        assert_eq!(SortField::parse(None), SortField::Id);
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(None).as_sql(), "ASC");
    }

    #[test]
    fn test_query_blank_filters_are_dropped() {
        let query = ListCustomersQuery {
            city: Some("  ".into()),
            state: Some(" MH ".into()),
            ..Default::default()
        };
        let (filters, _, _) = query.into_parts();
        assert_eq!(filters.city, None);
        assert_eq!(filters.state.as_deref(), Some("MH"));
    }
}
