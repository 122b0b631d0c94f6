//! Pagination helpers shared by list endpoints.
//!
//! Two request shapes exist on the wire: `page`/`limit` (contacts) and
//! `limit`/`skip` (wallets, invoices). Both normalize into [`Pagination`].

pub const MAX_PER_PAGE: u64 = 100;

/// Largest offset the database accepts (`OFFSET` is a signed bigint).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Normalized window over a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// rows to skip
    pub offset: u64,
    /// rows per page, within `1..=MAX_PER_PAGE`
    pub limit: u64,
}

impl Pagination {
    /// 1-based page index plus page size.
    pub fn from_page(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PER_PAGE);
        let page = page.unwrap_or(1).max(1);
        Self { offset: (page - 1).saturating_mul(limit).min(MAX_OFFSET), limit }
    }

    /// Raw `limit`/`skip` pair.
    pub fn from_skip(limit: Option<u64>, skip: Option<u64>, default_limit: u64) -> Self {
        Self { offset: skip.unwrap_or(0).min(MAX_OFFSET), limit: limit.unwrap_or(default_limit).clamp(1, MAX_PER_PAGE) }
    }

    /// 1-based page the window starts in.
    pub fn page(&self) -> u64 { self.offset / self.limit + 1 }

    /// Number of pages needed for `total` rows.
    pub fn pages(&self, total: u64) -> u64 { total.div_ceil(self.limit) }
}

impl Default for Pagination {
    fn default() -> Self { Self { offset: 0, limit: 20 } }
}

#[cfg(test)]
mod tests {
    use super::{Pagination, MAX_OFFSET};

    #[test]
    fn page_zero_clamps_to_first() {
        let p = Pagination::from_page(Some(0), Some(0), 10);
        assert_eq!(p.offset, 0);
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn clamps_upper_bound() {
        let p = Pagination::from_page(Some(5), Some(1000), 10);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 400);
        assert_eq!(p.page(), 5);
    }

    #[test]
    fn skip_maps_to_page() {
        let p = Pagination::from_skip(Some(20), Some(40), 20);
        assert_eq!(p.page(), 3);
        assert_eq!(p.pages(41), 3);
        assert_eq!(p.pages(0), 0);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.offset, 0);
        assert_eq!(d.limit, 20);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let p = Pagination::from_page(Some(u64::MAX), Some(100), 10);
        assert_eq!(p.offset, MAX_OFFSET);
        assert_eq!(p.limit, 100);
        assert_eq!(Pagination::from_skip(None, Some(u64::MAX), 20).offset, MAX_OFFSET);
        assert_eq!(p.pages(5), 1);
    }
}
