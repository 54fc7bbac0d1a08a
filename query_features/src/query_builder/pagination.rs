//! Page windows

use super::sql_generation::SqlGenerator;

/// A 1-based page of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: u64,
    limit: u64,
}

impl PageSpec {
    /// Both values are clamped to at least 1
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Coerce raw `page`/`limit` parameters
    ///
    /// Absent, non-numeric, zero and negative values fall back to the
    /// defaults instead of failing the request.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        default_page: u64,
        default_limit: u64,
    ) -> Self {
        Self::new(
            parse_positive(page).unwrap_or(default_page),
            parse_positive(limit).unwrap_or(default_limit),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of documents before this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn to_sql(&self) -> String {
        SqlGenerator::build_limit_clause(Some(self.limit), Some(self.skip()))
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
