//! Fiscal-calendar ordering for report periods. The fiscal year starts in
//! April: April is month 0 and March is month 11, so Apr-24 through Mar-25
//! form one contiguous run of fiscal year 24.

use chrono::Month;
use std::cmp::Ordering;
use std::str::FromStr;

/// Fiscal month order used everywhere a period is sorted.
pub const FISCAL_MONTH_ORDER: [Month; 12] = [
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
    Month::January,
    Month::February,
    Month::March,
];

/// 0-based index of a calendar month within the fiscal year (April = 0,
/// March = 11).
pub fn fiscal_month_index(month: Month) -> usize {
    ((month.number_from_month() + 8) % 12) as usize
}

/// Three-letter month label, capitalized ("Apr", "May", ...).
pub fn month_abbrev(month: Month) -> &'static str {
    &month.name()[..3]
}

/// Parses a month token from a column label. Accepts full and three-letter
/// names in any case; anything else is not a month.
pub fn parse_month_token(token: &str) -> Option<Month> {
    Month::from_str(token.trim()).ok()
}

/// A report period: a calendar month plus a two-digit year as it appears in
/// column labels ("Apr-24").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiscalPeriod {
    pub month: Month,
    pub year2: i32,
}

impl FiscalPeriod {
    pub fn new(month: Month, year2: i32) -> Self {
        Self { month, year2 }
    }

    /// Parses a (month token, two-digit year) pair as captured from a column
    /// label.
    pub fn parse(month_token: &str, year_token: &str) -> Option<Self> {
        let month = parse_month_token(month_token)?;
        let year2 = year_token.trim().parse::<i32>().ok()?;
        Some(Self { month, year2 })
    }

    /// Total-order sort key. January through March belong to the previous
    /// fiscal year; April through December to their own.
    pub fn fiscal_key(&self) -> (i32, usize) {
        let index = fiscal_month_index(self.month);
        let fiscal_year = if index <= 8 { self.year2 } else { self.year2 - 1 };
        (fiscal_year, index)
    }

    /// Canonical display label, e.g. "Apr-24".
    pub fn label(&self) -> String {
        format!("{}-{:02}", month_abbrev(self.month), self.year2)
    }
}

impl PartialOrd for FiscalPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FiscalPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fiscal_key().cmp(&other.fiscal_key())
    }
}
