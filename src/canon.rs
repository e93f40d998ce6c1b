//! Column-label canonicalization. Raw headers mix metric mnemonics, month
//! tokens, two-digit years and YTD ranges with inconsistent separators; this
//! module rewrites them into one canonical `Metric[-YTD]-Period` form via a
//! priority-ordered rule table, first match wins.

use crate::calendar::{month_abbrev, parse_month_token, FiscalPeriod};
use crate::error::ExtractNotice;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Report metric mnemonics as they appear in column headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Budget,
    Ly,
    Act,
    Gr,
    Ach,
}

impl Metric {
    pub const ALL: [Metric; 5] = [Metric::Budget, Metric::Ly, Metric::Act, Metric::Gr, Metric::Ach];

    pub fn display(&self) -> &'static str {
        match self {
            Metric::Budget => "Budget",
            Metric::Ly => "LY",
            Metric::Act => "Act",
            Metric::Gr => "Gr",
            Metric::Ach => "Ach",
        }
    }

    pub fn from_token(token: &str) -> Option<Metric> {
        match token.trim().to_ascii_lowercase().as_str() {
            "budget" => Some(Metric::Budget),
            "ly" => Some(Metric::Ly),
            "act" => Some(Metric::Act),
            "gr" => Some(Metric::Gr),
            "ach" => Some(Metric::Ach),
            _ => None,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// Fiscal-year span of a YTD aggregate column, e.g. `25-26 (Apr to Jun)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct YtdSpan {
    pub start_year2: i32,
    pub end_year2: i32,
    /// Month range exactly as written in the label, e.g. "Apr to Jun".
    pub range: String,
}

impl YtdSpan {
    /// Period part of the canonical label, e.g. "YTD-25-26 (Apr to Jun)".
    pub fn label(&self) -> String {
        format!(
            "YTD-{:02}-{:02} ({})",
            self.start_year2, self.end_year2, self.range
        )
    }

    /// First month named inside the range, used to order YTD columns.
    pub fn range_start_month(&self) -> Option<chrono::Month> {
        self.range
            .split_whitespace()
            .next()
            .and_then(parse_month_token)
    }
}

/// Structured period of a canonicalized column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnPeriod {
    Month(FiscalPeriod),
    Ytd(YtdSpan),
    None,
}

/// A column header after canonicalization. `raw` is preserved verbatim for
/// display fallbacks; `canonical` is unique within one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLabel {
    pub raw: String,
    pub canonical: String,
    pub metric: Option<Metric>,
    pub period: ColumnPeriod,
}

impl ColumnLabel {
    fn pass_through(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            canonical: raw.trim().to_string(),
            metric: None,
            period: ColumnPeriod::None,
        }
    }

    pub fn monthly(&self) -> Option<FiscalPeriod> {
        match &self.period {
            ColumnPeriod::Month(p) => Some(*p),
            _ => None,
        }
    }

    pub fn ytd(&self) -> Option<&YtdSpan> {
        match &self.period {
            ColumnPeriod::Ytd(span) => Some(span),
            _ => None,
        }
    }
}

// Rule patterns, evaluated top to bottom against the normalized label.
static YTD_TRAILING_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^ytd[-\s]*(\d{2})[-\s]*(\d{2})\s*\(([^)]*)\)\s*(budget|ly|act|gr|ach)$")
        .expect("valid YTD trailing-metric regex")
});

static YTD_LEADING_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(budget|ly|act|gr|ach)[-\s]*ytd[-\s]*(\d{2})[-\s]*(\d{2})\s*\(([^)]*)\)$")
        .expect("valid YTD leading-metric regex")
});

static MONTHLY_METRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(budget|ly|act|gr|ach)[-\s]*([a-z]{3,9})[-\s]*(\d{2})$")
        .expect("valid monthly metric regex")
});

static BARE_CARRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(gr|ach)\s*\.?\s*%?$").expect("valid bare-metric regex"));

/// Canonicalizes one raw label. `carry` is the "last monthly period seen"
/// accumulator threaded through a single left-to-right pass over one table's
/// columns; rule 3 matches update it, rule 4 consumes it.
pub fn canonicalize_label(raw: &str, carry: &mut Option<FiscalPeriod>) -> ColumnLabel {
    let normalized = raw.trim().replace(',', "").replace('\u{2013}', "-");

    // Rule 1: YTD with trailing metric suffix.
    if let Some(caps) = YTD_TRAILING_METRIC_RE.captures(&normalized) {
        let span = ytd_span(&caps[1], &caps[2], &caps[3]);
        let metric = Metric::from_token(&caps[4]).expect("alternation is exhaustive");
        return ytd_label(raw, metric, span);
    }

    // Rule 2: metric-prefixed YTD.
    if let Some(caps) = YTD_LEADING_METRIC_RE.captures(&normalized) {
        let metric = Metric::from_token(&caps[1]).expect("alternation is exhaustive");
        let span = ytd_span(&caps[2], &caps[3], &caps[4]);
        return ytd_label(raw, metric, span);
    }

    // Rule 3: monthly metric. The month token must actually be a month;
    // otherwise the label falls through untouched.
    if let Some(caps) = MONTHLY_METRIC_RE.captures(&normalized) {
        if let Some(period) = FiscalPeriod::parse(&caps[2], &caps[3]) {
            let metric = Metric::from_token(&caps[1]).expect("alternation is exhaustive");
            *carry = Some(period);
            return monthly_label(raw, metric, period);
        }
    }

    // Rule 4: bare Gr/Ach inherits the last monthly period seen.
    if let Some(caps) = BARE_CARRY_RE.captures(&normalized) {
        let metric = Metric::from_token(&caps[1]).expect("alternation is exhaustive");
        if let Some(period) = *carry {
            return monthly_label(raw, metric, period);
        }
        // No period to inherit: keep the label but remember the metric.
        return ColumnLabel {
            metric: Some(metric),
            ..ColumnLabel::pass_through(raw)
        };
    }

    // Rule 5: pass through unchanged.
    ColumnLabel::pass_through(raw)
}

fn ytd_span(start: &str, end: &str, range: &str) -> YtdSpan {
    YtdSpan {
        start_year2: start.parse().expect("two-digit capture"),
        end_year2: end.parse().expect("two-digit capture"),
        range: range.trim().replace('\u{2013}', "-"),
    }
}

fn ytd_label(raw: &str, metric: Metric, span: YtdSpan) -> ColumnLabel {
    ColumnLabel {
        raw: raw.to_string(),
        canonical: format!("{}-{}", metric.display(), span.label()),
        metric: Some(metric),
        period: ColumnPeriod::Ytd(span),
    }
}

fn monthly_label(raw: &str, metric: Metric, period: FiscalPeriod) -> ColumnLabel {
    ColumnLabel {
        raw: raw.to_string(),
        canonical: format!(
            "{} - {}-{:02}",
            metric.display(),
            month_abbrev(period.month),
            period.year2
        ),
        metric: Some(metric),
        period: ColumnPeriod::Month(period),
    }
}

/// Result of canonicalizing one table's header. `kept_indices` maps each
/// surviving column back to its source position so the data body can be
/// projected to match.
#[derive(Debug, Clone)]
pub struct CanonicalizedHeader {
    pub columns: Vec<ColumnLabel>,
    pub kept_indices: Vec<usize>,
    pub notices: Vec<ExtractNotice>,
}

/// Runs the rule table over a whole header, left to right, then collapses
/// duplicate canonical names (first occurrence kept).
pub fn canonicalize_header(labels: &[String]) -> CanonicalizedHeader {
    let mut carry: Option<FiscalPeriod> = None;
    let mut columns = Vec::with_capacity(labels.len());
    let mut kept_indices = Vec::with_capacity(labels.len());
    let mut notices = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in labels.iter().enumerate() {
        let label = canonicalize_label(raw, &mut carry);
        if !seen.insert(label.canonical.clone()) {
            warn!("Duplicate column '{}' dropped", label.canonical);
            notices.push(ExtractNotice::DuplicateColumnsDropped {
                label: label.canonical,
            });
            continue;
        }
        columns.push(label);
        kept_indices.push(index);
    }

    CanonicalizedHeader {
        columns,
        kept_indices,
        notices,
    }
}
