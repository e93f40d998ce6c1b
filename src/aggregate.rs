//! Wide→long reshaping and the aggregation views built on it. Every view
//! takes an already-filtered [`CanonicalTable`] and returns either a
//! populated series or a typed empty reason; periods are always ordered by
//! the fiscal calendar.

use crate::calendar::{fiscal_month_index, FiscalPeriod};
use crate::canon::{ColumnLabel, ColumnPeriod, Metric};
use crate::error::{ExtractError, Result};
use crate::numeric::coerce_cell;
use crate::table::CanonicalTable;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

static RANGE_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\bto\b\s*").expect("valid range separator regex"));

/// One output row for charting/export collaborators: a category (period
/// label or dimension value), a series key, and the aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub category: String,
    pub metric: String,
    pub value: f64,
}

/// Ordered reshaping target consumed by charting and presentation export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedSeries {
    pub rows: Vec<SeriesRow>,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One long-form observation: a dimension value, a period, a metric and a
/// coerced numeric value. Rows whose cell fails coercion are dropped.
#[derive(Debug, Clone)]
pub struct LongRow {
    pub dimension: String,
    pub metric: Metric,
    pub period: ColumnPeriod,
    pub period_label: String,
    pub source_row: usize,
    pub value: f64,
}

/// Reshapes the wide table into long rows over every column that carries a
/// recognized metric.
pub fn reshape_long(table: &CanonicalTable) -> Vec<LongRow> {
    let mut out = Vec::new();
    for row in 0..table.row_count() {
        let dimension = table.dimension_value(row).unwrap_or_default();
        for (col, label) in table.data_columns() {
            let Some(metric) = label.metric else {
                continue;
            };
            let Some(value) = coerce_cell(table.cell(row, col)) else {
                continue;
            };
            out.push(LongRow {
                dimension: dimension.clone(),
                metric,
                period: label.period.clone(),
                period_label: period_display(label),
                source_row: row,
                value,
            });
        }
    }
    out
}

fn period_display(label: &ColumnLabel) -> String {
    match &label.period {
        ColumnPeriod::Month(period) => period.label(),
        ColumnPeriod::Ytd(span) => span.label(),
        ColumnPeriod::None => label.canonical.clone(),
    }
}

fn metric_rank(metric: Metric) -> usize {
    Metric::ALL
        .iter()
        .position(|&m| m == metric)
        .expect("metric is in ALL")
}

fn monthly_columns(table: &CanonicalTable, metric: Metric) -> Vec<FiscalPeriod> {
    table
        .data_columns()
        .filter(|(_, label)| label.metric == Some(metric))
        .filter_map(|(_, label)| label.monthly())
        .collect()
}

/// Budget-vs-Actual comparison: monthly sums for the periods present in
/// **both** the Budget and Act column sets. Non-intersecting periods are
/// silently excluded.
pub fn budget_vs_actual(table: &CanonicalTable) -> Result<AggregatedSeries> {
    let budget_periods: BTreeSet<FiscalPeriod> =
        monthly_columns(table, Metric::Budget).into_iter().collect();
    let act_periods: BTreeSet<FiscalPeriod> =
        monthly_columns(table, Metric::Act).into_iter().collect();

    if budget_periods.is_empty() || act_periods.is_empty() {
        return Err(ExtractError::NoMatchingColumns("Budget and Act".to_string()));
    }

    let common: BTreeSet<FiscalPeriod> =
        budget_periods.intersection(&act_periods).copied().collect();
    if common.is_empty() {
        debug!("Budget and Act columns share no period; comparison is empty");
        return Err(ExtractError::NoMatchingColumns(
            "common Budget/Act periods".to_string(),
        ));
    }

    let mut sums: BTreeMap<((i32, usize), usize), (String, Metric, f64)> = BTreeMap::new();
    for row in reshape_long(table) {
        if row.metric != Metric::Budget && row.metric != Metric::Act {
            continue;
        }
        let ColumnPeriod::Month(period) = row.period else {
            continue;
        };
        if !common.contains(&period) {
            continue;
        }
        let key = (period.fiscal_key(), metric_rank(row.metric));
        let entry = sums
            .entry(key)
            .or_insert_with(|| (row.period_label.clone(), row.metric, 0.0));
        entry.2 += row.value;
    }

    if sums.is_empty() {
        return Err(ExtractError::NoNumericData);
    }

    Ok(AggregatedSeries {
        rows: sums
            .into_values()
            .map(|(category, metric, value)| SeriesRow {
                category,
                metric: metric.display().to_string(),
                value,
            })
            .collect(),
    })
}

/// Portfolio-level monthly series for one metric: sum per period across all
/// rows, in fiscal order.
pub fn monthly_series(table: &CanonicalTable, metric: Metric) -> Result<AggregatedSeries> {
    if monthly_columns(table, metric).is_empty() {
        return Err(ExtractError::NoMatchingColumns(metric.display().to_string()));
    }

    let mut sums: BTreeMap<(i32, usize), (String, f64)> = BTreeMap::new();
    for row in reshape_long(table) {
        if row.metric != metric {
            continue;
        }
        let ColumnPeriod::Month(period) = row.period else {
            continue;
        };
        let entry = sums
            .entry(period.fiscal_key())
            .or_insert_with(|| (row.period_label.clone(), 0.0));
        entry.1 += row.value;
    }

    if sums.is_empty() {
        return Err(ExtractError::NoNumericData);
    }

    Ok(AggregatedSeries {
        rows: sums
            .into_values()
            .map(|(category, value)| SeriesRow {
                category,
                metric: metric.display().to_string(),
                value,
            })
            .collect(),
    })
}

/// YTD comparison for one metric: one aggregated value per YTD span,
/// ordered by the starting month of each span's range. Display labels take
/// the reader-facing form "Act 25-26 (Apr - Jun)".
pub fn ytd_series(table: &CanonicalTable, metric: Metric) -> Result<AggregatedSeries> {
    let mut spans: Vec<(usize, &ColumnLabel)> = table
        .data_columns()
        .filter(|(_, label)| label.metric == Some(metric) && label.ytd().is_some())
        .collect();

    if spans.is_empty() {
        return Err(ExtractError::NoMatchingColumns(format!(
            "YTD {}",
            metric.display()
        )));
    }

    spans.sort_by_key(|(_, label)| {
        let span = label.ytd().expect("filtered to YTD columns");
        span.range_start_month()
            .map(fiscal_month_index)
            .unwrap_or(usize::MAX)
    });

    let mut rows = Vec::new();
    for (col, label) in spans {
        let span = label.ytd().expect("filtered to YTD columns");
        let values: Vec<f64> = (0..table.row_count())
            .filter_map(|row| coerce_cell(table.cell(row, col)))
            .collect();
        if values.is_empty() {
            continue;
        }
        let total: f64 = values.iter().sum();
        let range = RANGE_TO_RE.replace_all(&span.range, " - ").into_owned();
        rows.push(SeriesRow {
            category: format!(
                "{} {:02}-{:02} ({})",
                metric.display(),
                span.start_year2,
                span.end_year2,
                range
            ),
            metric: metric.display().to_string(),
            value: total,
        });
    }

    if rows.is_empty() {
        return Err(ExtractError::NoNumericData);
    }

    Ok(AggregatedSeries { rows })
}

/// A per-dimension ranking view, sorted descending by value with a stable
/// tie-break on original row order.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    /// Canonical label of the column the ranking was computed from.
    pub value_column: String,
    pub rows: Vec<SeriesRow>,
}

impl Ranking {
    pub fn top(&self, n: usize) -> &[SeriesRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn bottom(&self, n: usize) -> &[SeriesRow] {
        &self.rows[self.rows.len() - n.min(self.rows.len())..]
    }
}

/// Ranks dimension values on the latest YTD Act column, falling back to the
/// fiscally-latest Act monthly column. Stoplist rows are excluded before
/// ranking.
pub fn performance_ranking(table: &CanonicalTable, stoplist: &[String]) -> Result<Ranking> {
    let value_col = latest_ytd_act_column(table)
        .or_else(|| latest_monthly_act_column(table))
        .ok_or_else(|| ExtractError::NoMatchingColumns("Act".to_string()))?;

    let label = table.columns[value_col].canonical.clone();
    let lowered: Vec<String> = stoplist.iter().map(|t| t.to_lowercase()).collect();

    let mut rows: Vec<SeriesRow> = Vec::new();
    for row in 0..table.row_count() {
        let Some(dimension) = table.dimension_value(row) else {
            continue;
        };
        let lower = dimension.to_lowercase();
        if lowered.iter().any(|term| lower.contains(term)) {
            continue;
        }
        let Some(value) = coerce_cell(table.cell(row, value_col)) else {
            continue;
        };
        rows.push(SeriesRow {
            category: dimension,
            metric: label.clone(),
            value,
        });
    }

    if rows.is_empty() {
        return Err(ExtractError::NoNumericData);
    }

    // Vec::sort_by is stable, so equal values keep their original row order.
    rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));

    Ok(Ranking {
        value_column: label,
        rows,
    })
}

fn latest_ytd_act_column(table: &CanonicalTable) -> Option<usize> {
    table
        .data_columns()
        .filter(|(_, label)| label.metric == Some(Metric::Act))
        .filter_map(|(col, label)| label.ytd().map(|span| (col, span)))
        .max_by_key(|(_, span)| (span.end_year2, span.start_year2))
        .map(|(col, _)| col)
}

fn latest_monthly_act_column(table: &CanonicalTable) -> Option<usize> {
    table
        .data_columns()
        .filter(|(_, label)| label.metric == Some(Metric::Act))
        .filter_map(|(col, label)| label.monthly().map(|period| (col, period)))
        .max_by_key(|(_, period)| period.fiscal_key())
        .map(|(col, _)| col)
}

/// Month-wise breakdown per dimension value for one metric: no grouping,
/// one row per (dimension, period), fiscally ordered. The series key is the
/// dimension value so consumers can draw one series per branch/product.
pub fn dimension_monthwise(table: &CanonicalTable, metric: Metric) -> Result<AggregatedSeries> {
    if monthly_columns(table, metric).is_empty() {
        return Err(ExtractError::NoMatchingColumns(metric.display().to_string()));
    }

    let mut rows: Vec<(i32, usize, usize, SeriesRow)> = Vec::new();
    for row in reshape_long(table) {
        if row.metric != metric {
            continue;
        }
        let ColumnPeriod::Month(period) = row.period else {
            continue;
        };
        let (fiscal_year, month_index) = period.fiscal_key();
        rows.push((
            fiscal_year,
            month_index,
            row.source_row,
            SeriesRow {
                category: row.period_label,
                metric: row.dimension,
                value: row.value,
            },
        ));
    }

    if rows.is_empty() {
        return Err(ExtractError::NoNumericData);
    }

    rows.sort_by_key(|(year, month, source_row, _)| (*year, *month, *source_row));
    Ok(AggregatedSeries {
        rows: rows.into_iter().map(|(_, _, _, row)| row).collect(),
    })
}
