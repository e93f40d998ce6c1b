use crate::calendar::fiscal_month_index;
use crate::canon::{CanonicalizedHeader, ColumnLabel, ColumnPeriod};
use crate::grid::CellValue;
use chrono::Month;
use std::collections::BTreeSet;

/// A normalized report table: canonical column labels plus the data body.
/// The first column is always the leading dimension column (branch, product
/// or row label); every other column is numeric-or-null.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    pub name: Option<String>,
    pub columns: Vec<ColumnLabel>,
    pub rows: Vec<Vec<CellValue>>,
}

impl CanonicalTable {
    /// Assembles a table from a canonicalized header and the raw data body,
    /// projecting each row onto the surviving columns. Short rows are padded
    /// with `Null`.
    pub fn assemble(
        name: Option<String>,
        header: &CanonicalizedHeader,
        body: &[Vec<CellValue>],
    ) -> Self {
        let rows = body
            .iter()
            .map(|row| {
                header
                    .kept_indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();
        Self {
            name,
            columns: header.columns.clone(),
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.len() <= 1
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.rows[row][col]
    }

    /// The leading dimension column's label, if the table has any columns.
    pub fn dimension_column(&self) -> Option<&ColumnLabel> {
        self.columns.first()
    }

    /// Trimmed textual value of the dimension cell of one row.
    pub fn dimension_value(&self, row: usize) -> Option<String> {
        self.rows[row]
            .first()
            .and_then(|c| c.display())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Data columns in order, skipping the leading dimension column.
    pub fn data_columns(&self) -> impl Iterator<Item = (usize, &ColumnLabel)> {
        self.columns.iter().enumerate().skip(1)
    }

    /// Distinct, sorted dimension values after stoplist rows are removed.
    ///
    /// Stoplist matching is a case-insensitive substring test, so a
    /// legitimate value that merely contains a stoplist term (say a branch
    /// named after the word "Total") is excluded too; that trade-off is
    /// inherited from the report layouts themselves.
    pub fn dimension_values(&self, stoplist: &[String]) -> Vec<String> {
        let lowered: Vec<String> = stoplist.iter().map(|t| t.to_lowercase()).collect();
        let mut distinct: BTreeSet<String> = BTreeSet::new();
        for row in 0..self.row_count() {
            if let Some(value) = self.dimension_value(row) {
                let lower = value.to_lowercase();
                if lowered.iter().any(|term| lower.contains(term)) {
                    continue;
                }
                distinct.insert(value);
            }
        }
        distinct.into_iter().collect()
    }

    /// Distinct months named by monthly columns, in fiscal order. This is
    /// the month domain offered to filter UIs.
    pub fn month_domain(&self) -> Vec<Month> {
        let mut months: Vec<Month> = Vec::new();
        for (_, label) in self.data_columns() {
            if let ColumnPeriod::Month(period) = &label.period {
                if !months.contains(&period.month) {
                    months.push(period.month);
                }
            }
        }
        months.sort_by_key(|&m| fiscal_month_index(m));
        months
    }

    /// Distinct two-digit years named by monthly and YTD columns, ascending.
    pub fn year_domain(&self) -> Vec<i32> {
        let mut years: BTreeSet<i32> = BTreeSet::new();
        for (_, label) in self.data_columns() {
            match &label.period {
                ColumnPeriod::Month(period) => {
                    years.insert(period.year2);
                }
                ColumnPeriod::Ytd(span) => {
                    years.insert(span.start_year2);
                    years.insert(span.end_year2);
                }
                ColumnPeriod::None => {}
            }
        }
        years.into_iter().collect()
    }
}
