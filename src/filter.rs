//! Row/column selection. Filters compose as a conjunction across facets;
//! each facet carries a select-all sentinel so an untouched UI control never
//! restricts anything.

use crate::canon::{ColumnLabel, ColumnPeriod};
use crate::error::{ExtractError, Result};
use crate::table::CanonicalTable;
use chrono::Month;

/// One facet of a filter: everything, or an explicit subset. An explicit
/// empty subset behaves as select-all for that facet.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    All,
    Only(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    pub fn includes(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.is_empty() || values.contains(value),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.is_empty(),
        }
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

/// The full filter state driving one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub months: Selection<Month>,
    pub years: Selection<i32>,
    pub dimensions: Selection<String>,
}

impl FilterSelection {
    pub fn select_all() -> Self {
        Self::default()
    }
}

/// Column inclusion rule: monthly columns need month AND year to be
/// selected; YTD columns are keyed on their fiscal end-year; columns with no
/// parsed period only survive unrestricted facets.
pub fn column_included(label: &ColumnLabel, selection: &FilterSelection) -> bool {
    match &label.period {
        ColumnPeriod::Month(period) => {
            selection.months.includes(&period.month) && selection.years.includes(&period.year2)
        }
        ColumnPeriod::Ytd(span) => selection.years.includes(&span.end_year2),
        ColumnPeriod::None => {
            selection.months.is_unrestricted() && selection.years.is_unrestricted()
        }
    }
}

/// Applies the selection to a table. The leading dimension column always
/// survives; an empty result is reported as `EmptyAfterFilter` rather than
/// returned as a degenerate table.
pub fn apply_filters(
    table: &CanonicalTable,
    selection: &FilterSelection,
) -> Result<CanonicalTable> {
    let kept_cols: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, label)| *i == 0 || column_included(label, selection))
        .map(|(i, _)| i)
        .collect();

    let kept_rows: Vec<usize> = (0..table.row_count())
        .filter(|&row| match table.dimension_value(row) {
            Some(value) => selection.dimensions.includes(&value),
            None => selection.dimensions.is_unrestricted(),
        })
        .collect();

    if kept_cols.len() <= 1 || kept_rows.is_empty() {
        return Err(ExtractError::EmptyAfterFilter);
    }

    let columns = kept_cols.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = kept_rows
        .iter()
        .map(|&r| kept_cols.iter().map(|&c| table.cell(r, c).clone()).collect())
        .collect();

    Ok(CanonicalTable {
        name: table.name.clone(),
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::canonicalize_header;
    use crate::grid::CellValue;
    use crate::table::CanonicalTable;

    fn table_of(labels: &[&str], body: &[&[&str]]) -> CanonicalTable {
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let header = canonicalize_header(&labels);
        let rows: Vec<Vec<CellValue>> = body
            .iter()
            .map(|row| row.iter().map(|c| CellValue::from_raw(c)).collect())
            .collect();
        CanonicalTable::assemble(None, &header, &rows)
    }

    fn raw_labels(table: &CanonicalTable) -> Vec<&str> {
        table.columns.iter().map(|c| c.raw.as_str()).collect()
    }

    #[test]
    fn test_month_and_year_conjunction() {
        let table = table_of(
            &["REGIONS", "Budget-Apr-24", "Act-Apr-24", "Budget-May-24"],
            &[&["North", "1", "2", "3"]],
        );
        let selection = FilterSelection {
            months: Selection::Only(vec![Month::April]),
            years: Selection::Only(vec![24]),
            dimensions: Selection::All,
        };
        let filtered = apply_filters(&table, &selection).unwrap();
        assert_eq!(
            raw_labels(&filtered),
            vec!["REGIONS", "Budget-Apr-24", "Act-Apr-24"]
        );
    }

    #[test]
    fn test_select_all_is_identity() {
        let table = table_of(
            &["REGIONS", "Budget-Apr-24", "YTD-25-26 (Apr to Jun) Act", "Notes"],
            &[&["North", "1", "2", "x"], &["South", "3", "4", "y"]],
        );
        let filtered = apply_filters(&table, &FilterSelection::select_all()).unwrap();
        assert_eq!(raw_labels(&filtered), raw_labels(&table));
        assert_eq!(filtered.row_count(), table.row_count());
    }

    #[test]
    fn test_empty_subset_means_include_all() {
        let table = table_of(
            &["REGIONS", "Budget-Apr-24", "Budget-May-24"],
            &[&["North", "1", "2"]],
        );
        let selection = FilterSelection {
            months: Selection::Only(Vec::new()),
            years: Selection::Only(Vec::new()),
            dimensions: Selection::Only(Vec::new()),
        };
        let filtered = apply_filters(&table, &selection).unwrap();
        assert_eq!(raw_labels(&filtered), raw_labels(&table));
    }

    #[test]
    fn test_ytd_keyed_on_fiscal_end_year() {
        let table = table_of(
            &["REGIONS", "YTD-25-26 (Apr to Jun) Act", "Budget-Apr-25"],
            &[&["North", "1", "2"]],
        );
        let keep_26 = FilterSelection {
            years: Selection::Only(vec![26]),
            ..FilterSelection::select_all()
        };
        let filtered = apply_filters(&table, &keep_26).unwrap();
        assert_eq!(
            raw_labels(&filtered),
            vec!["REGIONS", "YTD-25-26 (Apr to Jun) Act"]
        );

        let keep_25 = FilterSelection {
            years: Selection::Only(vec![25]),
            ..FilterSelection::select_all()
        };
        let filtered = apply_filters(&table, &keep_25).unwrap();
        // The YTD span ends in 26, so year 25 only keeps the monthly column.
        assert_eq!(raw_labels(&filtered), vec!["REGIONS", "Budget-Apr-25"]);
    }

    #[test]
    fn test_unparsed_columns_dropped_under_restriction() {
        let table = table_of(
            &["REGIONS", "Budget-Apr-24", "Notes"],
            &[&["North", "1", "x"]],
        );
        let selection = FilterSelection {
            months: Selection::Only(vec![Month::April]),
            ..FilterSelection::select_all()
        };
        let filtered = apply_filters(&table, &selection).unwrap();
        assert_eq!(raw_labels(&filtered), vec!["REGIONS", "Budget-Apr-24"]);
    }

    #[test]
    fn test_dimension_row_filter() {
        let table = table_of(
            &["REGIONS", "Act-Apr-24"],
            &[&["North", "1"], &["South", "2"]],
        );
        let selection = FilterSelection {
            dimensions: Selection::Only(vec!["South".to_string()]),
            ..FilterSelection::select_all()
        };
        let filtered = apply_filters(&table, &selection).unwrap();
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.dimension_value(0).as_deref(), Some("South"));
    }

    #[test]
    fn test_empty_result_is_typed() {
        let table = table_of(&["REGIONS", "Act-Apr-24"], &[&["North", "1"]]);
        let selection = FilterSelection {
            months: Selection::Only(vec![Month::June]),
            ..FilterSelection::select_all()
        };
        let err = apply_filters(&table, &selection).unwrap_err();
        assert_eq!(err.reason_code(), "EmptyAfterFilter");
    }
}
