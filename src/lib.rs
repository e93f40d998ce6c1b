//! # Financial Report Extractor
//!
//! A library for recovering normalized, queryable tables from loosely
//! structured financial report spreadsheets (multiple tables per sheet,
//! inconsistent headers, mnemonic column names).
//!
//! ## Core Concepts
//!
//! - **RawGrid**: the untyped cell grid of one sheet, as handed over by the
//!   workbook-loading collaborator
//! - **TableRegion**: row bounds of one logical table, found via anchor
//!   keywords ("SALES in MT") and closed by grand-total rows
//! - **CanonicalTable**: a region with its header resolved and every column
//!   label rewritten into the canonical `Metric[-YTD]-Period` form
//! - **FiscalPeriod**: a (month, two-digit year) pair ordered by the
//!   April-to-March fiscal calendar
//! - **AggregatedSeries**: long-form rows consumed by charting/export
//!   collaborators
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_report_extractor::*;
//!
//! let grid = RawGrid::from_raw_rows(rows_from_loader);
//! let extract = extract_sheet(&grid, "Region Wise Analysis", 3)?;
//!
//! let table = extract.first_table().expect("sheet carries a table");
//! let filtered = apply_filters(table, &FilterSelection::select_all())?;
//! let series = aggregate::budget_vs_actual(&filtered)?;
//! ```

pub mod aggregate;
pub mod calendar;
pub mod canon;
pub mod error;
pub mod filter;
pub mod grid;
pub mod header;
pub mod locate;
pub mod numeric;
pub mod profile;
pub mod table;

pub use aggregate::{
    budget_vs_actual, dimension_monthwise, monthly_series, performance_ranking, reshape_long,
    ytd_series, AggregatedSeries, LongRow, Ranking, SeriesRow,
};
pub use calendar::{fiscal_month_index, month_abbrev, FiscalPeriod, FISCAL_MONTH_ORDER};
pub use canon::{
    canonicalize_header, canonicalize_label, CanonicalizedHeader, ColumnLabel, ColumnPeriod,
    Metric, YtdSpan,
};
pub use error::{ExtractError, ExtractNotice, Result};
pub use filter::{apply_filters, column_included, FilterSelection, Selection};
pub use grid::{CellValue, RawGrid};
pub use header::{resolve_header, HeaderBlock, HEADER_SCAN_WINDOW};
pub use locate::{locate_tables, TableRegion, TERMINATOR_KEYWORDS};
pub use numeric::{coerce_cell, parse_numeric};
pub use profile::{
    AnalysisKind, SheetProfile, TableAnchor, BRANCH_EXCLUDE_TERMS, TOTAL_ROW_TERMS,
};
pub use table::CanonicalTable;

use log::{debug, info};

/// What became of one located region.
#[derive(Debug)]
pub enum TableOutcome {
    /// Header resolved and columns canonicalized.
    Parsed(CanonicalTable),
    /// Kept as raw rows for display-only fallback, with the reason the
    /// region could not be parsed.
    Unparsed {
        reason: ExtractError,
        rows: Vec<Vec<CellValue>>,
    },
}

#[derive(Debug)]
pub struct ExtractedTable {
    pub region: TableRegion,
    pub outcome: TableOutcome,
}

impl ExtractedTable {
    pub fn table(&self) -> Option<&CanonicalTable> {
        match &self.outcome {
            TableOutcome::Parsed(table) => Some(table),
            TableOutcome::Unparsed { .. } => None,
        }
    }
}

/// Everything recovered from one sheet: the extracted tables in document
/// order plus the non-fatal notices gathered along the way.
#[derive(Debug)]
pub struct SheetExtract {
    pub tables: Vec<ExtractedTable>,
    pub notices: Vec<ExtractNotice>,
}

impl SheetExtract {
    pub fn first_table(&self) -> Option<&CanonicalTable> {
        self.tables.iter().find_map(|t| t.table())
    }

    pub fn table_named(&self, name: &str) -> Option<&CanonicalTable> {
        self.tables
            .iter()
            .filter(|t| t.region.anchor.as_deref() == Some(name))
            .find_map(|t| t.table())
    }
}

/// Runs locate → resolve → canonicalize for one sheet. Filtering and
/// aggregation are separate steps so they can re-run per interaction
/// without re-parsing.
pub struct SheetExtractor {
    profile: SheetProfile,
}

impl SheetExtractor {
    pub fn new(profile: SheetProfile) -> Self {
        Self { profile }
    }

    /// Builds an extractor with the profile derived from the sheet's name
    /// and workbook position.
    pub fn for_sheet(sheet_name: &str, sheet_index: usize) -> Self {
        Self::new(SheetProfile::classify(sheet_name, sheet_index))
    }

    pub fn profile(&self) -> &SheetProfile {
        &self.profile
    }

    pub fn extract(&self, grid: &RawGrid) -> Result<SheetExtract> {
        let regions = locate_tables(grid, &self.profile.anchors)?;
        info!(
            "Located {} table region(s) in sheet '{}'",
            regions.len(),
            self.profile.sheet_name
        );

        let mut tables = Vec::with_capacity(regions.len());
        let mut notices = Vec::new();

        for region in regions {
            if region.is_pass_through() {
                tables.push(ExtractedTable {
                    outcome: TableOutcome::Unparsed {
                        reason: ExtractError::NoTableDetected,
                        rows: region_rows(grid, &region),
                    },
                    region,
                });
                continue;
            }

            match resolve_header(grid, &region, &self.profile) {
                Ok(block) => {
                    let header = canonicalize_header(&block.labels);
                    notices.extend(header.notices.clone());
                    let table = CanonicalTable::assemble(
                        region.anchor.clone(),
                        &header,
                        &block.body,
                    );
                    debug!(
                        "Parsed table '{}': {} columns, {} rows",
                        region.anchor.as_deref().unwrap_or("unnamed"),
                        table.column_count(),
                        table.row_count()
                    );
                    tables.push(ExtractedTable {
                        region,
                        outcome: TableOutcome::Parsed(table),
                    });
                }
                Err(reason @ ExtractError::HeaderNotFound { .. }) => {
                    tables.push(ExtractedTable {
                        outcome: TableOutcome::Unparsed {
                            reason,
                            rows: region_rows(grid, &region),
                        },
                        region,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(SheetExtract { tables, notices })
    }
}

/// One-call convenience wrapper over [`SheetExtractor`].
pub fn extract_sheet(
    grid: &RawGrid,
    sheet_name: &str,
    sheet_index: usize,
) -> Result<SheetExtract> {
    SheetExtractor::for_sheet(sheet_name, sheet_index).extract(grid)
}

fn region_rows(grid: &RawGrid, region: &TableRegion) -> Vec<Vec<CellValue>> {
    (region.start_row..region.end_row)
        .map(|i| grid.row(i).to_vec())
        .collect()
}
