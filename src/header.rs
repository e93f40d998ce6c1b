//! Header-row discovery. A located region still starts with its anchor row
//! and often a banner row or two; the real header is the first row carrying
//! a metric keyword.

use crate::error::{ExtractError, Result};
use crate::grid::{CellValue, RawGrid};
use crate::locate::TableRegion;
use crate::profile::SheetProfile;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// How many leading rows of a region are searched for the header.
pub const HEADER_SCAN_WINDOW: usize = 5;

static METRIC_ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:budget|ly|act|gr|ach)\b").expect("valid metric regex"));

/// A region with its header resolved: raw column labels plus the data body.
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    /// Index of the header row within the region's non-blank rows. Always
    /// within `[0, min(HEADER_SCAN_WINDOW, region_len) - 1]`.
    pub header_row: usize,
    pub labels: Vec<String>,
    pub body: Vec<Vec<CellValue>>,
}

/// Finds the header row of a region and splits it into labels and body,
/// applying the profile's structural quirks.
pub fn resolve_header(
    grid: &RawGrid,
    region: &TableRegion,
    profile: &SheetProfile,
) -> Result<HeaderBlock> {
    let rows: Vec<Vec<CellValue>> = (region.start_row..region.end_row)
        .filter(|&i| !grid.row_is_blank(i))
        .map(|i| grid.row(i).to_vec())
        .collect();

    let window = HEADER_SCAN_WINDOW.min(rows.len());
    let header_row = (0..window)
        .find(|&i| METRIC_ROW_RE.is_match(&row_text(&rows[i])))
        .ok_or_else(|| ExtractError::HeaderNotFound {
            table: region.anchor.clone().unwrap_or_else(|| "unnamed".to_string()),
            window: HEADER_SCAN_WINDOW,
        })?;

    let labels: Vec<String> = rows[header_row]
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.display() {
            Some(text) => text.trim().to_string(),
            None => format!("Unnamed_{}", i),
        })
        .collect();

    let mut body: Vec<Vec<CellValue>> = rows[header_row + 1..].to_vec();

    if profile.drop_duplicate_subtotal_row && !body.is_empty() {
        debug!("Dropping duplicated subtotal row under header");
        body.remove(0);
    }

    if !profile.row_stoplist.is_empty() {
        body.retain(|row| !leading_cell_matches(row, &profile.row_stoplist));
    }

    Ok(HeaderBlock {
        header_row,
        labels,
        body,
    })
}

fn row_text(row: &[CellValue]) -> String {
    row.iter()
        .filter_map(|c| c.display())
        .collect::<Vec<_>>()
        .join(" ")
}

fn leading_cell_matches(row: &[CellValue], stoplist: &[String]) -> bool {
    let Some(first) = row.first().and_then(|c| c.display()) else {
        return false;
    };
    let lower = first.to_lowercase();
    stoplist.iter().any(|term| lower.contains(&term.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::locate_tables;
    use crate::profile::SheetProfile;

    fn grid_of(lines: &[&str]) -> RawGrid {
        RawGrid::from_raw_rows(
            lines
                .iter()
                .map(|line| line.split('|').map(str::to_string).collect::<Vec<_>>()),
        )
    }

    fn region_for(grid: &RawGrid, profile: &SheetProfile) -> TableRegion {
        locate_tables(grid, &profile.anchors).unwrap().remove(0)
    }

    #[test]
    fn test_header_found_below_anchor() {
        let profile = SheetProfile::classify("Region Wise Analysis", 0);
        let grid = grid_of(&[
            "SALES IN MT",
            "|",
            "REGIONS|Budget-Apr-24|Act-Apr-24",
            "North|100|90",
        ]);
        let block = resolve_header(&grid, &region_for(&grid, &profile), &profile).unwrap();
        // The blank row is dropped before the scan.
        assert_eq!(block.header_row, 1);
        assert_eq!(
            block.labels,
            vec!["REGIONS", "Budget-Apr-24", "Act-Apr-24"]
        );
        assert_eq!(block.body.len(), 1);
    }

    #[test]
    fn test_header_index_stays_in_window() {
        let profile = SheetProfile::classify("Region Wise Analysis", 0);
        let grid = grid_of(&[
            "SALES IN MT",
            "banner",
            "another banner",
            "more banner",
            "yet more",
            "REGIONS|Budget-Apr-24",
            "North|100",
        ]);
        // Header sits at row 5 of the region, outside the 5-row window.
        let err = resolve_header(&grid, &region_for(&grid, &profile), &profile).unwrap_err();
        assert_eq!(err.reason_code(), "HeaderNotFound");
    }

    #[test]
    fn test_null_header_cells_get_placeholder_names() {
        let profile = SheetProfile::classify("Region Wise Analysis", 0);
        let grid = grid_of(&["SALES IN MT", "|Budget-Apr-24|", "North|100|5"]);
        let block = resolve_header(&grid, &region_for(&grid, &profile), &profile).unwrap();
        assert_eq!(
            block.labels,
            vec!["Unnamed_0", "Budget-Apr-24", "Unnamed_2"]
        );
    }

    #[test]
    fn test_duplicate_subtotal_row_dropped_by_flag() {
        // Sheet index 2 carries the duplicated-subtotal quirk.
        let profile = SheetProfile::classify("Region Wise Analysis", 2);
        let grid = grid_of(&[
            "SALES IN MT",
            "REGIONS|Budget-Apr-24",
            "CHN Total|500",
            "North|100",
        ]);
        let block = resolve_header(&grid, &region_for(&grid, &profile), &profile).unwrap();
        assert_eq!(block.body.len(), 1);
        assert_eq!(block.body[0][0].as_text(), Some("North"));
    }

    #[test]
    fn test_row_stoplist_removes_header_artifacts() {
        // Sheet index 1 repeats the "REGIONS" header inside the body.
        let profile = SheetProfile::classify("Company Summary", 1);
        let grid = grid_of(&[
            "SALES IN MT",
            "REGIONS|Budget-Apr-24",
            "North|100",
            "REGIONS|Budget-Apr-24",
            "South|200",
        ]);
        let block = resolve_header(&grid, &region_for(&grid, &profile), &profile).unwrap();
        assert_eq!(block.body.len(), 2);
        assert_eq!(block.body[0][0].as_text(), Some("North"));
        assert_eq!(block.body[1][0].as_text(), Some("South"));
    }
}
