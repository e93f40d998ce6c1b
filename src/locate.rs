//! Table-region detection. Financial report sheets stack several logical
//! tables in one grid; each table is introduced by an anchor phrase
//! ("SALES in MT", "Sales in Value") and closed by a grand-total row.

use crate::error::{ExtractError, Result};
use crate::grid::RawGrid;
use crate::profile::TableAnchor;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

/// Row keywords that terminate a table body. The terminator row itself is
/// kept inside the region.
pub const TERMINATOR_KEYWORDS: [&str; 3] = ["total sales", "grand total", "overall total"];

static TERMINATOR_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = TERMINATOR_KEYWORDS
        .map(|k| k.replace(' ', r"\s+"))
        .join("|");
    Regex::new(&format!("(?i){}", pattern)).expect("valid terminator regex")
});

/// Half-open row bounds of one located table. `anchor` is `None` for the
/// pass-through region produced when no anchor matched anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    pub anchor: Option<String>,
    pub start_row: usize,
    pub end_row: usize,
}

impl TableRegion {
    /// True for the whole-grid fallback region that downstream stages must
    /// not try to canonicalize.
    pub fn is_pass_through(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }
}

/// Locates table regions in document order. Anchors are matched strictly in
/// sequence: the second anchor is only recognized once the first has been
/// found, so a "value" table can never be claimed above its "MT" sibling.
pub fn locate_tables(grid: &RawGrid, anchors: &[TableAnchor]) -> Result<Vec<TableRegion>> {
    let compiled = compile_anchors(anchors)?;

    let mut starts: Vec<(usize, String)> = Vec::new();
    let mut next_anchor = 0;
    for row in 0..grid.row_count() {
        if next_anchor >= compiled.len() {
            break;
        }
        let text = grid.row_text(row);
        if compiled[next_anchor].1.is_match(&text) {
            debug!(
                "Anchor '{}' matched at row {}",
                compiled[next_anchor].0, row
            );
            starts.push((row, compiled[next_anchor].0.clone()));
            next_anchor += 1;
        }
    }

    if starts.is_empty() {
        info!("No anchor keyword matched; emitting whole-grid pass-through region");
        return Ok(vec![TableRegion {
            anchor: None,
            start_row: 0,
            end_row: grid.row_count(),
        }]);
    }

    let mut regions = Vec::with_capacity(starts.len());
    for (i, (start_row, anchor)) in starts.iter().enumerate() {
        let next_start = starts
            .get(i + 1)
            .map(|(row, _)| *row)
            .unwrap_or_else(|| grid.row_count());

        let terminator_end = (start_row + 1..next_start)
            .find(|&row| TERMINATOR_RE.is_match(&grid.row_text(row)))
            .map(|row| row + 1);

        let end_row = terminator_end.unwrap_or(next_start);
        regions.push(TableRegion {
            anchor: Some(anchor.clone()),
            start_row: *start_row,
            end_row,
        });
    }

    Ok(regions)
}

fn compile_anchors(anchors: &[TableAnchor]) -> Result<Vec<(String, Regex)>> {
    anchors
        .iter()
        .map(|anchor| {
            let regex = Regex::new(&format!("(?i){}", anchor.pattern)).map_err(|e| {
                ExtractError::InvalidProfile(format!(
                    "anchor pattern '{}' does not compile: {}",
                    anchor.pattern, e
                ))
            })?;
            Ok((anchor.name.clone(), regex))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RawGrid;

    fn anchor(name: &str, pattern: &str) -> TableAnchor {
        TableAnchor {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }

    fn grid_of(lines: &[&str]) -> RawGrid {
        RawGrid::from_raw_rows(
            lines
                .iter()
                .map(|line| line.split('|').map(str::to_string).collect::<Vec<_>>()),
        )
    }

    fn mt_and_value() -> Vec<TableAnchor> {
        vec![
            anchor("Sales in MT", r"\bsales\s*in\s*mt\b"),
            anchor("Sales in Value", r"\bsales\s*in\s*value\b"),
        ]
    }

    #[test]
    fn test_two_tables_split_at_second_anchor() {
        let grid = grid_of(&[
            "Company Report",
            "SALES IN MT",
            "REGIONS|Budget-Apr-24",
            "North|100",
            "SALES IN VALUE",
            "REGIONS|Budget-Apr-24",
            "North|900",
        ]);
        let regions = locate_tables(&grid, &mt_and_value()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].start_row, 1);
        assert_eq!(regions[0].end_row, 4);
        assert_eq!(regions[1].start_row, 4);
        assert_eq!(regions[1].end_row, 7);
        assert_eq!(regions[0].anchor.as_deref(), Some("Sales in MT"));
    }

    #[test]
    fn test_terminator_row_closes_and_is_kept() {
        let grid = grid_of(&[
            "SALES IN MT",
            "REGIONS|Act-Apr-24",
            "North|10",
            "TOTAL SALES|10",
            "Footnote: unaudited",
        ]);
        let regions = locate_tables(&grid, &mt_and_value()).unwrap();
        assert_eq!(regions.len(), 1);
        // Ends the row after "TOTAL SALES", keeping the terminator row.
        assert_eq!(regions[0].end_row, 4);
    }

    #[test]
    fn test_no_anchor_yields_pass_through() {
        let grid = grid_of(&["random|cells", "more|cells"]);
        let regions = locate_tables(&grid, &mt_and_value()).unwrap();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_pass_through());
        assert_eq!(regions[0].start_row, 0);
        assert_eq!(regions[0].end_row, 2);
    }

    #[test]
    fn test_later_anchor_needs_earlier_anchor_first() {
        // "Sales in Value" appears first but must not be recognized until
        // "Sales in MT" has been located.
        let grid = grid_of(&[
            "SALES IN VALUE",
            "North|900",
            "SALES IN MT",
            "North|100",
            "SALES IN VALUE",
            "North|900",
        ]);
        let regions = locate_tables(&grid, &mt_and_value()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].anchor.as_deref(), Some("Sales in MT"));
        assert_eq!(regions[0].start_row, 2);
        assert_eq!(regions[1].start_row, 4);
    }

    #[test]
    fn test_invalid_anchor_pattern_is_rejected() {
        let grid = grid_of(&["SALES IN MT"]);
        let err = locate_tables(&grid, &[anchor("Broken", r"sales\s*in\s*(")]).unwrap_err();
        assert_eq!(err.reason_code(), "InvalidProfile");
    }
}
