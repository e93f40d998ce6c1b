use crate::numeric::parse_numeric;
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell. Sheets mix absent, numeric and textual cells
/// freely, so every consumer matches on the variant instead of assuming a
/// type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Builds a cell from a raw textual value the way the loading
    /// collaborator hands them over: placeholder tokens become `Null`,
    /// values that coerce cleanly become `Number`, everything else stays
    /// `Text`.
    pub fn from_raw(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "nan" | "none" | "nat" | "null" | "-" => return CellValue::Null,
            _ => {}
        }
        match parse_numeric(trimmed) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Display form used when joining a row into searchable text. `Null`
    /// yields nothing so placeholder cells never pollute keyword matches.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Row-major grid of cells for one sheet, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor for tests and loaders that hold raw strings.
    pub fn from_raw_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| CellValue::from_raw(&c)).collect())
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[CellValue] {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Joins the non-null cells of a row into one searchable string. Anchor
    /// and header keywords can sit in any cell of the row.
    pub fn row_text(&self, index: usize) -> String {
        self.rows[index]
            .iter()
            .filter_map(|c| c.display())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn row_is_blank(&self, index: usize) -> bool {
        self.rows[index].iter().all(|c| c.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_classification() {
        assert_eq!(CellValue::from_raw("  "), CellValue::Null);
        assert_eq!(CellValue::from_raw("NaN"), CellValue::Null);
        assert_eq!(CellValue::from_raw("none"), CellValue::Null);
        assert_eq!(CellValue::from_raw("1,234.5"), CellValue::Number(1234.5));
        assert_eq!(
            CellValue::from_raw(" North "),
            CellValue::Text("North".to_string())
        );
    }

    #[test]
    fn test_row_text_skips_nulls() {
        let grid = RawGrid::new(vec![vec![
            CellValue::Text("SALES".to_string()),
            CellValue::Null,
            CellValue::Text("in MT".to_string()),
            CellValue::Number(42.0),
        ]]);
        assert_eq!(grid.row_text(0), "SALES in MT 42");
    }

    #[test]
    fn test_blank_row_detection() {
        let grid = RawGrid::new(vec![
            vec![CellValue::Null, CellValue::Null],
            vec![CellValue::Null, CellValue::Number(1.0)],
        ]);
        assert!(grid.row_is_blank(0));
        assert!(!grid.row_is_blank(1));
    }
}
