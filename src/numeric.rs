//! Locale-safe coercion of textual cells into numbers. Report sheets carry
//! thousands separators and stray whitespace; coercion is total and returns
//! `None` instead of guessing.

use crate::grid::CellValue;

/// Parses a raw string into a number, stripping thousands separators.
/// Parenthesized values are treated as negatives, as in accounting exports.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let mut cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let mut negate = false;
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
        negate = true;
    }

    cleaned.parse::<f64>().ok().map(|n| {
        if negate {
            -n
        } else {
            n
        }
    })
}

/// Coerces any cell into a number. Numbers pass through, text goes through
/// [`parse_numeric`], everything else is `None`.
pub fn coerce_cell(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_numeric(s),
        CellValue::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(parse_numeric("1,234"), Some(1234.0));
        assert_eq!(parse_numeric("12,34,567.89"), Some(1234567.89));
    }

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(parse_numeric("(1,500)"), Some(-1500.0));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(parse_numeric("North"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("12 MT"), None);
    }

    #[test]
    fn test_coerce_cell_variants() {
        assert_eq!(coerce_cell(&CellValue::Number(3.5)), Some(3.5));
        assert_eq!(coerce_cell(&CellValue::Text("2,000".to_string())), Some(2000.0));
        assert_eq!(coerce_cell(&CellValue::Text("Gr".to_string())), None);
        assert_eq!(coerce_cell(&CellValue::Null), None);
    }
}
