use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Row-prefix labels that mark subtotal/aggregate rows across all report
/// layouts.
pub const TOTAL_ROW_TERMS: [&str; 3] = ["TOTAL SALES", "GRAND TOTAL", "OVERALL TOTAL"];

/// Group/subtotal labels that masquerade as branches in region sheets and
/// must be excluded from dimension analysis.
pub const BRANCH_EXCLUDE_TERMS: [&str; 5] = [
    "CHN Total",
    "ERD SALES",
    "North Total",
    "WEST SALES",
    "GROUP COMPANIES",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AnalysisKind {
    #[schemars(description = "Company-level summary sheet; the leading column is a free-form row label")]
    Summary,

    #[schemars(description = "Region-wise analysis sheet; the leading column holds branch names")]
    Branch,

    #[schemars(description = "Product-wise analysis sheet; the leading column holds product names")]
    Product,
}

/// One anchor phrase locating the start of a logical table. Patterns are
/// case-insensitive regular expressions matched against whole-row text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct TableAnchor {
    #[schemars(description = "Display name of the table this anchor introduces (e.g. 'Sales in MT')")]
    pub name: String,

    #[schemars(description = "Case-insensitive regular expression that identifies the anchor row")]
    pub pattern: String,
}

/// Structural description of one sheet: which anchors open its tables and
/// which layout quirks apply. Derived from the sheet name and position via
/// [`SheetProfile::classify`], or supplied by the caller as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetProfile {
    #[schemars(description = "Sheet name as reported by the workbook loader")]
    pub sheet_name: String,

    #[schemars(description = "0-based position of the sheet within the workbook")]
    pub sheet_index: usize,

    #[schemars(description = "Which analysis family the sheet belongs to")]
    pub kind: AnalysisKind,

    #[schemars(description = "Ordered anchor phrases; later anchors are only recognized after earlier ones")]
    pub anchors: Vec<TableAnchor>,

    #[serde(default)]
    #[schemars(
        description = "Drop one extra leading data row after the header. Some layout classes repeat the subtotal row directly under the header."
    )]
    pub drop_duplicate_subtotal_row: bool,

    #[serde(default)]
    #[schemars(
        description = "Case-insensitive substrings identifying repeated-header artifact rows to remove from the table body (matched against the leading column)"
    )]
    pub row_stoplist: Vec<String>,

    #[serde(default)]
    #[schemars(
        description = "Case-insensitive substrings identifying subtotal/group rows excluded from dimension analysis"
    )]
    pub dimension_stoplist: Vec<String>,
}

impl SheetProfile {
    /// Derives a profile from the sheet name and workbook position, the way
    /// the original reports are laid out.
    pub fn classify(sheet_name: &str, sheet_index: usize) -> Self {
        let lower = sheet_name.to_lowercase();

        let kind = if lower.contains("region wise analysis") {
            AnalysisKind::Branch
        } else if lower.contains("product") || lower.contains("ts-pw") || lower.contains("ero-pw")
        {
            AnalysisKind::Product
        } else {
            AnalysisKind::Summary
        };

        let anchors = match kind {
            AnalysisKind::Branch => vec![
                TableAnchor {
                    name: "Sales in MT".to_string(),
                    pattern: r"\bsales\s*in\s*mt\b".to_string(),
                },
                TableAnchor {
                    name: "Sales in Value".to_string(),
                    pattern: r"\bsales\s*in\s*value\b".to_string(),
                },
            ],
            AnalysisKind::Product => vec![
                TableAnchor {
                    name: "Sales in Tonage".to_string(),
                    pattern: r"\bsales\s*in\s*ton[n]?age\b".to_string(),
                },
                TableAnchor {
                    name: "Sales in Value".to_string(),
                    pattern: r"\bsales\s*in\s*value\b".to_string(),
                },
            ],
            AnalysisKind::Summary => vec![
                TableAnchor {
                    name: "Sales in MT".to_string(),
                    pattern: r"\bsales\s*in\s*mt\b".to_string(),
                },
                TableAnchor {
                    name: "Sales in Value".to_string(),
                    pattern: r"\bsales\s*in\s*(?:value|ton[n]?age)\b".to_string(),
                },
            ],
        };

        let mut dimension_stoplist: Vec<String> =
            TOTAL_ROW_TERMS.iter().map(|t| t.to_string()).collect();
        if kind == AnalysisKind::Branch {
            dimension_stoplist.extend(BRANCH_EXCLUDE_TERMS.iter().map(|t| t.to_string()));
        }

        // Sheets 2..=4 repeat the subtotal row directly under the header;
        // sheet 1 repeats the "REGIONS" header inside the body.
        let drop_duplicate_subtotal_row = (2..=4).contains(&sheet_index);
        let row_stoplist = if sheet_index == 1 {
            vec!["REGIONS".to_string()]
        } else {
            Vec::new()
        };

        Self {
            sheet_name: sheet_name.to_string(),
            sheet_index,
            kind,
            anchors,
            drop_duplicate_subtotal_row,
            row_stoplist,
            dimension_stoplist,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SheetProfile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_branch_sheet() {
        let profile = SheetProfile::classify("Region Wise Analysis FY25", 3);
        assert_eq!(profile.kind, AnalysisKind::Branch);
        assert!(profile.drop_duplicate_subtotal_row);
        assert!(profile
            .dimension_stoplist
            .iter()
            .any(|t| t == "GROUP COMPANIES"));
        assert_eq!(profile.anchors[0].name, "Sales in MT");
    }

    #[test]
    fn test_classify_product_sheet() {
        let profile = SheetProfile::classify("TS-PW Sales Analysis Month Wise", 5);
        assert_eq!(profile.kind, AnalysisKind::Product);
        assert!(!profile.drop_duplicate_subtotal_row);
        assert_eq!(profile.anchors[0].name, "Sales in Tonage");
        // Product sheets still exclude total rows from dimensions.
        assert!(profile.dimension_stoplist.iter().any(|t| t == "TOTAL SALES"));
        assert!(!profile.dimension_stoplist.iter().any(|t| t == "ERD SALES"));
    }

    #[test]
    fn test_classify_summary_sheet_with_regions_artifact() {
        let profile = SheetProfile::classify("Company Summary", 1);
        assert_eq!(profile.kind, AnalysisKind::Summary);
        assert_eq!(profile.row_stoplist, vec!["REGIONS".to_string()]);
    }

    #[test]
    fn test_profile_round_trip() {
        let profile = SheetProfile::classify("Region Wise Analysis", 2);
        let json = serde_json::to_string(&profile).unwrap();
        let back = SheetProfile::from_json(&json).unwrap();
        assert_eq!(back.kind, AnalysisKind::Branch);
        assert_eq!(back.anchors, profile.anchors);
    }

    #[test]
    fn test_schema_generation() {
        let schema = SheetProfile::generate_json_schema();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("sheet_name"));
        assert!(json.contains("drop_duplicate_subtotal_row"));
    }
}
