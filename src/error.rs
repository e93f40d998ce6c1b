use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No anchor keyword matched anywhere in the sheet")]
    NoTableDetected,

    #[error("No header row found in the first {window} rows of table '{table}'")]
    HeaderNotFound { table: String, window: usize },

    #[error("No columns matched '{0}' after canonicalization")]
    NoMatchingColumns(String),

    #[error("No numeric data remained after coercion")]
    NoNumericData,

    #[error("Selection produced an empty table")]
    EmptyAfterFilter,

    #[error("Invalid sheet profile: {0}")]
    InvalidProfile(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ExtractError {
    /// Stable reason code handed to presentation collaborators alongside
    /// empty results.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ExtractError::NoTableDetected => "NoTableDetected",
            ExtractError::HeaderNotFound { .. } => "HeaderNotFound",
            ExtractError::NoMatchingColumns(_) => "NoMatchingColumns",
            ExtractError::NoNumericData => "NoNumericData",
            ExtractError::EmptyAfterFilter => "EmptyAfterFilter",
            ExtractError::InvalidProfile(_) => "InvalidProfile",
            ExtractError::SerializationError(_) => "SerializationError",
        }
    }
}

/// Non-fatal conditions surfaced to the caller without aborting extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractNotice {
    DuplicateColumnsDropped { label: String },
}

impl std::fmt::Display for ExtractNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractNotice::DuplicateColumnsDropped { label } => {
                write!(f, "Duplicate column '{}' dropped (first occurrence kept)", label)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
