use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Serialization format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    Json,
    /// Header row plus one comma-separated row per record
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Result of a bulk import. Partial success is normal: `errors` lists the
/// rejected entries by 1-based position, everything else was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
