use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use crate::errors::CoreError;
use crate::models::draft::RecordDraft;
use crate::models::record::InvestmentRecord;
use crate::models::transfer::ExportFormat;

/// A decoded import entry: 1-based position plus the draft or a decode error.
pub type DecodedEntry = (usize, Result<RecordDraft, String>);

/// Encodes records for export and decodes import payloads into drafts.
pub struct TransferService;

impl TransferService {
    pub fn new() -> Self {
        Self
    }

    pub fn export(
        &self,
        records: &[InvestmentRecord],
        format: ExportFormat,
    ) -> Result<String, CoreError> {
        match format {
            ExportFormat::Json => self.to_json(records),
            ExportFormat::Csv => self.to_csv(records),
        }
    }

    /// Pretty-printed JSON array, field order as stored.
    pub fn to_json(&self, records: &[InvestmentRecord]) -> Result<String, CoreError> {
        serde_json::to_string_pretty(records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records to JSON: {e}")))
    }

    /// CSV with a header row of field names. Values containing a comma, quote
    /// or line break are quoted; no records means an empty string.
    pub fn to_csv(&self, records: &[InvestmentRecord]) -> Result<String, CoreError> {
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for record in records {
            writer.serialize(record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Csv(format!("Failed to flush CSV output: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| CoreError::Serialization(format!("CSV output is not UTF-8: {e}")))
    }

    /// Decode a JSON array element by element.
    ///
    /// Only a document that is not an array at all is an error; a bad element
    /// becomes a positional entry in the result.
    pub fn decode_json(&self, text: &str) -> Result<Vec<DecodedEntry>, CoreError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let draft = serde_json::from_value::<RecordDraft>(value)
                    .map_err(|e| format!("cannot decode record: {e}"));
                (idx + 1, draft)
            })
            .collect())
    }

    /// Decode CSV rows by header name. Extra columns (ids, totals, timestamps)
    /// are ignored and missing columns take their defaults.
    pub fn decode_csv(&self, text: &str) -> Result<Vec<DecodedEntry>, CoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        // Make sure the header row itself is readable before decoding rows.
        reader.headers()?;

        Ok(reader
            .deserialize::<RecordDraft>()
            .enumerate()
            .map(|(idx, row)| {
                let draft = row.map_err(|e| format!("cannot decode row: {e}"));
                (idx + 1, draft)
            })
            .collect())
    }
}

impl Default for TransferService {
    fn default() -> Self {
        Self::new()
    }
}
