use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::draft::RecordDraft;
use crate::models::filter::RecordFilter;
use crate::models::record::{InvestmentRecord, RecordFields};
use crate::models::transfer::ImportReport;
use crate::services::validation_service;

/// Mutations and queries over an in-memory record collection.
///
/// Pure business logic with no I/O. The store loads the collection, calls in
/// here, and writes the collection back.
pub struct RecordService;

impl RecordService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a draft and append it as a new record. Returns the stored copy.
    pub fn add_record(
        &self,
        records: &mut Vec<InvestmentRecord>,
        draft: &RecordDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<InvestmentRecord, CoreError> {
        let fields =
            validation_service::check_record(draft, today).map_err(CoreError::Validation)?;
        let record = Self::create_unique(records, fields, now);
        records.push(record.clone());
        Ok(record)
    }

    /// Replace the editable fields of an existing record.
    ///
    /// Validation runs first, so an invalid draft is reported even if the id
    /// is unknown. Nothing is modified on failure.
    pub fn update_record(
        &self,
        records: &mut [InvestmentRecord],
        id: Uuid,
        draft: &RecordDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<InvestmentRecord, CoreError> {
        let fields =
            validation_service::check_record(draft, today).map_err(CoreError::Validation)?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))?;

        let stamp = strictly_after(record.update_time, now);
        record.apply(fields, stamp);
        Ok(record.clone())
    }

    /// Remove a record by id, returning it.
    pub fn remove_record(
        &self,
        records: &mut Vec<InvestmentRecord>,
        id: Uuid,
    ) -> Result<InvestmentRecord, CoreError> {
        let idx = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::RecordNotFound(id.to_string()))?;
        Ok(records.remove(idx))
    }

    /// Validate every draft independently and append the valid ones.
    ///
    /// Rejected drafts are reported as `"Record {n}: ..."` with a 1-based `n`.
    /// Each entry pairs the 1-based position with either a decoded draft or the
    /// message explaining why the raw entry could not be decoded.
    pub fn import_records(
        &self,
        records: &mut Vec<InvestmentRecord>,
        drafts: Vec<(usize, Result<RecordDraft, String>)>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> (ImportReport, Vec<InvestmentRecord>) {
        let mut report = ImportReport::default();
        let mut added = Vec::new();

        for (position, draft) in drafts {
            let outcome = draft.and_then(|d| {
                validation_service::check_record(&d, today).map_err(|errors| errors.join(", "))
            });
            match outcome {
                Ok(fields) => {
                    let record = Self::create_unique(records, fields, now);
                    records.push(record.clone());
                    added.push(record);
                }
                Err(message) => report.errors.push(format!("Record {position}: {message}")),
            }
        }

        report.imported = added.len();
        (report, added)
    }

    /// Records matching `filter`, in stored order.
    pub fn filter<'a>(
        &self,
        records: &'a [InvestmentRecord],
        filter: &RecordFilter,
    ) -> Vec<&'a InvestmentRecord> {
        records.iter().filter(|r| filter.matches(r)).collect()
    }

    // Ids are unique within a collection.
    fn create_unique(
        records: &[InvestmentRecord],
        fields: RecordFields,
        now: DateTime<Utc>,
    ) -> InvestmentRecord {
        let mut record = InvestmentRecord::create(fields, now);
        while records.iter().any(|r| r.id == record.id) {
            record.id = Uuid::new_v4();
        }
        record
    }
}

impl Default for RecordService {
    fn default() -> Self {
        Self::new()
    }
}

/// `now`, bumped past `previous` if the clock has not advanced.
fn strictly_after(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
