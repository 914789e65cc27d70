pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use errors::CoreError;
use models::{
    draft::RecordDraft,
    filter::RecordFilter,
    price::StockPriceMap,
    record::{HoldingMethod, InvestmentRecord},
    settings::StoreSettings,
    summary::InvestmentSummary,
    transfer::{ExportFormat, ImportReport},
    validation::ValidationResult,
};
use services::{
    mock_data_service::MockDataService,
    record_service::RecordService,
    summary_service::SummaryService,
    transfer_service::{DecodedEntry, TransferService},
    validation_service,
};
use storage::{memory::MemoryStorage, traits::StorageBackend};

/// Main entry point for the investment-records core library.
///
/// Owns the persisted record collection, the investor registry and the stock
/// price map. Every read and write of persisted state goes through here; the
/// bytes themselves live in the injected `StorageBackend`.
#[must_use]
pub struct InvestmentStore {
    backend: Box<dyn StorageBackend>,
    settings: StoreSettings,
    record_service: RecordService,
    summary_service: SummaryService,
    transfer_service: TransferService,
}

impl std::fmt::Debug for InvestmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestmentStore")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl InvestmentStore {
    /// Open a store over `backend`. Absent keys are seeded with sample data
    /// when `settings.seed_mock_data` is set; present keys are never touched.
    pub fn open(
        backend: impl StorageBackend + 'static,
        settings: StoreSettings,
    ) -> Result<Self, CoreError> {
        let mut store = Self {
            backend: Box::new(backend),
            settings,
            record_service: RecordService::new(),
            summary_service: SummaryService::new(),
            transfer_service: TransferService::new(),
        };
        if store.settings.seed_mock_data {
            store.seed_missing()?;
        }
        Ok(store)
    }

    /// A store over a fresh in-memory backend with default settings (seeded).
    pub fn in_memory() -> Result<Self, CoreError> {
        Self::open(MemoryStorage::new(), StoreSettings::default())
    }

    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    #[must_use]
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn StorageBackend {
        self.backend.as_mut()
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Records matching every populated field of `filter`, in stored order.
    /// Unreadable storage yields an empty list.
    #[must_use]
    pub fn get_all(&self, filter: &RecordFilter) -> Vec<InvestmentRecord> {
        let records = self.load_records();
        self.record_service
            .filter(&records, filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Records whose investor name contains `investor` (case-sensitive).
    #[must_use]
    pub fn get_by_investor(&self, investor: &str) -> Vec<InvestmentRecord> {
        self.get_all(&RecordFilter::new().investor(investor))
    }

    #[must_use]
    pub fn get_by_holding_method(&self, method: HoldingMethod) -> Vec<InvestmentRecord> {
        self.get_all(&RecordFilter::new().holding_method(method))
    }

    /// Records whose stock code contains `stock_code`.
    #[must_use]
    pub fn get_by_stock_code(&self, stock_code: &str) -> Vec<InvestmentRecord> {
        self.get_all(&RecordFilter::new().stock_code(stock_code))
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<InvestmentRecord> {
        self.load_records().into_iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.load_records().len()
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Check a draft against every field rule. Pure; touches no storage.
    #[must_use]
    pub fn validate_record(&self, draft: &RecordDraft) -> ValidationResult {
        validation_service::validate_record(draft)
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Validate and append a new record. Returns the stored record with its
    /// id, timestamps and derived fields. Nothing is written on failure.
    pub fn add(&mut self, draft: &RecordDraft) -> Result<InvestmentRecord, CoreError> {
        let now = Utc::now();
        let mut records = self.load_records();
        let record = self
            .record_service
            .add_record(&mut records, draft, now.date_naive(), now)?;

        self.write_json(&self.settings.records_key.clone(), &records)?;
        debug!("Added record {} ({} {})", record.id, record.stock_code, record.investor);
        self.register_investors([record.investor.as_str()]);
        Ok(record)
    }

    /// Replace the editable fields of record `id`. Fails with `Validation` or
    /// `RecordNotFound` without writing anything.
    pub fn update(&mut self, id: Uuid, draft: &RecordDraft) -> Result<InvestmentRecord, CoreError> {
        let now = Utc::now();
        let mut records = self.load_records();
        let record = self
            .record_service
            .update_record(&mut records, id, draft, now.date_naive(), now)?;

        self.write_json(&self.settings.records_key.clone(), &records)?;
        debug!("Updated record {id}");
        self.register_investors([record.investor.as_str()]);
        Ok(record)
    }

    /// Remove record `id`, returning it.
    pub fn delete(&mut self, id: Uuid) -> Result<InvestmentRecord, CoreError> {
        let mut records = self.load_records();
        let removed = self.record_service.remove_record(&mut records, id)?;
        self.write_json(&self.settings.records_key.clone(), &records)?;
        debug!("Deleted record {id}");
        Ok(removed)
    }

    /// Bulk import. Each draft is validated on its own; valid ones are stored
    /// in a single write, invalid ones are listed in the report by position.
    pub fn import(&mut self, drafts: Vec<RecordDraft>) -> Result<ImportReport, CoreError> {
        let entries = drafts
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| (idx + 1, Ok(draft)))
            .collect();
        self.import_entries(entries)
    }

    /// Import a JSON array (e.g., the output of `export(ExportFormat::Json)`).
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let entries = self.transfer_service.decode_json(text)?;
        self.import_entries(entries)
    }

    /// Import CSV with camelCase headers (e.g., the output of
    /// `export(ExportFormat::Csv)`).
    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, CoreError> {
        let entries = self.transfer_service.decode_csv(text)?;
        self.import_entries(entries)
    }

    // ── Aggregation ─────────────────────────────────────────────────

    /// Totals over all records, or over those whose investor name contains
    /// `investor`.
    #[must_use]
    pub fn calculate_summary(&self, investor: Option<&str>) -> InvestmentSummary {
        let records = match investor {
            Some(name) => self.get_by_investor(name),
            None => self.load_records(),
        };
        let prices = self.get_stock_prices();
        self.summary_service.calculate(&records, &prices)
    }

    // ── Investors ───────────────────────────────────────────────────

    /// Known investor names, in registration order.
    #[must_use]
    pub fn get_investors(&self) -> Vec<String> {
        self.load_or_default(&self.settings.investors_key, "investor list")
    }

    /// Register `name` (trimmed). Returns `false` if it was blank or known.
    pub fn add_investor(&mut self, name: &str) -> Result<bool, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let mut investors = self.get_investors();
        if investors.iter().any(|known| known == name) {
            return Ok(false);
        }
        investors.push(name.to_string());
        self.write_json(&self.settings.investors_key.clone(), &investors)?;
        Ok(true)
    }

    // ── Stock prices ────────────────────────────────────────────────

    pub fn update_stock_price(&mut self, stock_code: &str, price: f64) -> Result<(), CoreError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(CoreError::validation(format!(
                "Price for {stock_code} must be a positive number, got {price}"
            )));
        }
        let mut prices = self.get_stock_prices();
        prices.insert(stock_code.to_string(), price);
        self.write_json(&self.settings.stock_prices_key.clone(), &prices)
    }

    /// Stored price for `stock_code`, if any. Never an error.
    #[must_use]
    pub fn get_stock_price(&self, stock_code: &str) -> Option<f64> {
        self.get_stock_prices().get(stock_code).copied()
    }

    #[must_use]
    pub fn get_stock_prices(&self) -> StockPriceMap {
        self.load_or_default(&self.settings.stock_prices_key, "stock price map")
    }

    // ── Export / Reset ──────────────────────────────────────────────

    /// Serialize every record as pretty JSON or CSV.
    pub fn export(&self, format: ExportFormat) -> Result<String, CoreError> {
        self.transfer_service.export(&self.load_records(), format)
    }

    /// Overwrite all three stores with freshly generated sample data.
    pub fn reset_to_mock_data(&mut self) -> Result<(), CoreError> {
        let now = Utc::now();
        let mut generator = MockDataService::from_seed_option(self.settings.mock_seed);
        let records = generator.generate_records(now.date_naive(), now);
        let prices = generator.generate_stock_prices();
        let investors = generator.generate_investors();

        self.write_json(&self.settings.records_key.clone(), &records)?;
        self.write_json(&self.settings.stock_prices_key.clone(), &prices)?;
        self.write_json(&self.settings.investors_key.clone(), &investors)?;
        info!("Reset to {} sample records", records.len());
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn seed_missing(&mut self) -> Result<(), CoreError> {
        let now = Utc::now();
        let mut generator = MockDataService::from_seed_option(self.settings.mock_seed);
        let keys = self.settings.clone();

        if self.backend.get(&keys.records_key)?.is_none() {
            let records = generator.generate_records(now.date_naive(), now);
            self.write_json(&keys.records_key, &records)?;
            info!("Seeded {} sample records under '{}'", records.len(), keys.records_key);
        }
        if self.backend.get(&keys.investors_key)?.is_none() {
            self.write_json(&keys.investors_key, &generator.generate_investors())?;
            info!("Seeded investor list under '{}'", keys.investors_key);
        }
        if self.backend.get(&keys.stock_prices_key)?.is_none() {
            self.write_json(&keys.stock_prices_key, &generator.generate_stock_prices())?;
            info!("Seeded stock prices under '{}'", keys.stock_prices_key);
        }
        Ok(())
    }

    fn import_entries(&mut self, entries: Vec<DecodedEntry>) -> Result<ImportReport, CoreError> {
        let now = Utc::now();
        let mut records = self.load_records();
        let (report, added) =
            self.record_service
                .import_records(&mut records, entries, now.date_naive(), now);

        if !added.is_empty() {
            self.write_json(&self.settings.records_key.clone(), &records)?;
            self.register_investors(added.iter().map(|r| r.investor.as_str()));
        }
        info!(
            "Imported {} records, rejected {}",
            report.imported,
            report.errors.len()
        );
        Ok(report)
    }

    /// Add unseen names to the registry. A failed registry write is logged,
    /// not returned: the records it belongs to are already stored.
    fn register_investors<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let mut investors = self.get_investors();
        let before = investors.len();
        for name in names {
            if !investors.iter().any(|known| known == name) {
                investors.push(name.to_string());
            }
        }
        if investors.len() == before {
            return;
        }
        let key = self.settings.investors_key.clone();
        if let Err(e) = self.write_json(&key, &investors) {
            warn!("Failed to update investor list: {e}");
        }
    }

    fn load_records(&self) -> Vec<InvestmentRecord> {
        self.load_or_default(&self.settings.records_key, "record list")
    }

    /// Read and decode `key`. `Ok(None)` when the key is absent;
    /// `StorageCorruption` when the stored text does not decode.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let Some(text) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CoreError::StorageCorruption {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// `read_json`, with any failure logged and replaced by the default.
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str, what: &str) -> T {
        match self.read_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Failed to read {what}, treating it as empty: {e}");
                T::default()
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), CoreError> {
        let text = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        self.backend.set(key, text)
    }
}
