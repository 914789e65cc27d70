// ═══════════════════════════════════════════════════════════════════
// Integration Tests — InvestmentStore end to end over real backends
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

use investment_records_core::errors::CoreError;
use investment_records_core::models::draft::RecordDraft;
use investment_records_core::models::filter::RecordFilter;
use investment_records_core::models::record::{HoldingMethod, InvestmentRecord, InvestmentType};
use investment_records_core::models::settings::StoreSettings;
use investment_records_core::models::transfer::ExportFormat;
use investment_records_core::services::mock_data_service::SAMPLE_RECORD_COUNT;
use investment_records_core::storage::encrypted_file::EncryptedFileStorage;
use investment_records_core::storage::encryption::KdfParams;
use investment_records_core::storage::file::JsonFileStorage;
use investment_records_core::storage::memory::MemoryStorage;
use investment_records_core::InvestmentStore;

const RECORDS_KEY: &str = "finance_platform_investments";
const INVESTORS_KEY: &str = "finance_platform_investors";
const PRICES_KEY: &str = "finance_platform_stock_prices";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn empty_store() -> InvestmentStore {
    InvestmentStore::open(MemoryStorage::new(), StoreSettings::empty()).unwrap()
}

fn draft(investor: &str, code: &str, method: HoldingMethod, date: NaiveDate) -> RecordDraft {
    RecordDraft::new(
        investor,
        code,
        "贵州茅台",
        method,
        date,
        InvestmentType::Buy,
        100,
        1800.50,
    )
}

fn moutai() -> RecordDraft {
    draft("张三", "600519", HoldingMethod::Held, d(2025, 1, 15))
}

// ═══════════════════════════════════════════════════════════════════
// Records CRUD
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_add_then_get_all() {
    let mut store = empty_store();
    assert_eq!(store.count(), 0);

    let added = store.add(&moutai()).unwrap();
    assert_eq!(added.total_amount, 180_050.0);
    assert_eq!(added.create_time, added.update_time);

    let all = store.get_all(&RecordFilter::new());
    assert_eq!(all, vec![added.clone()]);
    assert_eq!(store.get(added.id), Some(added));
    assert_eq!(store.count(), 1);
}

#[test]
fn test_add_invalid_writes_nothing() {
    let mut store = empty_store();
    let mut bad = moutai();
    bad.quantity = 150;

    let err = store.add(&bad).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(store.backend().get(RECORDS_KEY).unwrap(), None);
    assert!(store.get_investors().is_empty());
}

#[test]
fn test_add_future_date_rejected() {
    let mut store = empty_store();
    let future = chrono::Utc::now().date_naive() + chrono::Duration::days(2);
    let err = store
        .add(&draft("张三", "600519", HoldingMethod::Held, future))
        .unwrap_err();
    assert!(err.to_string().contains("Investment date"));
}

#[test]
fn test_add_with_overflowing_total_keeps_existing_records() {
    let mut store = empty_store();
    let kept = store.add(&moutai()).unwrap();

    let mut huge = moutai();
    huge.quantity = 1000;
    huge.current_shares = 1000;
    huge.unit_price = 1e307;
    assert!(matches!(store.add(&huge), Err(CoreError::Validation(_))));

    assert_eq!(store.count(), 1);
    assert_eq!(store.get(kept.id), Some(kept));
    assert_eq!(store.import(vec![huge]).unwrap().imported, 0);
    assert_eq!(store.count(), 1);
}

#[test]
fn test_summary_with_huge_share_counts() {
    let mut store = empty_store();
    for _ in 0..3 {
        let mut draft = moutai();
        draft.quantity = 9_000_000_000_000_000_000;
        draft.current_shares = draft.quantity;
        draft.unit_price = 1.0;
        store.add(&draft).unwrap();
    }
    let summary = store.calculate_summary(None);
    assert_eq!(summary.total_shares, u64::MAX);
    assert_eq!(summary.total_transactions, 3);
}

#[test]
fn test_ids_unique_across_adds() {
    let mut store = empty_store();
    for _ in 0..20 {
        store.add(&moutai()).unwrap();
    }
    let ids: HashSet<Uuid> = store
        .get_all(&RecordFilter::new())
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_update_record() {
    let mut store = empty_store();
    let added = store.add(&moutai()).unwrap();

    let changed = moutai()
        .with_current_shares(50)
        .with_current_price(2000.0)
        .with_remarks("trimmed");
    let updated = store.update(added.id, &changed).unwrap();

    assert_eq!(updated.id, added.id);
    assert_eq!(updated.create_time, added.create_time);
    assert!(updated.update_time > added.update_time);
    assert_eq!(updated.current_value, 100_000.0);
    assert_eq!(store.get(added.id), Some(updated));
}

#[test]
fn test_update_unknown_id() {
    let mut store = empty_store();
    store.add(&moutai()).unwrap();
    assert!(matches!(
        store.update(Uuid::new_v4(), &moutai()),
        Err(CoreError::RecordNotFound(_))
    ));
}

#[test]
fn test_update_invalid_keeps_record() {
    let mut store = empty_store();
    let added = store.add(&moutai()).unwrap();
    let bad = moutai().with_current_shares(500);
    assert!(store.update(added.id, &bad).is_err());
    assert_eq!(store.get(added.id), Some(added));
}

#[test]
fn test_delete_twice() {
    let mut store = empty_store();
    let a = store.add(&moutai()).unwrap();
    let b = store.add(&moutai()).unwrap();

    assert_eq!(store.delete(a.id).unwrap().id, a.id);
    assert!(matches!(store.delete(a.id), Err(CoreError::RecordNotFound(_))));
    assert_eq!(store.count(), 1);
    assert!(store.get(b.id).is_some());
}

// ═══════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════

fn populated_store() -> InvestmentStore {
    let mut store = empty_store();
    store
        .add(&draft("张三", "600519", HoldingMethod::Held, d(2025, 1, 10)))
        .unwrap();
    store
        .add(&draft("李四", "000001", HoldingMethod::Owned, d(2025, 2, 10)))
        .unwrap();
    store
        .add(&draft("张三丰", "000002", HoldingMethod::Owned, d(2025, 3, 10)))
        .unwrap();
    store
}

#[test]
fn test_query_helpers() {
    let store = populated_store();

    let by_investor: Vec<String> = store
        .get_by_investor("张三")
        .into_iter()
        .map(|r| r.investor)
        .collect();
    assert_eq!(by_investor, vec!["张三", "张三丰"]);

    assert_eq!(store.get_by_holding_method(HoldingMethod::Owned).len(), 2);
    assert_eq!(store.get_by_stock_code("0000").len(), 2);
    assert!(store.get_by_investor("王五").is_empty());
}

#[test]
fn test_combined_filter() {
    let store = populated_store();
    let filter = RecordFilter::new()
        .holding_method(HoldingMethod::Owned)
        .date_range(d(2025, 3, 1), d(2025, 3, 31));
    let hits = store.get_all(&filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].stock_code, "000002");
}

#[test]
fn test_search_matches_name_or_code() {
    let store = populated_store();
    assert_eq!(store.get_all(&RecordFilter::new().search("茅台")).len(), 3);
    assert_eq!(store.get_all(&RecordFilter::new().search("600")).len(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Import / Export
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_import_partial_success() {
    let mut store = empty_store();
    let mut bad = draft("李四", "12345", HoldingMethod::Owned, d(2025, 2, 1));
    bad.stock_name = "x".into();

    let report = store
        .import(vec![
            moutai(),
            bad,
            draft("王五", "000858", HoldingMethod::Owned, d(2025, 3, 1)),
        ])
        .unwrap();

    assert_eq!(report.imported, 2);
    assert!(!report.is_complete());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Record 2:"));
    assert!(report.errors[0].contains("Stock code"));
    assert!(report.errors[0].contains("Stock name"));
    assert_eq!(store.count(), 2);
    assert_eq!(store.get_investors(), vec!["张三", "王五"]);
}

#[test]
fn test_import_nothing_valid_writes_nothing() {
    let mut store = empty_store();
    let report = store.import(vec![RecordDraft::default()]).unwrap();
    assert_eq!(report.imported, 0);
    assert_eq!(store.backend().get(RECORDS_KEY).unwrap(), None);
}

#[test]
fn test_csv_export_import_round_trip() {
    let mut source = empty_store();
    source
        .add(&moutai().with_remarks("dividend, reinvested \"twice\""))
        .unwrap();
    source
        .add(&draft("李四", "000001", HoldingMethod::Owned, d(2025, 2, 1)).with_current_price(1900.0))
        .unwrap();

    let csv = source.export(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 3);

    let mut target = empty_store();
    let report = target.import_csv(&csv).unwrap();
    assert!(report.is_complete(), "{:?}", report.errors);

    let strip = |r: InvestmentRecord| RecordDraft::from(&r);
    let before: Vec<RecordDraft> = source.get_all(&RecordFilter::new()).into_iter().map(strip).collect();
    let after: Vec<RecordDraft> = target.get_all(&RecordFilter::new()).into_iter().map(strip).collect();
    assert_eq!(before, after);
}

#[test]
fn test_json_export_import_round_trip() {
    let mut source = empty_store();
    source.add(&moutai()).unwrap();
    let json = source.export(ExportFormat::Json).unwrap();

    let mut target = empty_store();
    let report = target.import_json(&json).unwrap();
    assert_eq!(report.imported, 1);

    let original = &source.get_all(&RecordFilter::new())[0];
    let copy = &target.get_all(&RecordFilter::new())[0];
    // New identity, same content.
    assert_ne!(original.id, copy.id);
    assert_eq!(RecordDraft::from(original), RecordDraft::from(copy));
}

#[test]
fn test_import_json_not_an_array() {
    let mut store = empty_store();
    assert!(store.import_json("{}").is_err());
    assert!(store.import_json("nonsense").is_err());
}

#[test]
fn test_export_empty() {
    let store = empty_store();
    assert_eq!(store.export(ExportFormat::Csv).unwrap(), "");
    assert_eq!(store.export(ExportFormat::Json).unwrap(), "[]");
    assert!("xml".parse::<ExportFormat>().is_err());
}

// ═══════════════════════════════════════════════════════════════════
// Summary
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_summary_empty_store() {
    let s = empty_store().calculate_summary(None);
    assert_eq!(s.total_investment, 0.0);
    assert_eq!(s.total_profit_rate, 0.0);
    assert_eq!(s.total_transactions, 0);
}

#[test]
fn test_summary_uses_stored_prices_as_fallback() {
    let mut store = empty_store();
    // 100 @ 1800.50, no own current price
    store.add(&moutai()).unwrap();
    store
        .add(&draft("李四", "000001", HoldingMethod::Owned, d(2025, 2, 1)).with_current_price(2000.0))
        .unwrap();
    store.update_stock_price("600519", 1900.0).unwrap();
    store.update_stock_price("000001", 1.0).unwrap();

    let all = store.calculate_summary(None);
    assert_eq!(all.total_investment, 360_100.0);
    assert_eq!(all.total_current_value, 190_000.0 + 200_000.0);
    assert_eq!(all.total_transactions, 2);
    assert_eq!(all.active_investors, 2);

    let one = store.calculate_summary(Some("张三"));
    assert_eq!(one.total_transactions, 1);
    assert_eq!(one.total_current_value, 190_000.0);
}

// ═══════════════════════════════════════════════════════════════════
// Investors and prices
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_investor_registry() {
    let mut store = empty_store();
    assert!(store.add_investor("  王五 ").unwrap());
    assert!(!store.add_investor("王五").unwrap());
    assert!(!store.add_investor("   ").unwrap());

    store.add(&moutai()).unwrap();
    store.add(&moutai()).unwrap();
    assert_eq!(store.get_investors(), vec!["王五", "张三"]);
}

#[test]
fn test_stock_prices() {
    let mut store = empty_store();
    assert_eq!(store.get_stock_price("600519"), None);

    store.update_stock_price("600519", 1800.0).unwrap();
    store.update_stock_price("600519", 1850.5).unwrap();
    assert_eq!(store.get_stock_price("600519"), Some(1850.5));
    assert_eq!(store.get_stock_prices().len(), 1);

    for bad in [0.0, -3.0, f64::NAN] {
        assert!(matches!(
            store.update_stock_price("600519", bad),
            Err(CoreError::Validation(_))
        ));
    }
    assert_eq!(store.get_stock_price("600519"), Some(1850.5));
}

// ═══════════════════════════════════════════════════════════════════
// Corruption and seeding
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_corrupt_records_read_as_empty() {
    let backend = MemoryStorage::with_entries([
        (RECORDS_KEY, "{{not json"),
        (INVESTORS_KEY, "42"),
        (PRICES_KEY, "[]"),
    ]);
    let store = InvestmentStore::open(backend, StoreSettings::empty()).unwrap();
    assert!(store.get_all(&RecordFilter::new()).is_empty());
    assert!(store.get_investors().is_empty());
    assert!(store.get_stock_prices().is_empty());
    assert_eq!(store.calculate_summary(None).total_transactions, 0);
}

#[test]
fn test_add_over_corrupt_data_replaces_it() {
    let backend = MemoryStorage::with_entries([(RECORDS_KEY, "garbage")]);
    let mut store = InvestmentStore::open(backend, StoreSettings::empty()).unwrap();
    store.add(&moutai()).unwrap();
    assert_eq!(store.count(), 1);
}

#[test]
fn test_seeding_fills_absent_keys() {
    let settings = StoreSettings {
        mock_seed: Some(7),
        ..StoreSettings::default()
    };
    let store = InvestmentStore::open(MemoryStorage::new(), settings).unwrap();
    assert_eq!(store.count(), SAMPLE_RECORD_COUNT);
    assert_eq!(store.get_investors().len(), 6);
    assert_eq!(store.get_stock_prices().len(), 20);
    assert_eq!(store.calculate_summary(None).total_transactions, 30);
}

#[test]
fn test_in_memory_is_seeded() {
    let store = InvestmentStore::in_memory().unwrap();
    assert_eq!(store.count(), SAMPLE_RECORD_COUNT);
}

#[test]
fn test_seeding_keeps_existing_and_corrupt_keys() {
    let backend = MemoryStorage::with_entries([
        (RECORDS_KEY, "[]"),
        (INVESTORS_KEY, "corrupt"),
    ]);
    let store = InvestmentStore::open(backend, StoreSettings::default()).unwrap();
    assert_eq!(store.count(), 0);
    assert_eq!(
        store.backend().get(INVESTORS_KEY).unwrap().as_deref(),
        Some("corrupt")
    );
    assert_eq!(store.get_stock_prices().len(), 20);
}

#[test]
fn test_reset_to_mock_data() {
    let mut store = empty_store();
    store.add(&moutai()).unwrap();
    store.add_investor("someone").unwrap();

    store.reset_to_mock_data().unwrap();
    assert_eq!(store.count(), SAMPLE_RECORD_COUNT);
    assert_eq!(store.get_investors().len(), 6);
    assert!(!store.get_investors().contains(&"someone".to_string()));
    assert_eq!(store.get_stock_prices().len(), 20);
}

#[test]
fn test_custom_keys() {
    let settings = StoreSettings {
        records_key: "r".into(),
        investors_key: "i".into(),
        stock_prices_key: "p".into(),
        seed_mock_data: false,
        mock_seed: None,
    };
    let mut store = InvestmentStore::open(MemoryStorage::new(), settings).unwrap();
    store.add(&moutai()).unwrap();
    assert_eq!(store.backend().keys(), vec!["i", "r"]);
}

// ═══════════════════════════════════════════════════════════════════
// File-backed stores
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_json_file_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");

    let id = {
        let backend = JsonFileStorage::open(&path).unwrap();
        let mut store = InvestmentStore::open(backend, StoreSettings::empty()).unwrap();
        store.add(&moutai()).unwrap().id
    };

    let backend = JsonFileStorage::open(&path).unwrap();
    let store = InvestmentStore::open(backend, StoreSettings::default()).unwrap();
    // Records key existed, so no sample records were added.
    assert_eq!(store.count(), 1);
    assert!(store.get(id).is_some());
}

#[test]
fn test_encrypted_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.irsv");
    let params = KdfParams::insecure_fast();

    {
        let backend = EncryptedFileStorage::open_with_params(&path, "pw", params).unwrap();
        let mut store = InvestmentStore::open(backend, StoreSettings::empty()).unwrap();
        store.add(&moutai()).unwrap();
        store.update_stock_price("600519", 1900.0).unwrap();
    }

    let backend = EncryptedFileStorage::open(&path, "pw").unwrap();
    let store = InvestmentStore::open(backend, StoreSettings::empty()).unwrap();
    assert_eq!(store.count(), 1);
    assert_eq!(store.get_stock_price("600519"), Some(1900.0));
    assert!(format!("{store:?}").contains("encrypted-file"));

    assert!(matches!(
        EncryptedFileStorage::open(&path, "wrong"),
        Err(CoreError::Decryption)
    ));
}
