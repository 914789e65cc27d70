use chrono::{NaiveDate, Utc};

use crate::models::draft::RecordDraft;
use crate::models::record::{HoldingMethod, InvestmentType, RecordFields};
use crate::models::validation::ValidationResult;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 20;
pub const STOCK_CODE_LEN: usize = 6;
pub const LOT_SIZE: i64 = 100;

/// Validate a draft against today's date (UTC).
pub fn validate_record(draft: &RecordDraft) -> ValidationResult {
    validate_record_as_of(draft, Utc::now().date_naive())
}

/// Validate a draft against an explicit "today".
pub fn validate_record_as_of(draft: &RecordDraft, today: NaiveDate) -> ValidationResult {
    match check_record(draft, today) {
        Ok(_) => ValidationResult::from_errors(Vec::new()),
        Err(errors) => ValidationResult::from_errors(errors),
    }
}

/// Validate a draft and, if every rule passes, convert it into typed fields.
///
/// Text fields come out trimmed. A current price that is not a positive finite
/// number is treated as unset.
pub fn check_record(draft: &RecordDraft, today: NaiveDate) -> Result<RecordFields, Vec<String>> {
    let mut errors = Vec::new();

    let investor = draft.investor.trim();
    if !name_length_ok(investor) {
        errors.push("Investor name must be 2-20 characters".to_string());
    }

    // Code and enum values are matched as given; only names and remarks are trimmed.
    let stock_code = draft.stock_code.as_str();
    if !is_stock_code(stock_code) {
        errors.push("Stock code must be exactly 6 letters or digits".to_string());
    }

    let stock_name = draft.stock_name.trim();
    if !name_length_ok(stock_name) {
        errors.push("Stock name must be 2-20 characters".to_string());
    }

    let holding_method = draft.holding_method.parse::<HoldingMethod>().ok();
    if holding_method.is_none() {
        errors.push("Holding method must be 'owned' or 'held'".to_string());
    }

    let investment_date = draft.investment_date.filter(|d| *d <= today);
    if investment_date.is_none() {
        errors.push("Investment date is required and cannot be in the future".to_string());
    }

    let investment_type = draft.investment_type.parse::<InvestmentType>().ok();
    if investment_type.is_none() {
        errors.push("Investment type must be 'buy' or 'sell'".to_string());
    }

    if draft.quantity <= 0 || draft.quantity % LOT_SIZE != 0 {
        errors.push("Quantity must be a positive multiple of 100".to_string());
    }

    if draft.current_shares < 0 || draft.current_shares > draft.quantity {
        errors.push("Current shares cannot be negative or exceed the quantity".to_string());
    }

    let unit_price_ok = draft.unit_price.is_finite() && draft.unit_price > 0.0;
    if !unit_price_ok {
        errors.push("Unit price must be a positive number".to_string());
    }

    let current_price = draft.current_price.filter(|p| p.is_finite() && *p > 0.0);
    if unit_price_ok && !totals_finite(draft, current_price) {
        errors.push("Total amount or current value is too large".to_string());
    }

    match (holding_method, investment_date, investment_type) {
        (Some(holding_method), Some(investment_date), Some(investment_type)) if errors.is_empty() => {
            Ok(RecordFields {
                investor: investor.to_string(),
                stock_code: stock_code.to_string(),
                stock_name: stock_name.to_string(),
                holding_method,
                investment_date,
                investment_type,
                quantity: draft.quantity as u64,
                current_shares: draft.current_shares as u64,
                unit_price: draft.unit_price,
                current_price,
                remarks: draft.remarks.trim().to_string(),
            })
        }
        _ => Err(errors),
    }
}

// Derived totals must stay representable in JSON.
fn totals_finite(draft: &RecordDraft, current_price: Option<f64>) -> bool {
    let total_amount = draft.quantity as f64 * draft.unit_price;
    let current_value = draft.current_shares as f64 * current_price.unwrap_or(draft.unit_price);
    total_amount.is_finite() && current_value.is_finite()
}

fn name_length_ok(name: &str) -> bool {
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name.chars().count())
}

fn is_stock_code(code: &str) -> bool {
    code.len() == STOCK_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}
