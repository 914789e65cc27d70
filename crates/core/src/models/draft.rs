use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{HoldingMethod, InvestmentRecord, InvestmentType};

/// Unvalidated record input, as it arrives from a form or an import file.
///
/// Enum fields are plain strings and numbers are unconstrained so that every
/// problem can be reported by validation instead of failing to decode.
/// Unknown fields (ids, derived totals, timestamps) are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDraft {
    pub investor: String,
    pub stock_code: String,
    pub stock_name: String,
    pub holding_method: String,
    pub investment_date: Option<NaiveDate>,
    pub investment_type: String,
    pub quantity: i64,
    pub current_shares: i64,
    pub unit_price: f64,
    pub current_price: Option<f64>,
    pub remarks: String,
}

impl RecordDraft {
    /// Draft with the required fields set and everything else defaulted.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        investor: impl Into<String>,
        stock_code: impl Into<String>,
        stock_name: impl Into<String>,
        holding_method: HoldingMethod,
        investment_date: NaiveDate,
        investment_type: InvestmentType,
        quantity: i64,
        unit_price: f64,
    ) -> Self {
        Self {
            investor: investor.into(),
            stock_code: stock_code.into(),
            stock_name: stock_name.into(),
            holding_method: holding_method.as_str().to_string(),
            investment_date: Some(investment_date),
            investment_type: investment_type.as_str().to_string(),
            quantity,
            current_shares: quantity,
            unit_price,
            current_price: None,
            remarks: String::new(),
        }
    }

    pub fn with_current_shares(mut self, shares: i64) -> Self {
        self.current_shares = shares;
        self
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }
}

/// Prefill a draft from a stored record (e.g., for an edit form).
impl From<&InvestmentRecord> for RecordDraft {
    fn from(record: &InvestmentRecord) -> Self {
        Self {
            investor: record.investor.clone(),
            stock_code: record.stock_code.clone(),
            stock_name: record.stock_name.clone(),
            holding_method: record.holding_method.as_str().to_string(),
            investment_date: Some(record.investment_date),
            investment_type: record.investment_type.as_str().to_string(),
            quantity: record.quantity as i64,
            current_shares: record.current_shares as i64,
            unit_price: record.unit_price,
            current_price: record.current_price,
            remarks: record.remarks.clone(),
        }
    }
}
