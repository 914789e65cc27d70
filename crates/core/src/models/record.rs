use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// How a position is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingMethod {
    /// Shares owned outright
    Owned,
    /// Shares held on someone's behalf
    Held,
}

impl HoldingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingMethod::Owned => "owned",
            HoldingMethod::Held => "held",
        }
    }
}

impl std::fmt::Display for HoldingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owned" => Ok(HoldingMethod::Owned),
            "held" => Ok(HoldingMethod::Held),
            other => Err(format!("unknown holding method '{other}'")),
        }
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    Buy,
    Sell,
}

impl InvestmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentType::Buy => "buy",
            InvestmentType::Sell => "sell",
        }
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(InvestmentType::Buy),
            "sell" => Ok(InvestmentType::Sell),
            other => Err(format!("unknown investment type '{other}'")),
        }
    }
}

/// The editable part of a record, already validated and typed.
///
/// Produced only by the validation service from a `RecordDraft`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub investor: String,
    pub stock_code: String,
    pub stock_name: String,
    pub holding_method: HoldingMethod,
    pub investment_date: NaiveDate,
    pub investment_type: InvestmentType,
    pub quantity: u64,
    pub current_shares: u64,
    pub unit_price: f64,
    pub current_price: Option<f64>,
    pub remarks: String,
}

/// A single stored buy/sell transaction.
///
/// Field order is the persisted and exported column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    pub id: Uuid,
    pub investor: String,
    pub stock_code: String,
    pub stock_name: String,
    pub holding_method: HoldingMethod,
    pub investment_date: NaiveDate,
    pub investment_type: InvestmentType,
    pub quantity: u64,
    pub current_shares: u64,
    pub unit_price: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
    /// quantity × unit_price
    pub total_amount: f64,
    /// current_shares × (current_price or unit_price)
    pub current_value: f64,
    #[serde(default)]
    pub remarks: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl InvestmentRecord {
    /// Build a brand-new record with a fresh id and derived fields filled in.
    pub fn create(fields: RecordFields, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            investor: fields.investor,
            stock_code: fields.stock_code,
            stock_name: fields.stock_name,
            holding_method: fields.holding_method,
            investment_date: fields.investment_date,
            investment_type: fields.investment_type,
            quantity: fields.quantity,
            current_shares: fields.current_shares,
            unit_price: fields.unit_price,
            current_price: fields.current_price,
            total_amount: 0.0,
            current_value: 0.0,
            remarks: fields.remarks,
            create_time: now,
            update_time: now,
        };
        record.recompute_derived();
        record
    }

    /// Replace every editable field, keeping id and create_time.
    pub fn apply(&mut self, fields: RecordFields, now: DateTime<Utc>) {
        self.investor = fields.investor;
        self.stock_code = fields.stock_code;
        self.stock_name = fields.stock_name;
        self.holding_method = fields.holding_method;
        self.investment_date = fields.investment_date;
        self.investment_type = fields.investment_type;
        self.quantity = fields.quantity;
        self.current_shares = fields.current_shares;
        self.unit_price = fields.unit_price;
        self.current_price = fields.current_price;
        self.remarks = fields.remarks;
        self.update_time = now;
        self.recompute_derived();
    }

    /// The price used for `current_value`: own current price, else unit price.
    pub fn effective_price(&self) -> f64 {
        self.current_price.unwrap_or(self.unit_price)
    }

    pub fn recompute_derived(&mut self) {
        self.total_amount = self.quantity as f64 * self.unit_price;
        self.current_value = self.current_shares as f64 * self.effective_price();
    }

    /// Copy out the editable fields.
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            investor: self.investor.clone(),
            stock_code: self.stock_code.clone(),
            stock_name: self.stock_name.clone(),
            holding_method: self.holding_method,
            investment_date: self.investment_date,
            investment_type: self.investment_type,
            quantity: self.quantity,
            current_shares: self.current_shares,
            unit_price: self.unit_price,
            current_price: self.current_price,
            remarks: self.remarks.clone(),
        }
    }
}
