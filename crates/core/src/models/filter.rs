use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{HoldingMethod, InvestmentRecord};

/// Query filter for `get_all`. Every populated field must match (logical AND);
/// an empty field imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordFilter {
    /// Case-sensitive substring of the investor name
    pub investor: Option<String>,
    pub holding_method: Option<HoldingMethod>,
    /// Case-sensitive substring of the stock code
    pub stock_code: Option<String>,
    /// Inclusive lower bound on the investment date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the investment date
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive text matched against stock name, stock code or investor
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn investor(mut self, investor: impl Into<String>) -> Self {
        self.investor = Some(investor.into());
        self
    }

    pub fn holding_method(mut self, method: HoldingMethod) -> Self {
        self.holding_method = Some(method);
        self
    }

    pub fn stock_code(mut self, code: impl Into<String>) -> Self {
        self.stock_code = Some(code.into());
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// `true` when no field is populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &InvestmentRecord) -> bool {
        if let Some(investor) = non_empty(&self.investor) {
            if !record.investor.contains(investor) {
                return false;
            }
        }
        if let Some(method) = self.holding_method {
            if record.holding_method != method {
                return false;
            }
        }
        if let Some(code) = non_empty(&self.stock_code) {
            if !record.stock_code.contains(code) {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| record.investment_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| record.investment_date > end) {
            return false;
        }
        if let Some(search) = non_empty(&self.search) {
            let q = search.to_lowercase();
            let hit = record.stock_name.to_lowercase().contains(&q)
                || record.stock_code.to_lowercase().contains(&q)
                || record.investor.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        true
    }
}

// An empty string behaves like an absent filter field.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
