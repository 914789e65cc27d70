use serde::{Deserialize, Serialize};

/// Aggregate statistics over a set of records.
///
/// An empty record set yields `InvestmentSummary::default()` (all zeros).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    /// Sum of every record's total amount
    pub total_investment: f64,

    /// Sum of current shares × effective current price
    pub total_current_value: f64,

    /// total_current_value - total_investment
    pub total_unrealized_gain: f64,

    /// Gain as a percentage of the investment; 0 when nothing was invested
    pub total_profit_rate: f64,

    /// Number of distinct stock codes
    pub holding_stocks: usize,

    /// Sum of current shares
    pub total_shares: u64,

    /// Number of records
    pub total_transactions: usize,

    /// Number of distinct investors
    pub active_investors: usize,
}
