use std::collections::HashSet;

use crate::models::price::StockPriceMap;
use crate::models::record::InvestmentRecord;
use crate::models::summary::InvestmentSummary;

/// Computes aggregate statistics: invested total, current value, unrealized
/// gain and profit rate, plus distinct stock / investor counts.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Summarize `records`.
    ///
    /// A record's effective current price is its own `current_price`, else the
    /// quote in `prices` for its stock code, else its `unit_price`.
    pub fn calculate<'a, I>(&self, records: I, prices: &StockPriceMap) -> InvestmentSummary
    where
        I: IntoIterator<Item = &'a InvestmentRecord>,
    {
        let mut summary = InvestmentSummary::default();
        let mut stocks = HashSet::new();
        let mut investors = HashSet::new();

        for record in records {
            let price = Self::effective_price(record, prices);
            summary.total_investment += record.total_amount;
            summary.total_current_value += record.current_shares as f64 * price;
            summary.total_shares = summary.total_shares.saturating_add(record.current_shares);
            summary.total_transactions += 1;
            stocks.insert(record.stock_code.as_str());
            investors.insert(record.investor.as_str());
        }

        if summary.total_transactions == 0 {
            return InvestmentSummary::default();
        }

        summary.total_unrealized_gain = summary.total_current_value - summary.total_investment;
        summary.total_profit_rate = if summary.total_investment > 0.0 {
            (summary.total_unrealized_gain / summary.total_investment) * 100.0
        } else {
            0.0
        };
        summary.holding_stocks = stocks.len();
        summary.active_investors = investors.len();
        summary
    }

    pub fn effective_price(record: &InvestmentRecord, prices: &StockPriceMap) -> f64 {
        record
            .current_price
            .or_else(|| prices.get(&record.stock_code).copied())
            .unwrap_or(record.unit_price)
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
