use serde::{Deserialize, Serialize};

/// Configuration for an `InvestmentStore`: which keys it persists under and
/// whether missing keys are seeded with sample data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Key holding the JSON array of records.
    pub records_key: String,

    /// Key holding the JSON array of investor names.
    pub investors_key: String,

    /// Key holding the JSON object of stock code → price.
    pub stock_prices_key: String,

    /// Seed absent keys with generated sample data on open.
    pub seed_mock_data: bool,

    /// Fixed RNG seed for sample data; `None` draws from OS entropy.
    pub mock_seed: Option<u64>,
}

impl StoreSettings {
    /// Default keys, no seeding. Starts from genuinely empty stores.
    pub fn empty() -> Self {
        Self {
            seed_mock_data: false,
            ..Self::default()
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            records_key: "finance_platform_investments".to_string(),
            investors_key: "finance_platform_investors".to_string(),
            stock_prices_key: "finance_platform_stock_prices".to_string(),
            seed_mock_data: true,
            mock_seed: None,
        }
    }
}
