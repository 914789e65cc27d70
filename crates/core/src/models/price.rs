use std::collections::BTreeMap;

/// Stock code → current price. Ordered so the persisted JSON is stable.
pub type StockPriceMap = BTreeMap<String, f64>;
