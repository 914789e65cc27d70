use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::price::StockPriceMap;
use crate::models::record::{HoldingMethod, InvestmentRecord, InvestmentType, RecordFields};

/// Sample investors used for seeding.
pub const SAMPLE_INVESTORS: [&str; 6] = ["张三", "李四", "王五", "赵六", "钱七", "孙八"];

/// Sample A-share stocks (code, name) used for seeding.
pub const SAMPLE_STOCKS: [(&str, &str); 20] = [
    ("000001", "平安银行"),
    ("000002", "万科A"),
    ("000858", "五粮液"),
    ("002415", "海康威视"),
    ("002594", "比亚迪"),
    ("300015", "爱尔眼科"),
    ("300059", "东方财富"),
    ("300750", "宁德时代"),
    ("600036", "招商银行"),
    ("600519", "贵州茅台"),
    ("600887", "伊利股份"),
    ("000725", "京东方A"),
    ("002230", "科大讯飞"),
    ("000568", "泸州老窖"),
    ("002027", "分众传媒"),
    ("600276", "恒瑞医药"),
    ("000963", "华东医药"),
    ("600031", "三一重工"),
    ("002304", "洋河股份"),
    ("600900", "长江电力"),
];

pub const SAMPLE_RECORD_COUNT: usize = 30;

/// Generates plausible demo data: records, the investor list and a price map.
pub struct MockDataService {
    rng: StdRng,
}

impl MockDataService {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic output for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// `SAMPLE_RECORD_COUNT` records cycling through the sample stocks and
    /// investors, dated within the year before `today`.
    pub fn generate_records(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Vec<InvestmentRecord> {
        (0..SAMPLE_RECORD_COUNT)
            .map(|i| {
                let (code, name) = SAMPLE_STOCKS[i % SAMPLE_STOCKS.len()];
                let investor = SAMPLE_INVESTORS[i % SAMPLE_INVESTORS.len()];

                let base_price = self.rng.gen_range(10.0..90.0);
                let quantity: u64 = self.rng.gen_range(1..=10) * 100;
                let sold = (self.rng.gen::<f64>() * quantity as f64 * 0.3).floor() as u64;
                let change = self.rng.gen_range(-0.2..0.2);
                let days_ago = self.rng.gen_range(0..365);

                let fields = RecordFields {
                    investor: investor.to_string(),
                    stock_code: code.to_string(),
                    stock_name: name.to_string(),
                    holding_method: if self.rng.gen_bool(0.5) {
                        HoldingMethod::Owned
                    } else {
                        HoldingMethod::Held
                    },
                    investment_date: today - Duration::days(days_ago),
                    investment_type: if self.rng.gen_bool(0.5) {
                        InvestmentType::Buy
                    } else {
                        InvestmentType::Sell
                    },
                    quantity,
                    current_shares: quantity - sold,
                    unit_price: round2(base_price),
                    current_price: Some(round2(base_price * (1.0 + change))),
                    remarks: if self.rng.gen_bool(0.3) {
                        format!("投资备注{}", i + 1)
                    } else {
                        String::new()
                    },
                };
                InvestmentRecord::create(fields, now)
            })
            .collect()
    }

    pub fn generate_investors(&self) -> Vec<String> {
        SAMPLE_INVESTORS.iter().map(|s| s.to_string()).collect()
    }

    /// One price in [10, 90) per sample stock code.
    pub fn generate_stock_prices(&mut self) -> StockPriceMap {
        SAMPLE_STOCKS
            .iter()
            .map(|(code, _)| (code.to_string(), round2(self.rng.gen_range(10.0..90.0))))
            .collect()
    }
}

impl Default for MockDataService {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
