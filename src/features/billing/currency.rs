use serde::{Deserialize, Serialize};

/// 金額を固定レートで換算する
///
/// # 引数
/// * `amount` - 換算元通貨での金額
/// * `rate` - 換算レート（換算元1単位あたりの換算先金額）
///
/// # 戻り値
/// 換算先通貨での金額
pub fn convert(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// 換算元・換算先の通貨と固定レートの組
///
/// レートは設定値であり、実行中に外部から取得することはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub source: String,
    pub target: String,
    pub rate: f64,
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            source: "USD".to_string(),
            target: "RUB".to_string(),
            rate: 90.0,
        }
    }
}

impl CurrencyPair {
    pub fn new<S: Into<String>>(source: S, target: S, rate: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rate,
        }
    }

    /// 換算元通貨の金額を換算先通貨に換算する
    pub fn convert(&self, amount: f64) -> f64 {
        convert(amount, self.rate)
    }

    /// レート表記（例: "90 USD/RUB"）
    pub fn rate_label(&self) -> String {
        let rate = if self.rate.fract() == 0.0 {
            format!("{:.0}", self.rate)
        } else {
            format!("{:.2}", self.rate)
        };
        format!("{rate} {}/{}", self.source, self.target)
    }
}
