/// 請求計算機能モジュール
///
/// このモジュールは、サブスクリプションの請求日に関する純粋な計算を提供します：
/// - 次回支払いまでの残り日数
/// - 指定月に請求が発生するかの判定
/// - 月別の支出集計と内訳
/// - 固定レートでの通貨換算
///
/// 保存処理やログ出力には依存しません。
pub mod currency;
pub mod errors;
pub mod projection;
pub mod window;

#[cfg(test)]
mod properties_test;

// 公開インターフェース
pub use currency::{convert, CurrencyPair};
pub use errors::BillingError;
pub use projection::{
    aggregate_monthly_spend, days_until_next_payment, first_occurrence_on_or_after,
    monthly_breakdown, occurs_in_month, parse_start_date, total_amount, Billable, MonthlyCharge,
};
pub use window::MonthWindow;
