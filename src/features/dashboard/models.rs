use crate::features::billing::CurrencyPair;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 一覧の1行分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRow {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub start_date: String,
    pub period: i64,
    /// 次回支払いまでの残り日数（計算できない場合はNone）
    pub days_left: Option<i64>,
    /// 残り日数がしきい値以下
    pub due_soon: bool,
    /// 計算に失敗した場合のユーザー向けメッセージ
    pub error: Option<String>,
}

/// 当月内訳の1項目（円グラフの1区画）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub id: String,
    pub title: String,
    pub amount: f64,
    /// 月合計に占める割合（%）
    pub share_percent: f64,
}

/// 指定月の支出内訳
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// "YYYY-MM"
    pub label: String,
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
    pub slices: Vec<ChartSlice>,
    pub total: f64,
    pub converted_total: f64,
}

/// ダッシュボード表示用のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// 生成日時（RFC3339形式）
    pub generated_at: String,
    pub currency: CurrencyPair,
    pub rows: Vec<SubscriptionRow>,
    /// 全サブスクリプションの金額合計（換算元通貨）
    pub total: f64,
    /// 全サブスクリプションの金額合計（換算先通貨）
    pub converted_total: f64,
    pub month: MonthSummary,
}

impl DashboardSnapshot {
    /// 計算に失敗した行の数
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.error.is_some()).count()
    }

    /// 支払いが近い行
    pub fn due_soon(&self) -> impl Iterator<Item = &SubscriptionRow> {
        self.rows.iter().filter(|row| row.due_soon)
    }
}
