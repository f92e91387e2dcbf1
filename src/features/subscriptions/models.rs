use crate::features::billing::{parse_start_date, Billable};
use serde::{Deserialize, Serialize};

/// 新規入力時の既定の請求周期（日数）
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// サブスクリプションデータモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,         // nanoId（21文字）またはサーバー発行ID
    pub title: String,      // サービス名、100文字以内
    pub amount: f64,        // 正の数値、1周期あたりの金額
    pub start_date: String, // YYYY-MM-DD形式
    pub period: i64,        // 請求周期（日数）
    #[serde(default)]
    pub created_at: String, // RFC3339形式
    #[serde(default)]
    pub updated_at: String, // RFC3339形式
}

impl Billable for Subscription {
    fn billing_id(&self) -> &str {
        &self.id
    }

    fn billing_title(&self) -> &str {
        &self.title
    }

    fn billing_amount(&self) -> f64 {
        self.amount
    }

    fn billing_start(&self) -> &str {
        &self.start_date
    }

    fn billing_period(&self) -> i64 {
        self.period
    }
}

/// サブスクリプション保存用の下書き
///
/// `id` がない場合は新規作成、ある場合は更新として扱う
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubscriptionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub amount: f64,
    pub start_date: String,
    pub period: i64,
}

impl SubscriptionDraft {
    /// 新規作成用の下書きを作成する
    pub fn new<S: Into<String>>(title: S, amount: f64, start_date: S, period: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            amount,
            start_date: start_date.into(),
            period,
        }
    }

    /// 更新対象かどうか
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }
}

/// サブスクリプション部分更新用のパッチ
///
/// 指定されたフィールドのみ既存の値を置き換える
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<String>,
    pub period: Option<i64>,
}

impl SubscriptionPatch {
    /// 変更が1つも指定されていないか
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.start_date.is_none()
            && self.period.is_none()
    }

    /// 既存のサブスクリプションにパッチを適用した更新用の下書きを作成する
    ///
    /// 開始日を変更しない場合、既存の開始日はYYYY-MM-DD形式に揃える
    /// （APIサーバーはタイムスタンプ形式で返すことがある）
    pub fn apply_to(self, existing: &Subscription) -> SubscriptionDraft {
        SubscriptionDraft {
            id: Some(existing.id.clone()),
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            amount: self.amount.unwrap_or(existing.amount),
            start_date: self
                .start_date
                .unwrap_or_else(|| date_only(&existing.start_date)),
            period: self.period.unwrap_or(existing.period),
        }
    }
}

/// 開始日を日付部分のみにする（解析できない値はそのまま残し、検証で弾く）
fn date_only(start_date: &str) -> String {
    match parse_start_date(start_date) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => start_date.to_string(),
    }
}
