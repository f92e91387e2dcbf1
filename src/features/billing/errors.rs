use serde::{Deserialize, Serialize};

/// 請求計算エラーの種類
///
/// 計算エンジンは純粋関数のみで構成されるため、ここで定義するのは
/// 入力値の検証エラーだけである。ログ出力は呼び出し側で行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BillingError {
    /// 開始日が解析できない、または未入力
    #[error("開始日が不正です: {value:?}")]
    InvalidDate { value: String },

    /// 請求周期が1日未満、または日付として表現できないほど大きい
    #[error("請求周期が不正です: {period}日")]
    InvalidPeriod { period: i64 },

    /// 対象月の指定が不正
    #[error("対象月が不正です: {value}")]
    InvalidMonth { value: String },
}

impl BillingError {
    /// 開始日エラーを作成
    pub fn invalid_date<S: Into<String>>(value: S) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// 請求周期エラーを作成
    pub fn invalid_period(period: i64) -> Self {
        Self::InvalidPeriod { period }
    }

    /// 対象月エラーを作成
    pub fn invalid_month<S: Into<String>>(value: S) -> Self {
        Self::InvalidMonth {
            value: value.into(),
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDate { .. } => "開始日はYYYY-MM-DD形式で入力してください".to_string(),
            Self::InvalidPeriod { .. } => "請求周期は1日以上で入力してください".to_string(),
            Self::InvalidMonth { value } => {
                format!("対象月はYYYY-MM形式で入力してください（入力値: {value}）")
            }
        }
    }
}
