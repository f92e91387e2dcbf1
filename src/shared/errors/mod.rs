use crate::features::billing::BillingError;
use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// データベース関連のエラー
    #[error("データベースエラー: {0}")]
    Database(String),

    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 外部サービス連携でのエラー
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 請求計算の入力エラー
    #[error("請求計算エラー: {0}")]
    Billing(#[from] BillingError),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
    /// 最重要（データ破損など）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "データベース操作でエラーが発生しました".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::ExternalService(msg) => {
                format!("外部サービスとの通信でエラーが発生しました（{msg}）")
            }
            AppError::Configuration(msg) => format!("設定エラーが発生しました（{msg}）"),
            AppError::Billing(e) => e.user_message(),
            AppError::Io(_) => "ファイル操作でエラーが発生しました".to_string(),
            AppError::Json(_) => "データ形式の解析でエラーが発生しました".to_string(),
            AppError::Concurrency(_) => "並行処理でエラーが発生しました".to_string(),
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Database(_) => ErrorSeverity::High,
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::ExternalService(_) => ErrorSeverity::Medium,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Billing(_) => ErrorSeverity::Low,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::Concurrency(_) => ErrorSeverity::Critical,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

/// AppErrorからStringへの変換（CLI出力用）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message()
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Database(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        // 各エラータイプの重要度をテスト
        assert_eq!(
            AppError::validation("テスト").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::not_found("サブスクリプション").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::external_service("API", "接続失敗").severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            AppError::configuration("設定ファイル不正").severity(),
            ErrorSeverity::High
        );
        assert_eq!(
            AppError::from(BillingError::invalid_period(0)).severity(),
            ErrorSeverity::Low
        );
    }

    #[test]
    fn test_user_message() {
        let validation_error = AppError::validation("金額が不正です");
        assert_eq!(validation_error.user_message(), "金額が不正です");

        let not_found_error = AppError::not_found("サブスクリプション");
        assert_eq!(
            not_found_error.user_message(),
            "サブスクリプションが見つかりません"
        );

        let database_error = AppError::Database("disk I/O error".to_string());
        assert_eq!(
            database_error.user_message(),
            "データベース操作でエラーが発生しました"
        );

        let billing_error = AppError::from(BillingError::invalid_period(-1));
        assert_eq!(
            billing_error.user_message(),
            "請求周期は1日以上で入力してください"
        );
    }

    #[test]
    fn test_rusqlite_conversion() {
        let error: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, AppError::Database(_)));
    }

    #[test]
    fn test_string_conversion() {
        let error = AppError::validation("テストエラー");
        let error_string: String = error.into();
        assert_eq!(error_string, "テストエラー");
    }

    #[test]
    fn test_error_details() {
        let error = AppError::validation("詳細テスト");
        let details = error.details();
        assert!(details.contains("詳細テスト"));
    }
}
