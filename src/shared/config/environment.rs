use crate::features::billing::CurrencyPair;
use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::str::FromStr;
use std::time::Duration;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. コンパイル時の環境変数（`option_env!`マクロ、build.rsで埋め込み）
/// 3. どちらも見つからない場合はエラー
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をコンパイル時の環境変数から取得しました", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!(
                    "起動時の環境変数 {} もコンパイル時の環境変数も見つかりませんでした",
                    $var_name
                ),
            })
        }
    }};
}

/// 環境変数を取得する（オプション版）
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（デフォルト値付き）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "環境変数 {} が見つからないため、デフォルト値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let default_level = if debug_mode { "debug" } else { "info" };
        let log_level = crate::get_env_var_or_default!("LOG_LEVEL", default_level);

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
        }
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. コンパイル時埋め込み環境変数を最優先
/// 2. 実行時環境変数 ENVIRONMENT を確認
/// 3. デバッグビルドの場合は Development
/// 4. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Some(embedded_env) = option_env!("EMBEDDED_ENVIRONMENT") {
        let env = parse_environment(embedded_env);
        log::debug!("環境判定: コンパイル時埋め込み値を使用 -> {embedded_env} -> {env:?}");
        return env;
    }

    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = parse_environment(&env_var);
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

fn parse_environment(value: &str) -> Environment {
    match value {
        "production" => Environment::Production,
        _ => Environment::Development,
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_subscriptions.db"
/// - プロダクション環境: "subscriptions.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_subscriptions.db",
        Environment::Production => "subscriptions.db",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// # 処理内容
/// 1. コンパイル時埋め込み環境設定をチェック
/// 2. 環境に応じた.envファイルを読み込み
/// 3. フォールバック処理
pub fn load_environment_variables() {
    if let Some(env) = option_env!("EMBEDDED_ENVIRONMENT") {
        log::info!("コンパイル時埋め込み環境設定を使用: {env}");
    }

    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let log_level = match env_config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    };

    // 二重初期化はテストなどで起こり得るため無視する
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        env_config.log_level,
        env_config.environment
    );
}

/// サブスクリプションの保存先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// ローカルのSQLiteファイル
    Local,
    /// APIサーバー
    Remote,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "local" | "sqlite" => Ok(StoreBackend::Local),
            "remote" | "api" => Ok(StoreBackend::Remote),
            other => Err(AppError::configuration(format!(
                "SUBSCRIPTION_STORE は local または remote を指定してください: {other}"
            ))),
        }
    }
}

impl StoreBackend {
    /// 環境変数から保存先を読み込む（既定はローカル）
    pub fn from_env() -> AppResult<Self> {
        crate::get_env_var_or_default!("SUBSCRIPTION_STORE", "local").parse()
    }
}

/// APIサーバー接続設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL
    pub base_url: String,
    /// リクエストタイムアウト（秒）
    pub timeout_seconds: u64,
    /// 接続失敗時の最大リトライ回数
    pub max_retries: u32,
    /// Bearerトークン
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            auth_token: None,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    ///
    /// # 戻り値
    /// API設定、または値が不正な場合は設定エラー
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let base_url = crate::get_env_var_or_default!("API_BASE_URL", defaults.base_url);
        let timeout_seconds = parse_number(
            "API_TIMEOUT_SECONDS",
            &crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", defaults.timeout_seconds),
        )?;
        let max_retries = parse_number(
            "API_MAX_RETRIES",
            &crate::get_env_var_or_default!("API_MAX_RETRIES", defaults.max_retries),
        )?;
        // トークンはバイナリに埋め込まない
        let auth_token = std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty());

        let config = Self {
            base_url,
            timeout_seconds,
            max_retries,
            auth_token,
        };
        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証する
    pub fn validate(&self) -> AppResult<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            AppError::configuration(format!("API_BASE_URL が不正です: {} ({e})", self.base_url))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::configuration(format!(
                "API_BASE_URL はhttpまたはhttpsである必要があります: {}",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "API_TIMEOUT_SECONDS は1以上である必要があります",
            ));
        }

        Ok(())
    }
}

/// 請求表示に関する設定
#[derive(Debug, Clone)]
pub struct BillingSettings {
    /// 通貨換算設定
    pub currency: CurrencyPair,
    /// 暦の基準タイムゾーン
    pub timezone: Tz,
    /// 残り日数がこの値以下なら支払い間近として扱う
    pub due_soon_days: i64,
    /// ダッシュボードの再計算間隔
    pub refresh_interval: Duration,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            currency: CurrencyPair::default(),
            timezone: Tz::UTC,
            due_soon_days: 7,
            refresh_interval: Duration::from_secs(60),
        }
    }
}

impl BillingSettings {
    /// 環境変数から請求表示設定を読み込む
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let source = crate::get_env_var_or_default!("SOURCE_CURRENCY", defaults.currency.source);
        let target = crate::get_env_var_or_default!("TARGET_CURRENCY", defaults.currency.target);
        let rate = parse_exchange_rate(&crate::get_env_var_or_default!(
            "EXCHANGE_RATE",
            defaults.currency.rate
        ))?;
        let timezone = parse_timezone(&crate::get_env_var_or_default!(
            "BILLING_TIMEZONE",
            defaults.timezone.name()
        ))?;
        let due_soon_days = parse_due_soon_days(&crate::get_env_var_or_default!(
            "DUE_SOON_DAYS",
            defaults.due_soon_days
        ))?;
        let refresh_seconds: u64 = parse_number(
            "REFRESH_INTERVAL_SECONDS",
            &crate::get_env_var_or_default!(
                "REFRESH_INTERVAL_SECONDS",
                defaults.refresh_interval.as_secs()
            ),
        )?;
        if refresh_seconds == 0 {
            return Err(AppError::configuration(
                "REFRESH_INTERVAL_SECONDS は1以上である必要があります",
            ));
        }

        Ok(Self {
            currency: CurrencyPair::new(source.trim().to_uppercase(), target.trim().to_uppercase(), rate),
            timezone,
            due_soon_days,
            refresh_interval: Duration::from_secs(refresh_seconds),
        })
    }
}

/// 為替レートを解析する（正の有限値のみ）
pub fn parse_exchange_rate(value: &str) -> AppResult<f64> {
    let rate: f64 = parse_number("EXCHANGE_RATE", value)?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AppError::configuration(format!(
            "EXCHANGE_RATE は正の数値である必要があります: {value}"
        )));
    }
    Ok(rate)
}

/// 支払い間近とみなす日数を解析する（0以上）
pub fn parse_due_soon_days(value: &str) -> AppResult<i64> {
    let days: i64 = parse_number("DUE_SOON_DAYS", value)?;
    if days < 0 {
        return Err(AppError::configuration(format!(
            "DUE_SOON_DAYS は0以上である必要があります: {value}"
        )));
    }
    Ok(days)
}

/// タイムゾーン名（例: "Europe/Moscow"）を解析する
pub fn parse_timezone(value: &str) -> AppResult<Tz> {
    value.trim().parse::<Tz>().map_err(|e| {
        AppError::configuration(format!("BILLING_TIMEZONE が不正です: {value} ({e})"))
    })
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::configuration(format!("{name} は数値である必要があります: {value}")))
}
