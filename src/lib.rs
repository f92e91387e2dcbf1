pub mod cli;
pub mod features;
pub mod shared;

use cli::{execute, Cli};
use features::subscriptions::{LocalStore, RemoteStore, SubscriptionStore};
use log::{info, warn};
use shared::api_client::ApiClient;
use shared::config::{
    initialize_application, initialize_logging_system, load_environment_variables,
    log_initialization_complete, BillingSettings, StoreBackend,
};
use shared::errors::AppResult;
use std::path::PathBuf;

/// 設定に応じてサブスクリプションの保存先を開く
///
/// # 引数
/// * `backend` - 保存先の種類
/// * `database` - SQLiteファイルの明示指定（ローカル保存時のみ使用）
/// * `settings` - 請求表示設定（タイムスタンプのタイムゾーンに使用）
pub fn open_store(
    backend: StoreBackend,
    database: Option<PathBuf>,
    settings: &BillingSettings,
) -> AppResult<Box<dyn SubscriptionStore>> {
    match backend {
        StoreBackend::Local => {
            let init_result = initialize_application(database)?;
            let store = LocalStore::open(&init_result.database_path, settings.timezone)?;
            log_initialization_complete(&init_result);
            Ok(Box::new(store))
        }
        StoreBackend::Remote => {
            let api_client = ApiClient::from_env()?;
            info!("APIサーバーに接続します: {}", api_client.base_url());
            if !api_client.is_localhost() && std::env::var("API_TOKEN").is_err() {
                warn!("API_TOKEN が設定されていません。認証が必要なサーバーでは失敗します");
            }
            Ok(Box::new(RemoteStore::new(api_client)))
        }
    }
}

/// アプリケーションを実行する
///
/// # 処理内容
/// 1. 環境変数と.envファイルの読み込み
/// 2. ログシステムの初期化
/// 3. 請求表示設定と保存先の決定
/// 4. サブコマンドの実行
pub async fn run(cli: Cli) -> AppResult<()> {
    load_environment_variables();
    initialize_logging_system();

    let settings = BillingSettings::from_env()?;
    let backend = match cli.store {
        Some(store) => store.into(),
        None => StoreBackend::from_env()?,
    };
    let database = cli
        .database
        .or_else(|| crate::get_env_var_optional!("SUBSCRIPTION_DB_PATH").map(PathBuf::from));

    let store = open_store(backend, database, &settings)?;
    info!("保存先: {}", store.name());

    let mut stdout = std::io::stdout().lock();
    execute(cli.command, store.as_ref(), &settings, &mut stdout).await
}
