use crate::shared::config::{get_database_filename, get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// アプリケーションデータディレクトリ名
const APP_DIRECTORY_NAME: &str = "subscription-tracker";

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// アプリケーションデータディレクトリのパス
    pub app_data_dir: PathBuf,
    /// データベースファイルのパス
    pub database_path: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `database_override` - データベースファイルパスの明示指定（SUBSCRIPTION_DB_PATH）
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. アプリケーションデータディレクトリの作成
/// 2. 初回起動の判定
/// 3. 環境に応じたデータベースファイルパスの決定
pub fn initialize_application(database_override: Option<PathBuf>) -> AppResult<InitializationResult> {
    let environment = get_environment();

    let (app_data_dir, database_path) = match database_override {
        Some(path) => {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            ensure_directory(&parent)?;
            (parent, path)
        }
        None => {
            let app_data_dir = default_app_data_dir()?;
            ensure_directory(&app_data_dir)?;
            let database_path = app_data_dir.join(get_database_filename(environment.clone()));
            (app_data_dir, database_path)
        }
    };

    // データベースファイルの存在で初回起動を判定
    let is_first_run = !database_path.exists();

    if is_first_run {
        log_first_run_initialization(&environment, &app_data_dir, &database_path);
    }

    Ok(InitializationResult {
        is_first_run,
        app_data_dir,
        database_path,
        environment,
    })
}

/// OS標準のアプリケーションデータディレクトリを取得する
fn default_app_data_dir() -> AppResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIRECTORY_NAME))
        .ok_or_else(|| AppError::configuration("アプリデータディレクトリの取得に失敗しました"))
}

/// ディレクトリを確実に作成する
fn ensure_directory(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::configuration(format!("アプリデータディレクトリの作成に失敗: {e}"))
        })?;
        log::info!("アプリケーションデータディレクトリを作成しました: {dir:?}");
    }
    Ok(())
}

/// 初回起動時の初期化ログを出力する
fn log_first_run_initialization(environment: &Environment, app_data_dir: &Path, database_path: &Path) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("アプリデータディレクトリ: {app_data_dir:?}");
    log::info!("データベースファイル: {database_path:?}");
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存データベースを使用）");
    }
    log::debug!("環境: {:?}", result.environment);
    log::debug!("データベース: {:?}", result.database_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_with_override_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("subs.db");

        let result = initialize_application(Some(db_path.clone())).unwrap();

        assert!(result.is_first_run);
        assert_eq!(result.database_path, db_path);
        assert!(temp_dir.path().join("nested").exists());
    }

    #[test]
    fn test_existing_database_is_not_first_run() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("subs.db");
        fs::write(&db_path, b"").unwrap();

        let result = initialize_application(Some(db_path)).unwrap();
        assert!(!result.is_first_run);
    }

    #[test]
    fn test_log_initialization_complete() {
        let result = InitializationResult {
            is_first_run: true,
            app_data_dir: PathBuf::from("/tmp/test"),
            database_path: PathBuf::from("/tmp/test/subscriptions.db"),
            environment: Environment::Production,
        };

        // パニックしないことを確認
        log_initialization_complete(&result);
        assert_eq!(result.environment, Environment::Production);
    }
}
