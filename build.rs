use std::env;

/// コンパイル時に埋め込む設定キー
///
/// 実行時の環境変数が優先され、埋め込み値はそのフォールバックとして使われる。
const EMBEDDED_KEYS: [&str; 12] = [
    "SUBSCRIPTION_STORE",
    "API_BASE_URL",
    "API_TIMEOUT_SECONDS",
    "API_MAX_RETRIES",
    "SOURCE_CURRENCY",
    "TARGET_CURRENCY",
    "EXCHANGE_RATE",
    "BILLING_TIMEZONE",
    "DUE_SOON_DAYS",
    "REFRESH_INTERVAL_SECONDS",
    "SUBSCRIPTION_DB_PATH",
    "LOG_LEVEL",
];

fn main() {
    // ENVIRONMENT環境変数に基づいて適切な.envファイルを読み込み
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    println!("cargo:rerun-if-env-changed=ENVIRONMENT");
    println!("cargo:rerun-if-changed={env_file}");

    if dotenv::from_filename(env_file).is_ok() {
        println!("cargo:warning={env_file}ファイルを読み込みました");
    }

    // 本番ビルドのみ環境を固定する
    if environment == "production" {
        println!("cargo:rustc-env=EMBEDDED_ENVIRONMENT=production");
    }

    for key in EMBEDDED_KEYS {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}
