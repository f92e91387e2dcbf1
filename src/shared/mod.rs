/// 共有モジュール
///
/// 複数の機能で使用される共通のコンポーネント
pub mod api_client;
pub mod config;
pub mod database;
pub mod errors;
pub mod utils;
