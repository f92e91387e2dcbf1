/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・計算・保存処理を含む自己完結型のユニットです。
pub mod billing;
pub mod dashboard;
pub mod subscriptions;
