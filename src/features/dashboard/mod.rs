/// ダッシュボード機能モジュール
///
/// 一覧・合計・当月内訳をテキストで表示し、定期的に再計算する
pub mod models;
pub mod render;
pub mod service;
pub mod watch;

pub use models::{ChartSlice, DashboardSnapshot, MonthSummary, SubscriptionRow};
pub use render::{render_dashboard, render_rows, render_summary};
pub use service::build_snapshot;
pub use watch::watch_dashboard;
