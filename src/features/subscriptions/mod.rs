/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - サブスクリプションの作成、読み取り、更新、削除
/// - 入力値のバリデーション
/// - ローカル（SQLite）とAPIサーバーの2種類の保存先
/// - 変更通知の配信と一覧への反映
pub mod api_store;
pub mod commands;
pub mod models;
pub mod repository;
pub mod store;

// 公開インターフェース
pub use api_store::RemoteStore;
pub use commands::{
    add_subscription, build_draft, delete_subscription, edit_subscription, list_subscriptions,
    validate_draft,
};
pub use models::{Subscription, SubscriptionDraft, SubscriptionPatch, DEFAULT_PERIOD_DAYS};
pub use repository::LocalStore;
pub use store::{apply_event, SubscriptionEvent, SubscriptionStore};
