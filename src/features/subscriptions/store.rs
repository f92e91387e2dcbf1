use super::models::{Subscription, SubscriptionDraft};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// 変更通知チャネルのバッファサイズ
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// サブスクリプションの変更通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionEvent {
    /// 新規作成
    Inserted(Subscription),
    /// 更新
    Updated(Subscription),
    /// 削除
    Deleted { id: String },
}

/// サブスクリプションの保存先
///
/// ローカル保存とAPIサーバー保存で同じ操作を提供する
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// 保存先の名前（ログ・表示用）
    fn name(&self) -> &'static str;

    /// サブスクリプション一覧を取得する（作成日時の新しい順）
    async fn list(&self) -> AppResult<Vec<Subscription>>;

    /// 下書きを保存する
    ///
    /// `id` がなければ新規作成、あれば更新する。IDは保存先が採番する。
    async fn save(&self, draft: SubscriptionDraft) -> AppResult<Subscription>;

    /// サブスクリプションを削除する
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// 変更通知を購読する
    fn subscribe(&self) -> broadcast::Receiver<SubscriptionEvent>;
}

/// 変更通知をキャッシュ済みの一覧に反映する
///
/// - 作成: 先頭に追加
/// - 更新: 同じIDの要素を置き換え
/// - 削除: 同じIDの要素を取り除く
pub fn apply_event(subscriptions: &mut Vec<Subscription>, event: SubscriptionEvent) {
    match event {
        SubscriptionEvent::Inserted(subscription) => subscriptions.insert(0, subscription),
        SubscriptionEvent::Updated(subscription) => {
            if let Some(existing) = subscriptions.iter_mut().find(|s| s.id == subscription.id) {
                *existing = subscription;
            }
        }
        SubscriptionEvent::Deleted { id } => subscriptions.retain(|s| s.id != id),
    }
}

/// 変更通知を送信する（購読者がいない場合は何もしない）
pub(crate) fn publish(sender: &broadcast::Sender<SubscriptionEvent>, event: SubscriptionEvent) {
    if sender.send(event).is_err() {
        log::debug!("変更通知の購読者がいないため送信をスキップしました");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str, title: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            title: title.to_string(),
            amount: 10.0,
            start_date: "2024-03-01".to_string(),
            period: 30,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_apply_insert_prepends() {
        let mut list = vec![subscription("a", "Netflix")];
        apply_event(&mut list, SubscriptionEvent::Inserted(subscription("b", "Spotify")));

        let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_apply_update_replaces_by_id() {
        let mut list = vec![subscription("a", "Netflix"), subscription("b", "Spotify")];
        apply_event(
            &mut list,
            SubscriptionEvent::Updated(subscription("b", "Spotify Family")),
        );

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].title, "Spotify Family");
    }

    #[test]
    fn test_apply_update_for_unknown_id_is_ignored() {
        let mut list = vec![subscription("a", "Netflix")];
        apply_event(&mut list, SubscriptionEvent::Updated(subscription("x", "Hulu")));

        assert_eq!(list, vec![subscription("a", "Netflix")]);
    }

    #[test]
    fn test_apply_delete_removes_by_id() {
        let mut list = vec![subscription("a", "Netflix"), subscription("b", "Spotify")];
        apply_event(&mut list, SubscriptionEvent::Deleted { id: "a".to_string() });

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b");
    }

    #[test]
    fn test_event_serialization_tag() {
        let value =
            serde_json::to_value(SubscriptionEvent::Deleted { id: "a".to_string() }).unwrap();
        assert_eq!(value["event_type"], "DELETED");
        assert_eq!(value["id"], "a");
    }

    #[test]
    fn test_publish_without_receivers_does_not_fail() {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        publish(&sender, SubscriptionEvent::Deleted { id: "a".to_string() });
    }
}
