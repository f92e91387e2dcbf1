/// APIサーバー経由でのサブスクリプション保存
///
/// ローカルSQLiteの代わりにAPIサーバーを使用してサブスクリプションデータを管理します
use super::models::{Subscription, SubscriptionDraft};
use super::store::{publish, SubscriptionEvent, SubscriptionStore, EVENT_CHANNEL_CAPACITY};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use url::Url;

const SUBSCRIPTIONS_ENDPOINT: &str = "/api/v1/subscriptions";

/// APIサーバーからのサブスクリプション一覧取得レスポンス
#[derive(Debug, Serialize, Deserialize)]
struct GetSubscriptionsResponse {
    subscriptions: Vec<Subscription>,
    #[serde(default)]
    count: usize,
}

/// APIサーバーからのサブスクリプション作成・更新レスポンス
#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionResponse {
    subscription: Subscription,
}

/// 作成・更新リクエストのボディ
#[derive(Debug, Serialize)]
struct SubscriptionBody<'a> {
    title: &'a str,
    amount: f64,
    start_date: &'a str,
    period: i64,
}

impl<'a> From<&'a SubscriptionDraft> for SubscriptionBody<'a> {
    fn from(draft: &'a SubscriptionDraft) -> Self {
        Self {
            title: &draft.title,
            amount: draft.amount,
            start_date: &draft.start_date,
            period: draft.period,
        }
    }
}

/// 個別リソースのエンドポイント（IDはパスセグメントとしてエンコード）
fn item_endpoint(id: &str) -> AppResult<String> {
    let invalid = || AppError::validation(format!("IDをURLに変換できません: {id}"));

    let mut url = Url::parse(&format!("http://localhost{SUBSCRIPTIONS_ENDPOINT}"))
        .map_err(|_| invalid())?;
    url.path_segments_mut().map_err(|_| invalid())?.push(id);
    Ok(url.path().to_string())
}

/// APIサーバーに保存するサブスクリプションストア
///
/// 変更通知は自身が行った保存・削除の結果を配信する
pub struct RemoteStore {
    api_client: ApiClient,
    events: broadcast::Sender<SubscriptionEvent>,
}

impl RemoteStore {
    pub fn new(api_client: ApiClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { api_client, events }
    }
}

#[async_trait]
impl SubscriptionStore for RemoteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self) -> AppResult<Vec<Subscription>> {
        let response: GetSubscriptionsResponse = self.api_client.get(SUBSCRIPTIONS_ENDPOINT).await?;

        info!(
            "サブスクリプション一覧取得成功: count={}",
            response.subscriptions.len()
        );
        if response.count != 0 && response.count != response.subscriptions.len() {
            log::warn!(
                "件数が一致しません: count={}, actual={}",
                response.count,
                response.subscriptions.len()
            );
        }
        Ok(response.subscriptions)
    }

    async fn save(&self, draft: SubscriptionDraft) -> AppResult<Subscription> {
        let body = SubscriptionBody::from(&draft);

        match draft.id.as_deref() {
            Some(id) => {
                let response: SubscriptionResponse =
                    self.api_client.put(&item_endpoint(id)?, &body).await?;
                info!(
                    "サブスクリプション更新成功: subscription_id={}",
                    response.subscription.id
                );
                publish(
                    &self.events,
                    SubscriptionEvent::Updated(response.subscription.clone()),
                );
                Ok(response.subscription)
            }
            None => {
                let response: SubscriptionResponse =
                    self.api_client.post(SUBSCRIPTIONS_ENDPOINT, &body).await?;
                info!(
                    "サブスクリプション作成成功: subscription_id={}",
                    response.subscription.id
                );
                publish(
                    &self.events,
                    SubscriptionEvent::Inserted(response.subscription.clone()),
                );
                Ok(response.subscription)
            }
        }
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        if id.trim().is_empty() {
            return Err(AppError::validation("削除するIDを指定してください"));
        }

        self.api_client.delete(&item_endpoint(id)?).await?;
        info!("サブスクリプション削除成功: subscription_id={id}");
        publish(&self.events, SubscriptionEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SubscriptionEvent> {
        self.events.subscribe()
    }
}
