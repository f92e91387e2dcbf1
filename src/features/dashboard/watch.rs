use super::models::DashboardSnapshot;
use super::service::build_snapshot;
use crate::features::subscriptions::{apply_event, Subscription, SubscriptionStore};
use crate::shared::config::BillingSettings;
use crate::shared::errors::AppResult;
use crate::shared::utils::now_in;
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};

/// ダッシュボードを定期的に再計算する
///
/// # 引数
/// * `store` - サブスクリプションの保存先
/// * `settings` - 再計算間隔を含む表示設定
/// * `max_renders` - 描画回数の上限（Noneの場合はCtrl+Cまで継続）
/// * `render` - スナップショットごとに呼ばれる描画処理
///
/// # 処理内容
/// - 一定間隔で保存先から一覧を取得し直す
/// - 間に届いた変更通知は手元の一覧に反映してすぐに描画する
pub async fn watch_dashboard<F>(
    store: &dyn SubscriptionStore,
    settings: &BillingSettings,
    max_renders: Option<usize>,
    mut render: F,
) -> AppResult<()>
where
    F: FnMut(&DashboardSnapshot) -> AppResult<()>,
{
    let mut events = store.subscribe();
    let mut ticker = interval(settings.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut subscriptions: Vec<Subscription> = Vec::new();
    let mut renders = 0usize;

    info!(
        "ダッシュボードの監視を開始します: store={}, interval={:?}",
        store.name(),
        settings.refresh_interval
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => refresh(store, &mut subscriptions).await,
            received = events.recv() => match received {
                Ok(event) => apply_event(&mut subscriptions, event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("変更通知を{skipped}件取りこぼしたため一覧を再取得します");
                    refresh(store, &mut subscriptions).await;
                }
                Err(RecvError::Closed) => {
                    info!("変更通知チャネルが閉じられたため監視を終了します");
                    return Ok(());
                }
            },
            _ = &mut shutdown => {
                info!("ダッシュボードの監視を終了します");
                return Ok(());
            }
        }

        let snapshot = build_snapshot(&subscriptions, &now_in(settings.timezone), settings, None)?;
        render(&snapshot)?;

        renders += 1;
        if max_renders.is_some_and(|limit| renders >= limit) {
            return Ok(());
        }
    }
}

/// 保存先から一覧を取得し直す
///
/// 取得に失敗した場合は前回の一覧で描画を続ける
async fn refresh(store: &dyn SubscriptionStore, subscriptions: &mut Vec<Subscription>) {
    match store.list().await {
        Ok(latest) => *subscriptions = latest,
        Err(e) => warn!("サブスクリプション一覧の再取得に失敗しました: {}", e.details()),
    }
}
