use super::models::{ChartSlice, DashboardSnapshot, MonthSummary, SubscriptionRow};
use crate::features::billing::{
    aggregate_monthly_spend, days_until_next_payment, monthly_breakdown, total_amount,
    MonthWindow,
};
use crate::features::subscriptions::Subscription;
use crate::shared::config::BillingSettings;
use crate::shared::errors::AppResult;
use chrono::DateTime;
use chrono_tz::Tz;

/// ダッシュボードのスナップショットを作成する
///
/// # 引数
/// * `subscriptions` - 表示対象のサブスクリプション
/// * `now` - 基準時刻（設定タイムゾーンの暦で解釈する）
/// * `settings` - 通貨換算・しきい値の設定
/// * `month` - 内訳を表示する月（省略時は `now` を含む月）
///
/// # 戻り値
/// スナップショット、または対象月が不正な場合はエラー
///
/// # 備考
/// 残り日数を計算できないサブスクリプションは行にエラーを記録し、
/// 月別内訳からは除外する。合計金額には含める。
pub fn build_snapshot(
    subscriptions: &[Subscription],
    now: &DateTime<Tz>,
    settings: &BillingSettings,
    month: Option<MonthWindow>,
) -> AppResult<DashboardSnapshot> {
    let mut rows = Vec::with_capacity(subscriptions.len());
    let mut projectable = Vec::with_capacity(subscriptions.len());

    for subscription in subscriptions {
        let row = match days_until_next_payment(subscription, now) {
            Ok(days_left) => {
                projectable.push(subscription);
                SubscriptionRow {
                    id: subscription.id.clone(),
                    title: subscription.title.clone(),
                    amount: subscription.amount,
                    start_date: subscription.start_date.clone(),
                    period: subscription.period,
                    days_left: Some(days_left),
                    due_soon: days_left <= settings.due_soon_days,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!(
                    "残り日数を計算できませんでした: id={}, error={e}",
                    subscription.id
                );
                SubscriptionRow {
                    id: subscription.id.clone(),
                    title: subscription.title.clone(),
                    amount: subscription.amount,
                    start_date: subscription.start_date.clone(),
                    period: subscription.period,
                    days_left: None,
                    due_soon: false,
                    error: Some(e.user_message()),
                }
            }
        };
        rows.push(row);
    }

    let window = match month {
        Some(window) => window,
        None => MonthWindow::containing(now.date_naive())?,
    };

    let charges = monthly_breakdown(&projectable, window.start(), window.end_exclusive())?;
    let month_total =
        aggregate_monthly_spend(&projectable, window.start(), window.end_exclusive())?;

    let slices = charges
        .into_iter()
        .map(|charge| ChartSlice {
            share_percent: share_percent(charge.amount, month_total),
            id: charge.id,
            title: charge.title,
            amount: charge.amount,
        })
        .collect();

    let total = total_amount(subscriptions);
    let currency = settings.currency.clone();

    Ok(DashboardSnapshot {
        generated_at: now.to_rfc3339(),
        rows,
        total,
        converted_total: currency.convert(total),
        month: MonthSummary {
            label: window.to_string(),
            start: window.start(),
            end_exclusive: window.end_exclusive(),
            slices,
            total: month_total,
            converted_total: currency.convert(month_total),
        },
        currency,
    })
}

fn share_percent(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}
