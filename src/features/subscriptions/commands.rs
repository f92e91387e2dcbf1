use super::models::{Subscription, SubscriptionDraft, SubscriptionPatch, DEFAULT_PERIOD_DAYS};
use super::store::SubscriptionStore;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    normalize_string, today_in, validate_amount, validate_date, validate_period,
    validate_required_field, validate_text_length,
};
use chrono_tz::Tz;

/// サービス名の最大文字数
const MAX_TITLE_LENGTH: usize = 100;

/// 入力値から新規作成用の下書きを組み立てる
///
/// 開始日が省略された場合は今日（指定タイムゾーン基準）、
/// 請求周期が省略された場合は30日を使用する
pub fn build_draft(
    title: &str,
    amount: f64,
    start_date: Option<String>,
    period: Option<i64>,
    timezone: Tz,
) -> SubscriptionDraft {
    SubscriptionDraft {
        id: None,
        title: title.to_string(),
        amount,
        start_date: start_date.unwrap_or_else(|| today_in(timezone)),
        period: period.unwrap_or(DEFAULT_PERIOD_DAYS),
    }
}

/// 下書きを検証し、正規化した下書きを返す
///
/// # バリデーション規則
/// - サービス名は必須、前後の空白を除いて100文字以内
/// - 金額は正の数値、小数点以下2桁まで
/// - 開始日はYYYY-MM-DD形式
/// - 請求周期は1日以上
pub fn validate_draft(draft: SubscriptionDraft) -> AppResult<SubscriptionDraft> {
    log::debug!("バリデーション開始 - 受信した日付: {}", draft.start_date);

    let title = normalize_string(&draft.title);
    validate_required_field(&title, "サービス名")?;
    validate_text_length(&title, MAX_TITLE_LENGTH, "サービス名")?;
    validate_amount(draft.amount)?;

    let start_date = normalize_string(&draft.start_date);
    validate_date(&start_date)?;
    validate_period(draft.period)?;

    if let Some(id) = &draft.id {
        if id.trim().is_empty() {
            return Err(AppError::validation("更新するIDが空です"));
        }
    }

    Ok(SubscriptionDraft {
        title,
        start_date,
        ..draft
    })
}

/// サブスクリプション一覧を取得する
pub async fn list_subscriptions(store: &dyn SubscriptionStore) -> AppResult<Vec<Subscription>> {
    store.list().await
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `store` - 保存先
/// * `draft` - 作成する下書き（IDは指定しない）
pub async fn add_subscription(
    store: &dyn SubscriptionStore,
    draft: SubscriptionDraft,
) -> AppResult<Subscription> {
    if draft.is_update() {
        return Err(AppError::validation(
            "新規作成時にIDを指定することはできません",
        ));
    }

    let draft = validate_draft(draft)?;
    store.save(draft).await
}

/// サブスクリプションを部分更新する
///
/// # 引数
/// * `store` - 保存先
/// * `id` - 更新対象のID
/// * `patch` - 変更するフィールド
///
/// # 戻り値
/// 更新されたサブスクリプション、または失敗時はエラー
pub async fn edit_subscription(
    store: &dyn SubscriptionStore,
    id: &str,
    patch: SubscriptionPatch,
) -> AppResult<Subscription> {
    if id.trim().is_empty() {
        return Err(AppError::validation("更新するIDを指定してください"));
    }
    if patch.is_empty() {
        return Err(AppError::validation("変更する項目を1つ以上指定してください"));
    }

    let existing = store
        .list()
        .await?
        .into_iter()
        .find(|subscription| subscription.id == id)
        .ok_or_else(|| AppError::NotFound(format!("ID {id} のサブスクリプションが見つかりません")))?;

    let draft = validate_draft(patch.apply_to(&existing))?;
    store.save(draft).await
}

/// サブスクリプションを削除する
pub async fn delete_subscription(store: &dyn SubscriptionStore, id: &str) -> AppResult<()> {
    store.delete(id.trim()).await
}
