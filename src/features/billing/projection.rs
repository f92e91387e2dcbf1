use super::errors::BillingError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// 1日あたりのミリ秒数
const MILLIS_PER_DAY: i64 = 86_400_000;

/// 請求計算の対象になるデータ
///
/// 計算エンジンは保存形式に依存しないよう、このトレイト越しに
/// サブスクリプションの値を読み取る。
pub trait Billable {
    fn billing_id(&self) -> &str;
    fn billing_title(&self) -> &str;
    fn billing_amount(&self) -> f64;
    /// 初回請求日（YYYY-MM-DD）
    fn billing_start(&self) -> &str;
    /// 請求周期（日数）
    fn billing_period(&self) -> i64;
}

impl<T: Billable + ?Sized> Billable for &T {
    fn billing_id(&self) -> &str {
        (**self).billing_id()
    }

    fn billing_title(&self) -> &str {
        (**self).billing_title()
    }

    fn billing_amount(&self) -> f64 {
        (**self).billing_amount()
    }

    fn billing_start(&self) -> &str {
        (**self).billing_start()
    }

    fn billing_period(&self) -> i64 {
        (**self).billing_period()
    }
}

/// 指定月に発生する請求1件分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCharge {
    pub id: String,
    pub title: String,
    pub amount: f64,
}

/// 開始日文字列を解析する
///
/// # 引数
/// * `raw` - 開始日（YYYY-MM-DD形式、またはRFC3339形式のタイムスタンプ）
///
/// # 戻り値
/// 暦日、または解析できない場合は `InvalidDate`
///
/// # 備考
/// タイムスタンプの場合は記載された日付部分のみを使用する。
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, BillingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BillingError::invalid_date(raw));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    Err(BillingError::invalid_date(raw))
}

/// 請求周期を検証する
fn validate_period(period: i64) -> Result<i64, BillingError> {
    if period < 1 {
        return Err(BillingError::invalid_period(period));
    }
    Ok(period)
}

/// 日数をDurationに変換する（範囲外は `InvalidPeriod`）
fn days(period: i64, count: i64) -> Result<Duration, BillingError> {
    count
        .checked_mul(period)
        .and_then(Duration::try_days)
        .ok_or_else(|| BillingError::invalid_period(period))
}

/// ミリ秒を日数に切り上げる
fn ceil_days(remaining: Duration) -> i64 {
    let millis = remaining.num_milliseconds();
    let whole = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        whole
    } else {
        whole + 1
    }
}

/// 次回支払いまでの残り日数を計算する
///
/// # 引数
/// * `subscription` - 対象サブスクリプション
/// * `now` - 基準時刻（このタイムゾーンの暦で開始日の0時を解釈する）
///
/// # 戻り値
/// `ceil((開始日 + 周期 - now) / 1日)`、または入力不正時はエラー
///
/// # 備考
/// 開始日から1周期後の境界だけを見る。期限を過ぎても次の周期へは進めないため、
/// 結果は負になり得る。
pub fn days_until_next_payment<B, Tz>(subscription: &B, now: &DateTime<Tz>) -> Result<i64, BillingError>
where
    B: Billable + ?Sized,
    Tz: TimeZone,
{
    let start = parse_start_date(subscription.billing_start())?;
    let period = validate_period(subscription.billing_period())?;

    let boundary = start
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| BillingError::invalid_date(subscription.billing_start()))?
        .checked_add_signed(days(period, 1)?)
        .ok_or_else(|| BillingError::invalid_period(period))?;

    Ok(ceil_days(boundary.signed_duration_since(now.naive_local())))
}

/// 指定日以降で最初の請求日を求める
///
/// # 引数
/// * `subscription` - 対象サブスクリプション
/// * `date` - 基準日
///
/// # 戻り値
/// 請求日（`開始日 + 周期 * k`、k >= 0）。暦の表現範囲を超える場合は `None`。
///
/// # 備考
/// 開始日から1周期ずつ進めるのではなく、必要な周期数を割り算で求める。
pub fn first_occurrence_on_or_after<B>(
    subscription: &B,
    date: NaiveDate,
) -> Result<Option<NaiveDate>, BillingError>
where
    B: Billable + ?Sized,
{
    let start = parse_start_date(subscription.billing_start())?;
    let period = validate_period(subscription.billing_period())?;

    if start >= date {
        return Ok(Some(start));
    }

    let gap = date.signed_duration_since(start).num_days();
    let steps = gap / period + i64::from(gap % period != 0);

    let occurrence = steps
        .checked_mul(period)
        .and_then(Duration::try_days)
        .and_then(|offset| start.checked_add_signed(offset));

    Ok(occurrence)
}

/// 指定期間内に請求が発生するかを判定する
///
/// # 引数
/// * `subscription` - 対象サブスクリプション
/// * `month_start` - 期間の開始日（含む）
/// * `month_end_exclusive` - 期間の終了日（含まない）
///
/// # 戻り値
/// 期間内に請求日がある場合はtrue。1か月に複数回発生しても1回として扱う。
pub fn occurs_in_month<B>(
    subscription: &B,
    month_start: NaiveDate,
    month_end_exclusive: NaiveDate,
) -> Result<bool, BillingError>
where
    B: Billable + ?Sized,
{
    let next = first_occurrence_on_or_after(subscription, month_start)?;
    Ok(matches!(next, Some(date) if date < month_end_exclusive))
}

/// 指定期間に請求が発生するサブスクリプションの内訳を取得する
///
/// 入力順を保ったまま、期間内に請求があるものだけを返す。
pub fn monthly_breakdown<B>(
    subscriptions: &[B],
    month_start: NaiveDate,
    month_end_exclusive: NaiveDate,
) -> Result<Vec<MonthlyCharge>, BillingError>
where
    B: Billable,
{
    let mut charges = Vec::new();
    for subscription in subscriptions {
        if occurs_in_month(subscription, month_start, month_end_exclusive)? {
            charges.push(MonthlyCharge {
                id: subscription.billing_id().to_string(),
                title: subscription.billing_title().to_string(),
                amount: subscription.billing_amount(),
            });
        }
    }
    Ok(charges)
}

/// 指定期間の支出合計を計算する
///
/// 空の入力では0を返す。
pub fn aggregate_monthly_spend<B>(
    subscriptions: &[B],
    month_start: NaiveDate,
    month_end_exclusive: NaiveDate,
) -> Result<f64, BillingError>
where
    B: Billable,
{
    let charges = monthly_breakdown(subscriptions, month_start, month_end_exclusive)?;
    Ok(charges.iter().fold(0.0, |acc, charge| acc + charge.amount))
}

/// 月に関係なく全サブスクリプションの金額を合計する
pub fn total_amount<B>(subscriptions: &[B]) -> f64
where
    B: Billable,
{
    subscriptions
        .iter()
        .fold(0.0, |acc, subscription| acc + subscription.billing_amount())
}
