use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

pub mod nanoid;

/// 請求周期の上限（日数）
pub const MAX_PERIOD_DAYS: i64 = 3660;

/// 金額の上限（10桁未満）
const MAX_AMOUNT: f64 = 10_000_000_000.0;

/// 日付文字列のバリデーション
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 有効な日付の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn validate_date(date_str: &str) -> AppResult<()> {
    if date_str.len() != 10 {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    if (date_str.chars().nth(4) != Some('-')) || (date_str.chars().nth(7) != Some('-')) {
        return Err(AppError::validation(
            "日付はYYYY-MM-DD形式で入力してください",
        ));
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("無効な日付です"))?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(())
}

/// 金額のバリデーション
///
/// # バリデーション規則
/// - 正の数値であること
/// - 10桁以内であること
/// - 小数点以下は2桁まで
pub fn validate_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() {
        return Err(AppError::validation("無効な金額です"));
    }

    if amount <= 0.0 {
        return Err(AppError::validation("金額は正の数値で入力してください"));
    }

    if amount >= MAX_AMOUNT {
        return Err(AppError::validation("金額は10桁以内で入力してください"));
    }

    let amount_str = format!("{amount:.10}");
    if let Some(decimal_pos) = amount_str.find('.') {
        let significant_decimals = amount_str[decimal_pos + 1..].trim_end_matches('0');
        if significant_decimals.len() > 2 {
            return Err(AppError::validation(
                "金額は小数点以下2桁まで入力してください",
            ));
        }
    }

    Ok(())
}

/// 請求周期のバリデーション（1日以上、上限以内）
pub fn validate_period(period: i64) -> AppResult<()> {
    if period < 1 {
        return Err(AppError::validation("請求周期は1日以上で入力してください"));
    }
    if period > MAX_PERIOD_DAYS {
        return Err(AppError::validation(format!(
            "請求周期は{MAX_PERIOD_DAYS}日以内で入力してください"
        )));
    }
    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// 現在時刻を指定タイムゾーンで取得
pub fn now_in(timezone: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&timezone)
}

/// 現在の日時を指定タイムゾーンのRFC3339文字列で取得
pub fn current_timestamp(timezone: Tz) -> String {
    now_in(timezone).to_rfc3339()
}

/// 今日の日付をYYYY-MM-DD形式で取得（指定タイムゾーン基準）
pub fn today_in(timezone: Tz) -> String {
    now_in(timezone).format("%Y-%m-%d").to_string()
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 金額を小数点以下2桁でフォーマット
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
