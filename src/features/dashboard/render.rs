use super::models::{DashboardSnapshot, SubscriptionRow};
use crate::shared::errors::AppResult;
use crate::shared::utils::format_amount;
use std::io::Write;

const TITLE_WIDTH: usize = 24;

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

fn days_label(row: &SubscriptionRow) -> String {
    match (&row.error, row.days_left) {
        (Some(message), _) => format!("エラー: {message}"),
        (None, Some(days)) if row.due_soon => format!("{days}日 (まもなく)"),
        (None, Some(days)) => format!("{days}日"),
        (None, None) => "-".to_string(),
    }
}

/// サブスクリプション一覧を表形式で出力する
pub fn render_rows<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> AppResult<()> {
    let currency = &snapshot.currency.source;

    if snapshot.rows.is_empty() {
        writeln!(out, "サブスクリプションはまだ登録されていません")?;
        return Ok(());
    }

    writeln!(
        out,
        "{} {} {:>12} {:>6}  {}",
        pad("ID", 21),
        pad("サービス名", TITLE_WIDTH),
        "金額",
        "周期",
        "次回支払い"
    )?;
    for row in &snapshot.rows {
        writeln!(
            out,
            "{} {} {:>12} {:>6}  {}",
            pad(&row.id, 21),
            pad(&row.title, TITLE_WIDTH),
            format!("{} {currency}", format_amount(row.amount)),
            format!("{}日", row.period),
            days_label(row)
        )?;
    }
    Ok(())
}

/// 合計と当月内訳を出力する
pub fn render_summary<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> AppResult<()> {
    let pair = &snapshot.currency;

    writeln!(
        out,
        "合計: {} {} / {} {} ({})",
        format_amount(snapshot.total),
        pair.source,
        format_amount(snapshot.converted_total),
        pair.target,
        pair.rate_label()
    )?;
    writeln!(out)?;
    writeln!(out, "{} の支出内訳", snapshot.month.label)?;

    if snapshot.month.slices.is_empty() {
        writeln!(out, "  この月に発生する支払いはありません")?;
    }
    for slice in &snapshot.month.slices {
        writeln!(
            out,
            "  {} {:>12} {:>6.1}%",
            pad(&slice.title, TITLE_WIDTH),
            format!("{} {}", format_amount(slice.amount), pair.source),
            slice.share_percent
        )?;
    }
    writeln!(
        out,
        "月合計: {} {} / {} {}",
        format_amount(snapshot.month.total),
        pair.source,
        format_amount(snapshot.month.converted_total),
        pair.target
    )?;

    let errors = snapshot.error_count();
    if errors > 0 {
        writeln!(out, "※ {errors}件のサブスクリプションは計算できませんでした")?;
    }
    Ok(())
}

/// ダッシュボード全体を出力する
pub fn render_dashboard<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> AppResult<()> {
    render_rows(out, snapshot)?;
    writeln!(out)?;
    render_summary(out, snapshot)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dashboard::service::build_snapshot;
    use crate::features::subscriptions::Subscription;
    use crate::shared::config::BillingSettings;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn subscription(id: &str, title: &str, amount: f64, start_date: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            title: title.to_string(),
            amount,
            start_date: start_date.to_string(),
            period: 30,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn render(subscriptions: &[Subscription]) -> String {
        let now = Tz::UTC.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let snapshot =
            build_snapshot(subscriptions, &now, &BillingSettings::default(), None).unwrap();
        let mut out = Vec::new();
        render_dashboard(&mut out, &snapshot).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_dashboard() {
        let text = render(&[
            subscription("n", "Netflix", 10.0, "2024-03-01"),
            subscription("s", "Spotify", 5.0, "2024-03-10"),
        ]);

        assert!(text.contains("Netflix"));
        assert!(text.contains("10.00 USD"));
        assert!(text.contains("26日"));
        assert!(text.contains("合計: 15.00 USD / 1350.00 RUB (90 USD/RUB)"));
        assert!(text.contains("2024-03 の支出内訳"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("月合計: 15.00 USD / 1350.00 RUB"));
    }

    #[test]
    fn test_render_due_soon_and_errors() {
        let text = render(&[
            subscription("soon", "Soon", 3.0, "2024-02-10"),
            subscription("bad", "Broken", 3.0, "yesterday"),
        ]);

        assert!(text.contains("6日 (まもなく)"));
        assert!(text.contains("エラー: 開始日はYYYY-MM-DD形式で入力してください"));
        assert!(text.contains("※ 1件のサブスクリプションは計算できませんでした"));
    }

    #[test]
    fn test_render_empty() {
        let text = render(&[]);

        assert!(text.contains("サブスクリプションはまだ登録されていません"));
        assert!(text.contains("この月に発生する支払いはありません"));
        assert!(text.contains("合計: 0.00 USD / 0.00 RUB"));
    }
}
