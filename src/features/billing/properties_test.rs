/// 請求計算エンジンの性質テスト
///
/// quickcheckで生成した入力に対し、単純な1周期ずつの走査結果や
/// 代数的な性質と一致することを確認する。
use super::*;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

struct Plan {
    id: String,
    start: String,
    period: i64,
    amount: f64,
}

impl Billable for Plan {
    fn billing_id(&self) -> &str {
        &self.id
    }
    fn billing_title(&self) -> &str {
        &self.id
    }
    fn billing_amount(&self) -> f64 {
        self.amount
    }
    fn billing_start(&self) -> &str {
        &self.start
    }
    fn billing_period(&self) -> i64 {
        self.period
    }
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn plan(start: NaiveDate, period: i64, amount: f64) -> Plan {
    Plan {
        id: format!("{start}/{period}"),
        start: start.format("%Y-%m-%d").to_string(),
        period,
        amount,
    }
}

/// 開始日から1周期ずつ進める素朴な判定
fn naive_scan(start: NaiveDate, period: i64, window: &MonthWindow) -> bool {
    let mut cursor = start;
    while cursor < window.end_exclusive() {
        if cursor >= window.start() {
            return true;
        }
        cursor += Duration::days(period);
    }
    false
}

#[quickcheck]
fn occurs_in_month_matches_naive_scan(start_offset: u16, period: u16, month_offset: u8) -> bool {
    let start = base_date() + Duration::days(i64::from(start_offset % 4000));
    let period = i64::from(period % 400) + 1;
    let window =
        MonthWindow::containing(base_date() + Duration::days(i64::from(month_offset) * 31))
            .unwrap();

    let sub = plan(start, period, 1.0);
    let actual = occurs_in_month(&sub, window.start(), window.end_exclusive()).unwrap();

    actual == naive_scan(start, period, &window)
}

#[quickcheck]
fn occurs_in_month_is_idempotent(start_offset: u16, period: u16, month_offset: u8) -> bool {
    let start = base_date() + Duration::days(i64::from(start_offset));
    let sub = plan(start, i64::from(period) + 1, 1.0);
    let window =
        MonthWindow::containing(base_date() + Duration::days(i64::from(month_offset) * 31))
            .unwrap();

    let first = occurs_in_month(&sub, window.start(), window.end_exclusive());
    let second = occurs_in_month(&sub, window.start(), window.end_exclusive());
    first == second
}

#[quickcheck]
fn days_until_next_payment_is_zero_on_boundary(start_offset: u16, period: u16) -> bool {
    let start = base_date() + Duration::days(i64::from(start_offset));
    let period = i64::from(period) + 1;
    let sub = plan(start, period, 1.0);

    let boundary = (start + Duration::days(period)).and_hms_opt(0, 0, 0).unwrap();
    let now = Utc.from_utc_datetime(&boundary);

    days_until_next_payment(&sub, &now) == Ok(0)
}

#[quickcheck]
fn non_positive_period_is_rejected(period: u32, month_offset: u8) -> bool {
    let period = -i64::from(period);
    let sub = plan(base_date(), period, 1.0);
    let window =
        MonthWindow::containing(base_date() + Duration::days(i64::from(month_offset) * 31))
            .unwrap();

    occurs_in_month(&sub, window.start(), window.end_exclusive())
        == Err(BillingError::InvalidPeriod { period })
}

#[quickcheck]
fn aggregate_ignores_input_order(entries: Vec<(u16, u16, u16)>) -> TestResult {
    if entries.len() > 50 {
        return TestResult::discard();
    }

    let mut subs: Vec<Plan> = entries
        .iter()
        .map(|(offset, period, cents)| {
            plan(
                base_date() + Duration::days(i64::from(*offset % 2000)),
                i64::from(*period % 90) + 1,
                f64::from(*cents) / 100.0 + 0.01,
            )
        })
        .collect();
    let window = MonthWindow::new(2022, 6).unwrap();

    let forward = aggregate_monthly_spend(&subs, window.start(), window.end_exclusive()).unwrap();
    subs.reverse();
    let backward = aggregate_monthly_spend(&subs, window.start(), window.end_exclusive()).unwrap();

    TestResult::from_bool((forward - backward).abs() < 1e-6)
}

#[quickcheck]
fn aggregate_equals_breakdown_sum(entries: Vec<(u16, u16)>) -> bool {
    let subs: Vec<Plan> = entries
        .iter()
        .map(|(offset, period)| {
            plan(
                base_date() + Duration::days(i64::from(*offset % 2000)),
                i64::from(*period % 90) + 1,
                f64::from(*period) + 1.0,
            )
        })
        .collect();
    let window = MonthWindow::new(2021, 2).unwrap();

    let charges = monthly_breakdown(&subs, window.start(), window.end_exclusive()).unwrap();
    let total = aggregate_monthly_spend(&subs, window.start(), window.end_exclusive()).unwrap();

    let expected = charges.iter().fold(0.0, |acc, charge| acc + charge.amount);
    charges.len() <= subs.len() && (total - expected).abs() < 1e-9
}

#[test]
fn aggregate_of_nothing_is_zero_for_every_month() {
    let subs: Vec<Plan> = Vec::new();
    for month in 1..=12 {
        let window = MonthWindow::new(2024, month).unwrap();
        assert_eq!(
            aggregate_monthly_spend(&subs, window.start(), window.end_exclusive()).unwrap(),
            0.0
        );
    }
}
