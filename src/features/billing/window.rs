use super::errors::BillingError;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// 暦月の期間 `[月初, 翌月初)`
///
/// 月は1始まり（1 = 1月）で指定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthWindow {
    start: NaiveDate,
    end_exclusive: NaiveDate,
}

impl MonthWindow {
    /// 年と月から期間を作成する
    ///
    /// # 引数
    /// * `year` - 年
    /// * `month` - 月（1〜12）
    ///
    /// # 戻り値
    /// 月の期間、または月が範囲外の場合は `InvalidMonth`
    pub fn new(year: i32, month: u32) -> Result<Self, BillingError> {
        let invalid = || BillingError::invalid_month(format!("{year:04}-{month:02}"));

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1).ok_or_else(invalid)?, 1)
        } else {
            (year, month + 1)
        };
        let end_exclusive = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

        Ok(Self {
            start,
            end_exclusive,
        })
    }

    /// 指定日を含む月の期間を作成する
    pub fn containing(date: NaiveDate) -> Result<Self, BillingError> {
        Self::new(date.year(), date.month())
    }

    /// "YYYY-MM" 形式の文字列から期間を作成する
    pub fn parse(raw: &str) -> Result<Self, BillingError> {
        let trimmed = raw.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| BillingError::invalid_month(trimmed))?;

        let year: i32 = year
            .parse()
            .map_err(|_| BillingError::invalid_month(trimmed))?;
        let month: u32 = month
            .parse()
            .map_err(|_| BillingError::invalid_month(trimmed))?;

        Self::new(year, month)
    }

    /// 月初日
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// 翌月初日（期間に含まれない）
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end_exclusive
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end_exclusive
    }

    /// 月の日数
    pub fn days(&self) -> i64 {
        self.end_exclusive.signed_duration_since(self.start).num_days()
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.start.year(), self.start.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_window() {
        let window = MonthWindow::new(2024, 3).unwrap();
        assert_eq!(window.start(), date(2024, 3, 1));
        assert_eq!(window.end_exclusive(), date(2024, 4, 1));
        assert_eq!(window.days(), 31);
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let window = MonthWindow::new(2023, 12).unwrap();
        assert_eq!(window.end_exclusive(), date(2024, 1, 1));
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(MonthWindow::new(2024, 2).unwrap().days(), 29);
        assert_eq!(MonthWindow::new(2023, 2).unwrap().days(), 28);
    }

    #[test]
    fn test_invalid_month() {
        assert!(matches!(
            MonthWindow::new(2024, 0),
            Err(BillingError::InvalidMonth { .. })
        ));
        assert!(matches!(
            MonthWindow::new(2024, 13),
            Err(BillingError::InvalidMonth { .. })
        ));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            MonthWindow::parse("2024-03").unwrap(),
            MonthWindow::new(2024, 3).unwrap()
        );
        assert_eq!(
            MonthWindow::parse(" 2024-3 ").unwrap(),
            MonthWindow::new(2024, 3).unwrap()
        );
        assert!(MonthWindow::parse("2024/03").is_err());
        assert!(MonthWindow::parse("2024-xx").is_err());
        assert!(MonthWindow::parse("").is_err());
    }

    #[test]
    fn test_contains_is_half_open() {
        let window = MonthWindow::containing(date(2024, 3, 15)).unwrap();
        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 31)));
        assert!(!window.contains(date(2024, 4, 1)));
        assert!(!window.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_display() {
        assert_eq!(MonthWindow::new(2024, 3).unwrap().to_string(), "2024-03");
    }
}
