//! Time window resolver — calendar and trailing boundaries for reports.
//!
//! All windows are inclusive at both ends. Calendar windows run from
//! 00:00:00 on the first day to 23:59:59 on the last day.

use crate::error::{ReportError, ReportResult};
use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Span between start and end of a valid daily-curve request.
pub const DAILY_RANGE_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end:   NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Trailing seven days ending at `now`. Not calendar-aligned.
pub fn week_window(now: NaiveDateTime) -> TimeWindow {
    TimeWindow::new(now - Duration::days(7), now)
}

/// Trailing one month ending at `now`.
pub fn trailing_month_window(now: NaiveDateTime) -> TimeWindow {
    TimeWindow::new(now - Months::new(1), now)
}

/// Trailing one year ending at `now`.
pub fn year_trailing_window(now: NaiveDateTime) -> TimeWindow {
    TimeWindow::new(now - Months::new(12), now)
}

/// The calendar month containing `reference`.
pub fn month_window(reference: NaiveDate) -> TimeWindow {
    let first = reference - Days::new(u64::from(reference.day0()));
    let last = first + Months::new(1) - Days::new(1);
    TimeWindow::new(start_of_day(first), end_of_day(last))
}

/// The calendar month before the one containing `reference`.
/// Day-of-month clamps, so March 31st resolves to February.
pub fn previous_month_window(reference: NaiveDate) -> TimeWindow {
    month_window(reference - Months::new(1))
}

/// A single day, 00:00:00 to 23:59:59.
pub fn day_window(date: NaiveDate) -> TimeWindow {
    TimeWindow::new(start_of_day(date), end_of_day(date))
}

/// Accept only `end == start + 7 days`; anything else is rejected, never corrected.
pub fn validate_daily_range(start: NaiveDate, end: NaiveDate) -> ReportResult<()> {
    match start.checked_add_days(Days::new(DAILY_RANGE_DAYS)) {
        Some(expected) if expected == end => Ok(()),
        _ => Err(ReportError::InvalidDateRange { start, end }),
    }
}

/// The eight dates `start..=start+7` of a validated daily range.
pub fn daily_range(start: NaiveDate, end: NaiveDate) -> ReportResult<Vec<NaiveDate>> {
    validate_daily_range(start, end)?;
    Ok(start.iter_days().take(DAILY_RANGE_DAYS as usize + 1).collect())
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(LAST_SECOND_OF_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn week_window_is_trailing_seven_days() {
        let now = at(2024, 3, 13, 15, 30, 0);
        let w = week_window(now);
        assert_eq!(w.start, at(2024, 3, 6, 15, 30, 0));
        assert_eq!(w.end, now);
    }

    #[test]
    fn month_window_covers_whole_calendar_month() {
        let w = month_window(date(2024, 2, 17));
        assert_eq!(w.start, at(2024, 2, 1, 0, 0, 0));
        assert_eq!(w.end, at(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn previous_month_window_crosses_year_boundary() {
        let w = previous_month_window(date(2025, 1, 31));
        assert_eq!(w.start, at(2024, 12, 1, 0, 0, 0));
        assert_eq!(w.end, at(2024, 12, 31, 23, 59, 59));
    }

    #[test]
    fn previous_month_window_clamps_day_of_month() {
        let w = previous_month_window(date(2024, 3, 31));
        assert_eq!(w.start, at(2024, 2, 1, 0, 0, 0));
        assert_eq!(w.end, at(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn year_window_is_trailing() {
        let now = at(2024, 6, 1, 8, 0, 0);
        let w = year_trailing_window(now);
        assert_eq!(w.start, at(2023, 6, 1, 8, 0, 0));
        assert_eq!(w.end, now);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = day_window(date(2024, 5, 5));
        assert!(w.contains(at(2024, 5, 5, 0, 0, 0)));
        assert!(w.contains(at(2024, 5, 5, 23, 59, 59)));
        assert!(!w.contains(at(2024, 5, 6, 0, 0, 0)));
    }

    #[test]
    fn daily_range_requires_exactly_seven_day_span() {
        let d = date(2024, 5, 1);
        let days = daily_range(d, date(2024, 5, 8)).unwrap();
        assert_eq!(days.len(), 8);
        assert_eq!(days.first(), Some(&d));
        assert_eq!(days.last(), Some(&date(2024, 5, 8)));

        assert!(matches!(
            validate_daily_range(d, date(2024, 5, 7)),
            Err(ReportError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            validate_daily_range(d, date(2024, 5, 9)),
            Err(ReportError::InvalidDateRange { .. })
        ));
    }
}
