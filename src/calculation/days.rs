//! Commercial-calendar day counting.
//!
//! Colombian payroll counts every month as 30 days and every year as 360
//! (CST art. 134 and the practice built on it). A full month always pays 30
//! days, a second fortnight always pays 15, and annual benefits divide by 360.
//!
//! ## Rules
//!
//! - Day 31 counts as day 30.
//! - The last day of February counts as day 30, both as the start and as
//!   the end of a range.
//! - Ranges are inclusive of both ends.

use chrono::{Datelike, NaiveDate};

use crate::models::Contract;

/// Number of commercial days in the inclusive range `start..=end`.
///
/// Returns 0 when `end` is before `start`.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::days360;
/// use chrono::NaiveDate;
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
///
/// assert_eq!(days360(d(2025, 1, 1), d(2025, 1, 31)), 30);
/// assert_eq!(days360(d(2025, 2, 1), d(2025, 2, 28)), 30);
/// assert_eq!(days360(d(2025, 3, 16), d(2025, 3, 31)), 15);
/// assert_eq!(days360(d(2025, 1, 1), d(2025, 12, 31)), 360);
/// ```
pub fn days360(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let d1 = commercial_day(start);
    let d2 = commercial_day(end);

    let days = (end.year() - start.year()) as i64 * 360
        + (end.month() as i64 - start.month() as i64) * 30
        + (d2 - d1)
        + 1;

    days.max(0) as u32
}

/// Commercial days of `start..=end` covered by the contract.
pub fn days_in_range(contract: &Contract, start: NaiveDate, end: NaiveDate) -> u32 {
    let from = start.max(contract.start_date);
    let to = match contract.end_date {
        Some(contract_end) => end.min(contract_end),
        None => end,
    };
    days360(from, to)
}

/// First day of the half-year containing `date` (January 1 or July 1).
pub fn semester_start(date: NaiveDate) -> NaiveDate {
    let month = if date.month() <= 6 { 1 } else { 7 };
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// January 1 of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn commercial_day(date: NaiveDate) -> i64 {
    if is_last_day_of_february(date) {
        30
    } else {
        date.day().min(30) as i64
    }
}

fn is_last_day_of_february(date: NaiveDate) -> bool {
    date.month() == 2 && date.succ_opt().is_some_and(|next| next.month() == 3)
}
