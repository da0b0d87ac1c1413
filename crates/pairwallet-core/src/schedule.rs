//! Calendar arithmetic for subscription and debt schedules
//!
//! Month and year steps clamp to the last day of the target month. The
//! original day-of-month is kept in an anchor so a schedule that started on
//! the 31st returns to the 31st after a short month, and so stepping forward
//! then back is the identity.

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::BillingPeriod;

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Shift by whole months, landing on `anchor_day` or the month's last day
pub fn shift_months(date: NaiveDate, months: i32, anchor_day: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = anchor_day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Shift `date` by `steps` billing periods (negative steps go back).
///
/// `anchor_day` is filled from `date` on first use for month-based periods.
pub fn shift(
    date: NaiveDate,
    period: BillingPeriod,
    steps: i32,
    anchor_day: &mut Option<u32>,
) -> NaiveDate {
    match period {
        BillingPeriod::Weekly => date + Duration::days(7 * steps as i64),
        BillingPeriod::Monthly => {
            let day = *anchor_day.get_or_insert(date.day());
            shift_months(date, steps, day)
        }
        BillingPeriod::Yearly => {
            let day = *anchor_day.get_or_insert(date.day());
            shift_months(date, 12 * steps, day)
        }
    }
}

/// One period forward
pub fn advance(date: NaiveDate, period: BillingPeriod, anchor_day: &mut Option<u32>) -> NaiveDate {
    shift(date, period, 1, anchor_day)
}

/// One period back, the exact inverse of [`advance`]
pub fn regress(date: NaiveDate, period: BillingPeriod, anchor_day: &mut Option<u32>) -> NaiveDate {
    shift(date, period, -1, anchor_day)
}
