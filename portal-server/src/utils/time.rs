//! Calendar-month helpers for stay validation and pricing
//!
//! Stays are measured in calendar months, not fixed 30-day blocks: a
//! check-in on Jan 31 plus one month lands on Feb 28/29 per chrono's
//! end-of-month clamping.

use chrono::{Months, NaiveDate};

/// Whether `check_out` is at least `min_months` calendar months after
/// `check_in`
pub fn min_stay_satisfied(check_in: NaiveDate, check_out: NaiveDate, min_months: u32) -> bool {
    match check_in.checked_add_months(Months::new(min_months)) {
        Some(min_out) => check_out >= min_out,
        None => false,
    }
}

/// Billed months for a stay: the smallest `n` with
/// `check_in + n months >= check_out`, so a started month bills in full.
///
/// Callers must have validated `check_out > check_in` first.
pub fn billed_months(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
    let mut months = 0u32;
    loop {
        let Some(cursor) = check_in.checked_add_months(Months::new(months)) else {
            return months;
        };
        if cursor >= check_out {
            return months;
        }
        months += 1;
    }
}
