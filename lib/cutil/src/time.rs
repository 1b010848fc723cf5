//! Time and date utilities for formatting and picking random calendar dates.

use chrono::{Days, Local, NaiveDate};
use rand::Rng;

/// Date format used by the photo search API (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats the current local time according to the specified format string.
///
/// The format string follows the same syntax as `chrono::format::strftime`.
///
/// # Examples
///
/// ```
/// use cutil::time::local_now;
///
/// let formatted = local_now("%Y-%m-%d %H:%M:%S");
/// println!("Current time: {}", formatted);
/// ```
pub fn local_now(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// Gets today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a date as "YYYY-MM-DD".
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Picks a calendar date uniformly at random in `[start, end]`.
///
/// Both ends are inclusive. If `end` is before `start`, `start` is returned.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use cutil::time::random_date;
///
/// let start = NaiveDate::from_ymd_opt(2004, 2, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2004, 2, 29).unwrap();
/// let date = random_date(&mut rand::rng(), start, end);
/// assert!(date >= start && date <= end);
/// ```
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }

    let offset = rng.random_range(0..=span) as u64;
    start.checked_add_days(Days::new(offset)).unwrap_or(end)
}
