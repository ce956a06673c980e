//! Next-recurrence calculation
//!
//! Recurrence is computed from the stored due date on demand; recording a
//! payment never moves the due date itself.

use chrono::{Days, Months, NaiveDate};

use super::frequency::Frequency;

impl Frequency {
    /// Advance a date by exactly one period of this cadence.
    ///
    /// Month and year steps are calendar-aware and clamp the day of month
    /// (Jan 31 + 1 month = Feb 28/29). Returns `None` only when the result
    /// falls outside chrono's supported date range.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => date.checked_add_days(Days::new(1)),
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::Monthly => date.checked_add_months(Months::new(1)),
            Self::Quarterly => date.checked_add_months(Months::new(3)),
            Self::Yearly => date.checked_add_months(Months::new(12)),
        }
    }
}

/// Next relevant due date for an expense.
///
/// A due date strictly after `today` is returned unchanged. Otherwise the due
/// date moves forward by one period of `frequency`. There is no error path:
/// if the step would overflow the calendar the due date is returned as is.
pub fn next_recurrence(due_date: NaiveDate, frequency: Frequency, today: NaiveDate) -> NaiveDate {
    if due_date > today {
        return due_date;
    }
    frequency.advance(due_date).unwrap_or(due_date)
}

/// Same as [`next_recurrence`] for a raw frequency code.
///
/// Codes that match no cadence leave the due date unchanged.
pub fn next_recurrence_for_code(due_date: NaiveDate, code: &str, today: NaiveDate) -> NaiveDate {
    match code.parse::<Frequency>() {
        Ok(frequency) => next_recurrence(due_date, frequency, today),
        Err(_) => due_date,
    }
}
