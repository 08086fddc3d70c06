use super::PlanError;
use crate::model::{MonthKey, Shift, ShiftId};
use chrono::NaiveDate;

/// Jours de `[start, end)`, par ordre croissant.
pub(super) fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d < end)
}

pub(super) fn month_bounds(key: &MonthKey) -> Result<(NaiveDate, NaiveDate), PlanError> {
    key.bounds().ok_or(PlanError::InvalidMonth {
        year: key.year,
        month: key.month,
    })
}

/// `2025-03-01, 2025-03-04`
pub fn join_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn find_shift_index(shifts: &[Shift], shift_id: &ShiftId) -> Option<usize> {
    shifts.iter().position(|s| &s.id == shift_id)
}
