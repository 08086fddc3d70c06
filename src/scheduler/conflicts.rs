use super::{Conflict, ConflictKind};
use crate::model::{Clinic, LocationId, Shift};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Audit du planning : doubles gardes, gardes posées sur un congé, quotas dépassés.
pub fn detect_conflicts(clinic: &Clinic) -> Vec<Conflict> {
    let mut out = Vec::new();

    for doctor in clinic.doctors.iter() {
        let mut shifts: Vec<&Shift> = clinic
            .shifts
            .iter()
            .filter(|s| s.doctor == doctor.id)
            .collect();
        shifts.sort_by_key(|s| s.date);

        for same_day in shifts.chunk_by(|a, b| a.date == b.date) {
            if same_day.len() > 1 {
                out.push(Conflict {
                    doctor: doctor.id.clone(),
                    date: same_day[0].date,
                    shifts: same_day.iter().map(|s| s.id.clone()).collect(),
                    kind: ConflictKind::DoubleBooking,
                });
            }
        }

        for shift in shifts.iter().filter(|s| clinic.is_on_holiday(&doctor.id, s.date)) {
            out.push(Conflict {
                doctor: doctor.id.clone(),
                date: shift.date,
                shifts: vec![shift.id.clone()],
                kind: ConflictKind::HolidayViolation,
            });
        }

        let mut per_month: BTreeMap<(&LocationId, i32, u32), Vec<&Shift>> = BTreeMap::new();
        for shift in shifts.iter().copied() {
            per_month
                .entry((&shift.location, shift.date.year(), shift.date.month()))
                .or_default()
                .push(shift);
        }
        let quota = usize::try_from(doctor.shift_quota).unwrap_or(usize::MAX);
        for month in per_month.values() {
            if let Some(first_over) = month.get(quota) {
                out.push(Conflict {
                    doctor: doctor.id.clone(),
                    date: first_over.date,
                    shifts: month[quota..].iter().map(|s| s.id.clone()).collect(),
                    kind: ConflictKind::QuotaExceeded,
                });
            }
        }
    }

    out
}
