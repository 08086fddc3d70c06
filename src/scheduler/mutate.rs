use super::{util, PlanError};
use crate::model::{Clinic, DoctorId, Shift, ShiftId};
use chrono::NaiveDate;

impl Clinic {
    /// Saisie manuelle d'une garde ; refuse une seconde garde le même jour pour le même médecin.
    pub fn add_shift(&mut self, shift: Shift) -> Result<ShiftId, PlanError> {
        if self.find_doctor_by_id(&shift.doctor).is_none() {
            return Err(PlanError::UnknownDoctor(shift.doctor.as_str().to_string()));
        }
        if self.is_assigned(&shift.doctor, shift.date) {
            return Err(PlanError::AlreadyAssigned {
                doctor: shift.doctor.as_str().to_string(),
                date: shift.date,
            });
        }
        let id = shift.id.clone();
        self.shifts.push(shift);
        Ok(id)
    }

    pub fn remove_shift(&mut self, shift_id: &ShiftId) -> Result<Shift, PlanError> {
        let Some(pos) = util::find_shift_index(&self.shifts, shift_id) else {
            return Err(PlanError::UnknownShift(shift_id.as_str().to_string()));
        };
        Ok(self.shifts.remove(pos))
    }

    /// Vrai si `doctor` tient une garde à `date` autre que `except`.
    fn holds_other_shift(&self, doctor: &DoctorId, date: NaiveDate, except: &ShiftId) -> bool {
        self.shifts
            .iter()
            .any(|s| &s.doctor == doctor && s.date == date && &s.id != except)
    }
}

/// Échange les médecins de deux gardes du même site.
pub fn swap_shifts(clinic: &mut Clinic, a: &ShiftId, b: &ShiftId) -> Result<(), PlanError> {
    let Some(pos_a) = util::find_shift_index(&clinic.shifts, a) else {
        return Err(PlanError::UnknownShift(a.as_str().to_string()));
    };
    let Some(pos_b) = util::find_shift_index(&clinic.shifts, b) else {
        return Err(PlanError::UnknownShift(b.as_str().to_string()));
    };

    let (shift_a, shift_b) = (&clinic.shifts[pos_a], &clinic.shifts[pos_b]);
    if shift_a.doctor == shift_b.doctor {
        return Err(PlanError::SwapInvalid("both shifts held by the same doctor"));
    }
    if shift_a.location != shift_b.location {
        return Err(PlanError::SwapInvalid("shifts belong to different locations"));
    }

    for (doctor, target) in [(&shift_a.doctor, shift_b), (&shift_b.doctor, shift_a)] {
        if clinic.is_on_holiday(doctor, target.date) {
            return Err(PlanError::SwapInvalid("doctor on holiday that day"));
        }
        // la garde rendue par ce médecin ne compte pas
        let given_up = if target.id == shift_a.id { &shift_b.id } else { &shift_a.id };
        if clinic.holds_other_shift(doctor, target.date, given_up) {
            return Err(PlanError::SwapInvalid("introduces double booking"));
        }
    }

    let doctor_a = clinic.shifts[pos_a].doctor.clone();
    let doctor_b = std::mem::replace(&mut clinic.shifts[pos_b].doctor, doctor_a);
    clinic.shifts[pos_a].doctor = doctor_b;

    #[cfg(feature = "logging")]
    tracing::info!(shift_a = a.as_str(), shift_b = b.as_str(), "shifts swapped");

    Ok(())
}

/// Confie une garde à un autre médecin rattaché au même site.
pub fn reassign_shift(clinic: &mut Clinic, shift_id: &ShiftId, doctor: &DoctorId) -> Result<(), PlanError> {
    let Some(pos) = util::find_shift_index(&clinic.shifts, shift_id) else {
        return Err(PlanError::UnknownShift(shift_id.as_str().to_string()));
    };
    let target = clinic
        .find_doctor_by_id(doctor)
        .ok_or_else(|| PlanError::UnknownDoctor(doctor.as_str().to_string()))?;

    let shift = &clinic.shifts[pos];
    if &shift.doctor == doctor {
        return Ok(());
    }
    if !target.works_at(&shift.location) {
        return Err(PlanError::ReassignInvalid("doctor not attached to the shift location"));
    }
    if clinic.is_on_holiday(doctor, shift.date) {
        return Err(PlanError::ReassignInvalid("doctor on holiday that day"));
    }
    if clinic.holds_other_shift(doctor, shift.date, shift_id) {
        return Err(PlanError::ReassignInvalid("doctor already holds a shift that day"));
    }

    clinic.shifts[pos].doctor = doctor.clone();
    Ok(())
}
