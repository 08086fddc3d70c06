use super::{types::Deadline, util, AllocationResult, AssignOptions, Assignment, PlanError};
use crate::model::{Doctor, DoctorId, LocationId, Shift};
use crate::store::{ConflictChecker, HolidayIndex, ShiftSink};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Passe unique, premier médecin valide dans l'ordre de la liste.
///
/// Une journée sans candidat est notée dans `unstaffed` puis ignorée : pas de
/// retour arrière. Une erreur de persistance interrompt la boucle et les
/// gardes déjà créées restent en place.
pub(super) fn allocate<S>(
    store: &S,
    doctors: &[Doctor],
    location: &LocationId,
    start: NaiveDate,
    end: NaiveDate,
    opts: AssignOptions,
    deadline: Deadline,
) -> Result<AllocationResult, PlanError>
where
    S: HolidayIndex + ConflictChecker + ShiftSink + ?Sized,
{
    if start > end {
        return Err(PlanError::InvalidRange { start, end });
    }
    if doctors.is_empty() {
        return Err(PlanError::NoEligibleDoctors(location.clone()));
    }

    let mut holidays: HashMap<&DoctorId, HashSet<NaiveDate>> = HashMap::new();
    for doctor in doctors {
        deadline.check()?;
        let dates = store.holidays(&doctor.id)?;
        holidays.entry(&doctor.id).or_default().extend(dates);
    }

    #[cfg(feature = "logging")]
    tracing::info!(
        location = location.as_str(),
        %start,
        %end,
        doctors = doctors.len(),
        "allocation started"
    );

    let mut taken: HashMap<&DoctorId, u32> = HashMap::new();
    let mut result = AllocationResult {
        location: Some(location.clone()),
        ..AllocationResult::default()
    };

    for date in util::days(start, end) {
        let mut chosen: Option<&Doctor> = None;

        for doctor in doctors {
            if holidays
                .get(&doctor.id)
                .is_some_and(|days| days.contains(&date))
            {
                continue;
            }
            if taken.get(&doctor.id).copied().unwrap_or(0) >= doctor.shift_quota {
                continue;
            }
            deadline.check()?;
            if store.is_assigned(&doctor.id, date)? {
                continue;
            }
            chosen = Some(doctor);
            break;
        }

        let Some(doctor) = chosen else {
            #[cfg(feature = "logging")]
            tracing::warn!(location = location.as_str(), %date, "no doctor available");
            result.unstaffed.push(date);
            continue;
        };

        *taken.entry(&doctor.id).or_insert(0) += 1;

        deadline.check()?;
        let shift = Shift::new(
            doctor.id.clone(),
            location.clone(),
            date,
            opts.shift_start,
            opts.shift_end,
        );
        let shift_id = store.create_shift(shift)?;
        result.assignments.push(Assignment {
            date,
            doctor: doctor.id.clone(),
            shift: shift_id,
        });
    }

    #[cfg(feature = "logging")]
    tracing::info!(
        location = location.as_str(),
        staffed = result.assignments.len(),
        unstaffed = result.unstaffed.len(),
        "allocation finished"
    );

    Ok(result)
}
