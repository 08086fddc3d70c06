//! Collaborateurs de l'allocation : éligibilité, congés, conflits, gardes,
//! statuts mensuels. `MemoryStore` les implémente tous sur un `Clinic`.

use crate::model::{Clinic, Doctor, DoctorId, LocationId, MonthKey, MonthStatus, Shift, ShiftId};
use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};

/// Échec de la couche de persistance.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Médecins autorisés à prendre des gardes sur un site, avec leur quota.
pub trait EligibilityProvider: Send + Sync {
    fn eligible_doctors(&self, location: &LocationId) -> Result<Vec<Doctor>, StoreError>;
}

/// Jours d'indisponibilité d'un médecin.
pub trait HolidayIndex: Send + Sync {
    fn holidays(&self, doctor: &DoctorId) -> Result<Vec<NaiveDate>, StoreError>;
}

/// Le médecin tient-il déjà une garde ce jour-là ?
pub trait ConflictChecker: Send + Sync {
    fn is_assigned(&self, doctor: &DoctorId, date: NaiveDate) -> Result<bool, StoreError>;
}

pub trait ShiftSink: Send + Sync {
    fn create_shift(&self, shift: Shift) -> Result<ShiftId, StoreError>;
    /// Supprime toutes les gardes du mois ; retourne le nombre supprimé.
    fn delete_shifts_in_month(&self, key: &MonthKey) -> Result<usize, StoreError>;
}

pub trait MonthStatusStore: Send + Sync {
    fn get_status(&self, key: &MonthKey) -> Result<Option<MonthStatus>, StoreError>;
    /// Crée la ligne ; `Conflict` si elle existe déjà.
    fn insert_status(&self, status: MonthStatus) -> Result<(), StoreError>;
    /// Met à jour le drapeau ; `NotFound` si la ligne n'existe pas.
    fn set_done(&self, key: &MonthKey, done: bool) -> Result<(), StoreError>;
}

/// Ensemble des collaborateurs dont a besoin le `Scheduler`.
pub trait ClinicStore:
    EligibilityProvider + HolidayIndex + ConflictChecker + ShiftSink + MonthStatusStore
{
}

impl<T> ClinicStore for T where
    T: EligibilityProvider + HolidayIndex + ConflictChecker + ShiftSink + MonthStatusStore
{
}

/// Magasin en mémoire, injecté explicitement et vivant le temps de son propriétaire.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clinic: Mutex<Clinic>,
}

impl MemoryStore {
    pub fn new(clinic: Clinic) -> Self {
        Self {
            clinic: Mutex::new(clinic),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Clinic>, StoreError> {
        self.clinic
            .lock()
            .map_err(|_| StoreError::Unavailable("clinic store lock poisoned".to_string()))
    }

    /// Copie de l'état courant.
    pub fn snapshot(&self) -> Result<Clinic, StoreError> {
        Ok(self.guard()?.clone())
    }

    pub fn into_clinic(self) -> Result<Clinic, StoreError> {
        self.clinic
            .into_inner()
            .map_err(|_| StoreError::Unavailable("clinic store lock poisoned".to_string()))
    }
}

impl EligibilityProvider for MemoryStore {
    fn eligible_doctors(&self, location: &LocationId) -> Result<Vec<Doctor>, StoreError> {
        Ok(self.guard()?.doctors_at(location))
    }
}

impl HolidayIndex for MemoryStore {
    fn holidays(&self, doctor: &DoctorId) -> Result<Vec<NaiveDate>, StoreError> {
        Ok(self.guard()?.holidays_of(doctor))
    }
}

impl ConflictChecker for MemoryStore {
    fn is_assigned(&self, doctor: &DoctorId, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self.guard()?.is_assigned(doctor, date))
    }
}

impl ShiftSink for MemoryStore {
    fn create_shift(&self, shift: Shift) -> Result<ShiftId, StoreError> {
        let mut clinic = self.guard()?;
        if clinic.shifts.iter().any(|s| s.id == shift.id) {
            return Err(StoreError::Conflict);
        }
        let id = shift.id.clone();
        clinic.shifts.push(shift);
        Ok(id)
    }

    fn delete_shifts_in_month(&self, key: &MonthKey) -> Result<usize, StoreError> {
        let mut clinic = self.guard()?;
        let before = clinic.shifts.len();
        clinic.shifts.retain(|s| !s.in_month(key));
        Ok(before - clinic.shifts.len())
    }
}

impl MonthStatusStore for MemoryStore {
    fn get_status(&self, key: &MonthKey) -> Result<Option<MonthStatus>, StoreError> {
        Ok(self.guard()?.status(key).cloned())
    }

    fn insert_status(&self, status: MonthStatus) -> Result<(), StoreError> {
        let mut clinic = self.guard()?;
        if clinic.status(&status.key).is_some() {
            return Err(StoreError::Conflict);
        }
        clinic.statuses.push(status);
        Ok(())
    }

    fn set_done(&self, key: &MonthKey, done: bool) -> Result<(), StoreError> {
        let mut clinic = self.guard()?;
        let status = clinic
            .statuses
            .iter_mut()
            .find(|s| &s.key == key)
            .ok_or(StoreError::NotFound)?;
        status.done = done;
        Ok(())
    }
}
