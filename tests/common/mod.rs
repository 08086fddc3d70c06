#![allow(dead_code)]
use chrono::NaiveDate;
use nobet::{
    model::{Clinic, Doctor, DoctorId, Holiday, LocationId, MonthKey, MonthStatus, Shift, ShiftId},
    store::{
        ConflictChecker, EligibilityProvider, HolidayIndex, MemoryStore, MonthStatusStore,
        ShiftSink, StoreError,
    },
};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Site "cardio", médecins rattachés dans l'ordre donné.
pub fn clinic_with(doctors: &[(&str, u32)]) -> (Clinic, LocationId, Vec<DoctorId>) {
    let mut clinic = Clinic::default();
    let location = clinic.location_or_insert("cardio");
    let mut ids = Vec::new();
    for (handle, quota) in doctors {
        let doctor = Doctor::new(*handle, handle.to_uppercase(), *quota).with_location(&location);
        ids.push(doctor.id.clone());
        clinic.doctors.push(doctor);
    }
    (clinic, location, ids)
}

pub fn holiday(clinic: &mut Clinic, doctor: &DoctorId, location: &LocationId, date: NaiveDate) {
    clinic.holidays.push(Holiday {
        doctor: doctor.clone(),
        location: location.clone(),
        date,
    });
}

/// Magasin mémoire avec pannes injectables.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// Nombre de créations réussies avant la panne.
    pub fail_create_after: Option<usize>,
    pub fail_delete: bool,
    pub fail_holidays: bool,
    created: AtomicUsize,
}

impl FlakyStore {
    pub fn new(clinic: Clinic) -> Self {
        Self {
            inner: MemoryStore::new(clinic),
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl EligibilityProvider for FlakyStore {
    fn eligible_doctors(&self, location: &LocationId) -> Result<Vec<Doctor>, StoreError> {
        self.inner.eligible_doctors(location)
    }
}

impl HolidayIndex for FlakyStore {
    fn holidays(&self, doctor: &DoctorId) -> Result<Vec<NaiveDate>, StoreError> {
        if self.fail_holidays {
            return Err(StoreError::Unavailable("holiday index down".into()));
        }
        self.inner.holidays(doctor)
    }
}

impl ConflictChecker for FlakyStore {
    fn is_assigned(&self, doctor: &DoctorId, date: NaiveDate) -> Result<bool, StoreError> {
        self.inner.is_assigned(doctor, date)
    }
}

impl ShiftSink for FlakyStore {
    fn create_shift(&self, shift: Shift) -> Result<ShiftId, StoreError> {
        if let Some(limit) = self.fail_create_after {
            if self.created() >= limit {
                return Err(StoreError::Unavailable("insert failed".into()));
            }
        }
        let id = self.inner.create_shift(shift)?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn delete_shifts_in_month(&self, key: &MonthKey) -> Result<usize, StoreError> {
        if self.fail_delete {
            return Err(StoreError::Unavailable("delete failed".into()));
        }
        self.inner.delete_shifts_in_month(key)
    }
}

impl MonthStatusStore for FlakyStore {
    fn get_status(&self, key: &MonthKey) -> Result<Option<MonthStatus>, StoreError> {
        self.inner.get_status(key)
    }

    fn insert_status(&self, status: MonthStatus) -> Result<(), StoreError> {
        self.inner.insert_status(status)
    }

    fn set_done(&self, key: &MonthKey, done: bool) -> Result<(), StoreError> {
        self.inner.set_done(key, done)
    }
}
