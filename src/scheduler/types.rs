use super::util;
use crate::model::{DoctorId, LocationId, MonthKey, ShiftId};
use crate::store::StoreError;
use chrono::{NaiveDate, NaiveTime};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Options d'assignation
#[derive(Debug, Clone, Copy)]
pub struct AssignOptions {
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
}

impl Default for AssignOptions {
    fn default() -> Self {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default();
        Self {
            shift_start: eight,
            shift_end: eight,
        }
    }
}

/// Échéance optionnelle propagée jusqu'aux appels de persistance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    pub(crate) fn check(&self) -> Result<(), PlanError> {
        if self.expired() {
            return Err(PlanError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// État d'un mois vu par le suivi de statut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthState {
    NotStarted,
    Done,
}

/// Une journée pourvue par l'allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub date: NaiveDate,
    pub doctor: DoctorId,
    pub shift: ShiftId,
}

/// Résultat d'une passe : journées écrites, puis journées restées vides (ordre croissant).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationResult {
    pub location: Option<LocationId>,
    pub assignments: Vec<Assignment>,
    pub unstaffed: Vec<NaiveDate>,
}

impl AllocationResult {
    pub fn is_complete(&self) -> bool {
        self.unstaffed.is_empty()
    }

    pub fn doctor_for(&self, date: NaiveDate) -> Option<&DoctorId> {
        self.assignments
            .iter()
            .find(|a| a.date == date)
            .map(|a| &a.doctor)
    }

    pub fn shifts_for(&self, doctor: &DoctorId) -> usize {
        self.assignments.iter().filter(|a| &a.doctor == doctor).count()
    }

    /// Transforme un résultat partiel en erreur, pour les appelants qui l'exigent complet.
    pub fn into_complete(self) -> Result<Self, PlanError> {
        if self.is_complete() {
            return Ok(self);
        }
        Err(PlanError::Unstaffed {
            location: self
                .location
                .as_ref()
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
            dates: self.unstaffed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    DoubleBooking,
    HolidayViolation,
    QuotaExceeded,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub doctor: DoctorId,
    pub date: NaiveDate,
    pub shifts: Vec<ShiftId>,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("no eligible doctors for location {0}")]
    NoEligibleDoctors(LocationId),
    #[error("no month status for {0}")]
    StatusNotFound(MonthKey),
    #[error("month already processed: {0}")]
    AlreadyProcessed(MonthKey),
    #[error("nothing to reset: {0} was never allocated")]
    NothingToReset(MonthKey),
    #[error("no doctor could be assigned on: {}", util::join_dates(.dates))]
    Unstaffed {
        location: String,
        dates: Vec<NaiveDate>,
    },
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("unknown doctor: {0}")]
    UnknownDoctor(String),
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("doctor {doctor} already holds a shift on {date}")]
    AlreadyAssigned { doctor: String, date: NaiveDate },
    #[error("swap invalid: {0}")]
    SwapInvalid(&'static str),
    #[error("reassign invalid: {0}")]
    ReassignInvalid(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}
