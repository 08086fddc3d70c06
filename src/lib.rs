#![forbid(unsafe_code)]
//! Nöbet — répartition mensuelle des gardes de médecins par site.
//!
//! - Allocation gloutonne "premier valide" avec congés et quotas.
//! - Statut mensuel (fait / non fait), remise à zéro explicite.
//! - Collaborateurs injectés (traits `store`), magasin mémoire fourni.
//! - Stockage fichiers (JSON/CSV) pour la CLI.

pub mod io;
pub mod model;
pub mod notification;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use model::{
    Clinic, Doctor, DoctorId, Holiday, Location, LocationId, MonthKey, MonthStatus, Shift, ShiftId,
};
pub use notification::{prepare_reminder, unstaffed_alert, Reminder, ReminderRenderer, TextReminder};
pub use scheduler::{
    AllocationResult, AssignOptions, Conflict, ConflictKind, Deadline, MonthState, PlanError,
    Scheduler,
};
pub use storage::{JsonStorage, Storage};
pub use store::{
    ClinicStore, ConflictChecker, EligibilityProvider, HolidayIndex, MemoryStore, MonthStatusStore,
    ShiftSink, StoreError,
};
