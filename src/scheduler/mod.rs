mod assignment;
mod conflicts;
mod locks;
mod mutate;
mod status;
mod types;
mod util;

pub use conflicts::detect_conflicts;
pub use locks::MonthLocks;
pub use mutate::{reassign_shift, swap_shifts};
pub use types::{
    AllocationResult, AssignOptions, Assignment, Conflict, ConflictKind, Deadline, MonthState,
    PlanError,
};
pub use util::join_dates;

use crate::model::{Doctor, LocationId, MonthKey};
use crate::store::ClinicStore;
use chrono::NaiveDate;

/// Scheduler : allocation mensuelle et suivi de statut au-dessus d'un magasin injecté.
///
/// `auto_assign` et `reset_month` sont sérialisés par (site, année, mois) ;
/// des clés différentes avancent en parallèle.
#[derive(Debug)]
pub struct Scheduler<S> {
    store: S,
    opts: AssignOptions,
    locks: MonthLocks,
}

impl<S: ClinicStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, AssignOptions::default())
    }

    pub fn with_options(store: S, opts: AssignOptions) -> Self {
        Self {
            store,
            opts,
            locks: MonthLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn into_store(self) -> S {
        self.store
    }
    pub fn options(&self) -> AssignOptions {
        self.opts
    }

    /// Moteur seul, sans statut ni verrou : `[start, end)` sur `doctors` dans l'ordre fourni.
    pub fn allocate(
        &self,
        doctors: &[Doctor],
        location: &LocationId,
        start: NaiveDate,
        end: NaiveDate,
        deadline: Deadline,
    ) -> Result<AllocationResult, PlanError> {
        assignment::allocate(&self.store, doctors, location, start, end, self.opts, deadline)
    }

    /// Allocation du mois complet : statut vérifié, médecins éligibles, passe, mois marqué fait.
    ///
    /// Des journées non pourvues ne sont pas une erreur : elles sont dans
    /// `AllocationResult::unstaffed` et le mois est tout de même marqué fait.
    pub fn auto_assign(&self, key: &MonthKey, deadline: Deadline) -> Result<AllocationResult, PlanError> {
        let (start, end) = util::month_bounds(key)?;
        self.locks.with_lock(key, || {
            if status::ensure_status(&self.store, key, deadline)? == MonthState::Done {
                return Err(PlanError::AlreadyProcessed(key.clone()));
            }

            deadline.check()?;
            let doctors = self.store.eligible_doctors(&key.location)?;
            if doctors.is_empty() {
                return Err(PlanError::NoEligibleDoctors(key.location.clone()));
            }

            let result = self.allocate(&doctors, &key.location, start, end, deadline)?;
            status::mark_done(&self.store, key, deadline)?;
            Ok(result)
        })
    }

    pub fn month_status(&self, key: &MonthKey, deadline: Deadline) -> Result<MonthState, PlanError> {
        status::get_status(&self.store, key, deadline)
    }

    /// Annule un mois alloué ; retourne le nombre de gardes supprimées.
    pub fn reset_month(&self, key: &MonthKey, deadline: Deadline) -> Result<usize, PlanError> {
        self.locks
            .with_lock(key, || status::reset(&self.store, key, deadline))
    }
}
