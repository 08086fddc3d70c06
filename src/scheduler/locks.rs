use super::PlanError;
use crate::model::MonthKey;
use crate::store::StoreError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Verrous par (site, année, mois) : une seule allocation ou remise à zéro à la fois par clé.
#[derive(Debug, Default)]
pub struct MonthLocks {
    locks: Mutex<HashMap<MonthKey, Arc<Mutex<()>>>>,
}

impl MonthLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &MonthKey) -> Result<Arc<Mutex<()>>, PlanError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Unavailable("month lock table poisoned".to_string()))?;
        Ok(locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Nombre de mois dont le verrou est actuellement tenu ou attendu.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exécute `f` en tenant le verrou de `key`.
    pub fn with_lock<T>(
        &self,
        key: &MonthKey,
        f: impl FnOnce() -> Result<T, PlanError>,
    ) -> Result<T, PlanError> {
        let lock = self.lock_for(key)?;
        let outcome = {
            // le verrou ne protège aucune donnée : un poison est sans conséquence
            let _guard: MutexGuard<'_, ()> = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(key, lock);
        outcome
    }

    /// Retire l'entrée de `key` quand plus personne ne la tient ni ne l'attend.
    fn release(&self, key: &MonthKey, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // les clones ne sont distribués que sous `locks` : la table et `lock` font 2
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }
}
