use super::{types::Deadline, MonthState, PlanError};
use crate::model::{MonthKey, MonthStatus};
use crate::store::{MonthStatusStore, ShiftSink, StoreError};

pub(super) fn get_status<S>(store: &S, key: &MonthKey, deadline: Deadline) -> Result<MonthState, PlanError>
where
    S: MonthStatusStore + ?Sized,
{
    deadline.check()?;
    match store.get_status(key)? {
        None => Err(PlanError::StatusNotFound(key.clone())),
        Some(status) if status.done => Ok(MonthState::Done),
        Some(_) => Ok(MonthState::NotStarted),
    }
}

/// Lit le statut, en créant la ligne "non fait" lors de la première tentative.
pub(super) fn ensure_status<S>(store: &S, key: &MonthKey, deadline: Deadline) -> Result<MonthState, PlanError>
where
    S: MonthStatusStore + ?Sized,
{
    match get_status(store, key, deadline) {
        Err(PlanError::StatusNotFound(_)) => {
            deadline.check()?;
            store.insert_status(MonthStatus {
                key: key.clone(),
                done: false,
            })?;
            Ok(MonthState::NotStarted)
        }
        other => other,
    }
}

pub(super) fn mark_done<S>(store: &S, key: &MonthKey, deadline: Deadline) -> Result<(), PlanError>
where
    S: MonthStatusStore + ?Sized,
{
    deadline.check()?;
    store.set_done(key, true).map_err(|err| match err {
        StoreError::NotFound => PlanError::StatusNotFound(key.clone()),
        other => PlanError::Store(other),
    })?;

    #[cfg(feature = "logging")]
    tracing::info!(month = %key, "month marked done");

    Ok(())
}

/// Repasse le mois à "non fait" puis supprime ses gardes.
///
/// Si la suppression échoue après le basculement, le statut reste "non fait"
/// alors que des gardes subsistent ; l'erreur est remontée telle quelle.
pub(super) fn reset<S>(store: &S, key: &MonthKey, deadline: Deadline) -> Result<usize, PlanError>
where
    S: MonthStatusStore + ShiftSink + ?Sized,
{
    if get_status(store, key, deadline)? != MonthState::Done {
        return Err(PlanError::NothingToReset(key.clone()));
    }

    deadline.check()?;
    store.set_done(key, false)?;

    deadline.check()?;
    let deleted = store.delete_shifts_in_month(key)?;

    #[cfg(feature = "logging")]
    tracing::info!(month = %key, deleted, "month reset");

    Ok(deleted)
}
