#![forbid(unsafe_code)]
mod common;

use chrono::NaiveTime;
use common::{clinic_with, day, holiday, FlakyStore};
use nobet::{
    model::Shift, AssignOptions, Deadline, MemoryStore, PlanError, Scheduler, StoreError,
};
use std::collections::HashMap;
use std::time::Instant;

#[test]
fn first_fit_respects_quota_and_holidays() {
    let (mut clinic, cardio, ids) = clinic_with(&[("a", 2), ("b", 1)]);
    let (a, b) = (ids[0].clone(), ids[1].clone());
    holiday(&mut clinic, &b, &cardio, day(2025, 3, 3));
    let doctors = clinic.doctors.clone();

    let s = Scheduler::new(MemoryStore::new(clinic));
    let result = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 4), Deadline::none())
        .unwrap();

    assert_eq!(result.doctor_for(day(2025, 3, 1)), Some(&a));
    assert_eq!(result.doctor_for(day(2025, 3, 2)), Some(&a));
    assert_eq!(result.doctor_for(day(2025, 3, 3)), None);
    assert_eq!(result.unstaffed, vec![day(2025, 3, 3)]);
    assert_eq!(result.shifts_for(&a), 2);
    assert_eq!(result.shifts_for(&b), 0);

    let clinic = s.into_store().into_clinic().unwrap();
    assert_eq!(clinic.shifts.len(), 2);
}

#[test]
fn list_order_is_the_tie_break() {
    let (clinic, cardio, ids) = clinic_with(&[("b", 1), ("a", 1)]);
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let result = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 3), Deadline::none())
        .unwrap();
    assert_eq!(result.doctor_for(day(2025, 3, 1)), Some(&ids[0]));
    assert_eq!(result.doctor_for(day(2025, 3, 2)), Some(&ids[1]));
    assert!(result.is_complete());
}

#[test]
fn never_exceeds_quota_or_day_count() {
    let (mut clinic, cardio, ids) = clinic_with(&[("a", 7), ("b", 5), ("c", 9), ("d", 3)]);
    for d in [3, 4, 5, 20] {
        holiday(&mut clinic, &ids[0], &cardio, day(2025, 1, d));
    }
    for d in 10..=17 {
        holiday(&mut clinic, &ids[2], &cardio, day(2025, 1, d));
    }
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let result = s
        .allocate(&doctors, &cardio, day(2025, 1, 1), day(2025, 2, 1), Deadline::none())
        .unwrap();

    assert!(result.assignments.len() <= 31);
    assert_eq!(result.assignments.len() + result.unstaffed.len(), 31);
    for doctor in &doctors {
        assert!((result.shifts_for(&doctor.id) as u32) <= doctor.shift_quota);
    }

    let clinic = s.into_store().into_clinic().unwrap();
    let mut per_day: HashMap<_, usize> = HashMap::new();
    for shift in &clinic.shifts {
        *per_day.entry(shift.date).or_default() += 1;
        assert!(!clinic.is_on_holiday(&shift.doctor, shift.date));
    }
    assert!(per_day.values().all(|n| *n == 1));
    for date in &result.unstaffed {
        assert!(!per_day.contains_key(date));
    }
}

#[test]
fn day_is_unstaffed_when_everyone_is_off_or_full() {
    let (mut clinic, cardio, ids) = clinic_with(&[("a", 1), ("b", 5)]);
    holiday(&mut clinic, &ids[1], &cardio, day(2025, 3, 2));
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let result = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 4), Deadline::none())
        .unwrap();

    // jour 1 : a (plein), jour 2 : b en congé, jour 3 : b
    assert_eq!(result.doctor_for(day(2025, 3, 1)), Some(&ids[0]));
    assert_eq!(result.unstaffed, vec![day(2025, 3, 2)]);
    assert_eq!(result.doctor_for(day(2025, 3, 3)), Some(&ids[1]));

    let clinic = s.into_store().into_clinic().unwrap();
    assert!(clinic.shifts.iter().all(|sh| sh.date != day(2025, 3, 2)));
}

#[test]
fn existing_shift_elsewhere_blocks_the_doctor() {
    let (mut clinic, cardio, ids) = clinic_with(&[("a", 10), ("b", 10)]);
    let urgences = clinic.location_or_insert("urgences");
    let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    clinic
        .add_shift(Shift::new(ids[0].clone(), urgences, day(2025, 3, 2), eight, eight))
        .unwrap();
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let result = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 4), Deadline::none())
        .unwrap();
    assert_eq!(result.doctor_for(day(2025, 3, 1)), Some(&ids[0]));
    assert_eq!(result.doctor_for(day(2025, 3, 2)), Some(&ids[1]));
    assert_eq!(result.doctor_for(day(2025, 3, 3)), Some(&ids[0]));
}

#[test]
fn created_shifts_carry_configured_hours() {
    let (clinic, cardio, _) = clinic_with(&[("a", 3)]);
    let doctors = clinic.doctors.clone();
    let opts = AssignOptions {
        shift_start: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        shift_end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    };
    let s = Scheduler::with_options(MemoryStore::new(clinic), opts);
    s.allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 2), Deadline::none())
        .unwrap();

    let clinic = s.into_store().into_clinic().unwrap();
    let shift = &clinic.shifts[0];
    assert_eq!(shift.start_time, opts.shift_start);
    assert_eq!(shift.end_time, opts.shift_end);
    assert_eq!(shift.duration_minutes(), 16 * 60);
}

#[test]
fn empty_range_and_inverted_range() {
    let (clinic, cardio, _) = clinic_with(&[("a", 3)]);
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let empty = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 1), Deadline::none())
        .unwrap();
    assert!(empty.assignments.is_empty() && empty.unstaffed.is_empty());

    let err = s
        .allocate(&doctors, &cardio, day(2025, 3, 2), day(2025, 3, 1), Deadline::none())
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRange { .. }));
}

#[test]
fn no_doctors_is_rejected() {
    let (clinic, cardio, _) = clinic_with(&[]);
    let s = Scheduler::new(MemoryStore::new(clinic));
    let err = s
        .allocate(&[], &cardio, day(2025, 3, 1), day(2025, 3, 2), Deadline::none())
        .unwrap_err();
    assert!(matches!(err, PlanError::NoEligibleDoctors(_)));
}

#[test]
fn persistence_failure_keeps_earlier_shifts() {
    let (clinic, cardio, _) = clinic_with(&[("a", 31)]);
    let doctors = clinic.doctors.clone();
    for successes in [0usize, 1, 4] {
        let mut store = FlakyStore::new(clinic.clone());
        store.fail_create_after = Some(successes);
        let s = Scheduler::new(store);

        let err = s
            .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 11), Deadline::none())
            .unwrap_err();
        assert!(matches!(err, PlanError::Store(StoreError::Unavailable(_))));

        let persisted = s.store().inner.snapshot().unwrap();
        assert_eq!(persisted.shifts.len(), successes);
        assert_eq!(s.store().created(), successes);
    }
}

#[test]
fn holiday_lookup_failure_aborts_before_any_write() {
    let (clinic, cardio, _) = clinic_with(&[("a", 5)]);
    let doctors = clinic.doctors.clone();
    let mut store = FlakyStore::new(clinic);
    store.fail_holidays = true;
    let s = Scheduler::new(store);

    let err = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 5), Deadline::none())
        .unwrap_err();
    assert!(matches!(err, PlanError::Store(_)));
    assert_eq!(s.store().created(), 0);
}

#[test]
fn expired_deadline_stops_before_writing() {
    let (clinic, cardio, _) = clinic_with(&[("a", 5)]);
    let doctors = clinic.doctors.clone();
    let s = Scheduler::new(MemoryStore::new(clinic));

    let err = s
        .allocate(&doctors, &cardio, day(2025, 3, 1), day(2025, 3, 5), Deadline::at(Instant::now()))
        .unwrap_err();
    assert!(matches!(err, PlanError::DeadlineExceeded));
    assert!(s.store().snapshot().unwrap().shifts.is_empty());
}
