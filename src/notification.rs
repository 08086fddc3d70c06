use crate::model::{Clinic, Doctor, Location, Shift};
use crate::scheduler::{join_dates, AllocationResult};
use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate};

/// Représente un rappel généré pour un médecin.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub doctor_handle: String,
    pub shift_id: String,
    pub notice_on: NaiveDate,
    pub content: String,
}

/// Permet de customiser le rendu du message (texte, SMS, etc.).
pub trait ReminderRenderer {
    fn render(&self, doctor: &Doctor, shift: &Shift, location: Option<&Location>, notice_on: NaiveDate) -> String;
}

/// Gabarit texte simple destiné à un futur mail/SMS.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReminder;

impl ReminderRenderer for TextReminder {
    fn render(&self, doctor: &Doctor, shift: &Shift, location: Option<&Location>, notice_on: NaiveDate) -> String {
        format!(
            "Hello {name},\n\nYou are on duty at {location} on {date}, from {start} to {end}.\nNotice generated on {notice}.\n",
            name = doctor.display_name,
            location = location.map(|l| l.name.as_str()).unwrap_or("an unknown location"),
            date = shift.date.format("%Y-%m-%d"),
            start = shift.start_time.format("%H:%M"),
            end = shift.end_time.format("%H:%M"),
            notice = notice_on.format("%Y-%m-%d"),
        )
    }
}

/// Prépare un rappel pour la prochaine garde d'un médecin.
pub fn prepare_reminder(
    clinic: &Clinic,
    handle: &str,
    days_before: i64,
    today: NaiveDate,
    renderer: &dyn ReminderRenderer,
) -> Result<Reminder> {
    if days_before < 0 {
        bail!("days_before must be positive");
    }

    let doctor = clinic
        .find_doctor_by_handle(handle)
        .with_context(|| format!("unknown doctor handle: {handle}"))?;

    let shift = clinic
        .shifts
        .iter()
        .filter(|shift| shift.doctor == doctor.id && shift.date >= today)
        .min_by_key(|shift| (shift.date, shift.start_time))
        .with_context(|| format!("no upcoming shift found for handle {handle}"))?;

    let notice_on = shift
        .date
        .checked_sub_days(Days::new(days_before.unsigned_abs()))
        .with_context(|| format!("days_before out of range: {days_before}"))?;
    let location = clinic.find_location_by_id(&shift.location);

    let content = renderer.render(doctor, shift, location, notice_on);
    Ok(Reminder {
        doctor_handle: doctor.handle.clone(),
        shift_id: shift.id.as_str().to_string(),
        notice_on,
        content,
    })
}

/// Alerte lisible listant les journées restées sans médecin, `None` si tout est pourvu.
pub fn unstaffed_alert(location_name: &str, result: &AllocationResult) -> Option<String> {
    if result.is_complete() {
        return None;
    }
    Some(format!(
        "{location_name}: no doctor could be assigned on the following days: {}",
        join_dates(&result.unstaffed)
    ))
}
