use crate::model::{Clinic, Doctor, Holiday};
use crate::scheduler::AllocationResult;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import de médecins depuis CSV: header `handle,display_name,quota[,locations]`
///
/// `locations` liste des noms de sites séparés par `;`, créés au besoin.
/// Un handle déjà connu met à jour le quota et ajoute les sites.
pub fn import_doctors_csv<P: AsRef<Path>>(path: P, clinic: &mut Clinic) -> anyhow::Result<usize> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;
    let mut count = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid doctor row (empty)");
        }
        let quota: u32 = rec
            .get(2)
            .context("missing quota")?
            .trim()
            .parse()
            .with_context(|| format!("invalid quota for handle {handle}"))?;

        let locations: Vec<_> = rec
            .get(3)
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| clinic.location_or_insert(name))
            .collect();

        let pos = match clinic.doctors.iter().position(|d| d.handle == handle) {
            Some(pos) => pos,
            None => {
                clinic.doctors.push(Doctor::new(handle, display, quota));
                clinic.doctors.len() - 1
            }
        };
        let doctor = &mut clinic.doctors[pos];
        doctor.display_name = display.to_string();
        doctor.shift_quota = quota;
        for location in &locations {
            doctor.attach(location);
        }
        count += 1;
    }
    Ok(count)
}

/// Import de congés: header `handle,location,dates`
///
/// `dates` : `YYYY-MM-DD` ou plages inclusives `YYYY-MM-DD..YYYY-MM-DD`, séparées par `;`.
pub fn import_holidays_csv<P: AsRef<Path>>(path: P, clinic: &mut Clinic) -> anyhow::Result<usize> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut added = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let location_name = rec.get(1).context("missing location")?.trim();
        let raw = rec.get(2).context("missing dates")?.trim();

        let doctor = clinic
            .find_doctor_by_handle(handle)
            .map(|d| d.id.clone())
            .with_context(|| format!("unknown doctor handle: {handle}"))?;
        let location = clinic
            .find_location_by_name(location_name)
            .map(|l| l.id.clone())
            .with_context(|| format!("unknown location: {location_name}"))?;

        let dates = parse_dates(raw).with_context(|| format!("invalid dates for handle {handle}"))?;
        for date in dates {
            if clinic.is_on_holiday(&doctor, date) {
                continue;
            }
            clinic.holidays.push(Holiday {
                doctor: doctor.clone(),
                location: location.clone(),
                date,
            });
            added += 1;
        }
    }
    Ok(added)
}

fn parse_dates(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    let mut out = Vec::new();
    for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        if let Some((start_raw, end_raw)) = chunk.split_once("..") {
            let start = parse_date(start_raw.trim())?;
            let end = parse_date(end_raw.trim())?;
            if end < start {
                bail!("range end before start: {chunk}");
            }
            out.extend(start.iter_days().take_while(|d| *d <= end));
        } else {
            out.push(parse_date(chunk)?);
        }
    }
    Ok(out)
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Export CSV des gardes: header `id,date,start_time,end_time,location,doctor_handle`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, clinic: &Clinic) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "date", "start_time", "end_time", "location", "doctor_handle"])?;
    let mut shifts: Vec<_> = clinic.shifts.iter().collect();
    shifts.sort_by_key(|s| s.date);
    for s in shifts {
        let handle = clinic
            .find_doctor_by_id(&s.doctor)
            .map(|d| d.handle.as_str())
            .unwrap_or("");
        let location = clinic
            .find_location_by_id(&s.location)
            .map(|l| l.name.as_str())
            .unwrap_or("");
        let date = s.date.format("%Y-%m-%d").to_string();
        let start = s.start_time.format("%H:%M").to_string();
        let end = s.end_time.format("%H:%M").to_string();
        w.write_record([s.id.as_str(), date.as_str(), start.as_str(), end.as_str(), location, handle])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des journées non pourvues: header `location,date`
pub fn export_unstaffed_csv<P: AsRef<Path>>(
    path: P,
    location_name: &str,
    result: &AllocationResult,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["location", "date"])?;
    for date in &result.unstaffed {
        let date = date.format("%Y-%m-%d").to_string();
        w.write_record([location_name, date.as_str()])?;
    }
    w.flush()?;
    Ok(())
}
