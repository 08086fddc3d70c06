use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Doctor
    DoctorId
);
string_id!(
    /// Identifiant fort pour Location (site de garde)
    LocationId
);
string_id!(
    /// Identifiant fort pour Shift
    ShiftId
);

/// Site clinique sur lequel des gardes sont tenues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: LocationId::random(),
            name: name.into(),
            description: None,
        }
    }
}

/// Médecin éligible aux gardes.
///
/// `shift_quota` borne le nombre de gardes qu'une seule passe d'allocation
/// peut lui attribuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub handle: String,
    pub display_name: String,
    pub shift_quota: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<LocationId>,
}

impl Doctor {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D, shift_quota: u32) -> Self {
        Self {
            id: DoctorId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            shift_quota,
            locations: Vec::new(),
        }
    }

    /// Rattache le médecin à un site (sans doublon).
    pub fn with_location(mut self, location: &LocationId) -> Self {
        self.attach(location);
        self
    }

    pub fn attach(&mut self, location: &LocationId) {
        if !self.locations.contains(location) {
            self.locations.push(location.clone());
        }
    }

    pub fn works_at(&self, location: &LocationId) -> bool {
        self.locations.contains(location)
    }
}

/// Jour de congé d'un médecin sur un site (journée calendaire entière).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub doctor: DoctorId,
    pub location: LocationId,
    pub date: NaiveDate,
}

/// Garde : un médecin, un site, un jour.
///
/// Si `end_time <= start_time`, la garde déborde sur le lendemain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub doctor: DoctorId,
    pub location: LocationId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Shift {
    pub fn new(
        doctor: DoctorId,
        location: LocationId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: ShiftId::random(),
            doctor,
            location,
            date,
            start_time,
            end_time,
        }
    }

    /// Durée en minutes (24h quand début == fin).
    pub fn duration_minutes(&self) -> i64 {
        let raw = (self.end_time - self.start_time).num_minutes();
        if raw <= 0 {
            raw + 24 * 60
        } else {
            raw
        }
    }

    pub fn in_month(&self, key: &MonthKey) -> bool {
        self.location == key.location
            && self.date.year() == key.year
            && self.date.month() == key.month
    }
}

/// Unité de travail de l'allocation : (site, année, mois).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub location: LocationId,
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(location: LocationId, year: i32, month: u32) -> Self {
        Self {
            location,
            year,
            month,
        }
    }

    /// Bornes `[1er du mois, 1er du mois suivant)`, `None` si le mois n'existe pas.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:04}-{:02}", self.location, self.year, self.month)
    }
}

/// Drapeau "déjà alloué" d'un mois.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStatus {
    #[serde(flatten)]
    pub key: MonthKey,
    #[serde(default)]
    pub done: bool,
}

/// État complet persisté : sites, médecins, congés, gardes, statuts mensuels.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Clinic {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub statuses: Vec<MonthStatus>,
}

impl Clinic {
    pub fn find_location_by_name<'a>(&'a self, name: &str) -> Option<&'a Location> {
        self.locations.iter().find(|l| l.name == name)
    }
    pub fn find_location_by_id<'a>(&'a self, id: &LocationId) -> Option<&'a Location> {
        self.locations.iter().find(|l| &l.id == id)
    }
    pub fn find_doctor_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Doctor> {
        self.doctors.iter().find(|d| d.handle == handle)
    }
    pub fn find_doctor_by_id<'a>(&'a self, id: &DoctorId) -> Option<&'a Doctor> {
        self.doctors.iter().find(|d| &d.id == id)
    }
    pub fn find_shift<'a>(&'a self, id: &ShiftId) -> Option<&'a Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    /// Retourne le site `name`, en le créant s'il n'existe pas encore.
    pub fn location_or_insert(&mut self, name: &str) -> LocationId {
        if let Some(existing) = self.find_location_by_name(name) {
            return existing.id.clone();
        }
        let location = Location::new(name);
        let id = location.id.clone();
        self.locations.push(location);
        id
    }

    /// Médecins rattachés à `location`, dans l'ordre d'enregistrement.
    pub fn doctors_at(&self, location: &LocationId) -> Vec<Doctor> {
        self.doctors
            .iter()
            .filter(|d| d.works_at(location))
            .cloned()
            .collect()
    }

    pub fn holidays_of(&self, doctor: &DoctorId) -> Vec<NaiveDate> {
        self.holidays
            .iter()
            .filter(|h| &h.doctor == doctor)
            .map(|h| h.date)
            .collect()
    }

    pub fn is_on_holiday(&self, doctor: &DoctorId, date: NaiveDate) -> bool {
        self.holidays
            .iter()
            .any(|h| &h.doctor == doctor && h.date == date)
    }

    pub fn is_assigned(&self, doctor: &DoctorId, date: NaiveDate) -> bool {
        self.shifts
            .iter()
            .any(|s| &s.doctor == doctor && s.date == date)
    }

    pub fn shifts_in_month<'a>(&'a self, key: &'a MonthKey) -> impl Iterator<Item = &'a Shift> + 'a {
        self.shifts.iter().filter(move |s| s.in_month(key))
    }

    pub fn status(&self, key: &MonthKey) -> Option<&MonthStatus> {
        self.statuses.iter().find(|s| &s.key == key)
    }
}
