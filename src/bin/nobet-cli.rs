#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use nobet::{
    io,
    model::{Clinic, Location, MonthKey, Shift, ShiftId},
    notification::{prepare_reminder, unstaffed_alert, TextReminder},
    scheduler::{detect_conflicts, reassign_shift, swap_shifts, AssignOptions, ConflictKind, Deadline, Scheduler},
    storage::{JsonStorage, Storage},
    store::MemoryStore,
    MonthState,
};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de répartition des gardes (fichier JSON, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de la clinique
    #[arg(long, global = true, default_value = "clinic.json")]
    clinic: String,

    #[command(subcommand)]
    cmd: Commands,
}

/// Désigne un mois d'un site.
#[derive(clap::Args, Debug)]
struct MonthArgs {
    /// Nom du site
    #[arg(long)]
    location: String,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Déclarer un site
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Importer des médecins depuis un CSV
    ImportDoctors {
        #[arg(long)]
        csv: String,
    },

    /// Importer des congés depuis un CSV
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Saisir une garde à la main
    CreateShift {
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        location: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long, default_value = "08:00")]
        start: String,
        /// HH:MM
        #[arg(long, default_value = "08:00")]
        end: String,
    },

    /// Répartir automatiquement les gardes d'un mois
    AutoAssign {
        #[command(flatten)]
        month: MonthArgs,
        /// HH:MM
        #[arg(long, default_value = "08:00")]
        shift_start: String,
        /// HH:MM
        #[arg(long, default_value = "08:00")]
        shift_end: String,
        /// Délai maximal de la passe, en millisecondes
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Export CSV des journées non pourvues (optionnel)
        #[arg(long)]
        unstaffed_csv: Option<String>,
    },

    /// Afficher le statut d'un mois
    Status {
        #[command(flatten)]
        month: MonthArgs,
    },

    /// Annuler la répartition d'un mois
    Reset {
        #[command(flatten)]
        month: MonthArgs,
    },

    /// Lister et optionnellement exporter
    List {
        /// Filtrer sur un site
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Échanger les médecins de deux gardes
    Swap {
        #[arg(long)]
        shift_id: String,
        #[arg(long)]
        with_shift: String,
    },

    /// Confier une garde à un autre médecin
    Reassign {
        #[arg(long)]
        shift_id: String,
        #[arg(long)]
        to: String,
    },

    /// Générer un rappel texte pour un médecin
    Notify {
        #[arg(long)]
        handle: String,
        #[arg(long, default_value_t = 2)]
        days_before: i64,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.clinic)?;
    let mut clinic = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::AddLocation { name, description } => {
            if clinic.find_location_by_name(&name).is_some() {
                anyhow::bail!("location already exists: {name}");
            }
            let mut location = Location::new(name);
            location.description = description;
            clinic.locations.push(location);
            storage.save(&clinic)?;
            0
        }
        Commands::ImportDoctors { csv } => {
            let n = io::import_doctors_csv(csv, &mut clinic)?;
            storage.save(&clinic)?;
            println!("{n} doctor(s) imported");
            0
        }
        Commands::ImportHolidays { csv } => {
            let n = io::import_holidays_csv(csv, &mut clinic)?;
            storage.save(&clinic)?;
            println!("{n} holiday(s) added");
            0
        }
        Commands::CreateShift {
            doctor,
            location,
            date,
            start,
            end,
        } => {
            let doctor = clinic
                .find_doctor_by_handle(&doctor)
                .map(|d| d.id.clone())
                .ok_or_else(|| anyhow::anyhow!("unknown doctor: {}", doctor))?;
            let location = location_id(&clinic, &location)?;
            let shift = Shift::new(doctor, location, io::parse_date(&date)?, parse_time(&start)?, parse_time(&end)?);
            let id = clinic.add_shift(shift)?;
            storage.save(&clinic)?;
            println!("{}", id.as_str());
            0
        }
        Commands::AutoAssign {
            month,
            shift_start,
            shift_end,
            timeout_ms,
            unstaffed_csv,
        } => {
            let key = month_key(&clinic, &month)?;
            let opts = AssignOptions {
                shift_start: parse_time(&shift_start)?,
                shift_end: parse_time(&shift_end)?,
            };
            let deadline = timeout_ms
                .map(|ms| Deadline::after(Duration::from_millis(ms)))
                .unwrap_or_default();

            let scheduler = Scheduler::with_options(MemoryStore::new(clinic), opts);
            let outcome = scheduler.auto_assign(&key, deadline);
            // les gardes déjà créées sont conservées, même en cas d'erreur
            let clinic = scheduler.into_store().into_clinic()?;
            storage.save(&clinic)?;
            let result = outcome?;

            println!(
                "{}: {} shift(s) assigned",
                month.location,
                result.assignments.len()
            );
            if let Some(path) = unstaffed_csv {
                io::export_unstaffed_csv(path, &month.location, &result)?;
            }
            match unstaffed_alert(&month.location, &result) {
                Some(alert) => {
                    eprintln!("{alert}");
                    // Code 2 = WARNING/INCOMPLETE
                    2
                }
                None => 0,
            }
        }
        Commands::Status { month } => {
            let key = month_key(&clinic, &month)?;
            let scheduler = Scheduler::new(MemoryStore::new(clinic));
            let state = scheduler.month_status(&key, Deadline::none())?;
            println!(
                "{} {:04}-{:02}: {}",
                month.location,
                month.year,
                month.month,
                match state {
                    MonthState::Done => "done",
                    MonthState::NotStarted => "not started",
                }
            );
            0
        }
        Commands::Reset { month } => {
            let key = month_key(&clinic, &month)?;
            let scheduler = Scheduler::new(MemoryStore::new(clinic));
            let outcome = scheduler.reset_month(&key, Deadline::none());
            let clinic = scheduler.into_store().into_clinic()?;
            storage.save(&clinic)?;
            let deleted = outcome?;
            println!("{deleted} shift(s) deleted");
            0
        }
        Commands::List {
            location,
            out_json,
            out_csv,
        } => {
            if let Some(path) = out_json {
                let json = serde_json::to_string_pretty(&clinic)?;
                std::fs::write(&path, json).with_context(|| format!("writing {path}"))?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &clinic)?;
            }
            let filter = location
                .as_deref()
                .map(|name| location_id(&clinic, name))
                .transpose()?;
            let mut shifts: Vec<&Shift> = clinic
                .shifts
                .iter()
                .filter(|s| filter.as_ref().map_or(true, |l| &s.location == l))
                .collect();
            shifts.sort_by_key(|s| (s.date, s.start_time));
            // impression compacte
            for s in shifts {
                let doctor = clinic
                    .find_doctor_by_id(&s.doctor)
                    .map(|d| d.handle.as_str())
                    .unwrap_or("-");
                let site = clinic
                    .find_location_by_id(&s.location)
                    .map(|l| l.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} {}→{} | {} | {}",
                    s.id.as_str(),
                    s.date.format("%Y-%m-%d"),
                    s.start_time.format("%H:%M"),
                    s.end_time.format("%H:%M"),
                    site,
                    doctor
                );
            }
            0
        }
        Commands::Check { report } => {
            let conflicts = detect_conflicts(&clinic);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["doctor_id", "date", "shifts", "kind"])?;
                    for c in &conflicts {
                        let date = c.date.format("%Y-%m-%d").to_string();
                        let shifts = c
                            .shifts
                            .iter()
                            .map(ShiftId::as_str)
                            .collect::<Vec<_>>()
                            .join(";");
                        w.write_record([
                            c.doctor.as_str(),
                            date.as_str(),
                            shifts.as_str(),
                            match c.kind {
                                ConflictKind::DoubleBooking => "double",
                                ConflictKind::HolidayViolation => "holiday",
                                ConflictKind::QuotaExceeded => "quota",
                            },
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Swap { shift_id, with_shift } => {
            swap_shifts(&mut clinic, &ShiftId::new(shift_id), &ShiftId::new(with_shift))?;
            storage.save(&clinic)?;
            0
        }
        Commands::Reassign { shift_id, to } => {
            let doctor = clinic
                .find_doctor_by_handle(&to)
                .map(|d| d.id.clone())
                .ok_or_else(|| anyhow::anyhow!("unknown doctor: {}", to))?;
            reassign_shift(&mut clinic, &ShiftId::new(shift_id), &doctor)?;
            storage.save(&clinic)?;
            0
        }
        Commands::Notify {
            handle,
            days_before,
            out,
        } => {
            let renderer = TextReminder;
            let reminder = prepare_reminder(
                &clinic,
                &handle,
                days_before,
                Local::now().date_naive(),
                &renderer,
            )?;
            std::fs::write(&out, reminder.content)?;
            println!(
                "Reminder generated for {} (shift {}) on {}",
                reminder.doctor_handle,
                reminder.shift_id,
                reminder.notice_on.format("%Y-%m-%d")
            );
            0
        }
    };

    std::process::exit(code);
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").with_context(|| format!("invalid time (HH:MM): {raw}"))
}

fn location_id(clinic: &Clinic, name: &str) -> Result<nobet::LocationId> {
    clinic
        .find_location_by_name(name)
        .map(|l| l.id.clone())
        .ok_or_else(|| anyhow::anyhow!("unknown location: {}", name))
}

fn month_key(clinic: &Clinic, month: &MonthArgs) -> Result<MonthKey> {
    Ok(MonthKey::new(
        location_id(clinic, &month.location)?,
        month.year,
        month.month,
    ))
}
