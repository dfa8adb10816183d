use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use triage_core::config::Config;
use triage_core::engine::Simulation;
use triage_core::hospital::{Hospital, HospitalDirectory, HospitalFilter};
use triage_core::types::{Language, Specialty};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum HospitalsSubcommand {
    /// List hospitals with ICU availability
    List {
        /// Only hospitals with at least one free ICU bed
        #[arg(long)]
        available: bool,
        /// trauma, cardiac, pediatric or general
        #[arg(long)]
        specialty: Option<String>,
        /// Label language: en or ta
        #[arg(long, default_value = "en")]
        lang: String,
        /// Apply the disaster-mode bed loss first
        #[arg(long)]
        disaster: bool,
    },

    /// Show the closest hospital with a free ICU bed
    Nearest,

    /// Reserve one ICU bed at a hospital
    Reserve {
        /// Hospital id
        id: u32,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: &Path, subcmd: HospitalsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        HospitalsSubcommand::List {
            available,
            specialty,
            lang,
            disaster,
        } => list(available, specialty.as_deref(), &lang, disaster, json),
        HospitalsSubcommand::Nearest => nearest(config_path, json),
        HospitalsSubcommand::Reserve { id } => reserve(config_path, id, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(
    available: bool,
    specialty: Option<&str>,
    lang: &str,
    disaster: bool,
    json: bool,
) -> anyhow::Result<()> {
    let lang: Language = lang.parse()?;
    let filter = HospitalFilter {
        available_only: available,
        specialty: specialty.map(str::parse::<Specialty>).transpose()?,
    };

    let mut directory = HospitalDirectory::default();
    if disaster {
        directory.apply_surge();
    }
    let hospitals = directory.filter(filter);

    if json {
        print_json(&hospitals)?;
        return Ok(());
    }

    if hospitals.is_empty() {
        println!("No hospitals match.");
        return Ok(());
    }

    let rows = hospitals.iter().map(|h| row(h, lang)).collect();
    print_table(
        &["ID", "NAME", "SPECIALTY", "ICU FREE", "STATUS", "DISTANCE", "ETA"],
        rows,
    );
    Ok(())
}

fn row(h: &Hospital, lang: Language) -> Vec<String> {
    vec![
        h.id.to_string(),
        h.display_name(lang).to_string(),
        h.specialty.to_string(),
        format!("{}/{}", h.available_icu, h.total_icu),
        h.availability().label(lang).to_string(),
        format!("{} km", h.distance_km),
        format!("{} min", h.eta_minutes()),
    ]
}

// ---------------------------------------------------------------------------
// nearest
// ---------------------------------------------------------------------------

fn nearest(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let mut sim = Simulation::headless(config)?;
    let h = sim
        .locate_nearest()
        .context("no hospital has a free ICU bed")?;

    if json {
        print_json(&h)?;
        return Ok(());
    }

    println!("Nearest:     {} ({})", h.name, h.specialty);
    println!("ICU beds:    {} free of {}", h.available_icu, h.total_icu);
    println!("Distance:    {} km, about {} min", h.distance_km, h.eta_minutes());
    Ok(())
}

// ---------------------------------------------------------------------------
// reserve
// ---------------------------------------------------------------------------

fn reserve(config_path: &Path, id: u32, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let mut sim = Simulation::headless(config)?;
    let h = sim.reserve_bed(id)?;

    if json {
        print_json(&serde_json::json!({
            "hospital": h,
            "activity": sim
                .session()
                .activity()
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    println!("ICU bed reserved at {}", h.name);
    println!("Remaining:   {} free, {} reserved", h.available_icu, h.reserved_icu);
    Ok(())
}
