use crate::error::{Result, TriageError};
use crate::types::{Availability, Language, Specialty};
use serde::{Deserialize, Serialize};

/// ICU beds knocked out of every hospital when disaster mode engages.
pub const SURGE_BED_LOSS: u32 = 5;

// ---------------------------------------------------------------------------
// Hospital
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: u32,
    pub name: String,
    pub name_ta: String,
    pub lat: f64,
    pub lng: f64,
    pub total_icu: u32,
    pub available_icu: u32,
    #[serde(default)]
    pub reserved_icu: u32,
    pub distance_km: f64,
    /// Drive time in seconds.
    pub eta_secs: u32,
    pub specialty: Specialty,
}

impl Hospital {
    pub fn availability(&self) -> Availability {
        Availability::from_free_beds(self.available_icu)
    }

    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name,
            Language::Ta => &self.name_ta,
        }
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_secs / 60
    }
}

#[allow(clippy::too_many_arguments)]
fn hospital(
    id: u32,
    name: &str,
    name_ta: &str,
    (lat, lng): (f64, f64),
    total_icu: u32,
    available_icu: u32,
    distance_km: f64,
    eta_secs: u32,
    specialty: Specialty,
) -> Hospital {
    Hospital {
        id,
        name: name.to_string(),
        name_ta: name_ta.to_string(),
        lat,
        lng,
        total_icu,
        available_icu,
        reserved_icu: 0,
        distance_km,
        eta_secs,
        specialty,
    }
}

/// Fixed Tamil Nadu government hospitals the demo starts with.
pub fn seed_hospitals() -> Vec<Hospital> {
    vec![
        hospital(1, "Chennai GH", "சென்னை GH", (13.0827, 80.2707), 50, 12, 8.5, 12, Specialty::Trauma),
        hospital(2, "Madurai GH", "மதுரை GH", (9.9252, 78.1198), 40, 5, 450.0, 480, Specialty::Cardiac),
        hospital(3, "Coimbatore GH", "கோயம்புத்தூர் GH", (11.0168, 76.9558), 35, 0, 500.0, 540, Specialty::Pediatric),
        hospital(4, "Trichy GH", "திருச்சி GH", (10.7905, 78.7047), 30, 8, 320.0, 360, Specialty::Trauma),
    ]
}

// ---------------------------------------------------------------------------
// HospitalFilter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HospitalFilter {
    pub available_only: bool,
    /// `None` matches every specialty.
    pub specialty: Option<Specialty>,
}

impl HospitalFilter {
    pub fn matches(&self, h: &Hospital) -> bool {
        if self.available_only && h.available_icu == 0 {
            return false;
        }
        match self.specialty {
            Some(s) => h.specialty == s,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// HospitalDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalDirectory {
    hospitals: Vec<Hospital>,
    selected: Option<u32>,
}

impl Default for HospitalDirectory {
    fn default() -> Self {
        Self::new(seed_hospitals())
    }
}

impl HospitalDirectory {
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self {
            hospitals,
            selected: None,
        }
    }

    pub fn get(&self, id: u32) -> Result<&Hospital> {
        self.hospitals
            .iter()
            .find(|h| h.id == id)
            .ok_or(TriageError::HospitalNotFound(id))
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Hospital> {
        self.hospitals
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(TriageError::HospitalNotFound(id))
    }

    pub fn filter(&self, filter: HospitalFilter) -> Vec<&Hospital> {
        self.hospitals.iter().filter(|h| filter.matches(h)).collect()
    }

    /// Closest hospital by road distance, regardless of beds.
    pub fn nearest(&self) -> Option<&Hospital> {
        self.hospitals
            .iter()
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
    }

    /// Closest hospital with at least one free ICU bed.
    pub fn nearest_available(&self) -> Option<&Hospital> {
        self.hospitals
            .iter()
            .filter(|h| h.available_icu > 0)
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
    }

    pub fn select(&mut self, id: u32) -> Result<&Hospital> {
        self.get(id)?;
        self.selected = Some(id);
        self.get(id)
    }

    pub fn selected(&self) -> Option<&Hospital> {
        self.selected.and_then(|id| self.get(id).ok())
    }

    /// Hold one free ICU bed at `id` for the incoming patient.
    pub fn reserve_icu_bed(&mut self, id: u32) -> Result<&Hospital> {
        let h = self.get_mut(id)?;
        if h.available_icu == 0 {
            return Err(TriageError::NoBedsAvailable(h.name.clone()));
        }
        h.available_icu -= 1;
        h.reserved_icu += 1;
        tracing::info!(hospital = %h.name, available = h.available_icu, "icu bed reserved");
        Ok(h)
    }

    /// Disaster mode: every hospital loses [`SURGE_BED_LOSS`] free beds.
    pub fn apply_surge(&mut self) {
        for h in &mut self.hospitals {
            h.available_icu = h.available_icu.saturating_sub(SURGE_BED_LOSS);
        }
    }

    pub fn total_available(&self) -> u32 {
        self.hospitals.iter().map(|h| h.available_icu).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
