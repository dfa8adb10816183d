use crate::error::Result;
use crate::random::RandomSource;
use crate::types::Ward;
use crate::vitals::VitalsSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores above this recommend ICU admission and raise the critical alert.
pub const ICU_THRESHOLD: u8 = 70;
/// Scores above this (and at most [`ICU_THRESHOLD`]) recommend the trauma ward.
pub const TRAUMA_THRESHOLD: u8 = 40;
pub const MAX_SCORE: u32 = 100;
pub const DEFAULT_JITTER: f64 = 5.0;

// ---------------------------------------------------------------------------
// Vital / Level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vital {
    HeartRate,
    BloodPressure,
    Spo2,
    Temperature,
}

impl Vital {
    pub fn as_str(self) -> &'static str {
        match self {
            Vital::HeartRate => "heart_rate",
            Vital::BloodPressure => "blood_pressure",
            Vital::Spo2 => "spo2",
            Vital::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Vital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Normal,
    Moderate,
    Severe,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Normal => "normal",
            Level::Moderate => "moderate",
            Level::Severe => "severe",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Contribution
// ---------------------------------------------------------------------------

/// Points one vital adds to the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub vital: Vital,
    pub level: Level,
    pub points: u32,
}

impl Contribution {
    fn new(vital: Vital, level: Level) -> Self {
        let points = match (vital, level) {
            (_, Level::Normal) => 0,
            (_, Level::Severe) => 25,
            (Vital::Temperature, Level::Moderate) => 10,
            (_, Level::Moderate) => 15,
        };
        Self {
            vital,
            level,
            points,
        }
    }
}

fn heart_rate_level(hr: f64) -> Level {
    if !(50.0..=120.0).contains(&hr) {
        Level::Severe
    } else if !(60.0..=100.0).contains(&hr) {
        Level::Moderate
    } else {
        Level::Normal
    }
}

fn blood_pressure_level(sys: f64, dia: f64) -> Level {
    if sys > 180.0 || sys < 90.0 || dia > 110.0 || dia < 60.0 {
        Level::Severe
    } else if sys > 140.0 || sys < 110.0 || dia > 90.0 || dia < 70.0 {
        Level::Moderate
    } else {
        Level::Normal
    }
}

fn spo2_level(spo2: f64) -> Level {
    if spo2 < 90.0 {
        Level::Severe
    } else if spo2 < 95.0 {
        Level::Moderate
    } else {
        Level::Normal
    }
}

fn temperature_level(t: f64) -> Level {
    if !(35.0..=39.0).contains(&t) {
        Level::Severe
    } else if !(36.0..=38.0).contains(&t) {
        Level::Moderate
    } else {
        Level::Normal
    }
}

/// Per-vital breakdown, in display order.
pub fn assess(sample: &VitalsSample) -> [Contribution; 4] {
    [
        Contribution::new(Vital::HeartRate, heart_rate_level(sample.heart_rate)),
        Contribution::new(
            Vital::BloodPressure,
            blood_pressure_level(sample.systolic_bp, sample.diastolic_bp),
        ),
        Contribution::new(Vital::Spo2, spo2_level(sample.spo2)),
        Contribution::new(Vital::Temperature, temperature_level(sample.temperature_c)),
    ]
}

/// Sum of per-vital points, capped at [`MAX_SCORE`]. No jitter.
pub fn raw_score(sample: &VitalsSample) -> u32 {
    capped_sum(&assess(sample))
}

fn capped_sum(contributions: &[Contribution]) -> u32 {
    contributions
        .iter()
        .map(|c| c.points)
        .sum::<u32>()
        .min(MAX_SCORE)
}

/// Step function from score to ward.
pub fn recommend_ward(score: u8) -> Ward {
    if score > ICU_THRESHOLD {
        Ward::Icu
    } else if score > TRAUMA_THRESHOLD {
        Ward::Trauma
    } else {
        Ward::General
    }
}

// ---------------------------------------------------------------------------
// SeverityResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityResult {
    /// Final score, 0-100, after jitter.
    pub score: u8,
    /// Capped point sum before jitter.
    pub raw_score: u32,
    pub recommended_ward: Ward,
    /// Cosmetic 85-95% figure shown beside the meter. Not derived from the
    /// vitals and not a real uncertainty estimate.
    pub confidence: f64,
    /// ICU risk indicator in percent.
    pub icu_risk: f64,
    pub contributions: Vec<Contribution>,
}

impl SeverityResult {
    pub fn is_critical(&self) -> bool {
        self.score > ICU_THRESHOLD
    }
}

// ---------------------------------------------------------------------------
// SeverityScorer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SeverityScorer {
    jitter: f64,
}

impl Default for SeverityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER)
    }
}

impl SeverityScorer {
    /// `jitter` bounds the uniform noise added to the raw score, in points.
    pub fn new(jitter: f64) -> Self {
        Self {
            jitter: jitter.abs(),
        }
    }

    /// Score `sample`. Draws the jitter first, then the confidence figure.
    pub fn score(&self, sample: &VitalsSample, rng: &mut dyn RandomSource) -> Result<SeverityResult> {
        sample.validate()?;

        let contributions = assess(sample);
        let raw = capped_sum(&contributions);
        let noise = rng.uniform(-self.jitter, self.jitter);
        let score = (raw as f64 + noise).clamp(0.0, MAX_SCORE as f64).round() as u8;
        let confidence = rng.uniform(85.0, 95.0);

        Ok(SeverityResult {
            score,
            raw_score: raw,
            recommended_ward: recommend_ward(score),
            confidence,
            icu_risk: score as f64 * 0.8,
            contributions: contributions
                .into_iter()
                .filter(|c| c.points > 0)
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
