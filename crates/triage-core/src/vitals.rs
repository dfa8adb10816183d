use crate::error::{Result, TriageError};
use crate::random::RandomSource;
use crate::types::Profile;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// VitalsSample
// ---------------------------------------------------------------------------

/// One set of patient vital signs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsSample {
    /// Beats per minute.
    pub heart_rate: f64,
    /// mmHg.
    pub systolic_bp: f64,
    /// mmHg.
    pub diastolic_bp: f64,
    /// Oxygen saturation, percent.
    pub spo2: f64,
    pub temperature_c: f64,
}

impl VitalsSample {
    /// Build a sample from the `SYS/DIA` blood pressure notation used on the
    /// vitals cards.
    pub fn from_readings(heart_rate: f64, bp: &str, spo2: f64, temperature_c: f64) -> Result<Self> {
        let (systolic_bp, diastolic_bp) = parse_blood_pressure(bp)?;
        Ok(Self {
            heart_rate,
            systolic_bp,
            diastolic_bp,
            spo2,
            temperature_c,
        })
    }

    /// `"120/80"`.
    pub fn blood_pressure(&self) -> String {
        format!("{}/{}", self.systolic_bp, self.diastolic_bp)
    }

    /// Reject readings no living patient or working sensor produces.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, f64, f64, f64); 5] = [
            ("heart rate", self.heart_rate, 0.0, 350.0),
            ("systolic pressure", self.systolic_bp, 0.0, 350.0),
            ("diastolic pressure", self.diastolic_bp, 0.0, 250.0),
            ("SpO2", self.spo2, 0.0, 100.0),
            ("temperature", self.temperature_c, 20.0, 46.0),
        ];
        for (name, value, min, max) in checks {
            if !value.is_finite() {
                return Err(TriageError::InvalidInput(format!("{name} is not a finite number")));
            }
            if value < min || value > max {
                return Err(TriageError::InvalidInput(format!(
                    "{name} {value} outside physical range {min}-{max}"
                )));
            }
        }
        if self.diastolic_bp > self.systolic_bp {
            return Err(TriageError::InvalidInput(format!(
                "diastolic pressure {} exceeds systolic {}",
                self.diastolic_bp, self.systolic_bp
            )));
        }
        Ok(())
    }
}

impl fmt::Display for VitalsSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HR {} bpm, BP {} mmHg, SpO2 {}%, Temp {:.1}°C",
            self.heart_rate,
            self.blood_pressure(),
            self.spo2,
            self.temperature_c
        )
    }
}

/// Parse `"SYS/DIA"`, tolerating surrounding whitespace.
pub fn parse_blood_pressure(bp: &str) -> Result<(f64, f64)> {
    let invalid = || TriageError::InvalidBloodPressure(bp.to_string());
    let (sys, dia) = bp.split_once('/').ok_or_else(invalid)?;
    let sys: f64 = sys.trim().parse().map_err(|_| invalid())?;
    let dia: f64 = dia.trim().parse().map_err(|_| invalid())?;
    Ok((sys, dia))
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Half-open ranges each vital is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct VitalRanges {
    pub heart_rate: (f64, f64),
    pub systolic_bp: (f64, f64),
    pub diastolic_bp: (f64, f64),
    pub spo2: (f64, f64),
    pub temperature_c: (f64, f64),
}

impl VitalRanges {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Normal => Self {
                heart_rate: (60.0, 100.0),
                systolic_bp: (110.0, 140.0),
                diastolic_bp: (70.0, 90.0),
                spo2: (95.0, 100.0),
                temperature_c: (36.0, 38.0),
            },
            Profile::Critical => Self {
                heart_rate: (130.0, 150.0),
                systolic_bp: (160.0, 190.0),
                diastolic_bp: (100.0, 120.0),
                spo2: (85.0, 93.0),
                temperature_c: (38.5, 40.0),
            },
        }
    }
}

/// Draw a synthetic sample for `profile`.
///
/// Heart rate, pressures and SpO2 are whole numbers and temperature has one
/// decimal, as they appear on a bedside monitor. Truncation keeps every value
/// inside its half-open range.
pub fn generate(profile: Profile, rng: &mut dyn RandomSource) -> VitalsSample {
    let r = VitalRanges::for_profile(profile);
    let heart_rate = whole(rng, r.heart_rate);
    let systolic_bp = whole(rng, r.systolic_bp);
    let diastolic_bp = whole(rng, r.diastolic_bp);
    let spo2 = whole(rng, r.spo2);
    let (lo, hi) = r.temperature_c;
    let temperature_c = (rng.uniform(lo, hi) * 10.0).floor() / 10.0;
    VitalsSample {
        heart_rate,
        systolic_bp,
        diastolic_bp,
        spo2,
        temperature_c,
    }
}

fn whole(rng: &mut dyn RandomSource, (lo, hi): (f64, f64)) -> f64 {
    rng.uniform(lo, hi).floor()
}

/// Heart-rate-only reading pushed by the background monitor refresh.
pub fn monitor_heart_rate(rng: &mut dyn RandomSource) -> f64 {
    whole(rng, VitalRanges::for_profile(Profile::Normal).heart_rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    fn within(v: f64, (lo, hi): (f64, f64)) -> bool {
        v >= lo && v < hi
    }

    #[test]
    fn generated_samples_respect_profile_ranges() {
        let mut rng = SeededRandom::new(Some(11));
        for profile in [Profile::Normal, Profile::Critical] {
            let r = VitalRanges::for_profile(profile);
            for _ in 0..500 {
                let s = generate(profile, &mut rng);
                assert!(within(s.heart_rate, r.heart_rate), "{profile}: {s}");
                assert!(within(s.systolic_bp, r.systolic_bp), "{profile}: {s}");
                assert!(within(s.diastolic_bp, r.diastolic_bp), "{profile}: {s}");
                assert!(within(s.spo2, r.spo2), "{profile}: {s}");
                assert!(within(s.temperature_c, r.temperature_c), "{profile}: {s}");
                assert!(s.validate().is_ok());
            }
        }
    }

    #[test]
    fn upper_draw_stays_below_range_end() {
        let mut rng = ScriptedRandom::constant(0.999_999);
        let s = generate(Profile::Normal, &mut rng);
        assert_eq!(s.heart_rate, 99.0);
        assert_eq!(s.spo2, 99.0);
        assert_eq!(s.temperature_c, 37.9);
    }

    #[test]
    fn lowest_draw_hits_range_start() {
        let mut rng = ScriptedRandom::constant(0.0);
        let s = generate(Profile::Critical, &mut rng);
        assert_eq!(s.heart_rate, 130.0);
        assert_eq!(s.blood_pressure(), "160/100");
        assert_eq!(s.spo2, 85.0);
        assert_eq!(s.temperature_c, 38.5);
    }

    #[test]
    fn parses_blood_pressure() {
        assert_eq!(parse_blood_pressure("190/115").unwrap(), (190.0, 115.0));
        assert_eq!(parse_blood_pressure(" 120 / 80 ").unwrap(), (120.0, 80.0));
        assert!(matches!(
            parse_blood_pressure("120-80"),
            Err(TriageError::InvalidBloodPressure(_))
        ));
        assert!(parse_blood_pressure("abc/80").is_err());
    }

    #[test]
    fn validate_rejects_negative_heart_rate() {
        let s = VitalsSample::from_readings(-5.0, "120/80", 98.0, 36.8).unwrap();
        assert!(matches!(s.validate(), Err(TriageError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_nan() {
        let s = VitalsSample::from_readings(75.0, "120/80", f64::NAN, 36.8).unwrap();
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("SpO2"), "{err}");
    }

    #[test]
    fn validate_rejects_inverted_pressure() {
        let s = VitalsSample::from_readings(75.0, "80/120", 98.0, 36.8).unwrap();
        assert!(s.validate().is_err());
    }

    #[test]
    fn display_reads_like_monitor() {
        let s = VitalsSample::from_readings(75.0, "120/80", 98.0, 36.8).unwrap();
        assert_eq!(s.to_string(), "HR 75 bpm, BP 120/80 mmHg, SpO2 98%, Temp 36.8°C");
    }
}
