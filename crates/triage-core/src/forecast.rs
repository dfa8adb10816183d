use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

pub const FORECAST_HOURS: usize = 12;
/// Hours with observed occupancy; the rest are forecast only.
pub const OBSERVED_HOURS: usize = 6;

// ---------------------------------------------------------------------------
// DemandForecast
// ---------------------------------------------------------------------------

/// Synthetic ICU occupancy, percent, for the next twelve hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub actual: Vec<Option<f64>>,
    pub predicted: Vec<f64>,
    pub surge: bool,
}

impl DemandForecast {
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let mut actual = Vec::with_capacity(FORECAST_HOURS);
        let mut predicted = Vec::with_capacity(FORECAST_HOURS);
        for hour in 0..FORECAST_HOURS {
            actual.push(if hour < OBSERVED_HOURS {
                Some(rng.uniform(60.0, 80.0))
            } else {
                None
            });
            let late_bump = if hour > OBSERVED_HOURS { 10.0 } else { 0.0 };
            predicted.push(rng.uniform(65.0, 90.0) + late_bump);
        }
        Self {
            actual,
            predicted,
            surge: false,
        }
    }

    /// Replace the latest observation with a fresh reading.
    pub fn refresh(&mut self, rng: &mut dyn RandomSource) {
        if let Some(slot) = self.actual.get_mut(OBSERVED_HOURS - 1) {
            *slot = Some(rng.uniform(60.0, 80.0));
        }
    }

    /// Disaster spike: late-hour predictions jump to 85-100%.
    pub fn apply_surge(&mut self, rng: &mut dyn RandomSource) {
        for v in self.predicted.iter_mut().skip(OBSERVED_HOURS + 1) {
            *v = rng.uniform(85.0, 100.0);
        }
        self.surge = true;
    }

    /// Clears the warning banner. The spiked predictions stay until the next
    /// full regeneration.
    pub fn clear_surge(&mut self) {
        self.surge = false;
    }

    /// Peak ICU load shown under the chart, percent.
    pub fn peak_load(&self) -> u32 {
        if self.surge {
            94
        } else {
            72
        }
    }

    /// Extra staff suggested for the peak.
    pub fn staff_needed(&self) -> u32 {
        if self.surge {
            12
        } else {
            3
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
