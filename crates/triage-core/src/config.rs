use crate::error::Result;
use crate::types::Stage;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const CONFIG_FILE: &str = "triage.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FlowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_effect_delay")]
    pub effect_delay_ms: u64,
    /// Pause between session start and the first timeline run.
    #[serde(default = "default_start_delay")]
    pub start_delay_ms: u64,
    #[serde(default = "default_stages")]
    pub stages: Vec<Stage>,
}

fn default_tick_interval() -> u64 {
    2000
}

fn default_effect_delay() -> u64 {
    500
}

fn default_start_delay() -> u64 {
    2000
}

fn default_stages() -> Vec<Stage> {
    Stage::all().to_vec()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            effect_delay_ms: default_effect_delay(),
            start_delay_ms: default_start_delay(),
            stages: default_stages(),
        }
    }
}

impl FlowConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn effect_delay(&self) -> Duration {
        Duration::from_millis(self.effect_delay_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// SeverityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityConfig {
    /// Half-width of the uniform noise added to the raw score.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Delay before the doctor is paged for a critical score.
    #[serde(default = "default_alert_delay")]
    pub alert_delay_ms: u64,
}

fn default_jitter() -> f64 {
    crate::severity::DEFAULT_JITTER
}

fn default_alert_delay() -> u64 {
    500
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            jitter: default_jitter(),
            alert_delay_ms: default_alert_delay(),
        }
    }
}

impl SeverityConfig {
    pub fn alert_delay(&self) -> Duration {
        Duration::from_millis(self.alert_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// BackgroundConfig
// ---------------------------------------------------------------------------

/// Periodic refreshers. A gate of `g` means the refresh only takes effect
/// when a uniform draw exceeds `g`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_vitals_interval")]
    pub vitals_interval_ms: u64,
    #[serde(default = "default_vitals_gate")]
    pub vitals_gate: f64,
    #[serde(default = "default_occupancy_interval")]
    pub occupancy_interval_ms: u64,
    #[serde(default = "default_occupancy_gate")]
    pub occupancy_gate: f64,
    #[serde(default = "default_forecast_interval")]
    pub forecast_interval_ms: u64,
}

fn default_vitals_interval() -> u64 {
    5000
}

fn default_vitals_gate() -> f64 {
    0.7
}

fn default_occupancy_interval() -> u64 {
    15000
}

fn default_occupancy_gate() -> f64 {
    0.8
}

fn default_forecast_interval() -> u64 {
    10000
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            vitals_interval_ms: default_vitals_interval(),
            vitals_gate: default_vitals_gate(),
            occupancy_interval_ms: default_occupancy_interval(),
            occupancy_gate: default_occupancy_gate(),
            forecast_interval_ms: default_forecast_interval(),
        }
    }
}

impl BackgroundConfig {
    pub fn vitals_interval(&self) -> Duration {
        Duration::from_millis(self.vitals_interval_ms)
    }

    pub fn occupancy_interval(&self) -> Duration {
        Duration::from_millis(self.occupancy_interval_ms)
    }

    pub fn forecast_interval(&self) -> Duration {
        Duration::from_millis(self.forecast_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// LogConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_activity_capacity")]
    pub activity_capacity: usize,
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,
}

fn default_activity_capacity() -> usize {
    crate::alert::DEFAULT_ACTIVITY_CAPACITY
}

fn default_alert_capacity() -> usize {
    crate::alert::DEFAULT_ALERT_CAPACITY
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            activity_capacity: default_activity_capacity(),
            alert_capacity: default_alert_capacity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub severity: SeverityConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub logs: LogConfig,
    /// Fixed seed for a reproducible session. Entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    /// Load from `path`. A missing file yields the defaults; a present but
    /// malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Write atomically through a tempfile in the target directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => {
                std::fs::create_dir_all(p)?;
                p
            }
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Periodic timers must make progress
        let intervals = [
            ("flow.tick_interval_ms", self.flow.tick_interval_ms),
            ("background.vitals_interval_ms", self.background.vitals_interval_ms),
            ("background.occupancy_interval_ms", self.background.occupancy_interval_ms),
            ("background.forecast_interval_ms", self.background.forecast_interval_ms),
        ];
        for (name, ms) in intervals {
            if ms == 0 {
                warnings.push(ConfigWarning::error(format!("{name} must be greater than 0")));
            }
        }

        // 2. Effects that land after the next tick look out of order
        if self.flow.effect_delay_ms >= self.flow.tick_interval_ms && self.flow.tick_interval_ms > 0 {
            warnings.push(ConfigWarning::warning(format!(
                "flow.effect_delay_ms ({}) is not shorter than flow.tick_interval_ms ({})",
                self.flow.effect_delay_ms, self.flow.tick_interval_ms
            )));
        }

        // 3. Timeline needs a start and an end
        if self.flow.stages.len() < 2 {
            warnings.push(ConfigWarning::error(format!(
                "flow.stages needs at least 2 stages, got {}",
                self.flow.stages.len()
            )));
        }
        for (i, stage) in self.flow.stages.iter().enumerate() {
            if self.flow.stages[..i].contains(stage) {
                warnings.push(ConfigWarning::warning(format!(
                    "flow.stages lists '{stage}' more than once"
                )));
            }
        }

        // 4. Gates are probabilities
        let gates = [
            ("background.vitals_gate", self.background.vitals_gate),
            ("background.occupancy_gate", self.background.occupancy_gate),
        ];
        for (name, g) in gates {
            if !(0.0..=1.0).contains(&g) {
                warnings.push(ConfigWarning::error(format!("{name} must be within 0-1, got {g}")));
            } else if g >= 1.0 {
                warnings.push(ConfigWarning::warning(format!("{name} of 1 disables the refresh")));
            }
        }

        // 5. Jitter
        if !self.severity.jitter.is_finite() || self.severity.jitter < 0.0 {
            warnings.push(ConfigWarning::error(format!(
                "severity.jitter must be a non-negative number, got {}",
                self.severity.jitter
            )));
        } else if self.severity.jitter > 50.0 {
            warnings.push(ConfigWarning::warning(format!(
                "severity.jitter of {} swamps the vitals score",
                self.severity.jitter
            )));
        }

        // 6. Log capacities
        if self.logs.activity_capacity == 0 {
            warnings.push(ConfigWarning::warning("logs.activity_capacity of 0 is treated as 1"));
        }
        if self.logs.alert_capacity == 0 {
            warnings.push(ConfigWarning::warning("logs.alert_capacity of 0 is treated as 1"));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg.flow.tick_interval_ms, 2000);
        assert_eq!(cfg.flow.stages.len(), 4);
        assert_eq!(cfg.severity.jitter, 5.0);
        assert_eq!(cfg.background.occupancy_gate, 0.8);
        assert_eq!(cfg.logs.activity_capacity, 5);
        assert!(cfg.seed.is_none());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "seed: 42\nflow:\n  tick_interval_ms: 1000\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.flow.tick_interval_ms, 1000);
        assert_eq!(cfg.flow.effect_delay_ms, 500);
        assert_eq!(cfg.background.vitals_interval_ms, 5000);
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "flow: [not, a, map]\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut cfg = Config::default();
        cfg.seed = Some(7);
        cfg.flow.stages = vec![Stage::Dispatch, Stage::Arrived];
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.flow.stages, vec![Stage::Dispatch, Stage::Arrived]);
    }

    #[test]
    fn validate_flags_zero_interval_and_bad_gate() {
        let mut cfg = Config::default();
        cfg.background.vitals_interval_ms = 0;
        cfg.background.occupancy_gate = 1.5;
        let warnings = cfg.validate();
        let errors: Vec<&ConfigWarning> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("vitals_interval_ms"));
        assert!(errors[1].message.contains("occupancy_gate"));
    }

    #[test]
    fn validate_flags_short_stage_list() {
        let mut cfg = Config::default();
        cfg.flow.stages = vec![Stage::Dispatch];
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("at least 2")));
    }

    #[test]
    fn validate_warns_on_duplicate_stage_and_slow_effect() {
        let mut cfg = Config::default();
        cfg.flow.stages = vec![Stage::Dispatch, Stage::EnRoute, Stage::EnRoute];
        cfg.flow.effect_delay_ms = 3000;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
    }

    #[test]
    fn validate_rejects_negative_jitter() {
        let mut cfg = Config::default();
        cfg.severity.jitter = -1.0;
        assert!(cfg.validate().iter().any(|w| w.message.contains("jitter")));
    }
}
