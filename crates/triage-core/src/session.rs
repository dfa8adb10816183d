use crate::alert::{ActivityEntry, AlertEvent, AlertLog, BoundedLog};
use crate::config::Config;
use crate::flow::FlowSequencer;
use crate::forecast::DemandForecast;
use crate::hospital::HospitalDirectory;
use crate::random::RandomSource;
use crate::severity::{SeverityResult, ICU_THRESHOLD};
use crate::types::NetworkMode;
use crate::vitals::VitalsSample;
use crate::ward::{WardBoard, WardTotals};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// All mutable dashboard state for one run. Handlers receive it by
/// reference and change it only through the `record_*` / `set_*` methods.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) hospitals: HospitalDirectory,
    pub(crate) wards: WardBoard,
    pub(crate) forecast: DemandForecast,
    pub(crate) flow: FlowSequencer,
    vitals: Option<VitalsSample>,
    monitor_heart_rate: Option<f64>,
    severity: Option<SeverityResult>,
    critical_alert_raised: bool,
    alerts: AlertLog,
    activity: BoundedLog<ActivityEntry>,
    disaster_mode: bool,
    network: NetworkMode,
}

impl Session {
    pub fn new(config: &Config, rng: &mut dyn RandomSource) -> Self {
        Self {
            hospitals: HospitalDirectory::default(),
            wards: WardBoard::default(),
            forecast: DemandForecast::generate(rng),
            flow: FlowSequencer::new(
                &config.flow.stages,
                config.flow.tick_interval(),
                config.flow.effect_delay(),
            ),
            vitals: None,
            monitor_heart_rate: None,
            severity: None,
            critical_alert_raised: false,
            alerts: AlertLog::new(config.logs.alert_capacity),
            activity: BoundedLog::new(config.logs.activity_capacity),
            disaster_mode: false,
            network: NetworkMode::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn hospitals(&self) -> &HospitalDirectory {
        &self.hospitals
    }

    pub fn wards(&self) -> &WardBoard {
        &self.wards
    }

    pub fn forecast(&self) -> &DemandForecast {
        &self.forecast
    }

    pub fn flow(&self) -> &FlowSequencer {
        &self.flow
    }

    pub fn vitals(&self) -> Option<&VitalsSample> {
        self.vitals.as_ref()
    }

    pub fn monitor_heart_rate(&self) -> Option<f64> {
        self.monitor_heart_rate
    }

    pub fn severity(&self) -> Option<&SeverityResult> {
        self.severity.as_ref()
    }

    /// Last computed score, 0 before the first assessment.
    pub fn last_score(&self) -> u8 {
        self.severity.as_ref().map_or(0, |s| s.score)
    }

    pub fn critical_alert_raised(&self) -> bool {
        self.critical_alert_raised
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn activity(&self) -> &BoundedLog<ActivityEntry> {
        &self.activity
    }

    pub fn disaster_mode(&self) -> bool {
        self.disaster_mode
    }

    pub fn network(&self) -> NetworkMode {
        self.network
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            disaster_mode: self.disaster_mode,
            network: self.network,
            active_stage: self.flow.active_stage().to_string(),
            timeline_running: self.flow.is_running(),
            last_score: self.severity.as_ref().map(|s| s.score),
            recommended_ward: self
                .severity
                .as_ref()
                .map(|s| s.recommended_ward.label().to_string()),
            alerts: self.alerts.len(),
            unacknowledged_alerts: self.alerts.unacknowledged().count(),
            icu_beds_available: self.hospitals.total_available(),
            ward_totals: self.wards.totals(),
            peak_load: self.forecast.peak_load(),
            activity: self.activity.iter().map(|e| e.message.clone()).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    pub fn record_vitals(&mut self, sample: VitalsSample) {
        self.vitals = Some(sample);
    }

    pub fn record_heart_rate(&mut self, bpm: f64) {
        self.monitor_heart_rate = Some(bpm);
    }

    /// Store the latest result. Returns `true` exactly once per session: the
    /// first time a score crosses the ICU threshold.
    pub fn record_severity(&mut self, result: SeverityResult) -> bool {
        let fire = result.score > ICU_THRESHOLD && !self.critical_alert_raised;
        if fire {
            self.critical_alert_raised = true;
        }
        self.severity = Some(result);
        fire
    }

    pub fn record_alert(&mut self, event: AlertEvent) {
        self.alerts.push(event);
    }

    pub fn acknowledge_alert(&mut self, id: uuid::Uuid) -> crate::Result<()> {
        self.alerts.acknowledge(id)
    }

    pub fn record_activity(&mut self, entry: ActivityEntry) {
        self.activity.push(entry);
    }

    /// Returns `false` when already in the requested mode.
    pub fn set_disaster_mode(&mut self, on: bool) -> bool {
        let changed = self.disaster_mode != on;
        self.disaster_mode = on;
        changed
    }

    /// Returns `false` when already in the requested mode.
    pub fn set_network_mode(&mut self, mode: NetworkMode) -> bool {
        let changed = self.network != mode;
        self.network = mode;
        changed
    }
}

// ---------------------------------------------------------------------------
// SessionSummary
// ---------------------------------------------------------------------------

/// Flat end-of-run view for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub disaster_mode: bool,
    pub network: NetworkMode,
    pub active_stage: String,
    pub timeline_running: bool,
    pub last_score: Option<u8>,
    pub recommended_ward: Option<String>,
    pub alerts: usize,
    pub unacknowledged_alerts: usize,
    pub icu_beds_available: u32,
    pub ward_totals: WardTotals,
    pub peak_load: u32,
    /// Newest first.
    pub activity: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
