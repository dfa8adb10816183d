//! Event loop tying the dashboard together.
//!
//! [`Simulation`] owns the session state, a virtual-time [`TimerQueue`] and
//! the injected collaborators. Nothing here sleeps: a driver either
//! fast-forwards with [`Simulation::advance_to`] or waits in real time until
//! [`Simulation::next_deadline`] and then advances.

use crate::alert::{ActivityEntry, AlertEvent, NotificationSink, NullSink};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, WarnLevel};
use crate::error::{Result, TriageError};
use crate::event::Event;
use crate::hospital::Hospital;
use crate::random::{RandomSource, SeededRandom};
use crate::render::{NoopRenderer, Renderer};
use crate::scheduler::{Scheduler, TimerId, TimerQueue};
use crate::session::Session;
use crate::severity::{SeverityResult, SeverityScorer};
use crate::types::{NetworkMode, Profile, Role};
use crate::vitals::{self, VitalsSample};
use std::time::Duration;
use uuid::Uuid;

pub struct Simulation {
    config: Config,
    session: Session,
    queue: TimerQueue<Event>,
    scorer: SeverityScorer,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    renderer: Box<dyn Renderer>,
    sink: Box<dyn NotificationSink>,
    started: bool,
}

impl Simulation {
    /// Fails with [`TriageError::InvalidInput`] on the first error-level
    /// config warning. A zero interval would re-arm its timer at the same
    /// instant and `advance_to` would never return.
    pub fn new(
        config: Config,
        mut rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
        renderer: Box<dyn Renderer>,
        sink: Box<dyn NotificationSink>,
    ) -> Result<Self> {
        if let Some(w) = config
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            return Err(TriageError::InvalidInput(format!("config: {}", w.message)));
        }
        let session = Session::new(&config, rng.as_mut());
        let scorer = SeverityScorer::new(config.severity.jitter);
        Ok(Self {
            config,
            session,
            queue: TimerQueue::new(),
            scorer,
            rng,
            clock,
            renderer,
            sink,
            started: false,
        })
    }

    /// Seeded from `config.seed`, wall clock, no presentation.
    pub fn headless(config: Config) -> Result<Self> {
        let rng = SeededRandom::new(config.seed);
        Self::new(
            config,
            Box::new(rng),
            Box::new(SystemClock),
            Box::new(NoopRenderer),
            Box::new(NullSink),
        )
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Virtual time since the simulation was created.
    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Arm the background refreshers and the first timeline run. Calling it
    /// again has no effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let bg = &self.config.background;
        self.queue.schedule(self.config.flow.start_delay(), Event::StartFlow);
        self.queue.schedule(bg.vitals_interval(), Event::VitalsRefresh);
        self.queue.schedule(bg.occupancy_interval(), Event::OccupancyWalk);
        self.queue.schedule(bg.forecast_interval(), Event::ForecastRefresh);
        tracing::info!(seed = ?self.config.seed, "simulation started");
    }

    pub fn advance_by(&mut self, d: Duration) -> usize {
        let until = self.queue.now() + d;
        self.advance_to(until)
    }

    /// Dispatch every event due at or before `until`, in deadline order, then
    /// move virtual time to `until`. Returns the number of events handled.
    pub fn advance_to(&mut self, until: Duration) -> usize {
        let mut handled = 0;
        while let Some((id, event)) = self.queue.pop_due(until) {
            self.dispatch(id, event);
            handled += 1;
        }
        self.queue.advance_to(until);
        handled
    }

    fn dispatch(&mut self, id: TimerId, event: Event) {
        tracing::debug!(event = event.as_str(), at_ms = self.queue.now().as_millis() as u64, "dispatch");
        match event {
            Event::StartFlow => self.restart_flow(),
            Event::FlowTick => {
                let at = self.clock.now();
                if self
                    .session
                    .flow
                    .on_tick(id, at, &mut self.queue)
                    .is_some()
                {
                    self.render_timeline();
                }
            }
            Event::AssessPatient(profile) => {
                if let Err(e) = self.assess(profile) {
                    tracing::warn!(error = %e, "patient assessment failed");
                }
            }
            Event::NotifyCareTeam => {
                if self.session.last_score() > crate::severity::ICU_THRESHOLD {
                    self.raise_alert(Role::Doctor);
                    self.raise_alert(Role::Nurse);
                }
            }
            Event::RaiseAlert(role) => {
                self.raise_alert(role);
            }
            Event::VitalsRefresh => {
                if self.rng.next_f64() > self.config.background.vitals_gate {
                    let bpm = vitals::monitor_heart_rate(self.rng.as_mut());
                    self.session.record_heart_rate(bpm);
                    self.renderer.heart_rate(bpm);
                }
                let every = self.config.background.vitals_interval();
                self.queue.schedule(every, Event::VitalsRefresh);
            }
            Event::OccupancyWalk => {
                if self.rng.next_f64() > self.config.background.occupancy_gate {
                    if let Some(change) = self.session.wards.random_walk(self.rng.as_mut()) {
                        tracing::debug!(?change, "ward occupancy changed");
                    }
                    self.renderer.wards(&self.session.wards);
                }
                let every = self.config.background.occupancy_interval();
                self.queue.schedule(every, Event::OccupancyWalk);
            }
            Event::ForecastRefresh => {
                self.session.forecast.refresh(self.rng.as_mut());
                self.renderer.forecast(&self.session.forecast);
                let every = self.config.background.forecast_interval();
                self.queue.schedule(every, Event::ForecastRefresh);
            }
        }
    }

    fn render_timeline(&mut self) {
        let snapshot = self.session.flow.snapshot(self.queue.now());
        self.renderer.timeline(&snapshot);
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Cancel any running timeline and start it again from the first stage.
    pub fn restart_flow(&mut self) {
        self.session.flow.restart(&mut self.queue);
        self.render_timeline();
    }

    /// Generate vitals for `profile` and score them.
    pub fn assess(&mut self, profile: Profile) -> Result<SeverityResult> {
        let sample = vitals::generate(profile, self.rng.as_mut());
        self.score_sample(sample)
    }

    /// Score `sample` and record it. A first critical score pages the doctor
    /// after the configured alert delay.
    pub fn score_sample(&mut self, sample: VitalsSample) -> Result<SeverityResult> {
        let result = self.scorer.score(&sample, self.rng.as_mut())?;
        self.session.record_vitals(sample);
        self.renderer.severity(&sample, &result);
        self.log(format!(
            "Severity calculated: {}/100 - {} recommended",
            result.score,
            result.recommended_ward.label()
        ));
        if self.session.record_severity(result.clone()) {
            tracing::info!(score = result.score, "critical score, paging doctor");
            self.queue
                .schedule(self.config.severity.alert_delay(), Event::RaiseAlert(Role::Doctor));
        }
        Ok(result)
    }

    /// Page `role` now.
    pub fn raise_alert(&mut self, role: Role) -> AlertEvent {
        let event = AlertEvent::for_role(role, self.clock.now());
        self.sink.alert(&event);
        self.session.record_alert(event.clone());
        self.log(format!("SMS Alert sent to {role}"));
        event
    }

    pub fn acknowledge_alert(&mut self, id: Uuid) -> Result<()> {
        self.session.acknowledge_alert(id)
    }

    /// Switch disaster mode. Entering it assesses a critical patient, spikes
    /// the forecast and knocks beds out of every hospital; leaving it
    /// assesses a normal patient and clears the forecast warning. Returns
    /// `false` when already in the requested mode.
    pub fn set_disaster_mode(&mut self, on: bool) -> Result<bool> {
        if !self.session.set_disaster_mode(on) {
            return Ok(false);
        }
        tracing::info!(on, "disaster mode");
        if on {
            self.assess(Profile::Critical)?;
            self.session.forecast.apply_surge(self.rng.as_mut());
            self.sink.notice(
                "Disaster Mode Activated",
                "Emergency protocols engaged. All hospitals on high alert.",
            );
            self.session.hospitals.apply_surge();
        } else {
            self.assess(Profile::Normal)?;
            self.session.forecast.clear_surge();
        }
        self.renderer.forecast(&self.session.forecast);
        self.renderer.hospitals(&self.session.hospitals);
        Ok(true)
    }

    /// Switch between internet and mesh fallback. Returns `false` when
    /// already in the requested mode.
    pub fn set_network_mode(&mut self, mode: NetworkMode) -> bool {
        if !self.session.set_network_mode(mode) {
            return false;
        }
        tracing::info!(mode = %mode, "network mode");
        match mode {
            NetworkMode::Mesh => {
                self.log("Internet connection lost. Switched to mesh network mode.");
                self.sink
                    .notice("Network Alert", "Internet connection failed. Mesh network activated.");
            }
            NetworkMode::Online => {
                self.log("Internet connection restored. Normal operations resumed.");
            }
        }
        true
    }

    pub fn select_hospital(&mut self, id: u32) -> Result<Hospital> {
        let h = self.session.hospitals.select(id)?.clone();
        self.renderer.hospitals(&self.session.hospitals);
        Ok(h)
    }

    /// Select the closest hospital that still has a free ICU bed.
    pub fn locate_nearest(&mut self) -> Option<Hospital> {
        let id = self.session.hospitals.nearest_available()?.id;
        self.select_hospital(id).ok()
    }

    /// Reserve one ICU bed at hospital `id`, selecting it first.
    pub fn reserve_bed(&mut self, id: u32) -> Result<Hospital> {
        self.session.hospitals.select(id)?;
        let h = self.session.hospitals.reserve_icu_bed(id)?.clone();
        self.sink
            .notice("Bed Reserved", &format!("ICU bed reserved at {}", h.name));
        self.log(format!("Bed reserved at {}", h.name));
        self.renderer.hospitals(&self.session.hospitals);
        Ok(h)
    }

    fn log(&mut self, message: impl Into<String>) {
        let entry = ActivityEntry::new(self.clock.now(), message);
        self.sink.log(&entry);
        self.session.record_activity(entry);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::flow::TimelineSnapshot;
    use crate::random::ScriptedRandom;
    use crate::types::{StepStatus, Ward};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        alerts: Vec<Role>,
        logs: Vec<String>,
        notices: Vec<String>,
        scores: Vec<u8>,
        timelines: Vec<TimelineSnapshot>,
        heart_rates: Vec<f64>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Recorded>>);

    impl NotificationSink for Recorder {
        fn alert(&mut self, event: &AlertEvent) {
            self.0.borrow_mut().alerts.push(event.role);
        }

        fn log(&mut self, entry: &ActivityEntry) {
            self.0.borrow_mut().logs.push(entry.message.clone());
        }

        fn notice(&mut self, title: &str, _message: &str) {
            self.0.borrow_mut().notices.push(title.to_string());
        }
    }

    impl Renderer for Recorder {
        fn severity(&mut self, _sample: &VitalsSample, result: &SeverityResult) {
            self.0.borrow_mut().scores.push(result.score);
        }

        fn timeline(&mut self, snapshot: &TimelineSnapshot) {
            self.0.borrow_mut().timelines.push(snapshot.clone());
        }

        fn heart_rate(&mut self, bpm: f64) {
            self.0.borrow_mut().heart_rates.push(bpm);
        }
    }

    /// Background refreshers pushed far out so only the timeline runs.
    fn quiet_config() -> Config {
        let mut cfg = Config::default();
        cfg.background.vitals_interval_ms = 3_600_000;
        cfg.background.occupancy_interval_ms = 3_600_000;
        cfg.background.forecast_interval_ms = 3_600_000;
        cfg
    }

    fn sim(cfg: Config, draws: Vec<f64>) -> (Simulation, Recorder) {
        let rec = Recorder::default();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
        let sim = Simulation::new(
            cfg,
            Box::new(ScriptedRandom::new(draws)),
            Box::new(clock),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
        )
        .unwrap();
        (sim, rec)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timeline_starts_after_start_delay() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        s.start();
        s.advance_to(ms(1999));
        assert!(!s.session().flow().is_running());
        s.advance_to(ms(2000));
        assert!(s.session().flow().is_running());
        assert_eq!(rec.0.borrow().timelines.len(), 1);
        assert_eq!(s.next_deadline(), Some(ms(4000)));
    }

    #[test]
    fn start_is_idempotent() {
        let (mut s, _) = sim(quiet_config(), vec![0.5]);
        s.start();
        let pending = s.pending_events();
        s.start();
        assert_eq!(s.pending_events(), pending);
    }

    #[test]
    fn full_run_with_normal_patient() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        s.start();
        s.advance_to(ms(20_000));

        let flow = s.session().flow();
        assert_eq!(flow.active_index(), 3);
        assert!(!flow.is_running());
        assert!(flow.steps()[..3]
            .iter()
            .all(|st| st.status == StepStatus::Completed));

        // mid-range draws give a healthy patient
        let rec = rec.0.borrow();
        assert_eq!(rec.scores, vec![0]);
        assert!(rec.alerts.is_empty());
        assert_eq!(
            rec.logs,
            vec!["Severity calculated: 0/100 - General Ward recommended"]
        );
        assert_eq!(s.session().severity().unwrap().recommended_ward, Ward::General);
    }

    #[test]
    fn critical_score_pages_doctor_once() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        let sample = VitalsSample::from_readings(140.0, "190/115", 80.0, 39.5).unwrap();
        let result = s.score_sample(sample).unwrap();
        assert_eq!(result.score, 100);
        assert!(s.session().critical_alert_raised());

        // doctor page is delayed
        assert!(rec.0.borrow().alerts.is_empty());
        s.advance_by(ms(500));
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor]);

        // a second critical score does not page again
        s.score_sample(sample).unwrap();
        s.advance_by(ms(500));
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor]);
    }

    #[test]
    fn healthy_reassessment_suppresses_care_team_page() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        s.start();
        let sample = VitalsSample::from_readings(140.0, "190/115", 80.0, 39.5).unwrap();
        s.score_sample(sample).unwrap();
        s.advance_to(ms(1000));
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor]);

        // mid-timeline assessment replaces the score with a healthy one
        s.advance_to(ms(20_000));
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor]);
        assert_eq!(s.session().last_score(), 0);
    }

    #[test]
    fn notify_care_team_uses_last_score() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        let sample = VitalsSample::from_readings(140.0, "190/115", 80.0, 39.5).unwrap();
        s.score_sample(sample).unwrap();
        s.queue.schedule(Duration::ZERO, Event::NotifyCareTeam);
        s.advance_by(Duration::ZERO);
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor, Role::Nurse]);
        assert_eq!(s.session().alerts().count_for(Role::Nurse), 1);
        assert_eq!(
            rec.0.borrow().logs.last().map(String::as_str),
            Some("SMS Alert sent to nurse")
        );
    }

    #[test]
    fn critical_patient_pages_care_team_on_arrival() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        s.start();
        s.advance_to(ms(5000));
        assert_eq!(s.session().flow().active_index(), 1);

        // patient deteriorates after the en-route assessment
        s.set_disaster_mode(true).unwrap();
        s.advance_to(ms(8499));
        assert_eq!(s.session().flow().active_index(), 3);
        assert_eq!(rec.0.borrow().alerts, vec![Role::Doctor]);

        s.advance_to(ms(8500));
        assert_eq!(
            rec.0.borrow().alerts,
            vec![Role::Doctor, Role::Doctor, Role::Nurse]
        );
        assert_eq!(s.session().alerts().count_for(Role::Nurse), 1);
    }

    #[test]
    fn zero_background_interval_is_rejected() {
        for field in ["vitals", "occupancy", "forecast"] {
            let mut cfg = Config::default();
            match field {
                "vitals" => cfg.background.vitals_interval_ms = 0,
                "occupancy" => cfg.background.occupancy_interval_ms = 0,
                _ => cfg.background.forecast_interval_ms = 0,
            }
            let err = Simulation::headless(cfg).err().unwrap();
            assert!(matches!(err, TriageError::InvalidInput(_)), "{field}: {err}");
        }
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut cfg = quiet_config();
        cfg.flow.tick_interval_ms = 0;
        assert!(Simulation::headless(cfg).is_err());
    }

    #[test]
    fn restart_mid_run_cancels_previous_sequence() {
        let (mut s, _) = sim(quiet_config(), vec![0.5]);
        s.start();
        s.advance_to(ms(6000));
        assert_eq!(s.session().flow().active_index(), 2);

        s.restart_flow();
        assert_eq!(s.session().flow().active_index(), 0);
        s.advance_to(ms(8000));
        assert_eq!(s.session().flow().active_index(), 1);
        s.advance_to(ms(30_000));
        assert_eq!(s.session().flow().active_index(), 3);
    }

    #[test]
    fn vitals_refresh_is_gated() {
        let mut cfg = quiet_config();
        cfg.background.vitals_interval_ms = 5000;
        cfg.flow.start_delay_ms = 3_600_000;
        // 18 forecast draws, then gate 0.9 passes, bpm draw 0.5 -> 80
        let mut draws = vec![0.5; 18];
        draws.extend([0.9, 0.5, 0.1]);
        let (mut s, rec) = sim(cfg, draws);
        s.start();
        s.advance_to(ms(5000));
        assert_eq!(rec.0.borrow().heart_rates, vec![80.0]);
        assert_eq!(s.session().monitor_heart_rate(), Some(80.0));

        // gate 0.1 fails, nothing rendered but timer re-armed
        s.advance_to(ms(10_000));
        assert_eq!(rec.0.borrow().heart_rates.len(), 1);
        assert_eq!(s.next_deadline(), Some(ms(15_000)));
    }

    #[test]
    fn occupancy_walk_conserves_beds() {
        let mut cfg = quiet_config();
        cfg.background.occupancy_interval_ms = 1000;
        cfg.background.occupancy_gate = 0.0;
        cfg.flow.start_delay_ms = 3_600_000;
        let rng = SeededRandom::new(Some(3));
        let mut s = Simulation::new(
            cfg,
            Box::new(rng),
            Box::new(SystemClock),
            Box::new(NoopRenderer),
            Box::new(NullSink),
        )
        .unwrap();
        let before = s.session().wards().totals();
        s.start();
        s.advance_to(ms(100_000));
        let after = s.session().wards().totals();
        assert_eq!(before.total, after.total);
        assert_eq!(before.occupied + before.available, after.occupied + after.available);
    }

    #[test]
    fn disaster_mode_round_trip() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        assert!(s.set_disaster_mode(true).unwrap());
        assert!(!s.set_disaster_mode(true).unwrap());
        assert!(s.session().disaster_mode());
        assert!(s.session().forecast().surge);
        assert_eq!(s.session().hospitals().total_available(), 10);
        assert!(s.session().last_score() > 70);
        assert_eq!(rec.0.borrow().notices, vec!["Disaster Mode Activated"]);

        assert!(s.set_disaster_mode(false).unwrap());
        assert!(!s.session().forecast().surge);
        assert!(s.session().last_score() <= 5);
        // beds lost to the surge stay lost
        assert_eq!(s.session().hospitals().total_available(), 10);
    }

    #[test]
    fn network_mode_logs_transitions() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        assert!(!s.set_network_mode(NetworkMode::Online));
        assert!(s.set_network_mode(NetworkMode::Mesh));
        assert!(s.set_network_mode(NetworkMode::Online));
        let rec = rec.0.borrow();
        assert_eq!(
            rec.logs,
            vec![
                "Internet connection lost. Switched to mesh network mode.",
                "Internet connection restored. Normal operations resumed."
            ]
        );
        assert_eq!(rec.notices, vec!["Network Alert"]);
    }

    #[test]
    fn reserve_bed_logs_and_selects() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        let h = s.reserve_bed(1).unwrap();
        assert_eq!(h.available_icu, 11);
        assert_eq!(s.session().hospitals().selected().unwrap().id, 1);
        assert_eq!(rec.0.borrow().logs, vec!["Bed reserved at Chennai GH"]);
        assert_eq!(rec.0.borrow().notices, vec!["Bed Reserved"]);

        assert!(s.reserve_bed(3).is_err());
        assert_eq!(rec.0.borrow().logs.len(), 1);
    }

    #[test]
    fn locate_nearest_skips_full_hospitals() {
        let (mut s, _) = sim(quiet_config(), vec![0.5]);
        let h = s.locate_nearest().unwrap();
        assert_eq!(h.name, "Chennai GH");
        assert_eq!(s.session().hospitals().selected().unwrap().id, 1);
    }

    #[test]
    fn invalid_sample_is_rejected_without_side_effects() {
        let (mut s, rec) = sim(quiet_config(), vec![0.5]);
        let bad = VitalsSample {
            heart_rate: -10.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            spo2: 98.0,
            temperature_c: 36.8,
        };
        assert!(s.score_sample(bad).is_err());
        assert!(s.session().severity().is_none());
        assert!(rec.0.borrow().logs.is_empty());
    }

    #[test]
    fn acknowledge_alert_by_id() {
        let (mut s, _) = sim(quiet_config(), vec![0.5]);
        let event = s.raise_alert(Role::Admin);
        s.acknowledge_alert(event.id).unwrap();
        assert!(s.session().alerts().is_acknowledged(event.id));
        assert!(s.acknowledge_alert(Uuid::new_v4()).is_err());
    }
}
