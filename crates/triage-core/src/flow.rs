//! Ambulance-to-admission timeline.
//!
//! A fixed list of stages advanced one step per tick. Steps complete strictly
//! in order and never revert; `restart` is the only way back to the first
//! stage. Exactly one step is active at any time; the last step stays active
//! once the sequence has run out.

use crate::event::Event;
use crate::scheduler::{Scheduler, TimerId};
use crate::types::{Profile, Stage, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_EFFECT_DELAY: Duration = Duration::from_millis(500);

/// Step index at which paramedics take a fresh set of vitals.
pub const ASSESSMENT_STEP: usize = 1;

// Left and right edge of the ambulance track, in percent.
const TRACK_START: f64 = 10.0;
const TRACK_SPAN: f64 = 80.0;

const INITIAL_ETA_MINUTES: u32 = 12;
const ETA_MINUTES_PER_STEP: u32 = 2;

// ---------------------------------------------------------------------------
// TimelineStep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub stage: Stage,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TimelineStep {
    fn pending(stage: Stage) -> Self {
        Self {
            stage,
            status: StepStatus::Pending,
            completed_at: None,
        }
    }
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub steps: Vec<TimelineStep>,
    pub active_index: usize,
    pub progress: f64,
    /// Ambulance marker position along the track, percent.
    pub track_position: f64,
    pub eta_minutes: u32,
    pub running: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { from: usize, to: usize },
    /// Already on the last step; nothing changed.
    Terminal,
}

// ---------------------------------------------------------------------------
// FlowSequencer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FlowSequencer {
    steps: Vec<TimelineStep>,
    active: usize,
    progress: f64,
    tick_interval: Duration,
    effect_delay: Duration,
    tick_timer: Option<TimerId>,
    effect_timers: Vec<TimerId>,
    started_at: Duration,
}

impl Default for FlowSequencer {
    fn default() -> Self {
        Self::new(Stage::all(), DEFAULT_TICK_INTERVAL, DEFAULT_EFFECT_DELAY)
    }
}

impl FlowSequencer {
    /// An empty stage list falls back to the standard four stages.
    pub fn new(stages: &[Stage], tick_interval: Duration, effect_delay: Duration) -> Self {
        let stages = if stages.is_empty() {
            Stage::all()
        } else {
            stages
        };
        let mut flow = Self {
            steps: stages.iter().copied().map(TimelineStep::pending).collect(),
            active: 0,
            progress: 0.0,
            tick_interval,
            effect_delay,
            tick_timer: None,
            effect_timers: Vec::new(),
            started_at: Duration::ZERO,
        };
        flow.reset();
        flow
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_stage(&self) -> Stage {
        self.steps[self.active].stage
    }

    fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn is_terminal(&self) -> bool {
        self.active == self.last_index()
    }

    /// True while a tick is scheduled.
    pub fn is_running(&self) -> bool {
        self.tick_timer.is_some()
    }

    /// `active / (N - 1)`, 0 right after a restart.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn track_position(&self) -> f64 {
        TRACK_START + TRACK_SPAN * self.progress
    }

    pub fn eta_minutes(&self) -> u32 {
        INITIAL_ETA_MINUTES.saturating_sub(ETA_MINUTES_PER_STEP * self.active as u32)
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    pub fn snapshot(&self, now: Duration) -> TimelineSnapshot {
        TimelineSnapshot {
            steps: self.steps.clone(),
            active_index: self.active,
            progress: self.progress,
            track_position: self.track_position(),
            eta_minutes: self.eta_minutes(),
            running: self.is_running(),
            elapsed_ms: self.elapsed(now).as_millis() as u64,
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn reset(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
            step.completed_at = None;
        }
        self.steps[0].status = StepStatus::Active;
        self.active = 0;
        self.progress = 0.0;
    }

    /// Complete the active step and activate the next one. A no-op on the
    /// last step.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Advance {
        if self.is_terminal() {
            return Advance::Terminal;
        }
        let from = self.active;
        let to = from + 1;
        self.steps[from].status = StepStatus::Completed;
        self.steps[from].completed_at = Some(at);
        self.steps[to].status = StepStatus::Active;
        self.active = to;
        self.progress = to as f64 / self.last_index() as f64;
        Advance::Moved { from, to }
    }

    /// Cancel pending timers and return to the first stage, then schedule the
    /// first tick. Calling it twice in a row leaves the same state as once.
    pub fn restart(&mut self, sched: &mut dyn Scheduler<Event>) {
        self.stop(sched);
        self.reset();
        self.started_at = sched.now();
        self.tick_timer = Some(sched.schedule(self.tick_interval, Event::FlowTick));
        tracing::info!(stages = self.steps.len(), "timeline restarted");
    }

    /// Cancel the pending tick and any scheduled step effects. Step state is
    /// left as is.
    pub fn stop(&mut self, sched: &mut dyn Scheduler<Event>) {
        if let Some(id) = self.tick_timer.take() {
            sched.cancel(id);
        }
        for id in self.effect_timers.drain(..) {
            sched.cancel(id);
        }
    }

    /// Handle a fired tick. Ticks from a cancelled sequence are ignored and
    /// return `None`.
    ///
    /// On a move, schedules the step effects and the next tick. A tick on the
    /// last step changes nothing and stops the timer.
    pub fn on_tick(
        &mut self,
        fired: TimerId,
        at: DateTime<Utc>,
        sched: &mut dyn Scheduler<Event>,
    ) -> Option<Advance> {
        if self.tick_timer != Some(fired) {
            tracing::debug!(timer = fired.get(), "ignoring stale timeline tick");
            return None;
        }
        self.tick_timer = None;

        let outcome = self.advance(at);
        match outcome {
            Advance::Moved { to, .. } => {
                if to == ASSESSMENT_STEP {
                    let id = sched.schedule(self.effect_delay, Event::AssessPatient(Profile::Normal));
                    self.effect_timers.push(id);
                }
                if to == self.last_index() {
                    let id = sched.schedule(self.effect_delay, Event::NotifyCareTeam);
                    self.effect_timers.push(id);
                }
                self.tick_timer = Some(sched.schedule(self.tick_interval, Event::FlowTick));
                tracing::debug!(step = to, stage = %self.active_stage(), "timeline advanced");
            }
            Advance::Terminal => {
                tracing::debug!("timeline finished");
            }
        }
        Some(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TimerQueue;
    use chrono::TimeZone;

    fn at(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, sec).unwrap()
    }

    fn statuses(flow: &FlowSequencer) -> Vec<StepStatus> {
        flow.steps().iter().map(|s| s.status).collect()
    }

    fn active_count(flow: &FlowSequencer) -> usize {
        flow.steps()
            .iter()
            .filter(|s| s.status == StepStatus::Active)
            .count()
    }

    /// Pop events up to `until`, feeding ticks back into the sequencer.
    fn drive(flow: &mut FlowSequencer, q: &mut TimerQueue<Event>, until: Duration) -> Vec<Event> {
        let mut fired = Vec::new();
        while let Some((id, ev)) = q.pop_due(until) {
            if ev == Event::FlowTick {
                flow.on_tick(id, at(0), q);
            }
            fired.push(ev);
        }
        q.advance_to(until);
        fired
    }

    #[test]
    fn starts_on_first_step() {
        let flow = FlowSequencer::default();
        assert_eq!(flow.active_index(), 0);
        assert_eq!(
            statuses(&flow),
            vec![
                StepStatus::Active,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending
            ]
        );
        assert_eq!(flow.progress(), 0.0);
        assert_eq!(flow.track_position(), 10.0);
        assert!(!flow.is_running());
    }

    #[test]
    fn n_minus_one_advances_complete_in_order() {
        let mut flow = FlowSequencer::default();
        let n = flow.len();
        for i in 0..n - 1 {
            assert_eq!(
                flow.advance(at(i as u32)),
                Advance::Moved { from: i, to: i + 1 }
            );
            assert_eq!(active_count(&flow), 1);
        }
        assert_eq!(flow.active_index(), n - 1);
        for (i, step) in flow.steps()[..n - 1].iter().enumerate() {
            assert_eq!(step.status, StepStatus::Completed);
            assert_eq!(step.completed_at, Some(at(i as u32)));
        }
        assert_eq!(flow.progress(), 1.0);
        assert_eq!(flow.track_position(), 90.0);
    }

    #[test]
    fn advance_past_last_step_is_noop() {
        let mut flow = FlowSequencer::default();
        for i in 0..3 {
            flow.advance(at(i));
        }
        let before = flow.snapshot(Duration::ZERO);
        assert_eq!(flow.advance(at(30)), Advance::Terminal);
        assert_eq!(flow.snapshot(Duration::ZERO), before);
    }

    #[test]
    fn eta_counts_down_two_minutes_per_step() {
        let mut flow = FlowSequencer::default();
        assert_eq!(flow.eta_minutes(), 12);
        flow.advance(at(0));
        assert_eq!(flow.eta_minutes(), 10);
        flow.advance(at(1));
        flow.advance(at(2));
        assert_eq!(flow.eta_minutes(), 6);
    }

    #[test]
    fn ticks_drive_whole_sequence_then_stop() {
        let mut q = TimerQueue::new();
        let mut flow = FlowSequencer::default();
        flow.restart(&mut q);

        let fired = drive(&mut flow, &mut q, Duration::from_secs(60));
        // 3 moves + 1 terminal tick
        assert_eq!(fired.iter().filter(|e| **e == Event::FlowTick).count(), 4);
        assert_eq!(flow.active_index(), 3);
        assert!(!flow.is_running());
        assert!(q.is_empty());
    }

    #[test]
    fn effects_fire_after_assessment_and_final_steps() {
        let mut q = TimerQueue::new();
        let mut flow = FlowSequencer::default();
        flow.restart(&mut q);

        let fired = drive(&mut flow, &mut q, Duration::from_millis(2499));
        assert_eq!(fired, vec![Event::FlowTick]);

        let fired = drive(&mut flow, &mut q, Duration::from_millis(2500));
        assert_eq!(fired, vec![Event::AssessPatient(Profile::Normal)]);

        let fired = drive(&mut flow, &mut q, Duration::from_millis(6500));
        assert_eq!(
            fired,
            vec![Event::FlowTick, Event::FlowTick, Event::NotifyCareTeam]
        );
    }

    #[test]
    fn restart_resets_and_cancels_previous_sequence() {
        let mut q = TimerQueue::new();
        let mut flow = FlowSequencer::default();
        flow.restart(&mut q);
        drive(&mut flow, &mut q, Duration::from_millis(2000));
        assert_eq!(flow.active_index(), 1);
        // tick + pending assessment
        assert_eq!(q.len(), 2);

        flow.restart(&mut q);
        assert_eq!(flow.active_index(), 0);
        assert_eq!(flow.progress(), 0.0);
        assert!(flow.steps().iter().all(|s| s.completed_at.is_none()));
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(Duration::from_millis(4000)));
        assert_eq!(flow.elapsed(q.now()), Duration::ZERO);
    }

    #[test]
    fn restart_twice_equals_restart_once() {
        let mut q1 = TimerQueue::new();
        let mut once = FlowSequencer::default();
        once.restart(&mut q1);

        let mut q2 = TimerQueue::new();
        let mut twice = FlowSequencer::default();
        twice.restart(&mut q2);
        twice.restart(&mut q2);

        assert_eq!(once.snapshot(q1.now()), twice.snapshot(q2.now()));
        assert_eq!(q1.len(), q2.len());
        assert_eq!(q1.next_deadline(), q2.next_deadline());
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut q = TimerQueue::new();
        let mut flow = FlowSequencer::default();
        flow.restart(&mut q);
        let stale = q.schedule(Duration::ZERO, Event::FlowTick);
        assert_eq!(flow.on_tick(stale, at(0), &mut q), None);
        assert_eq!(flow.active_index(), 0);
        assert!(flow.is_running());
    }

    #[test]
    fn custom_stage_list() {
        let mut flow = FlowSequencer::new(
            &[Stage::Dispatch, Stage::Admitted],
            DEFAULT_TICK_INTERVAL,
            DEFAULT_EFFECT_DELAY,
        );
        assert_eq!(flow.advance(at(0)), Advance::Moved { from: 0, to: 1 });
        assert!(flow.is_terminal());
        assert_eq!(flow.progress(), 1.0);
    }

    #[test]
    fn empty_stage_list_uses_standard_stages() {
        let flow = FlowSequencer::new(&[], DEFAULT_TICK_INTERVAL, DEFAULT_EFFECT_DELAY);
        assert_eq!(flow.len(), Stage::all().len());
        assert_eq!(flow.active_stage(), Stage::Dispatch);
    }
}
