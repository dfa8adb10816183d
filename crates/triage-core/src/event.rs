use crate::types::{Profile, Role};
use serde::{Deserialize, Serialize};

/// Work items delivered by the simulation's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Event {
    /// Kick off the ambulance timeline after the start delay.
    StartFlow,
    /// Advance the ambulance timeline by one step.
    FlowTick,
    /// Generate vitals for the profile and score them.
    AssessPatient(Profile),
    /// End-of-timeline check: page doctor and nurse for a critical patient.
    NotifyCareTeam,
    /// Deliver a pager alert to one role.
    RaiseAlert(Role),
    /// Background monitor heart-rate refresh.
    VitalsRefresh,
    /// Background admit/discharge random walk over the ward board.
    OccupancyWalk,
    /// Background ICU demand forecast refresh.
    ForecastRefresh,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartFlow => "start_flow",
            Event::FlowTick => "flow_tick",
            Event::AssessPatient(_) => "assess_patient",
            Event::NotifyCareTeam => "notify_care_team",
            Event::RaiseAlert(_) => "raise_alert",
            Event::VitalsRefresh => "vitals_refresh",
            Event::OccupancyWalk => "occupancy_walk",
            Event::ForecastRefresh => "forecast_refresh",
        }
    }
}
