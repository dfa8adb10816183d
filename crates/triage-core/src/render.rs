use crate::flow::TimelineSnapshot;
use crate::forecast::DemandForecast;
use crate::hospital::HospitalDirectory;
use crate::severity::SeverityResult;
use crate::vitals::VitalsSample;
use crate::ward::WardBoard;

/// Presentation side of the simulation. Every hook receives an immutable
/// view; the engine never reads anything back from the renderer.
///
/// All methods default to doing nothing, so a renderer only implements the
/// panels it actually draws.
pub trait Renderer {
    fn severity(&mut self, _sample: &VitalsSample, _result: &SeverityResult) {}

    fn timeline(&mut self, _snapshot: &TimelineSnapshot) {}

    /// Background monitor refresh of the heart-rate tile.
    fn heart_rate(&mut self, _bpm: f64) {}

    fn wards(&mut self, _board: &WardBoard) {}

    fn forecast(&mut self, _forecast: &DemandForecast) {}

    fn hospitals(&mut self, _directory: &HospitalDirectory) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {}
