use crate::output::clock_time;
use triage_core::alert::{ActivityEntry, AlertEvent, NotificationSink};
use triage_core::flow::TimelineSnapshot;
use triage_core::forecast::DemandForecast;
use triage_core::render::Renderer;
use triage_core::severity::SeverityResult;
use triage_core::types::StepStatus;
use triage_core::vitals::VitalsSample;
use triage_core::ward::WardBoard;

// ---------------------------------------------------------------------------
// ConsoleSink
// ---------------------------------------------------------------------------

/// Prints alerts, notices and activity lines as they happen.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn alert(&mut self, event: &AlertEvent) {
        println!(
            "{}  ALERT   [{}] {}: {}",
            clock_time(event.timestamp),
            event.role,
            event.title,
            event.message
        );
    }

    fn log(&mut self, entry: &ActivityEntry) {
        println!("{}  LOG     {}", clock_time(entry.timestamp), entry.message);
    }

    fn notice(&mut self, title: &str, message: &str) {
        println!("          NOTICE  {title}: {message}");
    }
}

// ---------------------------------------------------------------------------
// ConsoleRenderer
// ---------------------------------------------------------------------------

/// Text rendition of the dashboard panels. Timeline output is limited to
/// step changes so a restart and each advance print once.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    last_active: Option<(usize, bool)>,
}

impl Renderer for ConsoleRenderer {
    fn severity(&mut self, sample: &VitalsSample, result: &SeverityResult) {
        println!("          VITALS  {sample}");
        println!(
            "          SCORE   {}/100 -> {} (ICU risk {:.0}%, confidence {:.0}%)",
            result.score,
            result.recommended_ward.label(),
            result.icu_risk,
            result.confidence
        );
    }

    fn timeline(&mut self, snapshot: &TimelineSnapshot) {
        let key = (snapshot.active_index, snapshot.running);
        if self.last_active == Some(key) {
            return;
        }
        self.last_active = Some(key);
        let strip: Vec<String> = snapshot
            .steps
            .iter()
            .map(|s| match s.status {
                StepStatus::Completed => format!("[x] {}", s.stage),
                StepStatus::Active => format!("[>] {}", s.stage),
                StepStatus::Pending => format!("[ ] {}", s.stage),
            })
            .collect();
        println!(
            "          FLOW    {}  eta {} min, track {:.0}%",
            strip.join("  "),
            snapshot.eta_minutes,
            snapshot.track_position
        );
    }

    fn heart_rate(&mut self, bpm: f64) {
        println!("          MONITOR heart rate {bpm:.0} bpm");
    }

    fn wards(&mut self, board: &WardBoard) {
        let t = board.totals();
        println!(
            "          BEDS    {} occupied, {} reserved, {} free of {}",
            t.occupied, t.reserved, t.available, t.total
        );
    }

    fn forecast(&mut self, forecast: &DemandForecast) {
        if forecast.surge {
            println!(
                "          DEMAND  surge predicted: peak {}%, +{} staff",
                forecast.peak_load(),
                forecast.staff_needed()
            );
        }
    }
}
