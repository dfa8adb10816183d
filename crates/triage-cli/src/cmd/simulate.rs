use crate::console::{ConsoleRenderer, ConsoleSink};
use crate::output::{clock_time, print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use triage_core::alert::{ActivityEntry, AlertEvent, NotificationSink, NullSink};
use triage_core::clock::{Clock, ManualClock, SystemClock};
use triage_core::config::{Config, WarnLevel};
use triage_core::engine::Simulation;
use triage_core::flow::TimelineSnapshot;
use triage_core::random::SeededRandom;
use triage_core::render::{NoopRenderer, Renderer};
use triage_core::session::SessionSummary;
use triage_core::types::NetworkMode;

pub struct Options {
    pub seconds: u64,
    pub seed: Option<u64>,
    pub realtime: bool,
    pub disaster: bool,
    pub mesh_at: Option<u64>,
}

#[derive(Serialize)]
struct Report {
    seconds: u64,
    seed: Option<u64>,
    summary: SessionSummary,
    timeline: TimelineSnapshot,
    alerts: Vec<AlertEvent>,
    activity: Vec<ActivityEntry>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: &Path, opts: Options, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("failed to load config")?;
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
        }
    }

    let end = Duration::from_secs(opts.seconds);
    let mesh_at = opts.mesh_at.map(Duration::from_secs);
    let seed = config.seed;

    let (renderer, sink): (Box<dyn Renderer>, Box<dyn NotificationSink>) = if json {
        (Box::new(NoopRenderer), Box::new(NullSink))
    } else {
        (Box::new(ConsoleRenderer::default()), Box::new(ConsoleSink))
    };

    let sim = if opts.realtime {
        let sim = Simulation::new(
            config,
            Box::new(SeededRandom::new(seed)),
            Box::new(SystemClock),
            renderer,
            sink,
        )?;
        run_realtime(sim, end, opts.disaster, mesh_at)?
    } else {
        let clock = ManualClock::new(Utc::now());
        let sim = Simulation::new(
            config,
            Box::new(SeededRandom::new(seed)),
            Box::new(clock.clone()),
            renderer,
            sink,
        )?;
        run_fast(sim, &clock, end, opts.disaster, mesh_at)?
    };

    let session = sim.session();
    if json {
        let report = Report {
            seconds: opts.seconds,
            seed,
            summary: session.summary(),
            timeline: session.flow().snapshot(sim.now()),
            alerts: session.alerts().iter().cloned().collect(),
            activity: session.activity().iter().cloned().collect(),
        };
        return print_json(&report);
    }

    print_summary(&session.summary(), session.alerts().iter());
    Ok(())
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

fn begin(sim: &mut Simulation, disaster: bool) -> anyhow::Result<()> {
    sim.start();
    if disaster {
        sim.set_disaster_mode(true)?;
    }
    Ok(())
}

/// Next stop for the driver: the earlier of the next event and the mesh
/// switch, bounded by `end`.
fn next_stop(sim: &Simulation, mesh_at: Option<Duration>, end: Duration) -> Option<Duration> {
    [sim.next_deadline(), mesh_at.filter(|t| *t >= sim.now())]
        .into_iter()
        .flatten()
        .filter(|t| *t <= end)
        .min()
}

fn step(sim: &mut Simulation, to: Duration, mesh_at: &mut Option<Duration>) {
    if *mesh_at == Some(to) {
        // events due at the same instant go first
        sim.advance_to(to);
        sim.set_network_mode(NetworkMode::Mesh);
        *mesh_at = None;
    } else {
        sim.advance_to(to);
    }
}

/// Jump from deadline to deadline, keeping the manual clock in step so
/// timestamps read as if the run happened in real time.
fn run_fast(
    mut sim: Simulation,
    clock: &ManualClock,
    end: Duration,
    disaster: bool,
    mut mesh_at: Option<Duration>,
) -> anyhow::Result<Simulation> {
    let origin = clock.now();
    begin(&mut sim, disaster)?;
    while let Some(t) = next_stop(&sim, mesh_at, end) {
        clock.set(origin + chrono::Duration::from_std(t)?);
        step(&mut sim, t, &mut mesh_at);
    }
    clock.set(origin + chrono::Duration::from_std(end)?);
    sim.advance_to(end);
    tracing::debug!(pending = sim.pending_events(), "fast-forward finished");
    Ok(sim)
}

/// Sleep until each deadline on the wall clock. Ctrl-C ends the run early.
fn run_realtime(
    mut sim: Simulation,
    end: Duration,
    disaster: bool,
    mut mesh_at: Option<Duration>,
) -> anyhow::Result<Simulation> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let origin = tokio::time::Instant::now();
        begin(&mut sim, disaster)?;
        tracing::info!(seconds = end.as_secs(), "running in real time, Ctrl-C to stop");

        loop {
            let target = next_stop(&sim, mesh_at, end).unwrap_or(end);
            tokio::select! {
                _ = tokio::time::sleep_until(origin + target) => {
                    step(&mut sim, target, &mut mesh_at);
                    if target >= end {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted");
                    break;
                }
            }
        }
        anyhow::Ok(())
    })?;
    Ok(sim)
}

// ---------------------------------------------------------------------------
// Human output
// ---------------------------------------------------------------------------

fn print_summary<'a>(summary: &SessionSummary, alerts: impl Iterator<Item = &'a AlertEvent>) {
    println!();
    println!("Stage:       {}", summary.active_stage);
    match (summary.last_score, &summary.recommended_ward) {
        (Some(score), Some(ward)) => println!("Severity:    {score}/100 ({ward})"),
        _ => println!("Severity:    --"),
    }
    println!(
        "Mode:        {}, network {}",
        if summary.disaster_mode { "disaster" } else { "normal" },
        summary.network
    );
    println!("ICU beds:    {} free across hospitals", summary.icu_beds_available);
    println!(
        "Wards:       {}/{} occupied, peak ICU load {}%",
        summary.ward_totals.occupied, summary.ward_totals.total, summary.peak_load
    );

    let rows: Vec<Vec<String>> = alerts
        .map(|a| {
            vec![
                clock_time(a.timestamp),
                a.role.to_string(),
                a.title.clone(),
            ]
        })
        .collect();
    if rows.is_empty() {
        println!("Alerts:      none");
    } else {
        println!();
        print_table(&["TIME", "ROLE", "ALERT"], rows);
    }
}
