use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use triage_core::config::Config;
use triage_core::random::SeededRandom;
use triage_core::severity::{SeverityResult, SeverityScorer};
use triage_core::types::Language;
use triage_core::vitals::VitalsSample;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    config_path: &Path,
    heart_rate: f64,
    bp: &str,
    spo2: f64,
    temp: f64,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let sample = VitalsSample::from_readings(heart_rate, bp, spo2, temp)?;
    let result = score_sample(&config, &sample, seed)?;

    if json {
        print_json(&serde_json::json!({
            "vitals": sample,
            "result": result,
        }))?;
        return Ok(());
    }

    print_result(&sample, &result);
    Ok(())
}

/// Score with the configured jitter. `seed` overrides the config seed.
pub(crate) fn score_sample(
    config: &Config,
    sample: &VitalsSample,
    seed: Option<u64>,
) -> anyhow::Result<SeverityResult> {
    let mut rng = SeededRandom::new(seed.or(config.seed));
    let scorer = SeverityScorer::new(config.severity.jitter);
    let result = scorer
        .score(sample, &mut rng)
        .context("vitals rejected")?;
    Ok(result)
}

// ---------------------------------------------------------------------------
// Human output
// ---------------------------------------------------------------------------

pub(crate) fn print_result(sample: &VitalsSample, result: &SeverityResult) {
    println!("Vitals:      {sample}");
    println!(
        "Severity:    {}/100 (raw {})",
        result.score, result.raw_score
    );
    println!(
        "Ward:        {}",
        result.recommended_ward.recommendation(Language::En)
    );
    println!("ICU risk:    {:.0}%", result.icu_risk);
    println!("Confidence:  {:.0}% (placeholder)", result.confidence);
    if result.is_critical() {
        println!("CRITICAL: doctor would be paged");
    }

    if result.contributions.is_empty() {
        return;
    }
    println!();
    let rows = result
        .contributions
        .iter()
        .map(|c| {
            vec![
                c.vital.to_string(),
                c.level.to_string(),
                format!("+{}", c.points),
            ]
        })
        .collect();
    print_table(&["VITAL", "LEVEL", "POINTS"], rows);
}
