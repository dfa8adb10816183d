use crate::cmd::score::{print_result, score_sample};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::config::Config;
use triage_core::random::SeededRandom;
use triage_core::types::Profile;
use triage_core::vitals;

pub fn run(
    config_path: &Path,
    profile: &str,
    seed: Option<u64>,
    score: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let profile: Profile = profile.parse()?;
    let seed = seed.or(config.seed);

    let mut rng = SeededRandom::new(seed);
    let sample = vitals::generate(profile, &mut rng);

    // jitter comes from the next seed so it is not the heart-rate draw again
    let result = if score {
        Some(score_sample(&config, &sample, seed.map(|s| s.wrapping_add(1)))?)
    } else {
        None
    };

    if json {
        print_json(&serde_json::json!({
            "profile": profile,
            "vitals": sample,
            "blood_pressure": sample.blood_pressure(),
            "result": result,
        }))?;
        return Ok(());
    }

    match result {
        Some(r) => print_result(&sample, &r),
        None => {
            println!("Profile:     {profile}");
            println!("Vitals:      {sample}");
        }
    }
    Ok(())
}
