mod cmd;
mod config_path;
mod console;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, hospitals::HospitalsSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Emergency triage simulation: severity scoring, ambulance timeline, ICU beds",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest triage.yaml upward from cwd)
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one set of vitals
    Score {
        /// Beats per minute
        #[arg(long)]
        heart_rate: f64,
        /// Blood pressure as SYSTOLIC/DIASTOLIC, e.g. 120/80
        #[arg(long)]
        bp: String,
        /// Oxygen saturation, percent
        #[arg(long)]
        spo2: f64,
        /// Body temperature, Celsius
        #[arg(long)]
        temp: f64,
        /// Seed for the jitter draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a synthetic vitals sample
    Vitals {
        /// normal or critical
        #[arg(long, default_value = "normal")]
        profile: String,
        #[arg(long)]
        seed: Option<u64>,
        /// Also score the sample
        #[arg(long)]
        score: bool,
    },

    /// Run the dashboard simulation
    Simulate {
        /// Simulated duration
        #[arg(long, default_value = "20")]
        seconds: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Wait on the wall clock instead of fast-forwarding
        #[arg(long)]
        realtime: bool,
        /// Start in disaster mode
        #[arg(long)]
        disaster: bool,
        /// Drop to the mesh network at this second
        #[arg(long, value_name = "SECONDS")]
        mesh_at: Option<u64>,
    },

    /// Hospital directory
    Hospitals {
        #[command(subcommand)]
        subcommand: HospitalsSubcommand,
    },

    /// Ward occupancy board
    Wards {
        /// Show the bed icon strip per ward
        #[arg(long)]
        beds: bool,
        /// Label language: en or ta
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Show, validate or create the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Simulate { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config_path::resolve_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Score {
            heart_rate,
            bp,
            spo2,
            temp,
            seed,
        } => cmd::score::run(&config, heart_rate, &bp, spo2, temp, seed, cli.json),
        Commands::Vitals {
            profile,
            seed,
            score,
        } => cmd::vitals::run(&config, &profile, seed, score, cli.json),
        Commands::Simulate {
            seconds,
            seed,
            realtime,
            disaster,
            mesh_at,
        } => cmd::simulate::run(
            &config,
            cmd::simulate::Options {
                seconds,
                seed,
                realtime,
                disaster,
                mesh_at,
            },
            cli.json,
        ),
        Commands::Hospitals { subcommand } => cmd::hospitals::run(&config, subcommand, cli.json),
        Commands::Wards { beds, lang } => cmd::wards::run(beds, &lang, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
