//! Fuelcore CLI - command-line interface for the metabolic fueling engine
//!
//! Commands:
//! - plan: build and merge the fueling windows for a day bundle
//! - timeline: render the day's energy timeline
//! - snapshot: glycogen tank state at a given instant
//! - wave: fluid-deficit series over a multi-day bundle

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use fuelcore::{
    wave_range, DayFluidInputs, FuelError, FuelSettings, FuelingPlan, MacroTargets,
    MetabolicService, NutritionItem, NutritionStore, PlanStore, WorkoutEffort, WorkoutStore,
    ENGINE_VERSION,
};

/// Fuelcore - metabolic fueling engine
#[derive(Parser)]
#[command(name = "fuelcore")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute fueling windows, glycogen state, and fluid balance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and merge the fueling plan for one day
    Plan {
        /// Day bundle JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Render the day's energy timeline
    Timeline {
        /// Day bundle JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Glycogen tank snapshot
    Snapshot {
        /// Day bundle JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,
    },

    /// Fluid-deficit series over a date range
    Wave {
        /// Wave bundle JSON (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// One day of inputs for plan/timeline/snapshot commands
#[derive(serde::Deserialize)]
struct DayBundle {
    date: NaiveDate,
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default)]
    daily_targets: Option<MacroTargets>,
    #[serde(default)]
    nutrition: Vec<NutritionItem>,
    #[serde(default)]
    workouts: Vec<WorkoutEffort>,
    #[serde(default)]
    settings: FuelSettings,
}

/// Date-ordered multi-day inputs for the wave command
#[derive(serde::Deserialize)]
struct WaveBundle {
    days: Vec<DayFluidInputs>,
    #[serde(default)]
    settings: FuelSettings,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Store adapter exposing one parsed bundle to the service facade
struct BundleStore {
    date: NaiveDate,
    daily_targets: Option<MacroTargets>,
    nutrition: Vec<NutritionItem>,
    workouts: Vec<WorkoutEffort>,
}

impl NutritionStore for BundleStore {
    fn nutrition_for(
        &self,
        _user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NutritionItem>, FuelError> {
        Ok(if date == self.date {
            self.nutrition.clone()
        } else {
            Vec::new()
        })
    }

    fn daily_targets_for(
        &self,
        _user_id: Uuid,
        date: NaiveDate,
    ) -> Result<MacroTargets, FuelError> {
        self.daily_targets
            .filter(|_| date == self.date)
            .ok_or_else(|| FuelError::Store(format!("bundle carries no daily targets for {date}")))
    }
}

impl WorkoutStore for BundleStore {
    fn workouts_for(
        &self,
        _user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WorkoutEffort>, FuelError> {
        Ok(if date == self.date {
            self.workouts.clone()
        } else {
            Vec::new()
        })
    }
}

impl PlanStore for BundleStore {
    fn save_plan(&self, _user_id: Uuid, _plan: &FuelingPlan) -> Result<(), FuelError> {
        Err(FuelError::Store(
            "the CLI has nowhere to persist plans".to_string(),
        ))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan { input } => run_plan(&input),
        Commands::Timeline { input } => run_timeline(&input),
        Commands::Snapshot { input, as_of } => run_snapshot(&input, as_of),
        Commands::Wave { input } => run_wave(&input),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("fuelcore: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_plan(input: &PathBuf) -> Result<String, String> {
    let bundle = read_day_bundle(input)?;
    let (service, date) = service_for(bundle);
    let plan = service
        .fueling_plan_for_date(Uuid::nil(), date, false)
        .map_err(|e| e.to_string())?;
    to_pretty(&plan)
}

fn run_timeline(input: &PathBuf) -> Result<String, String> {
    let bundle = read_day_bundle(input)?;
    let (service, date) = service_for(bundle);
    let points = service
        .energy_timeline(Uuid::nil(), date)
        .map_err(|e| e.to_string())?;
    to_pretty(&points)
}

fn run_snapshot(input: &PathBuf, as_of: Option<DateTime<Utc>>) -> Result<String, String> {
    let bundle = read_day_bundle(input)?;
    let as_of = as_of.unwrap_or_else(Utc::now);
    let (service, _) = service_for(bundle);
    let snapshot = service
        .glycogen_state(Uuid::nil(), as_of)
        .map_err(|e| e.to_string())?;
    to_pretty(&snapshot)
}

fn run_wave(input: &PathBuf) -> Result<String, String> {
    let raw = read_input(input)?;
    let bundle: WaveBundle = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    let points = wave_range(&bundle.days, &bundle.settings.hydration);
    to_pretty(&points)
}

fn service_for(bundle: DayBundle) -> (MetabolicService<BundleStore>, NaiveDate) {
    let date = bundle.date;
    let store = BundleStore {
        date,
        daily_targets: bundle.daily_targets,
        nutrition: bundle.nutrition,
        workouts: bundle.workouts,
    };
    (
        MetabolicService::new(store, bundle.settings, bundle.timezone),
        date,
    )
}

fn read_day_bundle(input: &PathBuf) -> Result<DayBundle, String> {
    let raw = read_input(input)?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

fn read_input(input: &PathBuf) -> Result<String, String> {
    if input.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err("reading from stdin but stdin is a terminal".to_string());
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| e.to_string())?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).map_err(|e| format!("{}: {e}", input.display()))
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}
