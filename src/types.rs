//! Core types for the fuelcore engine
//!
//! This module defines the records that flow through each stage of the
//! engine: fueling windows and plans, nutrition and workout inputs, and the
//! glycogen/fluid-balance outputs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FuelError;

/// Kind of a fueling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    DailyBase,
    PreWorkout,
    IntraWorkout,
    PostWorkout,
    Transition,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::DailyBase => "daily_base",
            WindowKind::PreWorkout => "pre_workout",
            WindowKind::IntraWorkout => "intra_workout",
            WindowKind::PostWorkout => "post_workout",
            WindowKind::Transition => "transition",
        }
    }

    /// Fixed priority used to break start-time ties during the merge sweep.
    /// The ordering itself is arbitrary; being fixed is what matters.
    pub(crate) fn merge_priority(self) -> u8 {
        match self {
            WindowKind::PreWorkout => 0,
            WindowKind::IntraWorkout => 1,
            WindowKind::PostWorkout => 2,
            WindowKind::DailyBase => 3,
            WindowKind::Transition => 4,
        }
    }
}

/// Macro-nutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    /// Carbohydrate (g)
    pub carbs_g: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Fat (g)
    pub fat_g: f64,
}

impl MacroTargets {
    pub const ZERO: MacroTargets = MacroTargets {
        carbs_g: 0.0,
        protein_g: 0.0,
        fat_g: 0.0,
    };

    pub fn new(carbs_g: f64, protein_g: f64, fat_g: f64) -> Self {
        Self {
            carbs_g,
            protein_g,
            fat_g,
        }
    }

    /// Component-wise sum
    pub fn add(&self, other: &MacroTargets) -> MacroTargets {
        MacroTargets {
            carbs_g: self.carbs_g + other.carbs_g,
            protein_g: self.protein_g + other.protein_g,
            fat_g: self.fat_g + other.fat_g,
        }
    }

    pub fn total_g(&self) -> f64 {
        self.carbs_g + self.protein_g + self.fat_g
    }

    pub fn is_non_negative(&self) -> bool {
        self.carbs_g >= 0.0 && self.protein_g >= 0.0 && self.fat_g >= 0.0
    }
}

/// One scheduled fueling opportunity.
///
/// Windows are immutable values: every merge step replaces two windows with
/// a new one carrying the combined attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelingWindow {
    pub kind: WindowKind,
    /// Window start (UTC); must be strictly before `end`
    pub start: DateTime<Utc>,
    /// Window end (UTC)
    pub end: DateTime<Utc>,
    /// Macro targets for this window (non-negative grams)
    pub targets: MacroTargets,
    /// Informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Title of the linked workout, if any (informational only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_title: Option<String>,
}

impl FuelingWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check the interval and target invariants.
    ///
    /// A malformed window is a caller bug; the engine reports it loudly
    /// instead of normalizing.
    pub fn validate(&self) -> Result<(), FuelError> {
        if self.end <= self.start {
            return Err(FuelError::InvalidWindow {
                detail: format!(
                    "{} window has end {} not after start {}",
                    self.kind.as_str(),
                    self.end,
                    self.start
                ),
            });
        }
        if !self.targets.is_non_negative() {
            return Err(FuelError::InvalidTargets {
                detail: format!(
                    "{} window at {} has negative macro target",
                    self.kind.as_str(),
                    self.start
                ),
            });
        }
        Ok(())
    }
}

/// Per-user, per-date fueling plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelingPlan {
    /// Calendar date the plan covers (user-local)
    pub date: NaiveDate,
    /// Merged windows, ordered by start time
    pub windows: Vec<FuelingWindow>,
    /// Sum of macro targets across windows
    pub daily_totals: MacroTargets,
    /// Free-text annotations (rest day, fueling conflicts, ...)
    pub notes: Vec<String>,
}

/// A logged food/drink entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionItem {
    pub name: String,
    /// When the item was logged (UTC)
    pub logged_at: DateTime<Utc>,
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    /// Explicit fluid content, if the entry is (or includes) a drink
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_ml: Option<f64>,
}

impl NutritionItem {
    /// Total solid mass proxy, used to estimate water bundled with meals
    pub fn total_macro_g(&self) -> f64 {
        self.carbs_g + self.protein_g + self.fat_g
    }
}

/// A planned or actual training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutEffort {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Calendar date of the session (user-local)
    pub date: NaiveDate,
    /// Explicit start time (UTC), when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    pub duration_sec: u32,
    /// Intensity factor proxy (~0.5 easy, ~1.0 threshold)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_intensity: Option<f64>,
    /// Training stress score, when the platform has computed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tss: Option<f64>,
}

/// Intensity factor assumed when a session carries neither TSS nor an
/// explicit work intensity.
const DEFAULT_WORK_INTENSITY: f64 = 0.7;

impl WorkoutEffort {
    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.duration_sec))
    }

    /// End of the session, when the start is known
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.start.map(|s| s + self.duration())
    }

    /// Training load in TSS-like units.
    ///
    /// Uses the platform-computed TSS when present, otherwise the classic
    /// estimate IF^2 x hours x 100.
    pub fn load(&self) -> f64 {
        if let Some(tss) = self.tss {
            return tss.max(0.0);
        }
        let intensity = self.work_intensity.unwrap_or(DEFAULT_WORK_INTENSITY);
        let hours = f64::from(self.duration_sec) / 3600.0;
        intensity * intensity * hours * 100.0
    }
}

/// Tank classification; lower is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TankState {
    Optimal,
    Moderate,
    Critical,
}

impl TankState {
    pub fn label(self) -> &'static str {
        match self {
            TankState::Optimal => "Optimal",
            TankState::Moderate => "Moderate",
            TankState::Critical => "Critical",
        }
    }
}

impl From<TankState> for u8 {
    fn from(state: TankState) -> u8 {
        match state {
            TankState::Optimal => 1,
            TankState::Moderate => 2,
            TankState::Critical => 3,
        }
    }
}

impl TryFrom<u8> for TankState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TankState::Optimal),
            2 => Ok(TankState::Moderate),
            3 => Ok(TankState::Critical),
            other => Err(format!("unknown tank state code: {other}")),
        }
    }
}

/// Total replenishment absorbed so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplenishmentComponent {
    /// Percentage points added to the tank
    pub value: f64,
}

/// One workout's depletion contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepletionComponent {
    /// Percentage points drawn from the tank
    pub value: f64,
    pub source_workout_id: Uuid,
}

/// Component breakdown behind a glycogen snapshot.
///
/// Reported so callers can explain the number, not just display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlycogenBreakdown {
    pub midnight_baseline: f64,
    pub replenishment: ReplenishmentComponent,
    pub depletion: Vec<DepletionComponent>,
}

/// Point-in-time glycogen snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlycogenState {
    /// Tank level, clamped to 0-100
    pub percentage: f64,
    pub state: TankState,
    pub advice: String,
    pub breakdown: GlycogenBreakdown,
}

/// One discretization step of the daily energy timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyTimelinePoint {
    /// `HH:mm` in the user's local time
    pub time: String,
    /// Tank level, 0-100
    pub level: f64,
}

/// One day of the rolling fluid-balance ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidBalancePoint {
    pub date: NaiveDate,
    /// Accumulated deficit (ml); larger means more dehydrated
    pub fluid_deficit_ml: f64,
}

/// One day's fluid-relevant inputs, consumed in date order by the wave tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayFluidInputs {
    pub date: NaiveDate,
    pub nutrition: Vec<NutritionItem>,
    pub workouts: Vec<WorkoutEffort>,
}
