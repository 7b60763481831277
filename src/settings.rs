//! Engine settings
//!
//! Every tunable threshold lives here, grouped by concern. Settings are a
//! plain record passed by reference into each call; the engine never reads
//! ambient state and never mutates them.

use serde::{Deserialize, Serialize};

/// Complete settings record for the fueling engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelSettings {
    /// Glycogen tank simulation settings
    pub tank: TankSettings,
    /// Fueling window construction and merge settings
    pub windows: WindowSettings,
    /// Fluid balance settings
    pub hydration: HydrationSettings,
}

/// Tunables for the glycogen tank simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankSettings {
    /// Tank level assumed at local midnight (percent)
    pub midnight_baseline_pct: f64,
    /// Level at or above which the tank is Optimal (state 1)
    pub optimal_min_pct: f64,
    /// Level below which the tank is Critical (state 3)
    pub critical_max_pct: f64,
    /// Aggregate glycogen store the percentage scale maps onto (grams)
    pub tank_capacity_g: f64,
    /// Carbohydrate cost per TSS-like load unit (grams)
    pub carb_cost_per_load_g: f64,
    /// Depletion drift after a session ends (minutes)
    pub afterburn_min: u32,
    /// Timeline discretization step (minutes)
    pub timeline_step_min: u32,
    /// Daily carbs-per-kg threshold between fueling states 1 and 2
    pub fuel_state2_min: f64,
    /// Daily carbs-per-kg threshold between fueling states 2 and 3
    pub fuel_state3_min: f64,
}

impl Default for TankSettings {
    fn default() -> Self {
        Self {
            midnight_baseline_pct: 70.0,
            optimal_min_pct: 65.0,
            critical_max_pct: 35.0,
            tank_capacity_g: 500.0,
            carb_cost_per_load_g: 0.8,
            afterburn_min: 30,
            timeline_step_min: 15,
            fuel_state2_min: 3.0,
            fuel_state3_min: 6.0,
        }
    }
}

/// Tunables for window building and merging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Lead time of a pre-workout window (minutes)
    pub pre_lead_min: u32,
    /// Recovery span of a post-workout window (minutes)
    pub post_recovery_min: u32,
    /// Minimum session duration that earns an intra-workout window (seconds)
    pub intra_min_duration_sec: u32,
    /// Maximum gap between same-kind windows that still merges (minutes).
    /// 0 means touching-or-overlapping only.
    pub max_merge_gap_min: u32,
    /// Load stand-in for resting metabolism in the apportionment split
    pub base_load: f64,
    /// Local hour assumed for sessions without an explicit start time
    pub default_start_hour: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            pre_lead_min: 120,
            post_recovery_min: 60,
            intra_min_duration_sec: 4500,
            max_merge_gap_min: 0,
            base_load: 100.0,
            default_start_hour: 7,
        }
    }
}

/// Tunables for the fluid balance ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationSettings {
    /// Per-user sweat rate at reference intensity (liters per hour)
    pub sweat_rate_l_per_hour: f64,
    /// Load at which the sweat rate applies unscaled
    pub reference_load: f64,
    /// Implicit water carried per gram of logged food without explicit fluid
    pub meal_water_ml_per_g: f64,
    /// Lowest value the running deficit can take (ml)
    pub deficit_floor_ml: f64,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            sweat_rate_l_per_hour: 1.0,
            reference_load: 100.0,
            meal_water_ml_per_g: 1.2,
            deficit_floor_ml: 0.0,
        }
    }
}
