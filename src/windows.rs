//! Fueling window construction
//!
//! Derives the day's candidate windows from its workouts and daily macro
//! targets: one pre/intra/post set per session plus a daily base window
//! holding whatever the sessions did not claim. The builder never merges;
//! overlap in its output is legitimate and resolved downstream.

use chrono::{DateTime, Duration, Utc};

use crate::error::FuelError;
use crate::settings::WindowSettings;
use crate::types::{FuelingWindow, MacroTargets, WindowKind, WorkoutEffort};

/// Carb split across a workout's windows when all three exist
const CARB_SPLIT_PRE: f64 = 0.40;
const CARB_SPLIT_INTRA: f64 = 0.30;
const CARB_SPLIT_POST: f64 = 0.30;

/// Protein goes mostly to recovery
const PROTEIN_SPLIT_PRE: f64 = 0.25;
const PROTEIN_SPLIT_POST: f64 = 0.75;

/// Build the candidate fueling windows for one day.
///
/// `day_start` is the UTC instant of the user's local midnight; the daily
/// base window spans the 24 hours from there. Every workout must carry a
/// resolved start time (the facade fills in defaults before calling).
///
/// Apportionment: each session claims `load / (total_load + base_load)` of
/// the daily carbs and protein, where `base_load` stands in for resting
/// metabolism; the daily base window receives the exact remainder, so the
/// built windows always sum to the daily targets. Fat stays entirely in
/// the base window.
pub fn build_windows(
    day_start: DateTime<Utc>,
    daily_targets: &MacroTargets,
    workouts: &[WorkoutEffort],
    settings: &WindowSettings,
) -> Result<Vec<FuelingWindow>, FuelError> {
    if !daily_targets.is_non_negative() {
        return Err(FuelError::InvalidTargets {
            detail: "daily macro targets must be non-negative".to_string(),
        });
    }

    let total_load: f64 = workouts.iter().map(WorkoutEffort::load).sum();
    let pool = total_load + settings.base_load;

    let mut windows = Vec::new();
    let mut allocated = MacroTargets::ZERO;

    for workout in workouts {
        let start = workout.start.ok_or_else(|| FuelError::InvalidWindow {
            detail: format!("workout {} has no resolved start time", workout.id),
        })?;
        let end = start + workout.duration();
        let title = workout.title.clone();
        let label = title.as_deref().unwrap_or("workout");

        let share = if pool > 0.0 { workout.load() / pool } else { 0.0 };
        let carbs = daily_targets.carbs_g * share;
        let protein = daily_targets.protein_g * share;

        let has_intra = workout.duration_sec >= settings.intra_min_duration_sec;
        // Without an intra window its carb share folds into pre and post
        let (pre_carbs, intra_carbs, post_carbs) = if has_intra {
            (
                carbs * CARB_SPLIT_PRE,
                carbs * CARB_SPLIT_INTRA,
                carbs * CARB_SPLIT_POST,
            )
        } else {
            (
                carbs * (CARB_SPLIT_PRE + CARB_SPLIT_INTRA / 2.0),
                0.0,
                carbs * (CARB_SPLIT_POST + CARB_SPLIT_INTRA / 2.0),
            )
        };

        let pre = FuelingWindow {
            kind: WindowKind::PreWorkout,
            start: start - Duration::minutes(i64::from(settings.pre_lead_min)),
            end: start,
            targets: MacroTargets::new(pre_carbs, protein * PROTEIN_SPLIT_PRE, 0.0),
            description: Some(format!("Top up before {label}")),
            workout_title: title.clone(),
        };
        allocated = allocated.add(&pre.targets);
        windows.push(pre);

        if has_intra {
            let intra = FuelingWindow {
                kind: WindowKind::IntraWorkout,
                start,
                end,
                targets: MacroTargets::new(intra_carbs, 0.0, 0.0),
                description: Some(format!("Fuel during {label}")),
                workout_title: title.clone(),
            };
            allocated = allocated.add(&intra.targets);
            windows.push(intra);
        }

        let post = FuelingWindow {
            kind: WindowKind::PostWorkout,
            start: end,
            end: end + Duration::minutes(i64::from(settings.post_recovery_min)),
            targets: MacroTargets::new(post_carbs, protein * PROTEIN_SPLIT_POST, 0.0),
            description: Some(format!("Recover after {label}")),
            workout_title: title,
        };
        allocated = allocated.add(&post.targets);
        windows.push(post);
    }

    // Daily base takes the exact remainder so totals are conserved
    let base = FuelingWindow {
        kind: WindowKind::DailyBase,
        start: day_start,
        end: day_start + Duration::hours(24),
        targets: MacroTargets::new(
            daily_targets.carbs_g - allocated.carbs_g,
            daily_targets.protein_g - allocated.protein_g,
            daily_targets.fat_g - allocated.fat_g,
        ),
        description: Some("Baseline fueling across the day".to_string()),
        workout_title: None,
    };
    windows.push(base);

    Ok(windows)
}
