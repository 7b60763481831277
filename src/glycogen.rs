//! Glycogen tank simulation
//!
//! Models the athlete's stored carbohydrate reserve as a single 0-100% tank.
//! The level at any instant is the midnight baseline plus every nutrition
//! item's absorbed contribution minus every session's depletion, clamped to
//! the tank range. All arithmetic happens in UTC; the user's timezone only
//! anchors local midnight and renders `HH:mm` labels.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::absorption::resolve_absorption;
use crate::error::FuelError;
use crate::settings::TankSettings;
use crate::types::{
    DepletionComponent, EnergyTimelinePoint, GlycogenBreakdown, GlycogenState, NutritionItem,
    ReplenishmentComponent, TankState, WorkoutEffort,
};

/// Share of a session's carb cost drawn down by the time it ends; the rest
/// drifts in over the afterburn period.
const END_OF_SESSION_FRACTION: f64 = 0.9;

/// Minutes of history inspected to flag a fast-dropping level
const TREND_LOOKBACK_MIN: i64 = 5;

/// Drop (percentage points) over the lookback that counts as fast
const FAST_DROP_PCT: f64 = 5.0;

/// Compute the energy timeline for one local calendar day.
///
/// Returns one point per `timeline_step_min` across 24 hours from the
/// user's local midnight, with `HH:mm` labels in the user's zone. Days
/// without any nutrition or workout data produce a flat line at the
/// midnight baseline.
pub fn energy_timeline(
    nutrition: &[NutritionItem],
    workouts: &[WorkoutEffort],
    date: NaiveDate,
    settings: &TankSettings,
    timezone: &str,
) -> Result<Vec<EnergyTimelinePoint>, FuelError> {
    let tz = parse_zone(timezone)?;
    let midnight = local_midnight_utc(date, tz);

    let step = i64::from(settings.timeline_step_min.max(1));
    let steps = 24 * 60 / step;

    let mut points = Vec::with_capacity(steps as usize);
    for i in 0..steps {
        let t = midnight + Duration::minutes(i * step);
        let level = level_at(nutrition, workouts, settings, t);
        points.push(EnergyTimelinePoint {
            time: t.with_timezone(&tz).format("%H:%M").to_string(),
            level: round1(level),
        });
    }

    Ok(points)
}

/// Compute the point-in-time glycogen snapshot at `as_of`.
///
/// The snapshot carries the clamped tank percentage, its classification
/// against the settings thresholds, templated advice, and the component
/// breakdown (baseline, absorbed replenishment, per-session depletion) so
/// the caller can explain the number.
pub fn glycogen_state(
    nutrition: &[NutritionItem],
    workouts: &[WorkoutEffort],
    settings: &TankSettings,
    timezone: &str,
    as_of: DateTime<Utc>,
) -> Result<GlycogenState, FuelError> {
    parse_zone(timezone)?;

    let replenishment = replenishment_pct(nutrition, settings, as_of);
    let depletion = depletion_components(workouts, settings, as_of);
    let depleted_total: f64 = depletion.iter().map(|d| d.value).sum();

    let percentage = round1(
        (settings.midnight_baseline_pct + replenishment - depleted_total).clamp(0.0, 100.0),
    );

    let state = classify(percentage, settings);
    let earlier = level_at(
        nutrition,
        workouts,
        settings,
        as_of - Duration::minutes(TREND_LOOKBACK_MIN),
    );
    let falling_fast = earlier - percentage > FAST_DROP_PCT;

    Ok(GlycogenState {
        percentage,
        state,
        advice: advice(state, percentage, falling_fast),
        breakdown: GlycogenBreakdown {
            midnight_baseline: settings.midnight_baseline_pct,
            replenishment: ReplenishmentComponent {
                value: round1(replenishment),
            },
            depletion,
        },
    })
}

/// Tank level at `t`, clamped to 0-100
fn level_at(
    nutrition: &[NutritionItem],
    workouts: &[WorkoutEffort],
    settings: &TankSettings,
    t: DateTime<Utc>,
) -> f64 {
    let replenished = replenishment_pct(nutrition, settings, t);
    let depleted: f64 = depletion_components(workouts, settings, t)
        .iter()
        .map(|d| d.value)
        .sum();
    (settings.midnight_baseline_pct + replenished - depleted).clamp(0.0, 100.0)
}

/// Percentage points absorbed from all nutrition items by `t`
fn replenishment_pct(nutrition: &[NutritionItem], settings: &TankSettings, t: DateTime<Utc>) -> f64 {
    nutrition
        .iter()
        .map(|item| {
            let contribution = item.carbs_g / settings.tank_capacity_g * 100.0;
            let elapsed_min = (t - item.logged_at).num_seconds() as f64 / 60.0;
            contribution * resolve_absorption(&item.name).uptake_fraction(elapsed_min)
        })
        .sum()
}

/// Per-session depletion contributions at `t`.
///
/// Sessions without a resolved start time contribute nothing; the facade
/// fills in default starts before the simulation runs.
fn depletion_components(
    workouts: &[WorkoutEffort],
    settings: &TankSettings,
    t: DateTime<Utc>,
) -> Vec<DepletionComponent> {
    workouts
        .iter()
        .filter_map(|workout| {
            let start = workout.start?;
            let end = start + workout.duration();
            let cost_pct =
                workout.load() * settings.carb_cost_per_load_g / settings.tank_capacity_g * 100.0;
            let fraction = depletion_fraction(t, start, end, settings.afterburn_min);
            Some(DepletionComponent {
                value: round1(cost_pct * fraction),
                source_workout_id: workout.id,
            })
        })
        .collect()
}

/// Fraction of a session's full cost drawn down by `t`: linear to 90% at
/// the session's end, then linear to 100% over the afterburn period.
fn depletion_fraction(
    t: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    afterburn_min: u32,
) -> f64 {
    if t <= start {
        return 0.0;
    }
    if t < end {
        let total = (end - start).num_seconds() as f64;
        let elapsed = (t - start).num_seconds() as f64;
        return END_OF_SESSION_FRACTION * elapsed / total;
    }
    if afterburn_min == 0 {
        return 1.0;
    }
    let drift = (t - end).num_seconds() as f64 / (f64::from(afterburn_min) * 60.0);
    END_OF_SESSION_FRACTION + (1.0 - END_OF_SESSION_FRACTION) * drift.min(1.0)
}

fn classify(percentage: f64, settings: &TankSettings) -> TankState {
    if percentage >= settings.optimal_min_pct {
        TankState::Optimal
    } else if percentage < settings.critical_max_pct {
        TankState::Critical
    } else {
        TankState::Moderate
    }
}

fn advice(state: TankState, percentage: f64, falling_fast: bool) -> String {
    let mut text = match state {
        TankState::Optimal => format!(
            "Tank is topped up at {percentage:.0}%. Hold your planned fueling cadence."
        ),
        TankState::Moderate => format!(
            "Tank is at {percentage:.0}%. Add 30-60 g of quick carbs within the next hour."
        ),
        TankState::Critical => format!(
            "Tank is critically low at {percentage:.0}%. Take on rapid carbs now and ease intensity."
        ),
    };
    if falling_fast {
        text.push_str(" Level is dropping fast; fuel before it slides further.");
    }
    text
}

fn parse_zone(timezone: &str) -> Result<Tz, FuelError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| FuelError::InvalidTimezone(timezone.to_string()))
}

/// UTC instant of the given local calendar date's midnight.
///
/// A midnight skipped by a DST jump lands on the first valid hour; an
/// ambiguous midnight resolves to the earlier offset.
pub(crate) fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc)),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
