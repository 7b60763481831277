//! Fluid balance tracking
//!
//! Maintains the rolling multi-day "wave": each day's logged intake is
//! weighed against sweat loss estimated from that day's training, and the
//! running deficit carries forward. The recurrence means days must be
//! folded oldest to newest; the caller supplies them in date order.

use crate::settings::HydrationSettings;
use crate::types::{DayFluidInputs, FluidBalancePoint, NutritionItem, WorkoutEffort};

/// Fold a date-ordered range of day inputs into the deficit series.
///
/// Each point depends only on the previous point's deficit and its own
/// day's intake and loss. The deficit clamps at the configured floor, so
/// a surplus day rehydrates fully but carries no negative debt forward.
pub fn wave_range(days: &[DayFluidInputs], settings: &HydrationSettings) -> Vec<FluidBalancePoint> {
    let mut deficit = settings.deficit_floor_ml;
    let mut points = Vec::with_capacity(days.len());

    for day in days {
        let intake = day_intake_ml(&day.nutrition, settings);
        let loss = day_sweat_loss_ml(&day.workouts, settings);
        deficit = (deficit + loss - intake).max(settings.deficit_floor_ml);
        points.push(FluidBalancePoint {
            date: day.date,
            fluid_deficit_ml: round_ml(deficit),
        });
    }

    points
}

/// Logged fluid for one day: explicit water plus the water bundled with
/// meals that carry no explicit figure.
fn day_intake_ml(nutrition: &[NutritionItem], settings: &HydrationSettings) -> f64 {
    nutrition
        .iter()
        .map(|item| match item.water_ml {
            Some(water) => water,
            None => item.total_macro_g() * settings.meal_water_ml_per_g,
        })
        .sum()
}

/// Estimated sweat loss for one day's sessions.
///
/// The per-user sweat rate applies unscaled at the reference load; harder
/// or easier sessions scale it within a factor of two either way.
fn day_sweat_loss_ml(workouts: &[WorkoutEffort], settings: &HydrationSettings) -> f64 {
    workouts
        .iter()
        .map(|workout| {
            let hours = f64::from(workout.duration_sec) / 3600.0;
            let intensity_factor = if settings.reference_load > 0.0 {
                (workout.load() / settings.reference_load).clamp(0.5, 2.0)
            } else {
                1.0
            };
            hours * settings.sweat_rate_l_per_hour * 1000.0 * intensity_factor
        })
        .sum()
}

fn round_ml(value: f64) -> f64 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn day(day_of_month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day_of_month).unwrap()
    }

    fn water(ml: f64, day_of_month: u32) -> NutritionItem {
        NutritionItem {
            name: "water".to_string(),
            logged_at: Utc.with_ymd_and_hms(2024, 6, day_of_month, 12, 0, 0).unwrap(),
            carbs_g: 0.0,
            protein_g: 0.0,
            fat_g: 0.0,
            water_ml: Some(ml),
        }
    }

    fn dry_meal(macro_g: f64, day_of_month: u32) -> NutritionItem {
        NutritionItem {
            name: "rice and chicken".to_string(),
            logged_at: Utc.with_ymd_and_hms(2024, 6, day_of_month, 18, 0, 0).unwrap(),
            carbs_g: macro_g,
            protein_g: 0.0,
            fat_g: 0.0,
            water_ml: None,
        }
    }

    fn session(duration_sec: u32, tss: f64) -> WorkoutEffort {
        WorkoutEffort {
            id: Uuid::new_v4(),
            title: None,
            date: day(1),
            start: None,
            duration_sec,
            work_intensity: None,
            tss: Some(tss),
        }
    }

    #[test]
    fn test_deficit_accumulates_across_days() {
        // Two hard days with light drinking: the wave builds
        let days = vec![
            DayFluidInputs {
                date: day(1),
                nutrition: vec![water(500.0, 1)],
                workouts: vec![session(3600, 100.0)],
            },
            DayFluidInputs {
                date: day(2),
                nutrition: vec![water(500.0, 2)],
                workouts: vec![session(3600, 100.0)],
            },
        ];

        let points = wave_range(&days, &HydrationSettings::default());

        // 1000 ml loss - 500 ml intake = 500 ml per day
        assert_eq!(points[0].fluid_deficit_ml, 500.0);
        assert_eq!(points[1].fluid_deficit_ml, 1000.0);
    }

    #[test]
    fn test_surplus_day_clamps_at_floor() {
        let days = vec![
            DayFluidInputs {
                date: day(1),
                nutrition: vec![water(200.0, 1)],
                workouts: vec![session(3600, 100.0)],
            },
            DayFluidInputs {
                date: day(2),
                nutrition: vec![water(3000.0, 2)],
                workouts: vec![],
            },
            DayFluidInputs {
                date: day(3),
                nutrition: vec![],
                workouts: vec![session(1800, 50.0)],
            },
        ];

        let points = wave_range(&days, &HydrationSettings::default());

        assert_eq!(points[0].fluid_deficit_ml, 800.0);
        // Day 2 overshoots the debt; no negative carry
        assert_eq!(points[1].fluid_deficit_ml, 0.0);
        // Day 3 starts from the floor, not from the surplus
        assert_eq!(points[2].fluid_deficit_ml, 250.0);
    }

    #[test]
    fn test_next_point_depends_only_on_previous_and_own_day() {
        let days = vec![
            DayFluidInputs {
                date: day(1),
                nutrition: vec![water(100.0, 1)],
                workouts: vec![session(3600, 120.0)],
            },
            DayFluidInputs {
                date: day(2),
                nutrition: vec![water(400.0, 2)],
                workouts: vec![session(1800, 60.0)],
            },
        ];
        let settings = HydrationSettings::default();

        let full = wave_range(&days, &settings);

        // Day 2 sweats 300 ml (half hour at 0.6x load) and drinks 400 ml;
        // its point is exactly the recurrence applied to day 1's close
        let manual = (full[0].fluid_deficit_ml + 300.0 - 400.0).max(0.0);
        assert_eq!(full[1].fluid_deficit_ml, manual);
    }

    #[test]
    fn test_meals_contribute_implicit_water() {
        let days = vec![DayFluidInputs {
            date: day(1),
            nutrition: vec![dry_meal(100.0, 1)],
            workouts: vec![],
        }];

        let points = wave_range(&days, &HydrationSettings::default());

        // 100 g of food at 1.2 ml/g offsets nothing else, deficit stays floored
        assert_eq!(points[0].fluid_deficit_ml, 0.0);

        // The same meal against a session shows the offset
        let days = vec![DayFluidInputs {
            date: day(1),
            nutrition: vec![dry_meal(100.0, 1)],
            workouts: vec![session(3600, 100.0)],
        }];
        let points = wave_range(&days, &HydrationSettings::default());
        assert_eq!(points[0].fluid_deficit_ml, 880.0);
    }

    #[test]
    fn test_harder_sessions_sweat_more() {
        let easy = vec![DayFluidInputs {
            date: day(1),
            nutrition: vec![],
            workouts: vec![session(3600, 50.0)],
        }];
        let hard = vec![DayFluidInputs {
            date: day(1),
            nutrition: vec![],
            workouts: vec![session(3600, 200.0)],
        }];
        let settings = HydrationSettings::default();

        let easy_deficit = wave_range(&easy, &settings)[0].fluid_deficit_ml;
        let hard_deficit = wave_range(&hard, &settings)[0].fluid_deficit_ml;

        assert_eq!(easy_deficit, 500.0);
        assert_eq!(hard_deficit, 2000.0);
    }

    #[test]
    fn test_empty_range_yields_no_points() {
        assert!(wave_range(&[], &HydrationSettings::default()).is_empty());
    }
}
