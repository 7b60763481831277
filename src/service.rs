//! Metabolic service orchestration
//!
//! `MetabolicService` is the facade the platform talks to: it pulls a
//! user's day from the store collaborators, runs the pure stages (window
//! building, merging, tank simulation, wave tracking), and optionally hands
//! the finished plan back for persistence. All state lives in the caller's
//! stores; the service itself only holds settings and the user's timezone.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::FuelError;
use crate::glycogen::{self, local_midnight_utc};
use crate::hydration;
use crate::merge::merge_windows;
use crate::settings::FuelSettings;
use crate::types::{
    DayFluidInputs, EnergyTimelinePoint, FluidBalancePoint, FuelingPlan, GlycogenState,
    MacroTargets, NutritionItem, WindowKind, WorkoutEffort,
};
use crate::windows::build_windows;

/// Tolerance for the plan-totals consistency check (grams)
const MACRO_TOLERANCE_G: f64 = 0.01;

/// Read access to a user's nutrition log
pub trait NutritionStore {
    fn nutrition_for(&self, user_id: Uuid, date: NaiveDate)
        -> Result<Vec<NutritionItem>, FuelError>;

    /// The day's platform-computed macro targets
    fn daily_targets_for(&self, user_id: Uuid, date: NaiveDate)
        -> Result<MacroTargets, FuelError>;
}

/// Read access to a user's planned and completed sessions
pub trait WorkoutStore {
    fn workouts_for(&self, user_id: Uuid, date: NaiveDate)
        -> Result<Vec<WorkoutEffort>, FuelError>;
}

/// Write access for computed plans
pub trait PlanStore {
    fn save_plan(&self, user_id: Uuid, plan: &FuelingPlan) -> Result<(), FuelError>;
}

/// Facade composing the fueling engine per user and date
pub struct MetabolicService<S> {
    store: S,
    settings: FuelSettings,
    timezone: String,
}

impl<S> MetabolicService<S>
where
    S: NutritionStore + WorkoutStore + PlanStore,
{
    pub fn new(store: S, settings: FuelSettings, timezone: impl Into<String>) -> Self {
        Self {
            store,
            settings,
            timezone: timezone.into(),
        }
    }

    pub fn settings(&self) -> &FuelSettings {
        &self.settings
    }

    /// Build, merge, and optionally persist the fueling plan for one day.
    pub fn fueling_plan_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        persist: bool,
    ) -> Result<FuelingPlan, FuelError> {
        let tz = self.zone()?;
        let day_start = local_midnight_utc(date, tz);

        let daily_targets = self.store.daily_targets_for(user_id, date)?;
        let workouts = self.resolved_workouts(user_id, date, day_start)?;
        debug!(%user_id, %date, workouts = workouts.len(), "building fueling plan");

        let candidates =
            build_windows(day_start, &daily_targets, &workouts, &self.settings.windows)?;
        let windows = merge_windows(candidates, &self.settings.windows)?;

        let mut notes = Vec::new();
        if workouts.is_empty() {
            notes.push("Rest day - steady baseline fueling.".to_string());
        }
        let transitions = windows
            .iter()
            .filter(|w| w.kind == WindowKind::Transition)
            .count();
        if transitions > 0 {
            notes.push(format!(
                "Back-to-back sessions: {transitions} transition window(s) scheduled."
            ));
        }

        let daily_totals = windows
            .iter()
            .fold(MacroTargets::ZERO, |acc, w| acc.add(&w.targets));
        if (daily_totals.carbs_g - daily_targets.carbs_g).abs() > MACRO_TOLERANCE_G
            || (daily_totals.protein_g - daily_targets.protein_g).abs() > MACRO_TOLERANCE_G
            || (daily_totals.fat_g - daily_targets.fat_g).abs() > MACRO_TOLERANCE_G
        {
            warn!(%user_id, %date, "plan totals drifted from daily targets");
            notes.push("Plan totals differ from the daily macro target.".to_string());
        }

        let plan = FuelingPlan {
            date,
            windows,
            daily_totals,
            notes,
        };

        if persist {
            self.store.save_plan(user_id, &plan)?;
            debug!(%user_id, %date, "fueling plan persisted");
        }

        Ok(plan)
    }

    /// Glycogen snapshot for the local day containing `as_of`.
    pub fn glycogen_state(
        &self,
        user_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<GlycogenState, FuelError> {
        let tz = self.zone()?;
        let date = as_of.with_timezone(&tz).date_naive();
        let day_start = local_midnight_utc(date, tz);

        let nutrition = self.store.nutrition_for(user_id, date)?;
        let workouts = self.resolved_workouts(user_id, date, day_start)?;

        glycogen::glycogen_state(
            &nutrition,
            &workouts,
            &self.settings.tank,
            &self.timezone,
            as_of,
        )
    }

    /// Full-day energy timeline for one local calendar day.
    pub fn energy_timeline(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<EnergyTimelinePoint>, FuelError> {
        let tz = self.zone()?;
        let day_start = local_midnight_utc(date, tz);

        let nutrition = self.store.nutrition_for(user_id, date)?;
        let workouts = self.resolved_workouts(user_id, date, day_start)?;

        glycogen::energy_timeline(
            &nutrition,
            &workouts,
            date,
            &self.settings.tank,
            &self.timezone,
        )
    }

    /// Fluid-deficit series across an inclusive date range.
    ///
    /// Days are fetched and folded oldest to newest; the recurrence makes
    /// this sequential per user.
    pub fn wave_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FluidBalancePoint>, FuelError> {
        if start > end {
            return Err(FuelError::EmptyDateRange { start, end });
        }

        let mut days = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            days.push(DayFluidInputs {
                date,
                nutrition: self.store.nutrition_for(user_id, date)?,
                workouts: self.store.workouts_for(user_id, date)?,
            });
        }
        debug!(%user_id, %start, %end, days = days.len(), "tracking fluid wave");

        Ok(hydration::wave_range(&days, &self.settings.hydration))
    }

    fn zone(&self) -> Result<Tz, FuelError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| FuelError::InvalidTimezone(self.timezone.clone()))
    }

    /// Fetch the day's workouts with every start time resolved; sessions
    /// logged without one are placed at the default local hour.
    fn resolved_workouts(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        day_start: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEffort>, FuelError> {
        let default_start =
            day_start + Duration::hours(i64::from(self.settings.windows.default_start_hour));
        let mut workouts = self.store.workouts_for(user_id, date)?;
        for workout in &mut workouts {
            workout.start.get_or_insert(default_start);
        }
        Ok(workouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        nutrition: HashMap<NaiveDate, Vec<NutritionItem>>,
        targets: HashMap<NaiveDate, MacroTargets>,
        workouts: HashMap<NaiveDate, Vec<WorkoutEffort>>,
        saved: RefCell<Vec<FuelingPlan>>,
    }

    impl NutritionStore for MemoryStore {
        fn nutrition_for(
            &self,
            _user_id: Uuid,
            date: NaiveDate,
        ) -> Result<Vec<NutritionItem>, FuelError> {
            Ok(self.nutrition.get(&date).cloned().unwrap_or_default())
        }

        fn daily_targets_for(
            &self,
            user_id: Uuid,
            date: NaiveDate,
        ) -> Result<MacroTargets, FuelError> {
            self.targets
                .get(&date)
                .copied()
                .ok_or_else(|| FuelError::Store(format!("no daily targets for {user_id} on {date}")))
        }
    }

    impl WorkoutStore for MemoryStore {
        fn workouts_for(
            &self,
            _user_id: Uuid,
            date: NaiveDate,
        ) -> Result<Vec<WorkoutEffort>, FuelError> {
            Ok(self.workouts.get(&date).cloned().unwrap_or_default())
        }
    }

    impl PlanStore for MemoryStore {
        fn save_plan(&self, _user_id: Uuid, plan: &FuelingPlan) -> Result<(), FuelError> {
            self.saved.borrow_mut().push(plan.clone());
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn effort(hour: u32, duration_sec: u32, tss: f64) -> WorkoutEffort {
        WorkoutEffort {
            id: Uuid::new_v4(),
            title: Some("Threshold run".to_string()),
            date: date(),
            start: Some(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()),
            duration_sec,
            work_intensity: None,
            tss: Some(tss),
        }
    }

    fn service_with(store: MemoryStore) -> MetabolicService<MemoryStore> {
        MetabolicService::new(store, FuelSettings::default(), "UTC")
    }

    #[test]
    fn test_rest_day_plan_has_base_window_and_note() {
        let mut store = MemoryStore::default();
        store
            .targets
            .insert(date(), MacroTargets::new(220.0, 110.0, 70.0));
        let service = service_with(store);

        let plan = service
            .fueling_plan_for_date(Uuid::new_v4(), date(), false)
            .unwrap();

        assert_eq!(plan.windows.len(), 1);
        assert_eq!(plan.windows[0].kind, WindowKind::DailyBase);
        assert!(plan.notes.iter().any(|n| n.contains("Rest day")));
        assert_eq!(plan.daily_totals, MacroTargets::new(220.0, 110.0, 70.0));
    }

    #[test]
    fn test_back_to_back_sessions_produce_transition() {
        let mut store = MemoryStore::default();
        store
            .targets
            .insert(date(), MacroTargets::new(320.0, 140.0, 90.0));
        // The second session's pre window reaches back into the first
        // session's recovery window
        let second = WorkoutEffort {
            start: Some(Utc.with_ymd_and_hms(2024, 3, 1, 11, 30, 0).unwrap()),
            ..effort(11, 3600, 60.0)
        };
        store
            .workouts
            .insert(date(), vec![effort(8, 3600, 80.0), second]);
        let service = service_with(store);

        let plan = service
            .fueling_plan_for_date(Uuid::new_v4(), date(), false)
            .unwrap();

        assert!(plan
            .windows
            .iter()
            .any(|w| w.kind == WindowKind::Transition));
        assert!(plan.notes.iter().any(|n| n.contains("transition")));

        // Merging kept every gram of the daily target
        assert!((plan.daily_totals.carbs_g - 320.0).abs() < MACRO_TOLERANCE_G);
        assert!((plan.daily_totals.protein_g - 140.0).abs() < MACRO_TOLERANCE_G);
        assert!((plan.daily_totals.fat_g - 90.0).abs() < MACRO_TOLERANCE_G);
    }

    #[test]
    fn test_plan_is_persisted_only_on_request() {
        let mut store = MemoryStore::default();
        store
            .targets
            .insert(date(), MacroTargets::new(220.0, 110.0, 70.0));
        let service = service_with(store);
        let user = Uuid::new_v4();

        service.fueling_plan_for_date(user, date(), false).unwrap();
        assert!(service.store.saved.borrow().is_empty());

        service.fueling_plan_for_date(user, date(), true).unwrap();
        assert_eq!(service.store.saved.borrow().len(), 1);
    }

    #[test]
    fn test_unstarted_workout_lands_on_default_hour() {
        let mut store = MemoryStore::default();
        store
            .targets
            .insert(date(), MacroTargets::new(220.0, 110.0, 70.0));
        store.workouts.insert(
            date(),
            vec![WorkoutEffort {
                start: None,
                ..effort(0, 3600, 60.0)
            }],
        );
        let service = service_with(store);

        let plan = service
            .fueling_plan_for_date(Uuid::new_v4(), date(), false)
            .unwrap();

        let pre = plan
            .windows
            .iter()
            .find(|w| w.kind == WindowKind::PreWorkout)
            .unwrap();
        // Placed at 07:00 local, so the pre window ends there
        assert_eq!(pre.end, Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_store_failure_propagates() {
        let service = service_with(MemoryStore::default());

        let result = service.fueling_plan_for_date(Uuid::new_v4(), date(), false);

        assert!(matches!(result, Err(FuelError::Store(_))));
    }

    #[test]
    fn test_glycogen_snapshot_through_the_facade() {
        let mut store = MemoryStore::default();
        store.workouts.insert(date(), vec![effort(6, 3600, 150.0)]);
        let service = service_with(store);

        let snapshot = service
            .glycogen_state(
                Uuid::new_v4(),
                Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            )
            .unwrap();

        // 150 TSS costs 24 points off the 70% baseline
        assert_eq!(snapshot.percentage, 46.0);
        assert_eq!(snapshot.breakdown.depletion.len(), 1);
    }

    #[test]
    fn test_wave_range_walks_days_in_order() {
        let mut store = MemoryStore::default();
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        store.workouts.insert(
            d1,
            vec![WorkoutEffort {
                date: d1,
                ..effort(8, 3600, 100.0)
            }],
        );
        store.workouts.insert(
            d2,
            vec![WorkoutEffort {
                date: d2,
                ..effort(8, 3600, 100.0)
            }],
        );
        let service = service_with(store);

        let points = service.wave_range(Uuid::new_v4(), d1, d2).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d1);
        assert_eq!(points[0].fluid_deficit_ml, 1000.0);
        assert_eq!(points[1].fluid_deficit_ml, 2000.0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let service = service_with(MemoryStore::default());
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();

        let result = service.wave_range(Uuid::new_v4(), d2, d1);

        assert!(matches!(result, Err(FuelError::EmptyDateRange { .. })));
    }
}
