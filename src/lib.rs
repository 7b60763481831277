//! Fuelcore - metabolic fueling engine for athlete coaching
//!
//! Fuelcore turns an athlete's planned and logged day into fueling guidance
//! through a deterministic pipeline: window building → window merging →
//! fueling plan, alongside the glycogen tank simulation and the multi-day
//! fluid balance tracker.
//!
//! ## Modules
//!
//! - **absorption**: classify food/drink items into absorption-rate classes
//! - **windows** / **merge**: build and merge the day's fueling windows
//! - **glycogen**: simulate the 0-100% tank across a day
//! - **hydration**: fold the rolling fluid-deficit wave
//! - **service**: per-user/date facade over caller-supplied stores
//!
//! Everything is a pure, synchronous transformation over already-fetched
//! data: identical inputs always produce identical outputs, and the only
//! clock the engine knows is the explicit `as_of` parameter.

pub mod absorption;
pub mod error;
pub mod glycogen;
pub mod hydration;
pub mod merge;
pub mod service;
pub mod settings;
pub mod types;
pub mod windows;

pub use absorption::{profile_for_item, resolve_absorption, AbsorptionClass, AbsorptionProfile};
pub use error::FuelError;
pub use glycogen::{energy_timeline, glycogen_state};
pub use hydration::wave_range;
pub use merge::merge_windows;
pub use service::{MetabolicService, NutritionStore, PlanStore, WorkoutStore};
pub use settings::{FuelSettings, HydrationSettings, TankSettings, WindowSettings};
pub use types::{
    DayFluidInputs, EnergyTimelinePoint, FluidBalancePoint, FuelingPlan, FuelingWindow,
    GlycogenState, MacroTargets, NutritionItem, TankState, WindowKind, WorkoutEffort,
};
pub use windows::build_windows;

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
