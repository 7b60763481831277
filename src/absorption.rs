//! Absorption profile resolution
//!
//! Classifies a logged food/drink into one of a closed set of absorption
//! classes, each with a saturating uptake curve. Classification is a pure
//! total function of the item name: unrecognized names resolve to
//! `Balanced` rather than failing.

use serde::{Deserialize, Serialize};

/// How quickly an item's carbohydrate content becomes available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionClass {
    /// Gels, sports drinks: available almost immediately
    Rapid,
    /// Simple snacks, fruit
    Fast,
    /// Mixed meals; the default for unrecognized items
    Balanced,
    /// High-fat or high-fiber meals that release slowly
    Dense,
    /// Deliberate carb-loading servings: large and moderately quick
    HyperLoad,
}

impl AbsorptionClass {
    /// Minutes until the item's full contribution is absorbed
    pub fn horizon_min(self) -> f64 {
        match self {
            AbsorptionClass::Rapid => 20.0,
            AbsorptionClass::Fast => 45.0,
            AbsorptionClass::HyperLoad => 60.0,
            AbsorptionClass::Balanced => 90.0,
            AbsorptionClass::Dense => 180.0,
        }
    }

    /// Fraction of the item's contribution absorbed `elapsed_min` after
    /// logging. Monotonic, 0 at logging, saturates at 1 by the horizon.
    pub fn uptake_fraction(self, elapsed_min: f64) -> f64 {
        if elapsed_min <= 0.0 {
            return 0.0;
        }
        let u = (elapsed_min / self.horizon_min()).clamp(0.0, 1.0);
        // Smoothstep ramp: slow onset, fast middle, asymptotic finish
        u * u * (3.0 - 2.0 * u)
    }
}

/// Absorption class together with its curve horizon
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AbsorptionProfile {
    pub class: AbsorptionClass,
    pub horizon_min: f64,
}

/// Resolve an item name to its absorption class.
///
/// Keyword matching is case-insensitive and first-match-wins, ordered from
/// most to least specific so "carb load drink mix" lands on `HyperLoad`
/// before the drink keywords can claim it.
pub fn resolve_absorption(name: &str) -> AbsorptionClass {
    let lowered = name.to_lowercase();
    let matches = |keys: &[&str]| keys.iter().any(|k| lowered.contains(k));

    if matches(&["carb load", "carbo load", "loading", "maltodextrin bulk"]) {
        return AbsorptionClass::HyperLoad;
    }
    if matches(&[
        "gel",
        "sports drink",
        "isotonic",
        "dextrose",
        "glucose tab",
        "maltodextrin",
        "energy chew",
        "gummie",
    ]) {
        return AbsorptionClass::Rapid;
    }
    if matches(&[
        "banana", "dates", "honey", "white rice", "rice cake", "juice", "toast", "jam", "raisin",
        "bagel",
    ]) {
        return AbsorptionClass::Fast;
    }
    if matches(&[
        "pizza", "burger", "fries", "cheese", "nuts", "peanut", "avocado", "cream", "bacon",
        "sausage", "lentil", "bean",
    ]) {
        return AbsorptionClass::Dense;
    }

    AbsorptionClass::Balanced
}

/// Resolve an item name to its full absorption profile
pub fn profile_for_item(name: &str) -> AbsorptionProfile {
    let class = resolve_absorption(name);
    AbsorptionProfile {
        class,
        horizon_min: class.horizon_min(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_classifications() {
        assert_eq!(resolve_absorption("Energy Gel"), AbsorptionClass::Rapid);
        assert_eq!(resolve_absorption("banana"), AbsorptionClass::Fast);
        assert_eq!(resolve_absorption("Pepperoni Pizza"), AbsorptionClass::Dense);
        assert_eq!(
            resolve_absorption("Carb Load Drink Mix"),
            AbsorptionClass::HyperLoad
        );
    }

    #[test]
    fn test_unknown_name_defaults_to_balanced() {
        assert_eq!(
            resolve_absorption("grandma's mystery casserole"),
            AbsorptionClass::Balanced
        );
        assert_eq!(resolve_absorption(""), AbsorptionClass::Balanced);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(resolve_absorption("ENERGY GEL"), resolve_absorption("energy gel"));
    }

    #[test]
    fn test_uptake_is_monotonic_and_saturating() {
        for class in [
            AbsorptionClass::Rapid,
            AbsorptionClass::Fast,
            AbsorptionClass::Balanced,
            AbsorptionClass::Dense,
            AbsorptionClass::HyperLoad,
        ] {
            let mut previous = class.uptake_fraction(0.0);
            assert_eq!(previous, 0.0);

            let mut minute = 0.0;
            while minute < 240.0 {
                minute += 5.0;
                let current = class.uptake_fraction(minute);
                assert!(current >= previous, "{class:?} decreased at {minute} min");
                previous = current;
            }
            assert!((class.uptake_fraction(class.horizon_min()) - 1.0).abs() < 1e-9);
            assert_eq!(class.uptake_fraction(class.horizon_min() + 60.0), 1.0);
        }
    }

    #[test]
    fn test_rapid_absorbs_before_dense() {
        let at_20 = AbsorptionClass::Rapid.uptake_fraction(20.0);
        let dense_at_20 = AbsorptionClass::Dense.uptake_fraction(20.0);

        assert!((at_20 - 1.0).abs() < 1e-9);
        assert!(dense_at_20 < 0.1);
    }

    #[test]
    fn test_profile_carries_horizon() {
        let profile = profile_for_item("isotonic drink");
        assert_eq!(profile.class, AbsorptionClass::Rapid);
        assert_eq!(profile.horizon_min, 20.0);
    }
}
