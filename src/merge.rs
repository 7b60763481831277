//! Fueling window merging
//!
//! Collapses overlapping candidate windows into a final non-overlapping
//! schedule: one left-to-right sweep over the start-sorted list with an
//! immutable accumulator. Same-kind windows within the configured gap merge
//! into their hull with summed targets; a post-workout window running into
//! the next pre-workout window becomes a single transition window.

use chrono::Duration;

use crate::error::FuelError;
use crate::settings::WindowSettings;
use crate::types::{FuelingWindow, WindowKind};

/// Merge candidate windows into the final schedule.
///
/// Deterministic and order-independent: the input is sorted by start time
/// (ties broken by a fixed kind priority) before the sweep. Well-formed
/// input never fails; a malformed window (inverted interval, negative
/// target) is a caller bug and is reported, not normalized.
pub fn merge_windows(
    windows: Vec<FuelingWindow>,
    settings: &WindowSettings,
) -> Result<Vec<FuelingWindow>, FuelError> {
    for window in &windows {
        window.validate()?;
    }

    if windows.len() < 2 {
        return Ok(windows);
    }

    let mut sorted = windows;
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.kind.merge_priority().cmp(&b.kind.merge_priority()))
    });

    let max_gap = Duration::minutes(i64::from(settings.max_merge_gap_min));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter();
    let mut current = iter.next().expect("len checked above");

    for candidate in iter {
        let within_reach = candidate.start <= current.end + max_gap;

        if within_reach && candidate.kind == current.kind {
            current = combine(current.kind, &current, &candidate);
        } else if within_reach
            && current.kind == WindowKind::PostWorkout
            && candidate.kind == WindowKind::PreWorkout
        {
            // Recovery running into the next session's prep: one
            // transition window covering both.
            current = combine(WindowKind::Transition, &current, &candidate);
        } else if within_reach
            && current.kind == WindowKind::Transition
            && matches!(
                candidate.kind,
                WindowKind::PreWorkout | WindowKind::PostWorkout
            )
        {
            // A transition keeps absorbing workout-linked windows in its
            // overlap component.
            current = combine(WindowKind::Transition, &current, &candidate);
        } else {
            merged.push(current);
            current = candidate;
        }
    }
    merged.push(current);

    Ok(merged)
}

/// Build the replacement window for a merge step: hull of the two spans,
/// targets summed, the richer annotation kept.
fn combine(kind: WindowKind, a: &FuelingWindow, b: &FuelingWindow) -> FuelingWindow {
    FuelingWindow {
        kind,
        start: a.start.min(b.start),
        end: a.end.max(b.end),
        targets: a.targets.add(&b.targets),
        description: richer(&a.description, &b.description),
        workout_title: richer(&a.workout_title, &b.workout_title),
    }
}

/// Longer string wins; ties keep the accumulator's value.
fn richer(a: &Option<String>, b: &Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) if b.len() > a.len() => Some(b.clone()),
        (Some(a), _) => Some(a.clone()),
        (None, b) => b.clone(),
    }
}
