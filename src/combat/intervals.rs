//! Time-windowed damage multipliers built from aura lifecycle events.
//!
//! A stacking debuff contributes `1 + stacks * per_stack` while it is up. Each stack change
//! closes the current window and opens the next one, so one ability on one target yields an
//! ordered, non-overlapping interval list.

use serde::{Deserialize, Serialize};

use crate::combat::log_ingest::{AuraBand, AuraEvent, AuraEventKind};

/// Fixed damage multiplier of a curse window.
pub const CURSE_MULTIPLIER: f64 = 1.1;

/// Closed `[start, end]` window (telemetry milliseconds) with its damage multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierInterval {
    pub start: i64,
    pub end: i64,
    pub multiplier: f64,
}

impl ModifierInterval {
    pub fn new(start: i64, end: i64, multiplier: f64) -> Self {
        Self {
            start,
            end,
            multiplier,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackBehavior {
    /// Each stack adds `per_stack` to the multiplier.
    #[default]
    Stacking,
    /// Single application; stack events are ignored.
    Simple,
}

/// Running state machine over one ability's lifecycle events for one target.
#[derive(Debug, Clone)]
pub struct IntervalBuilder {
    target_id: i64,
    per_stack: f64,
    behavior: StackBehavior,
    stacks: u32,
    cursor: Option<i64>,
    intervals: Vec<ModifierInterval>,
}

impl IntervalBuilder {
    pub fn new(target_id: i64, per_stack: f64) -> Self {
        Self {
            target_id,
            per_stack,
            behavior: StackBehavior::Stacking,
            stacks: 0,
            cursor: None,
            intervals: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, behavior: StackBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn current_multiplier(&self) -> f64 {
        1.0 + self.stacks as f64 * self.per_stack
    }

    /// Close the open window at `timestamp`. Without an open window nothing is emitted.
    fn close(&mut self, timestamp: i64) {
        let Some(start) = self.cursor else {
            return;
        };
        if start <= timestamp {
            self.intervals
                .push(ModifierInterval::new(start, timestamp, self.current_multiplier()));
        }
    }

    pub fn push(&mut self, event: &AuraEvent) {
        if event.target_id != self.target_id {
            return;
        }
        match event.kind {
            AuraEventKind::Apply => {
                self.stacks = 1;
                self.cursor = Some(event.timestamp + 1);
            }
            AuraEventKind::ApplyStack => {
                if self.behavior == StackBehavior::Simple || self.cursor.is_none() {
                    return;
                }
                self.close(event.timestamp);
                self.stacks += 1;
                self.cursor = Some(event.timestamp + 1);
            }
            AuraEventKind::Remove => {
                self.close(event.timestamp);
                self.stacks = 0;
                self.cursor = None;
            }
            AuraEventKind::Other(_) => {}
        }
    }

    pub fn finish(self) -> Vec<ModifierInterval> {
        self.intervals
    }
}

/// Build the interval list for one stacking ability against `target_id`.
///
/// Events are ordered by timestamp first (stable, so same-timestamp events keep their order).
pub fn build_intervals(
    events: &[AuraEvent],
    target_id: i64,
    per_stack_modifier: f64,
) -> Vec<ModifierInterval> {
    build_intervals_with(events, target_id, per_stack_modifier, StackBehavior::Stacking)
}

pub fn build_intervals_with(
    events: &[AuraEvent],
    target_id: i64,
    per_stack_modifier: f64,
    behavior: StackBehavior,
) -> Vec<ModifierInterval> {
    let mut ordered: Vec<&AuraEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let mut builder = IntervalBuilder::new(target_id, per_stack_modifier).with_behavior(behavior);
    for event in ordered {
        builder.push(event);
    }
    builder.finish()
}

/// Curse uptime bands as intervals with one fixed multiplier.
pub fn curse_intervals(bands: &[AuraBand], multiplier: f64) -> Vec<ModifierInterval> {
    let mut intervals: Vec<ModifierInterval> = bands
        .iter()
        .map(|band| ModifierInterval::new(band.start_time, band.end_time, multiplier))
        .collect();
    intervals.sort_by_key(|interval| interval.start);
    intervals
}

/// Multiplier of the first interval containing `timestamp`.
pub fn multiplier_at(intervals: &[ModifierInterval], timestamp: i64) -> Option<f64> {
    intervals
        .iter()
        .find(|interval| interval.contains(timestamp))
        .map(|interval| interval.multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(timestamp: i64, kind: AuraEventKind) -> AuraEvent {
        AuraEvent::new(timestamp, kind, 9)
    }

    #[test]
    fn stack_then_remove_emits_two_windows() {
        let events = [
            ev(0, AuraEventKind::Apply),
            ev(10, AuraEventKind::ApplyStack),
            ev(20, AuraEventKind::Remove),
        ];
        let intervals = build_intervals(&events, 9, 0.03);
        assert_eq!(intervals.len(), 2);
        assert_eq!((intervals[0].start, intervals[0].end), (1, 10));
        assert!((intervals[0].multiplier - 1.03).abs() < 1e-12);
        assert_eq!((intervals[1].start, intervals[1].end), (11, 20));
        assert!((intervals[1].multiplier - 1.06).abs() < 1e-12);
    }

    #[test]
    fn simple_modifier_ignores_stack_events() {
        let events = [
            ev(0, AuraEventKind::Apply),
            ev(5, AuraEventKind::ApplyStack),
            ev(20, AuraEventKind::Remove),
        ];
        let intervals = build_intervals_with(&events, 9, 0.15, StackBehavior::Simple);
        assert_eq!(intervals, vec![ModifierInterval::new(1, 20, 1.15)]);
    }

    #[test]
    fn second_remove_without_apply_is_silent() {
        let events = [
            ev(0, AuraEventKind::Apply),
            ev(20, AuraEventKind::Remove),
            ev(30, AuraEventKind::Remove),
            ev(40, AuraEventKind::ApplyStack),
        ];
        let intervals = build_intervals(&events, 9, 0.03);
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn remove_in_same_millisecond_as_apply_emits_nothing() {
        let events = [ev(5, AuraEventKind::Apply), ev(5, AuraEventKind::Remove)];
        assert!(build_intervals(&events, 9, 0.03).is_empty());
    }

    #[test]
    fn multiplier_lookup_takes_first_match() {
        let intervals = [
            ModifierInterval::new(0, 10, 1.1),
            ModifierInterval::new(5, 15, 1.5),
        ];
        assert_eq!(multiplier_at(&intervals, 7), Some(1.1));
        assert_eq!(multiplier_at(&intervals, 12), Some(1.5));
        assert_eq!(multiplier_at(&intervals, 16), None);
    }
}
