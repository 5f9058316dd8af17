//! Per-event outcome classification.
//!
//! The theoretical damage of an event is the unmitigated amount scaled by its hit type, the curse
//! active at that moment and the damage modifiers active at that moment. The observed amount as a
//! percentage of that value lands in one of four bands (25/50/75/100) or is discarded as noise.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::aggregate::OutcomeBucket;
use crate::combat::intervals::{multiplier_at, ModifierInterval};
use crate::combat::log_ingest::DamageEvent;
use crate::combat::school::HitTypeTable;
use crate::data::gear::ActorGearProfile;
use crate::error::SpellresError;

pub const BAND_HALF_WIDTH: f64 = 3.0;
const BAND_CENTERS: [(f64, OutcomeBucket); 4] = [
    (25.0, OutcomeBucket::Resist25),
    (50.0, OutcomeBucket::Resist50),
    (75.0, OutcomeBucket::Resist75),
    (100.0, OutcomeBucket::FullHit),
];

/// What to do with events that land inside a curse window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursePolicy {
    /// Scale the theoretical damage by the curse multiplier.
    #[default]
    Discount,
    /// Drop events inside a curse window.
    Exclude,
    /// Keep only landed damage inside a curse window (scaled). Full resists always count.
    Require,
}

impl FromStr for CursePolicy {
    type Err = SpellresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discount" => Ok(Self::Discount),
            "exclude" => Ok(Self::Exclude),
            "require" => Ok(Self::Require),
            other => Err(SpellresError::UnknownCursePolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Penetration,
    Periodic,
    Filtered,
    CurseActive,
    CurseInactive,
    InvalidDamage,
    OutOfBand,
}

/// Theoretical damage before damage modifiers are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theoretical {
    Damage(f64),
    Excluded(SkipReason),
    /// The ability did nothing at all; counted as a miss.
    DefiniteMiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Counted(OutcomeBucket),
    Skipped(SkipReason),
}

impl Outcome {
    pub fn bucket(&self) -> Option<OutcomeBucket> {
        match self {
            Self::Counted(bucket) => Some(*bucket),
            Self::Skipped(_) => None,
        }
    }
}

/// Encounter-specific veto on individual events.
pub trait EventFilter: Send + Sync {
    fn excludes(&self, event: &DamageEvent) -> bool;
}

impl<F> EventFilter for F
where
    F: Fn(&DamageEvent) -> bool + Send + Sync,
{
    fn excludes(&self, event: &DamageEvent) -> bool {
        self(event)
    }
}

/// Excludes events while an aura is up on the target (a shield phase, a reflect, ...).
#[derive(Debug, Clone, Default)]
pub struct AuraWindowFilter {
    windows: Vec<ModifierInterval>,
}

impl AuraWindowFilter {
    pub fn new(windows: Vec<ModifierInterval>) -> Self {
        Self { windows }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl EventFilter for AuraWindowFilter {
    fn excludes(&self, event: &DamageEvent) -> bool {
        self.windows
            .iter()
            .any(|window| window.contains(event.timestamp))
    }
}

/// Everything about the target that classification needs besides the event itself.
#[derive(Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub hit_types: &'a HitTypeTable,
    /// `None` when the school has no curse ability to account for.
    pub curses: Option<&'a [ModifierInterval]>,
    pub modifiers: &'a [ModifierInterval],
    pub curse_policy: CursePolicy,
    pub filter: Option<&'a dyn EventFilter>,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(hit_types: &'a HitTypeTable) -> Self {
        Self {
            hit_types,
            curses: None,
            modifiers: &[],
            curse_policy: CursePolicy::Discount,
            filter: None,
        }
    }

    pub fn with_curses(mut self, curses: &'a [ModifierInterval]) -> Self {
        self.curses = Some(curses);
        self
    }

    pub fn with_modifiers(mut self, modifiers: &'a [ModifierInterval]) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_curse_policy(mut self, policy: CursePolicy) -> Self {
        self.curse_policy = policy;
        self
    }

    pub fn with_filter(mut self, filter: &'a dyn EventFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Map a landed-damage percentage onto its band, if any.
pub fn partial_bucket(ratio: f64) -> Option<OutcomeBucket> {
    BAND_CENTERS
        .iter()
        .find(|(center, _)| {
            center - BAND_HALF_WIDTH < ratio && ratio < center + BAND_HALF_WIDTH
        })
        .map(|(_, bucket)| *bucket)
}

/// Hit-type and curse adjusted theoretical damage.
pub fn theoretical_damage(event: &DamageEvent, ctx: &ClassifyContext<'_>) -> Theoretical {
    let base = event.unmitigated_amount * ctx.hit_types.multiplier(event.hit_type);
    if !base.is_finite() || base < 0.0 {
        return Theoretical::Excluded(SkipReason::InvalidDamage);
    }
    // Full resists count as misses under Require whether or not a curse is up.
    if base == 0.0 && ctx.curse_policy == CursePolicy::Require {
        return Theoretical::DefiniteMiss;
    }

    let damage = match ctx.curses {
        None => base,
        Some(curses) => match (ctx.curse_policy, multiplier_at(curses, event.timestamp)) {
            (CursePolicy::Exclude, Some(_)) => {
                return Theoretical::Excluded(SkipReason::CurseActive)
            }
            (CursePolicy::Require, None) => {
                return Theoretical::Excluded(SkipReason::CurseInactive)
            }
            (_, Some(multiplier)) => base * multiplier,
            (_, None) => base,
        },
    };

    if damage == 0.0 {
        Theoretical::DefiniteMiss
    } else if damage < 0.0 {
        Theoretical::Excluded(SkipReason::InvalidDamage)
    } else {
        Theoretical::Damage(damage)
    }
}

pub fn classify(
    event: &DamageEvent,
    profile: &ActorGearProfile,
    ctx: &ClassifyContext<'_>,
) -> Outcome {
    if profile.is_excluded() {
        return Outcome::Skipped(SkipReason::Penetration);
    }
    if event.tick {
        return Outcome::Skipped(SkipReason::Periodic);
    }
    if ctx.filter.is_some_and(|filter| filter.excludes(event)) {
        return Outcome::Skipped(SkipReason::Filtered);
    }

    let damage = match theoretical_damage(event, ctx) {
        Theoretical::Damage(damage) => damage,
        Theoretical::DefiniteMiss => return Outcome::Counted(OutcomeBucket::Miss),
        Theoretical::Excluded(reason) => return Outcome::Skipped(reason),
    };

    let adjusted = damage * multiplier_at(ctx.modifiers, event.timestamp).unwrap_or(1.0);
    let ratio = 100.0 * event.amount / adjusted;
    match partial_bucket(ratio) {
        Some(bucket) => Outcome::Counted(bucket),
        None => {
            tracing::trace!(ratio, timestamp = event.timestamp, "ratio outside partial bands");
            Outcome::Skipped(SkipReason::OutOfBand)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(hit_type: u32, unmitigated: f64, amount: f64) -> DamageEvent {
        DamageEvent {
            timestamp: 100,
            source_id: 1,
            target_id: 2,
            ability_id: 10151,
            hit_type,
            amount,
            unmitigated_amount: unmitigated,
            tick: false,
        }
    }

    #[test]
    fn band_edges_are_open() {
        assert_eq!(partial_bucket(25.0), Some(OutcomeBucket::Resist25));
        assert_eq!(partial_bucket(22.0), None);
        assert_eq!(partial_bucket(21.99), None);
        assert_eq!(partial_bucket(27.99), Some(OutcomeBucket::Resist25));
        assert_eq!(partial_bucket(28.0), None);
        assert_eq!(partial_bucket(102.5), Some(OutcomeBucket::FullHit));
        assert_eq!(partial_bucket(f64::NAN), None);
    }

    #[test]
    fn full_resist_hit_type_is_a_definite_miss() {
        let table = HitTypeTable::standard(1.5);
        let ctx = ClassifyContext::new(&table);
        let outcome = classify(&event(14, 900.0, 0.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(outcome, Outcome::Counted(OutcomeBucket::Miss));
    }

    #[test]
    fn missing_unmitigated_amount_is_a_miss_not_an_error() {
        let table = HitTypeTable::standard(1.5);
        let ctx = ClassifyContext::new(&table);
        let outcome = classify(&event(1, 0.0, 0.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(outcome.bucket(), Some(OutcomeBucket::Miss));
    }

    #[test]
    fn negative_damage_is_skipped() {
        let table = HitTypeTable::standard(1.5);
        let ctx = ClassifyContext::new(&table);
        let outcome = classify(&event(1, -50.0, 10.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(outcome, Outcome::Skipped(SkipReason::InvalidDamage));
    }

    #[test]
    fn closure_filters_plug_in() {
        let table = HitTypeTable::standard(1.5);
        let veto = |e: &DamageEvent| e.timestamp < 500;
        let ctx = ClassifyContext::new(&table).with_filter(&veto);
        let outcome = classify(&event(1, 1000.0, 1000.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Filtered));
    }

    #[test]
    fn require_counts_full_resists_outside_curse_windows() {
        let table = HitTypeTable::standard(1.5);
        let curses = [ModifierInterval::new(5000, 6000, 1.1)];
        let ctx = ClassifyContext::new(&table)
            .with_curses(&curses)
            .with_curse_policy(CursePolicy::Require);

        let resist = classify(&event(14, 1000.0, 0.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(resist, Outcome::Counted(OutcomeBucket::Miss));
        let hit = classify(&event(1, 1000.0, 1000.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(hit, Outcome::Skipped(SkipReason::CurseInactive));
    }

    #[test]
    fn exclude_drops_full_resists_inside_curse_windows() {
        let table = HitTypeTable::standard(1.5);
        let curses = [ModifierInterval::new(0, 6000, 1.1)];
        let ctx = ClassifyContext::new(&table)
            .with_curses(&curses)
            .with_curse_policy(CursePolicy::Exclude);

        let resist = classify(&event(14, 1000.0, 0.0), &ActorGearProfile::default(), &ctx);
        assert_eq!(resist, Outcome::Skipped(SkipReason::CurseActive));
    }

    #[test]
    fn curse_policy_parses_case_insensitively() {
        assert_eq!("Exclude".parse::<CursePolicy>().unwrap(), CursePolicy::Exclude);
        assert!("sometimes".parse::<CursePolicy>().is_err());
    }
}
