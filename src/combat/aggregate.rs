//! Outcome counters per magic school and the resistance estimate derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::combat::classify::Outcome;
use crate::combat::school::MagicSchool;

/// Casts required before an all-miss sample is reported as immune.
pub const IMMUNE_SAMPLE_THRESHOLD: u64 = 50;
/// Resistance per percent of average partial resist.
pub const RESISTANCE_PER_PARTIAL_PERCENT: f64 = 4.0;
/// Resistance granted per level the target has over the caster.
pub const RESISTANCE_PER_LEVEL: f64 = 8.0;

/// Classified outcome of one damage event. The number is the share of the theoretical damage
/// that landed: `Resist25` dealt a quarter, `FullHit` dealt everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBucket {
    Miss,
    Resist25,
    Resist50,
    Resist75,
    FullHit,
}

impl OutcomeBucket {
    pub const ALL: [OutcomeBucket; 5] = [
        OutcomeBucket::Miss,
        OutcomeBucket::Resist25,
        OutcomeBucket::Resist50,
        OutcomeBucket::Resist75,
        OutcomeBucket::FullHit,
    ];

    pub fn damage_fraction(&self) -> f64 {
        match self {
            Self::Miss => 0.0,
            Self::Resist25 => 0.25,
            Self::Resist50 => 0.5,
            Self::Resist75 => 0.75,
            Self::FullHit => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub miss: u64,
    pub resist25: u64,
    pub resist50: u64,
    pub resist75: u64,
    pub full_hit: u64,
}

impl OutcomeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bucket: OutcomeBucket) {
        *self.slot_mut(bucket) += 1;
    }

    /// By-value form of [`record`](Self::record).
    pub fn accumulate(mut self, bucket: OutcomeBucket) -> Self {
        self.record(bucket);
        self
    }

    pub fn merge(&mut self, other: &OutcomeCounts) {
        self.miss += other.miss;
        self.resist25 += other.resist25;
        self.resist50 += other.resist50;
        self.resist75 += other.resist75;
        self.full_hit += other.full_hit;
    }

    pub fn get(&self, bucket: OutcomeBucket) -> u64 {
        match bucket {
            OutcomeBucket::Miss => self.miss,
            OutcomeBucket::Resist25 => self.resist25,
            OutcomeBucket::Resist50 => self.resist50,
            OutcomeBucket::Resist75 => self.resist75,
            OutcomeBucket::FullHit => self.full_hit,
        }
    }

    fn slot_mut(&mut self, bucket: OutcomeBucket) -> &mut u64 {
        match bucket {
            OutcomeBucket::Miss => &mut self.miss,
            OutcomeBucket::Resist25 => &mut self.resist25,
            OutcomeBucket::Resist50 => &mut self.resist50,
            OutcomeBucket::Resist75 => &mut self.resist75,
            OutcomeBucket::FullHit => &mut self.full_hit,
        }
    }

    pub fn hits(&self) -> u64 {
        self.resist25 + self.resist50 + self.resist75 + self.full_hit
    }

    pub fn misses(&self) -> u64 {
        self.miss
    }

    pub fn casts(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Landed damage in units of full hits.
    pub fn damage_sum(&self) -> f64 {
        OutcomeBucket::ALL
            .iter()
            .map(|bucket| self.get(*bucket) as f64 * bucket.damage_fraction())
            .sum()
    }

    pub fn estimate(&self, levels: LevelSettings, level_scaling: bool) -> ResistanceEstimate {
        estimate(self, levels.caster_level, levels.target_level, level_scaling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSettings {
    pub caster_level: u32,
    pub target_level: u32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            caster_level: 60,
            target_level: 63,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResistanceEstimate {
    Resisted {
        /// Average share of damage lost to partial resists, in percent.
        partial_percent: f64,
        resistance: f64,
    },
    /// Enough casts, none landed.
    Immune,
    /// Too few casts to tell.
    Insufficient,
}

impl ResistanceEstimate {
    pub fn resistance(&self) -> Option<f64> {
        match self {
            Self::Resisted { resistance, .. } => Some(*resistance),
            _ => None,
        }
    }

    pub fn partial_percent(&self) -> Option<f64> {
        match self {
            Self::Resisted {
                partial_percent, ..
            } => Some(*partial_percent),
            _ => None,
        }
    }

    /// Table cell form: the number, `"IMMUNE"` or `"?"`.
    pub fn to_cell(&self) -> Value {
        match self {
            Self::Resisted { resistance, .. } => Value::from(*resistance),
            Self::Immune => Value::from("IMMUNE"),
            Self::Insufficient => Value::from("?"),
        }
    }
}

impl fmt::Display for ResistanceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resisted { resistance, .. } => write!(f, "{resistance}"),
            Self::Immune => f.write_str("IMMUNE"),
            Self::Insufficient => f.write_str("?"),
        }
    }
}

/// Fold one classifier result into the counters. Skipped events leave them unchanged.
pub fn accumulate(counters: OutcomeCounts, outcome: Outcome) -> OutcomeCounts {
    match outcome.bucket() {
        Some(bucket) => counters.accumulate(bucket),
        None => counters,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn resistance_from_level_difference(caster_level: u32, target_level: u32) -> f64 {
    target_level.saturating_sub(caster_level) as f64 * RESISTANCE_PER_LEVEL
}

/// Invert the bucket distribution into a resistance value.
pub fn estimate(
    counts: &OutcomeCounts,
    caster_level: u32,
    target_level: u32,
    level_scaling: bool,
) -> ResistanceEstimate {
    let hits = counts.hits();
    let casts = counts.casts();

    if casts == 0 {
        return ResistanceEstimate::Insufficient;
    }
    if hits == 0 {
        if casts >= IMMUNE_SAMPLE_THRESHOLD && counts.misses() == casts {
            return ResistanceEstimate::Immune;
        }
        return ResistanceEstimate::Insufficient;
    }

    let partial_percent = round2(100.0 * (1.0 - counts.damage_sum() / hits as f64));
    let level_resistance = if level_scaling {
        resistance_from_level_difference(caster_level, target_level)
    } else {
        0.0
    };
    let resistance =
        round2(partial_percent * RESISTANCE_PER_PARTIAL_PERCENT - level_resistance).max(0.0);

    ResistanceEstimate::Resisted {
        partial_percent,
        resistance,
    }
}

/// Counters for every school scanned against one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResistanceTable {
    schools: BTreeMap<MagicSchool, OutcomeCounts>,
}

impl ResistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schools<I>(schools: I) -> Self
    where
        I: IntoIterator<Item = MagicSchool>,
    {
        Self {
            schools: schools
                .into_iter()
                .map(|school| (school, OutcomeCounts::default()))
                .collect(),
        }
    }

    pub fn accumulate(&mut self, school: MagicSchool, bucket: OutcomeBucket) {
        self.schools.entry(school).or_default().record(bucket);
    }

    pub fn merge_counts(&mut self, school: MagicSchool, counts: &OutcomeCounts) {
        self.schools.entry(school).or_default().merge(counts);
    }

    pub fn merge(&mut self, other: &ResistanceTable) {
        for (school, counts) in &other.schools {
            self.merge_counts(*school, counts);
        }
    }

    pub fn counts(&self, school: MagicSchool) -> OutcomeCounts {
        self.schools.get(&school).copied().unwrap_or_default()
    }

    pub fn casts(&self, school: MagicSchool) -> u64 {
        self.counts(school).casts()
    }

    pub fn estimate(&self, school: MagicSchool, levels: LevelSettings) -> ResistanceEstimate {
        self.counts(school)
            .estimate(levels, school.has_level_scaling())
    }

    pub fn iter(&self) -> impl Iterator<Item = (MagicSchool, &OutcomeCounts)> {
        self.schools.iter().map(|(school, counts)| (*school, counts))
    }

    pub fn total_casts(&self) -> u64 {
        self.schools.values().map(OutcomeCounts::casts).sum()
    }
}
