pub mod aggregate;
pub mod classify;
pub mod intervals;
pub mod log_ingest;
pub mod school;

pub use aggregate::{
    accumulate, estimate, resistance_from_level_difference, LevelSettings, OutcomeBucket, OutcomeCounts,
    ResistanceEstimate, ResistanceTable, IMMUNE_SAMPLE_THRESHOLD, RESISTANCE_PER_LEVEL,
    RESISTANCE_PER_PARTIAL_PERCENT,
};
pub use classify::{
    classify, partial_bucket, theoretical_damage, AuraWindowFilter, ClassifyContext, CursePolicy,
    EventFilter, Outcome, SkipReason, Theoretical, BAND_HALF_WIDTH,
};
pub use intervals::{
    build_intervals, build_intervals_with, curse_intervals, multiplier_at, IntervalBuilder,
    ModifierInterval, StackBehavior, CURSE_MULTIPLIER,
};
pub use log_ingest::{
    ingest_aura_events, ingest_damage_events, parse_aura_events_json, parse_damage_events_json,
    AuraBand, AuraEvent, AuraEventKind, DamageEvent,
};
pub use school::{parse_school_list, HitTypeTable, MagicSchool};
