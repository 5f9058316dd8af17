//! One report, one school, one target: fetch what classification needs and count outcomes.

use std::collections::HashMap;

use crate::combat::{
    build_intervals_with, classify, curse_intervals, AuraWindowFilter, ClassifyContext,
    CursePolicy, DamageEvent, ModifierInterval, OutcomeCounts, CURSE_MULTIPLIER,
};
use crate::data::gear::{ActorGearProfile, GearCatalog};
use crate::data::schools::SchoolSpec;
use crate::data::source::CombatLogSource;
use crate::data::zones::ScanTarget;
use crate::error::Result;
use crate::scan::budget::CastBudget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchoolScan {
    pub counts: OutcomeCounts,
    /// Events handed to the classifier, counted or not.
    pub classified: usize,
}

/// Per-report inputs shared by every school scanned in it.
pub struct ReportScan<'a, S: CombatLogSource + ?Sized> {
    pub source: &'a S,
    pub gear: &'a GearCatalog,
    pub report: &'a str,
    pub target: &'a ScanTarget,
    pub curse_policy: CursePolicy,
}

impl<'a, S: CombatLogSource + ?Sized> ReportScan<'a, S> {
    /// Classify this report's events for `spec`. Every counted cast is claimed from `budget`
    /// first; the scan stops at the first claim that fails.
    pub fn scan_school(&self, spec: &SchoolSpec, budget: &CastBudget) -> Result<SchoolScan> {
        let encounter_id = self.target.encounter_id;
        let Some(hostile_id) = self
            .source
            .hostile_actor_id(self.report, &[self.target.enemy.id])?
        else {
            tracing::debug!(report = self.report, enemy = self.target.enemy.id, "enemy not present");
            return Ok(SchoolScan::default());
        };

        let profiles: HashMap<i64, ActorGearProfile> = self
            .source
            .friendly_actors(self.report, encounter_id, &spec.icon)?
            .into_iter()
            .map(|actor| (actor.id, self.gear.profile_for(&actor.gear)))
            .collect();
        if profiles.is_empty() {
            tracing::debug!(report = self.report, icon = %spec.icon, "no casters with gear");
            return Ok(SchoolScan::default());
        }

        let curses = match spec.curse_id {
            Some(curse_id) => Some(curse_intervals(
                &self
                    .source
                    .aura_bands(self.report, encounter_id, curse_id, hostile_id)?,
                CURSE_MULTIPLIER,
            )),
            None => None,
        };
        let modifiers = self.modifier_intervals(spec, hostile_id)?;
        let filter = match self.target.enemy.exclude_while_aura {
            Some(aura) => AuraWindowFilter::new(curse_intervals(
                &self
                    .source
                    .aura_bands(self.report, encounter_id, aura, hostile_id)?,
                1.0,
            )),
            None => AuraWindowFilter::default(),
        };

        let mut ctx = ClassifyContext::new(&spec.hit_types)
            .with_modifiers(&modifiers)
            .with_curse_policy(self.curse_policy);
        if let Some(curses) = curses.as_deref() {
            ctx = ctx.with_curses(curses);
        }
        if !filter.is_empty() {
            ctx = ctx.with_filter(&filter);
        }

        let events = self
            .source
            .damage_events(self.report, encounter_id, &spec.spell_ids)?;
        let mut scan = SchoolScan::default();
        for event in relevant(&events, &profiles, hostile_id) {
            // relevant() only yields events whose source has a profile.
            let Some(profile) = profiles.get(&event.source_id) else {
                continue;
            };
            if let Some(bucket) = classify(event, profile, &ctx).bucket() {
                if !budget.try_claim(spec.school) {
                    tracing::debug!(report = self.report, school = %spec.school, "cast limit reached mid-report");
                    break;
                }
                scan.counts.record(bucket);
            }
            scan.classified += 1;
        }

        tracing::debug!(
            report = self.report,
            school = %spec.school,
            classified = scan.classified,
            casts = scan.counts.casts(),
            "scanned school"
        );
        Ok(scan)
    }

    /// Every damage modifier of the school, concatenated in catalog order.
    fn modifier_intervals(&self, spec: &SchoolSpec, hostile_id: i64) -> Result<Vec<ModifierInterval>> {
        let mut intervals = Vec::new();
        for modifier in &spec.damage_modifiers {
            let events = self.source.aura_events(
                self.report,
                self.target.encounter_id,
                modifier.ability_id,
            )?;
            intervals.extend(build_intervals_with(
                &events,
                hostile_id,
                modifier.per_stack,
                modifier.behavior,
            ));
        }
        Ok(intervals)
    }
}

/// Non-periodic events from sampled casters against the hostile actor.
fn relevant<'e>(
    events: &'e [DamageEvent],
    profiles: &'e HashMap<i64, ActorGearProfile>,
    hostile_id: i64,
) -> impl Iterator<Item = &'e DamageEvent> + 'e {
    events.iter().filter(move |event| {
        event.target_id == hostile_id && !event.tick && profiles.contains_key(&event.source_id)
    })
}
