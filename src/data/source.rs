//! Where combat telemetry comes from.
//!
//! [CombatLogSource] is the seam between the scanner and the telemetry provider. [FileLogSource]
//! serves report exports saved as JSON files in a directory, one report per file:
//!
//! ```json
//! {
//!   "code": "a1b2c3",
//!   "actors": [{"id": 7, "name": "Pyra", "icon": "Mage", "gameID": 0, "type": "Player"}],
//!   "fights": [{
//!     "encounterID": 667,
//!     "combatantInfo": [{"sourceID": 7, "gear": [{"id": 19999, "permanentEnchant": 2588}]}],
//!     "damageEvents": [...],
//!     "auraEvents": [...],
//!     "auraBands": [{"abilityGameID": 11722, "targetID": 50, "bands": [{"startTime": 0, "endTime": 900}]}]
//!   }]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::combat::{ingest_aura_events, ingest_damage_events, AuraBand, AuraEvent, DamageEvent};
use crate::data::gear::GearItem;
use crate::data::schools::SchoolSpec;
use crate::error::{Result, SpellresError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "gameID", default)]
    pub game_id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantInfo {
    #[serde(rename = "sourceID")]
    pub source_id: i64,
    #[serde(default)]
    pub gear: Vec<GearItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuraTable {
    #[serde(rename = "abilityGameID")]
    pub ability_id: u64,
    #[serde(rename = "targetID")]
    pub target_id: i64,
    #[serde(default)]
    pub bands: Vec<AuraBand>,
}

/// One fight of a report. Event arrays stay raw so that bad records are dropped one at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FightExport {
    #[serde(rename = "encounterID")]
    pub encounter_id: u32,
    #[serde(rename = "combatantInfo", default)]
    pub combatant_info: Vec<CombatantInfo>,
    #[serde(rename = "damageEvents", default)]
    pub damage_events: Vec<Value>,
    #[serde(rename = "auraEvents", default)]
    pub aura_events: Vec<Value>,
    #[serde(rename = "auraBands", default)]
    pub aura_bands: Vec<AuraTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportExport {
    pub code: String,
    #[serde(default)]
    pub actors: Vec<ActorRecord>,
    #[serde(default)]
    pub fights: Vec<FightExport>,
}

impl ReportExport {
    fn fights_for(&self, encounter_id: u32) -> impl Iterator<Item = &FightExport> {
        self.fights
            .iter()
            .filter(move |fight| fight.encounter_id == encounter_id)
    }
}

/// A caster of the sampled class together with what they wore in the encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendlyActor {
    pub id: i64,
    pub name: String,
    pub gear: Vec<GearItem>,
}

/// Cheap per-report index used to skip reports that cannot contribute to a school.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub code: String,
    pub icons: BTreeSet<String>,
    #[serde(rename = "spellIDs")]
    pub spell_ids: BTreeSet<u64>,
}

impl ReportSummary {
    pub fn from_export(report: &ReportExport) -> Self {
        let icons = report
            .actors
            .iter()
            .filter(|actor| !actor.icon.is_empty())
            .map(|actor| actor.icon.clone())
            .collect();
        let spell_ids = report
            .fights
            .iter()
            .flat_map(|fight| fight.damage_events.iter())
            .filter_map(|record| record.get("abilityGameID").and_then(Value::as_u64))
            .collect();
        Self {
            code: report.code.clone(),
            icons,
            spell_ids,
        }
    }

    pub fn has_spell_for(&self, spec: &SchoolSpec) -> bool {
        spec.spell_ids.iter().any(|id| self.spell_ids.contains(id))
    }

    pub fn has_icon_for(&self, spec: &SchoolSpec) -> bool {
        self.icons.contains(&spec.icon)
    }
}

/// Telemetry provider queried per report, encounter and ability.
pub trait CombatLogSource: Sync {
    fn report_summaries(&self) -> Vec<ReportSummary>;

    /// Actors with the given class icon who have gear recorded for the encounter.
    fn friendly_actors(&self, report: &str, encounter_id: u32, icon: &str) -> Result<Vec<FriendlyActor>>;

    /// Highest actor id whose game id is one of `enemy_game_ids`, or `None` if the enemy is absent.
    fn hostile_actor_id(&self, report: &str, enemy_game_ids: &[u64]) -> Result<Option<i64>>;

    fn damage_events(&self, report: &str, encounter_id: u32, spell_ids: &[u64]) -> Result<Vec<DamageEvent>>;

    /// Lifecycle events of one aura on any target.
    fn aura_events(&self, report: &str, encounter_id: u32, ability_id: u64) -> Result<Vec<AuraEvent>>;

    fn aura_bands(
        &self,
        report: &str,
        encounter_id: u32,
        ability_id: u64,
        target_id: i64,
    ) -> Result<Vec<AuraBand>>;
}

/// Report exports loaded from `*.json` files in one directory.
#[derive(Debug, Clone, Default)]
pub struct FileLogSource {
    reports: BTreeMap<String, ReportExport>,
}

impl FileLogSource {
    /// Load every report in `dir`. A missing directory is an empty source; unreadable or
    /// malformed files are logged and skipped.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "report directory does not exist");
            return Ok(Self::default());
        }

        let entries = fs::read_dir(dir).map_err(|e| SpellresError::io(dir, e))?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            match load_report(&path) {
                Ok(report) => reports.push(report),
                Err(err) => tracing::warn!(error = %err.chain(), "skipping report file"),
            }
        }
        tracing::info!(reports = reports.len(), dir = %dir.display(), "loaded report exports");
        Ok(Self::from_reports(reports))
    }

    pub fn from_reports(reports: Vec<ReportExport>) -> Self {
        Self {
            reports: reports
                .into_iter()
                .map(|report| (report.code.clone(), report))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn report(&self, code: &str) -> Result<&ReportExport> {
        self.reports
            .get(code)
            .ok_or_else(|| SpellresError::MissingReport(code.to_string()))
    }
}

fn load_report(path: &Path) -> Result<ReportExport> {
    let raw = fs::read_to_string(path).map_err(|e| SpellresError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| SpellresError::json(path, e))
}

impl CombatLogSource for FileLogSource {
    fn report_summaries(&self) -> Vec<ReportSummary> {
        self.reports.values().map(ReportSummary::from_export).collect()
    }

    fn friendly_actors(&self, report: &str, encounter_id: u32, icon: &str) -> Result<Vec<FriendlyActor>> {
        let report = self.report(report)?;
        let combatants: Vec<&CombatantInfo> = report
            .fights_for(encounter_id)
            .flat_map(|fight| fight.combatant_info.iter())
            .collect();

        Ok(report
            .actors
            .iter()
            .filter(|actor| actor.icon == icon)
            .filter_map(|actor| {
                let info = combatants.iter().find(|info| info.source_id == actor.id)?;
                Some(FriendlyActor {
                    id: actor.id,
                    name: actor.name.clone(),
                    gear: info.gear.clone(),
                })
            })
            .collect())
    }

    fn hostile_actor_id(&self, report: &str, enemy_game_ids: &[u64]) -> Result<Option<i64>> {
        let report = self.report(report)?;
        Ok(report
            .actors
            .iter()
            .filter(|actor| enemy_game_ids.contains(&actor.game_id))
            .map(|actor| actor.id)
            .max())
    }

    fn damage_events(&self, report: &str, encounter_id: u32, spell_ids: &[u64]) -> Result<Vec<DamageEvent>> {
        let report = self.report(report)?;
        Ok(report
            .fights_for(encounter_id)
            .flat_map(|fight| ingest_damage_events(&fight.damage_events))
            .filter(|event| spell_ids.contains(&event.ability_id))
            .collect())
    }

    fn aura_events(&self, report: &str, encounter_id: u32, ability_id: u64) -> Result<Vec<AuraEvent>> {
        let report = self.report(report)?;
        Ok(report
            .fights_for(encounter_id)
            .flat_map(|fight| ingest_aura_events(&fight.aura_events))
            .filter(|event| event.ability_id == ability_id)
            .collect())
    }

    fn aura_bands(
        &self,
        report: &str,
        encounter_id: u32,
        ability_id: u64,
        target_id: i64,
    ) -> Result<Vec<AuraBand>> {
        let report = self.report(report)?;
        Ok(report
            .fights_for(encounter_id)
            .flat_map(|fight| fight.aura_bands.iter())
            .filter(|table| table.ability_id == ability_id && table.target_id == target_id)
            .flat_map(|table| table.bands.iter().copied())
            .collect())
    }
}
