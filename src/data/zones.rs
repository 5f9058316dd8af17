//! Raid zones, their encounters and the enemies resistance is measured against.
//! Catalog file: `zones.json` in the data directory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellresError};

pub const ZONES_FILE: &str = "zones.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: u64,
    pub name: String,
    /// Events landing while this aura is up on the enemy are not sampled.
    #[serde(default)]
    pub exclude_while_aura: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: u32,
    pub name: String,
    pub enemies: Vec<Enemy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub name: String,
    pub encounters: Vec<Encounter>,
}

/// What the user asked to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    Zone(u32),
    Encounter(u32),
    Enemy(u64),
}

/// One enemy inside the encounter it is fought in.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTarget {
    pub encounter_id: u32,
    pub encounter_name: String,
    pub enemy: Enemy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetSelection {
    pub zone_id: u32,
    pub zone_name: String,
    pub targets: Vec<ScanTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
}

impl ZoneCatalog {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SpellresError::io(path, e))?;
        let catalog: ZoneCatalog =
            serde_json::from_str(&raw).map_err(|e| SpellresError::json(path, e))?;
        tracing::debug!(zones = catalog.zones.len(), path = %path.display(), "loaded zone catalog");
        Ok(catalog)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    /// Resolve a selector into the enemies to scan, in catalog order.
    pub fn select(&self, selector: TargetSelector) -> Result<TargetSelection> {
        for zone in &self.zones {
            let encounters: Vec<&Encounter> = match selector {
                TargetSelector::Zone(id) if zone.id == id => zone.encounters.iter().collect(),
                TargetSelector::Zone(_) => continue,
                TargetSelector::Encounter(id) => {
                    zone.encounters.iter().filter(|e| e.id == id).collect()
                }
                TargetSelector::Enemy(id) => zone
                    .encounters
                    .iter()
                    .filter(|e| e.enemies.iter().any(|enemy| enemy.id == id))
                    .collect(),
            };
            if encounters.is_empty() && !matches!(selector, TargetSelector::Zone(_)) {
                continue;
            }

            let targets = encounters
                .into_iter()
                .flat_map(|encounter| {
                    encounter
                        .enemies
                        .iter()
                        .filter(move |enemy| match selector {
                            TargetSelector::Enemy(id) => enemy.id == id,
                            _ => true,
                        })
                        .map(move |enemy| ScanTarget {
                            encounter_id: encounter.id,
                            encounter_name: encounter.name.clone(),
                            enemy: enemy.clone(),
                        })
                })
                .collect();
            return Ok(TargetSelection {
                zone_id: zone.id,
                zone_name: zone.name.clone(),
                targets,
            });
        }

        Err(match selector {
            TargetSelector::Zone(id) => SpellresError::UnknownZone(id),
            TargetSelector::Encounter(id) => SpellresError::UnknownEncounter(id),
            TargetSelector::Enemy(id) => SpellresError::UnknownEnemy(id),
        })
    }

    /// Markdown-style listing of zones, encounters and enemies. `zone_id` narrows it to one zone.
    pub fn describe(&self, zone_id: Option<u32>) -> Result<String> {
        let zones: Vec<&Zone> = match zone_id {
            Some(id) => vec![self.zone(id).ok_or(SpellresError::UnknownZone(id))?],
            None => self.zones.iter().collect(),
        };

        let mut out = String::new();
        for zone in zones {
            let _ = writeln!(out, "# Zone: {} ({})", zone.name, zone.id);
            for encounter in &zone.encounters {
                let _ = writeln!(out, "## Encounter: {} ({})", encounter.name, encounter.id);
                for enemy in &encounter.enemies {
                    let _ = writeln!(out, "### Enemy: {} ({})", enemy.name, enemy.id);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ZoneCatalog {
        serde_json::from_str(
            r#"[
                {"id": 1000, "name": "Molten Core", "encounters": [
                    {"id": 663, "name": "Lucifron", "enemies": [{"id": 12118, "name": "Lucifron"}]},
                    {"id": 671, "name": "Majordomo Executus", "enemies": [
                        {"id": 12018, "name": "Majordomo Executus"},
                        {"id": 11663, "name": "Flamewaker Healer", "excludeWhileAura": 20619}
                    ]}
                ]},
                {"id": 1001, "name": "Blackwing Lair", "encounters": []}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn zone_selects_every_enemy() {
        let selection = catalog().select(TargetSelector::Zone(1000)).unwrap();
        assert_eq!(selection.zone_name, "Molten Core");
        let ids: Vec<u64> = selection.targets.iter().map(|t| t.enemy.id).collect();
        assert_eq!(ids, vec![12118, 12018, 11663]);
    }

    #[test]
    fn enemy_selects_only_that_enemy() {
        let selection = catalog().select(TargetSelector::Enemy(11663)).unwrap();
        assert_eq!(selection.targets.len(), 1);
        assert_eq!(selection.targets[0].encounter_id, 671);
        assert_eq!(selection.targets[0].enemy.exclude_while_aura, Some(20619));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let catalog = catalog();
        assert!(matches!(
            catalog.select(TargetSelector::Encounter(9)),
            Err(SpellresError::UnknownEncounter(9))
        ));
        assert!(matches!(
            catalog.select(TargetSelector::Zone(1001)),
            Ok(TargetSelection { ref targets, .. }) if targets.is_empty()
        ));
        assert!(catalog.describe(Some(5)).is_err());
    }

    #[test]
    fn describe_lists_hierarchy() {
        let text = catalog().describe(Some(1000)).unwrap();
        assert!(text.starts_with("# Zone: Molten Core (1000)\n## Encounter: Lucifron (663)\n"));
        assert!(text.contains("### Enemy: Flamewaker Healer (11663)"));
    }
}
