//! Equipment catalog and the hit/penetration profile derived from an actor's gear.
//! Catalog file: `items.json` in the data directory (array of `{id, name, spellHit, spellPenetration}`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellresError};

pub const ITEMS_FILE: &str = "items.json";

/// Hit chance every sampled caster gets from talents.
pub const BASE_TALENT_HIT: u32 = 89;
pub const HIT_CAP: u32 = 99;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spell_hit: Option<u32>,
    #[serde(default)]
    pub spell_penetration: Option<u32>,
}

/// One equipped item as reported by the combatant info of a fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearItem {
    pub id: u64,
    #[serde(default)]
    pub permanent_enchant: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorGearProfile {
    pub spell_hit: u32,
    pub spell_penetration: u32,
}

impl ActorGearProfile {
    /// Penetration shifts the partial-resist distribution, so these casters are not sampled.
    pub fn is_excluded(&self) -> bool {
        self.spell_penetration > 0
    }
}

/// Enchants that carry spell hit.
pub fn default_enchants() -> HashMap<u64, u32> {
    HashMap::from([(2588, 1)])
}

#[derive(Debug, Clone, Default)]
pub struct GearCatalog {
    items: HashMap<u64, ItemRecord>,
    enchants: HashMap<u64, u32>,
}

impl GearCatalog {
    pub fn new(items: Vec<ItemRecord>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            enchants: default_enchants(),
        }
    }

    pub fn with_enchant(mut self, enchant_id: u64, spell_hit: u32) -> Self {
        self.enchants.insert(enchant_id, spell_hit);
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SpellresError::io(path, e))?;
        let items: Vec<ItemRecord> =
            serde_json::from_str(&raw).map_err(|e| SpellresError::json(path, e))?;
        tracing::debug!(items = items.len(), path = %path.display(), "loaded equipment catalog");
        Ok(Self::new(items))
    }

    pub fn item(&self, id: u64) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn enchant_hit(&self, enchant_id: u64) -> u32 {
        self.enchants.get(&enchant_id).copied().unwrap_or(0)
    }

    /// Sum item and enchant bonuses on top of the talent baseline. Unknown items add nothing.
    pub fn profile_for(&self, gear: &[GearItem]) -> ActorGearProfile {
        let mut spell_hit = BASE_TALENT_HIT;
        let mut spell_penetration = 0;
        for equipped in gear {
            if let Some(enchant) = equipped.permanent_enchant {
                spell_hit += self.enchant_hit(enchant);
            }
            if let Some(item) = self.item(equipped.id) {
                spell_hit += item.spell_hit.unwrap_or(0);
                spell_penetration += item.spell_penetration.unwrap_or(0);
            }
        }
        ActorGearProfile {
            spell_hit: spell_hit.min(HIT_CAP),
            spell_penetration,
        }
    }
}
