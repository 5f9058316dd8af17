//! Which caster class, spells, curse and damage modifiers sample each magic school.
//!
//! Built-in defaults cover all five schools. A YAML file can replace individual entries:
//!
//! ```yaml
//! schools:
//!   - school: fire
//!     name: Fire
//!     icon: Mage
//!     spell_ids: [10151, 10207]
//!     curse_id: 11722
//!     damage_modifiers:
//!       - { ability_id: 22959, per_stack: 0.03 }
//!     hit_types: { 1: 1.0, 2: 1.5, 14: 0.0, 16: 1.0, 17: 1.5 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::{HitTypeTable, MagicSchool, StackBehavior};
use crate::error::{Result, SpellresError};

/// A debuff on the target that raises damage taken while it is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageModifierSpec {
    pub ability_id: u64,
    pub per_stack: f64,
    #[serde(default)]
    pub behavior: StackBehavior,
    #[serde(default)]
    pub name: Option<String>,
}

impl DamageModifierSpec {
    fn new(ability_id: u64, per_stack: f64, behavior: StackBehavior, name: &str) -> Self {
        Self {
            ability_id,
            per_stack,
            behavior,
            name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSpec {
    pub school: MagicSchool,
    /// Caster specialization name, used for logging.
    pub name: String,
    /// Class icon identifying eligible casters in a report.
    pub icon: String,
    pub spell_ids: Vec<u64>,
    #[serde(default)]
    pub curse_id: Option<u64>,
    #[serde(default)]
    pub damage_modifiers: Vec<DamageModifierSpec>,
    pub hit_types: HitTypeTable,
}

impl SchoolSpec {
    pub fn default_for(school: MagicSchool) -> SchoolSpec {
        const CURSE_OF_SHADOW: u64 = 17937;
        const CURSE_OF_ELEMENTS: u64 = 11722;

        match school {
            // Starfire ranks 7/6, Moonfire rank 10; Vengeance doubles crits.
            MagicSchool::Arcane => SchoolSpec {
                school,
                name: "Balance".to_string(),
                icon: "Druid-Balance".to_string(),
                spell_ids: vec![25298, 9876, 9835],
                curse_id: Some(CURSE_OF_SHADOW),
                damage_modifiers: Vec::new(),
                hit_types: HitTypeTable::standard(2.0),
            },
            // Fireball, Scorch, Fire Blast.
            MagicSchool::Fire => SchoolSpec {
                school,
                name: "Fire".to_string(),
                icon: "Mage".to_string(),
                spell_ids: vec![10151, 10207, 10199],
                curse_id: Some(CURSE_OF_ELEMENTS),
                damage_modifiers: vec![
                    DamageModifierSpec::new(22959, 0.03, StackBehavior::Stacking, "Improved Scorch"),
                    DamageModifierSpec::new(23605, 0.15, StackBehavior::Simple, "Nightfall"),
                ],
                hit_types: HitTypeTable::standard(1.5),
            },
            // Frostbolt ranks 1/11/10.
            MagicSchool::Frost => SchoolSpec {
                school,
                name: "Frost".to_string(),
                icon: "Mage-Frost".to_string(),
                spell_ids: vec![116, 25304, 10181],
                curse_id: Some(CURSE_OF_ELEMENTS),
                damage_modifiers: Vec::new(),
                hit_types: HitTypeTable::standard(1.5),
            },
            // Lightning Bolt ranks 10/4.
            MagicSchool::Nature => SchoolSpec {
                school,
                name: "Elemental".to_string(),
                icon: "Shaman-Elemental".to_string(),
                spell_ids: vec![15208, 915],
                curse_id: None,
                damage_modifiers: Vec::new(),
                hit_types: HitTypeTable::standard(1.5),
            },
            // Shadow Bolt ranks 9/10.
            MagicSchool::Shadow => SchoolSpec {
                school,
                name: "Destruction".to_string(),
                icon: "Warlock-Destruction".to_string(),
                spell_ids: vec![25307, 11661],
                curse_id: Some(CURSE_OF_SHADOW),
                damage_modifiers: Vec::new(),
                hit_types: HitTypeTable::standard(1.5),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchoolFile {
    schools: Vec<SchoolSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolCatalog {
    specs: BTreeMap<MagicSchool, SchoolSpec>,
}

impl Default for SchoolCatalog {
    fn default() -> Self {
        Self {
            specs: MagicSchool::ALL
                .iter()
                .map(|school| (*school, SchoolSpec::default_for(*school)))
                .collect(),
        }
    }
}

impl SchoolCatalog {
    /// Defaults with entries from the YAML file at `path` replacing same-school defaults.
    pub fn with_overrides(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SpellresError::io(path, e))?;
        let file: SchoolFile = serde_yaml::from_str(&raw).map_err(|source| SpellresError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut catalog = Self::default();
        for spec in file.schools {
            tracing::debug!(school = %spec.school, spec = %spec.name, "school override");
            catalog.specs.insert(spec.school, spec);
        }
        Ok(catalog)
    }

    pub fn get(&self, school: MagicSchool) -> &SchoolSpec {
        // Every school is present: the catalog starts from the full default set.
        &self.specs[&school]
    }

    pub fn select<'a>(&'a self, schools: &'a [MagicSchool]) -> impl Iterator<Item = &'a SchoolSpec> + 'a {
        schools.iter().map(move |school| self.get(*school))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_school() {
        let catalog = SchoolCatalog::default();
        for school in MagicSchool::ALL {
            assert_eq!(catalog.get(school).school, school);
        }
        assert_eq!(catalog.get(MagicSchool::Nature).curse_id, None);
        assert_eq!(catalog.get(MagicSchool::Fire).damage_modifiers.len(), 2);
    }

    #[test]
    fn arcane_crits_double() {
        let spec = SchoolSpec::default_for(MagicSchool::Arcane);
        assert_eq!(spec.hit_types.multiplier(HitTypeTable::CRIT), 2.0);
    }

    #[test]
    fn yaml_override_replaces_one_school() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schools.yaml");
        fs::write(
            &path,
            "schools:\n  - school: nature\n    name: Balance\n    icon: Druid-Balance\n    spell_ids: [9912]\n    hit_types: {1: 1.0, 2: 1.5, 14: 0.0}\n",
        )
        .unwrap();

        let catalog = SchoolCatalog::with_overrides(&path).unwrap();
        let nature = catalog.get(MagicSchool::Nature);
        assert_eq!(nature.spell_ids, vec![9912]);
        assert!(nature.damage_modifiers.is_empty());
        assert_eq!(catalog.get(MagicSchool::Fire), &SchoolSpec::default_for(MagicSchool::Fire));
    }
}
