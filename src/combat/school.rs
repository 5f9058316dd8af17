//! Magic schools and the per-school hit-type multiplier table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellresError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagicSchool {
    Arcane,
    Fire,
    Frost,
    Nature,
    Shadow,
}

impl MagicSchool {
    pub const ALL: [MagicSchool; 5] = [
        MagicSchool::Arcane,
        MagicSchool::Fire,
        MagicSchool::Frost,
        MagicSchool::Nature,
        MagicSchool::Shadow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arcane => "arcane",
            Self::Fire => "fire",
            Self::Frost => "frost",
            Self::Nature => "nature",
            Self::Shadow => "shadow",
        }
    }

    /// Frost samples are binary spells with no level-based resistance component.
    pub fn has_level_scaling(&self) -> bool {
        !matches!(self, Self::Frost)
    }
}

impl fmt::Display for MagicSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MagicSchool {
    type Err = SpellresError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arcane" => Ok(Self::Arcane),
            "fire" => Ok(Self::Fire),
            "frost" => Ok(Self::Frost),
            "nature" => Ok(Self::Nature),
            "shadow" => Ok(Self::Shadow),
            other => Err(SpellresError::UnknownSchool(other.to_string())),
        }
    }
}

/// Parse a comma-separated school list (`"arcane, fire"`). Duplicates keep their first position.
pub fn parse_school_list(raw: &str) -> Result<Vec<MagicSchool>> {
    let mut schools = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let school: MagicSchool = part.parse()?;
        if !schools.contains(&school) {
            schools.push(school);
        }
    }
    Ok(schools)
}

/// Multiplier applied to the unmitigated amount per telemetry hit-type code.
///
/// Codes missing from the table count as a plain hit (multiplier 1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitTypeTable {
    multipliers: BTreeMap<u32, f64>,
}

impl HitTypeTable {
    pub const HIT: u32 = 1;
    pub const CRIT: u32 = 2;
    pub const RESIST: u32 = 14;
    pub const PARTIAL_HIT: u32 = 16;
    pub const PARTIAL_CRIT: u32 = 17;

    pub fn new() -> Self {
        Self::default()
    }

    /// Hit/partial hit at 1, crit/partial crit at `crit_multiplier`, full resist at 0.
    pub fn standard(crit_multiplier: f64) -> Self {
        Self::new()
            .with(Self::HIT, 1.0)
            .with(Self::CRIT, crit_multiplier)
            .with(Self::RESIST, 0.0)
            .with(Self::PARTIAL_HIT, 1.0)
            .with(Self::PARTIAL_CRIT, crit_multiplier)
    }

    pub fn with(mut self, code: u32, multiplier: f64) -> Self {
        self.multipliers.insert(code, multiplier);
        self
    }

    pub fn multiplier(&self, code: u32) -> f64 {
        self.multipliers.get(&code).copied().unwrap_or(1.0)
    }
}
