//! Scan settings: which schools, how curses are treated, limits, levels and file locations.

use std::env;
use std::path::{Path, PathBuf};

use crate::combat::{CursePolicy, LevelSettings, MagicSchool};
use crate::data::gear::ITEMS_FILE;
use crate::data::zones::ZONES_FILE;

pub const DEFAULT_SPELL_CAST_LIMIT: u64 = 1000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_RESULTS_DIR: &str = "results";

pub const REPORTS_DIR_ENV: &str = "SPELLRES_REPORTS_DIR";
pub const RESULTS_DIR_ENV: &str = "SPELLRES_RESULTS_DIR";
pub const DATA_DIR_ENV: &str = "SPELLRES_DATA_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub schools: Vec<MagicSchool>,
    pub curse_policy: CursePolicy,
    /// Per-school cast count after which further reports are skipped.
    pub spell_cast_limit: u64,
    pub levels: LevelSettings,
    /// Worker threads; 0 uses every core.
    pub workers: usize,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Optional YAML overriding the built-in school catalog.
    pub schools_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            schools: MagicSchool::ALL.to_vec(),
            curse_policy: CursePolicy::default(),
            spell_cast_limit: DEFAULT_SPELL_CAST_LIMIT,
            levels: LevelSettings::default(),
            workers: 0,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            schools_file: None,
        }
    }
}

impl ScanConfig {
    /// Defaults with directory overrides from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env_path(DATA_DIR_ENV) {
            config.data_dir = dir;
        }
        if let Some(dir) = env_path(REPORTS_DIR_ENV) {
            config.reports_dir = dir;
        }
        if let Some(dir) = env_path(RESULTS_DIR_ENV) {
            config.results_dir = dir;
        }
        config
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(ITEMS_FILE)
    }

    pub fn zones_path(&self) -> PathBuf {
        self.data_dir.join(ZONES_FILE)
    }

    pub fn result_path(&self, enemy_id: u64) -> PathBuf {
        result_path_in(&self.results_dir, enemy_id)
    }
}

pub fn result_path_in(dir: &Path, enemy_id: u64) -> PathBuf {
    dir.join(format!("{enemy_id}.json"))
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
