//! Result documents: `results/<enemyID>.json`, one per scanned enemy.
//!
//! The `tables` array is the summary shown to users. Its partial columns are labelled by the share
//! of damage *resisted*, so the `25%` column holds the bucket where 75% of the damage landed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::combat::{LevelSettings, MagicSchool, ResistanceTable};
use crate::data::zones::Enemy;
use crate::error::{Result, SpellresError};
use crate::scan::config::result_path_in;

pub const TABLE_HEADER: [&str; 8] = ["school", "res", "#", "miss", "full", "25%", "50%", "75%"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    #[serde(rename = "enemyID")]
    pub enemy_id: u64,
    #[serde(rename = "enemyName")]
    pub enemy_name: String,
    pub tables: Vec<Vec<Value>>,
    /// Raw per-school counters behind `tables`, unrounded.
    #[serde(default)]
    pub counts: ResistanceTable,
    #[serde(rename = "generatedAt", default)]
    pub generated_at: Option<String>,
}

impl ResultDocument {
    /// Summary for every school, scanned or not.
    pub fn build(enemy: &Enemy, table: &ResistanceTable, levels: LevelSettings) -> Self {
        let mut tables: Vec<Vec<Value>> = vec![TABLE_HEADER.iter().map(|h| Value::from(*h)).collect()];
        for school in MagicSchool::ALL {
            let counts = table.counts(school);
            tables.push(vec![
                Value::from(school.as_str()),
                table.estimate(school, levels).to_cell(),
                Value::from(counts.casts()),
                Value::from(counts.misses()),
                Value::from(counts.full_hit),
                Value::from(counts.resist75),
                Value::from(counts.resist50),
                Value::from(counts.resist25),
            ]);
        }

        Self {
            enemy_id: enemy.id,
            enemy_name: enemy.name.clone(),
            tables,
            counts: table.clone(),
            generated_at: Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        }
    }

    /// Write to `<dir>/<enemyID>.json`, creating `dir` if needed.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| SpellresError::io(dir, e))?;
        let path = result_path_in(dir, self.enemy_id);
        let json = serde_json::to_string_pretty(self).map_err(SpellresError::Serialize)?;
        fs::write(&path, json).map_err(|e| SpellresError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "wrote result document");
        Ok(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SpellresError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| SpellresError::json(path, e))
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.tables
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }

    /// Aligned plain-text table titled with the enemy name.
    pub fn render_text(&self) -> String {
        let rows = self.rows();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                rows.iter()
                    .filter_map(|row| row.get(c))
                    .map(String::len)
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = format!("{} ({})\n", self.enemy_name, self.enemy_id);
        for (i, row) in rows.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:>width$}", width = *width))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
            if i == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                out.push_str(&rule.join("  "));
                out.push('\n');
            }
        }
        out
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in self.rows() {
            csv.write_record(&row)?;
        }
        csv.flush().map_err(|e| SpellresError::io("<csv output>", e))?;
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::OutcomeCounts;

    fn enemy() -> Enemy {
        Enemy {
            id: 11502,
            name: "Ragnaros".to_string(),
            exclude_while_aura: None,
        }
    }

    fn table() -> ResistanceTable {
        let mut table = ResistanceTable::new();
        table.merge_counts(
            MagicSchool::Fire,
            &OutcomeCounts {
                miss: 2,
                resist25: 1,
                resist50: 0,
                resist75: 3,
                full_hit: 4,
            },
        );
        table.merge_counts(
            MagicSchool::Shadow,
            &OutcomeCounts {
                miss: 60,
                ..OutcomeCounts::default()
            },
        );
        table
    }

    #[test]
    fn rows_swap_partial_columns_to_resisted_share() {
        let doc = ResultDocument::build(&enemy(), &table(), LevelSettings::default());
        assert_eq!(doc.tables.len(), 6);
        let fire = &doc.tables[2];
        assert_eq!(fire[0], Value::from("fire"));
        assert_eq!(fire[2], Value::from(10u64));
        assert_eq!(fire[4], Value::from(4u64));
        assert_eq!(fire[5], Value::from(3u64));
        assert_eq!(fire[7], Value::from(1u64));
        assert_eq!(doc.tables[1][1], Value::from("?"));
        assert_eq!(doc.tables[5][1], Value::from("IMMUNE"));
    }

    #[test]
    fn write_then_load_keeps_counts() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ResultDocument::build(&enemy(), &table(), LevelSettings::default());
        let path = doc.write(&dir.path().join("results")).unwrap();
        assert!(path.ends_with("11502.json"));
        let loaded = ResultDocument::load(&path).unwrap();
        assert_eq!(loaded.counts.casts(MagicSchool::Fire), 10);
        assert_eq!(loaded.tables, doc.tables);
    }

    #[test]
    fn text_and_csv_render_every_row() {
        let doc = ResultDocument::build(&enemy(), &table(), LevelSettings::default());
        let text = doc.render_text();
        assert!(text.starts_with("Ragnaros (11502)\n"));
        assert!(text.contains("IMMUNE"));

        let mut buf = Vec::new();
        doc.write_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        assert_eq!(csv.lines().next(), Some("school,res,#,miss,full,25%,50%,75%"));
        assert_eq!(csv.lines().count(), 6);
    }
}
