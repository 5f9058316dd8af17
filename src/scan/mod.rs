//! Scan orchestration: every report, every selected school, one target at a time.
//!
//! Reports are processed in parallel on a [WorkerPool]. Each report builds its own counters and
//! merges them into the shared table in one locked step, so a reader never sees half a report.
//! The cast limit is enforced through a [CastBudget] shared by all workers.

pub mod budget;
pub mod config;
pub mod report;
pub mod results;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use crate::combat::ResistanceTable;
use crate::data::gear::GearCatalog;
use crate::data::schools::SchoolCatalog;
use crate::data::source::{CombatLogSource, ReportSummary};
use crate::data::zones::ScanTarget;
use crate::error::Result;
use crate::parallel::WorkerPool;

pub use budget::CastBudget;
pub use config::ScanConfig;
pub use report::{ReportScan, SchoolScan};
pub use results::ResultDocument;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub target: ScanTarget,
    pub table: ResistanceTable,
    /// Reports that contributed at least one counted cast.
    pub reports_used: usize,
}

pub struct Scanner<'a, S: CombatLogSource + ?Sized> {
    source: &'a S,
    gear: &'a GearCatalog,
    schools: &'a SchoolCatalog,
    config: &'a ScanConfig,
}

impl<'a, S: CombatLogSource + ?Sized> Scanner<'a, S> {
    pub fn new(
        source: &'a S,
        gear: &'a GearCatalog,
        schools: &'a SchoolCatalog,
        config: &'a ScanConfig,
    ) -> Self {
        Self {
            source,
            gear,
            schools,
            config,
        }
    }

    pub fn scan(&self, target: &ScanTarget) -> Result<ScanOutcome> {
        self.scan_with(target, |_| Ok(()))
    }

    /// Scan all reports for `target`. `on_update` sees the table after every report that changed
    /// it, while the table is still locked.
    pub fn scan_with<F>(&self, target: &ScanTarget, on_update: F) -> Result<ScanOutcome>
    where
        F: Fn(&ResistanceTable) -> Result<()> + Sync,
    {
        let summaries = self.source.report_summaries();
        tracing::info!(
            enemy = %target.enemy.name,
            encounter = %target.encounter_name,
            reports = summaries.len(),
            "scanning target"
        );

        let table = Mutex::new(ResistanceTable::with_schools(self.config.schools.iter().copied()));
        let reports_used = AtomicUsize::new(0);
        let budget = CastBudget::new(self.config.spell_cast_limit);
        let pool = WorkerPool::with_workers(self.config.workers);

        pool.install(|| {
            summaries.par_iter().try_for_each(|summary| {
                let local = self.scan_report(summary, target, &budget);
                if local.total_casts() == 0 {
                    return Ok(());
                }
                let mut shared = table.lock().unwrap_or_else(PoisonError::into_inner);
                shared.merge(&local);
                reports_used.fetch_add(1, Ordering::Relaxed);
                on_update(&shared)
            })
        })?;

        Ok(ScanOutcome {
            target: target.clone(),
            table: table.into_inner().unwrap_or_else(PoisonError::into_inner),
            reports_used: reports_used.into_inner(),
        })
    }

    /// Counts from one report. A report the source cannot serve contributes nothing.
    fn scan_report(
        &self,
        summary: &ReportSummary,
        target: &ScanTarget,
        budget: &CastBudget,
    ) -> ResistanceTable {
        let scan = ReportScan {
            source: self.source,
            gear: self.gear,
            report: &summary.code,
            target,
            curse_policy: self.config.curse_policy,
        };
        let mut local = ResistanceTable::new();

        for spec in self.schools.select(&self.config.schools) {
            if !summary.has_spell_for(spec) {
                tracing::debug!(report = %summary.code, school = %spec.school, "report missing needed spells");
                continue;
            }
            if !summary.has_icon_for(spec) {
                tracing::debug!(report = %summary.code, school = %spec.school, "report missing needed spec");
                continue;
            }
            if budget.exhausted(spec.school) {
                tracing::debug!(report = %summary.code, school = %spec.school, "spell cast limit reached");
                continue;
            }

            match scan.scan_school(spec, budget) {
                Ok(result) => local.merge_counts(spec.school, &result.counts),
                Err(err) => {
                    tracing::warn!(report = %summary.code, error = %err.chain(), "skipping report");
                    budget.release(&local);
                    return ResistanceTable::new();
                }
            }
        }
        local
    }
}
