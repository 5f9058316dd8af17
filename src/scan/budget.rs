//! Per-school cast limit shared by every report of one scan.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::combat::{MagicSchool, ResistanceTable};

/// Casts are claimed one at a time before they are recorded, so concurrent reports never count
/// more than `limit` casts for a school between them.
#[derive(Debug)]
pub struct CastBudget {
    limit: u64,
    claimed: BTreeMap<MagicSchool, AtomicU64>,
}

impl CastBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            claimed: MagicSchool::ALL
                .into_iter()
                .map(|school| (school, AtomicU64::new(0)))
                .collect(),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn claimed(&self, school: MagicSchool) -> u64 {
        self.claimed
            .get(&school)
            .map_or(0, |claimed| claimed.load(Ordering::Acquire))
    }

    pub fn exhausted(&self, school: MagicSchool) -> bool {
        self.claimed(school) >= self.limit
    }

    /// Claim one cast for `school`; `false` once the limit is taken.
    pub fn try_claim(&self, school: MagicSchool) -> bool {
        let Some(claimed) = self.claimed.get(&school) else {
            return false;
        };
        claimed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .is_ok()
    }

    /// Hand back the claims behind counts that will not be merged.
    pub fn release(&self, table: &ResistanceTable) {
        for (school, counts) in table.iter() {
            if let Some(claimed) = self.claimed.get(&school) {
                claimed.fetch_sub(counts.casts(), Ordering::AcqRel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::OutcomeCounts;

    #[test]
    fn claims_stop_at_the_limit_per_school() {
        let budget = CastBudget::new(2);
        assert!(budget.try_claim(MagicSchool::Fire));
        assert!(budget.try_claim(MagicSchool::Fire));
        assert!(!budget.try_claim(MagicSchool::Fire));
        assert!(budget.exhausted(MagicSchool::Fire));
        assert!(budget.try_claim(MagicSchool::Frost));
        assert_eq!(budget.claimed(MagicSchool::Frost), 1);
    }

    #[test]
    fn concurrent_claims_never_exceed_the_limit() {
        use rayon::prelude::*;

        let budget = CastBudget::new(100);
        let granted = (0..1_000)
            .into_par_iter()
            .filter(|_| budget.try_claim(MagicSchool::Shadow))
            .count();
        assert_eq!(granted, 100);
        assert_eq!(budget.claimed(MagicSchool::Shadow), 100);
    }

    #[test]
    fn release_returns_discarded_casts() {
        let budget = CastBudget::new(3);
        for _ in 0..3 {
            assert!(budget.try_claim(MagicSchool::Fire));
        }
        let mut discarded = ResistanceTable::new();
        discarded.merge_counts(
            MagicSchool::Fire,
            &OutcomeCounts {
                miss: 1,
                full_hit: 1,
                ..OutcomeCounts::default()
            },
        );
        budget.release(&discarded);
        assert_eq!(budget.claimed(MagicSchool::Fire), 1);
        assert!(!budget.exhausted(MagicSchool::Fire));
    }
}
