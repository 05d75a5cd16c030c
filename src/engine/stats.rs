use serde::Serialize;

use super::tier::{classify, CategoryTier, Thresholds};
use crate::catalog::CourseRecord;

/// Cost extremum with every course that shares it, in dataset order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostExtreme {
    pub cost: f64,
    pub names: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub economy: usize,
    pub standard: usize,
    pub premium: usize,
}

impl TierCounts {
    pub fn get(&self, tier: CategoryTier) -> usize {
        match tier {
            CategoryTier::Economy => self.economy,
            CategoryTier::Standard => self.standard,
            CategoryTier::Premium => self.premium,
        }
    }
}

/// Dataset-wide figures. Extremes are `None` for an empty dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub average_duration: f64,
    pub max_cost: Option<CostExtreme>,
    pub min_cost: Option<CostExtreme>,
    pub tiers: TierCounts,
}

/// Summarizes the full, unfiltered dataset.
pub fn summarize(records: &[CourseRecord], thresholds: &Thresholds) -> Stats {
    let count = records.len();
    if count == 0 {
        return Stats::default();
    }

    let total_hours: f64 = records.iter().map(|r| r.duration_hours).sum();
    let max = records.iter().map(|r| r.cost).fold(f64::MIN, f64::max);
    let min = records.iter().map(|r| r.cost).fold(f64::MAX, f64::min);

    let mut tiers = TierCounts::default();
    for r in records {
        match classify(r.cost, thresholds) {
            CategoryTier::Economy => tiers.economy += 1,
            CategoryTier::Standard => tiers.standard += 1,
            CategoryTier::Premium => tiers.premium += 1,
        }
    }

    Stats {
        count,
        average_duration: total_hours / count as f64,
        max_cost: Some(extreme(records, max)),
        min_cost: Some(extreme(records, min)),
        tiers,
    }
}

fn extreme(records: &[CourseRecord], cost: f64) -> CostExtreme {
    CostExtreme {
        cost,
        names: records
            .iter()
            .filter(|r| r.cost == cost)
            .map(CourseRecord::label)
            .collect(),
    }
}

/// Number of courses strictly more expensive than `cost`.
pub fn count_above(records: &[CourseRecord], cost: f64) -> usize {
    records.iter().filter(|r| r.cost > cost).count()
}
