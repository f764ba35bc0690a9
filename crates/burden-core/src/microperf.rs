//! Microperformance aggregator and ranking sensitivity.
//!
//! Microarchitectural performance costs expressed as a share of runtime are
//! averaged per mechanism family and ranked ascending. E2/E3 magnitudes are
//! scaled by a perturbation multiplier while E1 magnitudes pass through, so
//! re-ranking at 0.8 and 1.2 probes whether the order depends on uncertain
//! evidence.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{CostRecord, CostType, NumericPolicy};
use crate::table::{four_places, Table};

/// Perturbation scenarios, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scenario {
    #[serde(rename = "baseline")]
    Baseline,
    #[serde(rename = "minus20_e2e3")]
    Minus20,
    #[serde(rename = "plus20_e2e3")]
    Plus20,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Baseline, Scenario::Minus20, Scenario::Plus20];

    /// Multiplier applied to E2/E3 magnitudes.
    pub fn multiplier(&self) -> f64 {
        match self {
            Scenario::Baseline => 1.0,
            Scenario::Minus20 => 0.8,
            Scenario::Plus20 => 1.2,
        }
    }
}

/// Families ordered by mean magnitude, with the means they were ranked on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicroperfRanking {
    /// Families ascending by (mean, name)
    pub order: Vec<String>,
    pub means: BTreeMap<String, f64>,
}

impl MicroperfRanking {
    pub fn mean(&self, family: &str) -> Option<f64> {
        self.means.get(family).copied()
    }
}

/// Rank families by mean percent-runtime cost at a given multiplier.
pub fn rank_microperf(
    costs: &[CostRecord],
    multiplier: f64,
    policy: NumericPolicy,
) -> MicroperfRanking {
    let mut grouped: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for row in costs {
        if row.cost_type() != Some(CostType::MicroarchitecturalPerformanceCost)
            || !row.is_percent_runtime()
        {
            continue;
        }
        let Some(family) = row.family() else {
            continue;
        };
        let Some(mut value) = row.magnitude(policy) else {
            continue;
        };
        if row.evidence_grade().is_some_and(|g| g.is_uncertain()) {
            value *= multiplier;
        }

        let (sum, count) = grouped.entry(family).or_insert((0.0, 0));
        *sum += value;
        *count += 1;
    }

    let means: BTreeMap<String, f64> = grouped
        .into_iter()
        .map(|(family, (sum, count))| (family.to_string(), sum / count as f64))
        .collect();

    let mut ranked: Vec<(&String, &f64)> = means.iter().collect();
    ranked.sort_by(|a, b| a.1.total_cmp(b.1).then_with(|| a.0.cmp(b.0)));
    let order = ranked.into_iter().map(|(family, _)| family.clone()).collect();

    MicroperfRanking { order, means }
}

/// One row of the sensitivity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub scenario: Scenario,
    pub rank: usize,
    pub mechanism_family: String,
    #[serde(serialize_with = "four_places")]
    pub mean_microperf_percent_runtime: f64,
}

impl Table for SensitivityRow {
    const HEADERS: &'static [&'static str] = &[
        "scenario",
        "rank",
        "mechanism_family",
        "mean_microperf_percent_runtime",
    ];
}

/// Rankings under every perturbation scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityAnalysis {
    pub rankings: Vec<(Scenario, MicroperfRanking)>,
}

impl SensitivityAnalysis {
    pub fn run(costs: &[CostRecord], policy: NumericPolicy) -> Self {
        let rankings = Scenario::ALL
            .iter()
            .map(|scenario| (*scenario, rank_microperf(costs, scenario.multiplier(), policy)))
            .collect();
        let analysis = Self { rankings };

        tracing::debug!(
            families = analysis.baseline().map_or(0, |r| r.order.len()),
            stable = analysis.is_stable(),
            "Ran microperformance sensitivity"
        );
        analysis
    }

    pub fn baseline(&self) -> Option<&MicroperfRanking> {
        self.rankings
            .iter()
            .find(|(scenario, _)| *scenario == Scenario::Baseline)
            .map(|(_, ranking)| ranking)
    }

    /// The ranking is stable when it is non-empty and identical in every scenario.
    pub fn is_stable(&self) -> bool {
        let Some(baseline) = self.baseline() else {
            return false;
        };
        !baseline.order.is_empty()
            && self
                .rankings
                .iter()
                .all(|(_, ranking)| ranking.order == baseline.order)
    }

    pub fn rows(&self) -> Vec<SensitivityRow> {
        self.rankings
            .iter()
            .flat_map(|(scenario, ranking)| {
                ranking.order.iter().enumerate().map(move |(i, family)| SensitivityRow {
                    scenario: *scenario,
                    rank: i + 1,
                    mechanism_family: family.clone(),
                    mean_microperf_percent_runtime: ranking.mean(family).unwrap_or_default(),
                })
            })
            .collect()
    }
}
