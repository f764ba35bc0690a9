//! Objective ranker: weighted multi-criteria comparison of mechanism families.
//!
//! Each decision objective weights five cost buckets, burden shifting, and
//! incident loss. Magnitudes are normalized by the largest magnitude seen for
//! their cost type, incident losses by the largest loss overall. A family's
//! score is its aggregate weighted burden, so lower ranks first, and every
//! score is reported relative to the objective's baseline family.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{CostRecord, CostType, IncidentRecord, NumericPolicy, ObjectiveRecord};
use crate::table::{two_places, Table};

/// The weight an objective assigns to a cost type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightBucket {
    Performance,
    Labor,
    Operations,
    Compliance,
    Opportunity,
}

impl WeightBucket {
    /// Fixed cost-type mapping. Cost types within a bucket are treated as
    /// fungible.
    pub fn for_cost_type(cost_type: CostType) -> Self {
        match cost_type {
            CostType::MicroarchitecturalPerformanceCost => WeightBucket::Performance,
            CostType::EngineeringLaborCost | CostType::VerificationValidationCost => {
                WeightBucket::Labor
            }
            CostType::PhysicalResourceCost
            | CostType::ToolchainInfrastructureCost
            | CostType::LifecycleOperationsCost => WeightBucket::Operations,
            CostType::ComplianceAssuranceCost
            | CostType::MarketContractualCost
            | CostType::LiabilityRedressCost
            | CostType::ReputationTrustCost => WeightBucket::Compliance,
            CostType::OpportunityCost => WeightBucket::Opportunity,
        }
    }
}

/// Parsed weights of one objective.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectiveWeights {
    pub perf: f64,
    pub labor: f64,
    pub ops: f64,
    pub compliance: f64,
    pub opportunity: f64,
    pub transfer_externalized: f64,
    pub incident_loss: f64,
}

impl ObjectiveWeights {
    /// Read all seven weights. Under [`NumericPolicy::Exclude`] a single
    /// malformed weight disqualifies the objective.
    pub fn read(record: &ObjectiveRecord, policy: NumericPolicy) -> Option<Self> {
        let [perf, labor, ops, compliance, opportunity, transfer_externalized, incident_loss] =
            record.weight_fields();
        Some(Self {
            perf: policy.read(perf)?,
            labor: policy.read(labor)?,
            ops: policy.read(ops)?,
            compliance: policy.read(compliance)?,
            opportunity: policy.read(opportunity)?,
            transfer_externalized: policy.read(transfer_externalized)?,
            incident_loss: policy.read(incident_loss)?,
        })
    }

    pub fn bucket(&self, bucket: WeightBucket) -> f64 {
        match bucket {
            WeightBucket::Performance => self.perf,
            WeightBucket::Labor => self.labor,
            WeightBucket::Operations => self.ops,
            WeightBucket::Compliance => self.compliance,
            WeightBucket::Opportunity => self.opportunity,
        }
    }
}

/// A normalization denominator; non-positive maxima fall back to 1.0.
fn floored(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max
    }
}

/// Normalization denominators computed once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalization {
    type_max: BTreeMap<CostType, f64>,
    incident_loss: BTreeMap<String, f64>,
}

impl Normalization {
    pub fn compute(
        costs: &[CostRecord],
        incidents: &[IncidentRecord],
        policy: NumericPolicy,
    ) -> Self {
        let mut type_max: BTreeMap<CostType, f64> = BTreeMap::new();
        for row in costs {
            let (Some(cost_type), Some(magnitude)) = (row.cost_type(), row.magnitude(policy))
            else {
                continue;
            };
            let max = type_max.entry(cost_type).or_insert(f64::NEG_INFINITY);
            *max = max.max(magnitude.abs());
        }
        let type_max = type_max
            .into_iter()
            .map(|(cost_type, max)| (cost_type, floored(max)))
            .collect();

        // The denominator spans every incident, linked to a family or not.
        let max_loss = floored(
            incidents
                .iter()
                .filter_map(|r| r.loss_magnitude(policy))
                .fold(f64::NEG_INFINITY, f64::max),
        );

        let mut grouped: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for row in incidents {
            let (Some(family), Some(loss)) = (row.linked_family(), row.loss_magnitude(policy))
            else {
                continue;
            };
            let (sum, count) = grouped.entry(family).or_insert((0.0, 0));
            *sum += loss / max_loss;
            *count += 1;
        }
        let incident_loss = grouped
            .into_iter()
            .map(|(family, (sum, count))| (family.to_string(), sum / count as f64))
            .collect();

        Self {
            type_max,
            incident_loss,
        }
    }

    /// Largest absolute magnitude observed for a cost type.
    pub fn type_max(&self, cost_type: CostType) -> f64 {
        self.type_max.get(&cost_type).copied().unwrap_or(1.0)
    }

    /// Mean normalized incident loss of a family, zero when it has no incidents.
    pub fn incident_loss(&self, family: &str) -> f64 {
        self.incident_loss.get(family).copied().unwrap_or(0.0)
    }
}

/// A cost row reduced to what objective scoring needs.
#[derive(Debug, Clone, Copy)]
struct BurdenEntry {
    bucket: WeightBucket,
    shifts_burden: bool,
    normalized: f64,
}

impl BurdenEntry {
    fn contribution(&self, weights: &ObjectiveWeights) -> f64 {
        let transfer = if self.shifts_burden {
            weights.transfer_externalized
        } else {
            0.0
        };
        (weights.bucket(self.bucket) + transfer) * self.normalized
    }
}

/// One row of the objective comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveRow {
    pub objective_id: String,
    pub objective_label: String,
    pub baseline_family: String,
    pub mechanism_family: String,
    #[serde(serialize_with = "two_places")]
    pub objective_score: f64,
    #[serde(serialize_with = "two_places")]
    pub delta_vs_baseline: f64,
    pub rank: usize,
}

impl Table for ObjectiveRow {
    const HEADERS: &'static [&'static str] = &[
        "objective_id",
        "objective_label",
        "baseline_family",
        "mechanism_family",
        "objective_score",
        "delta_vs_baseline",
        "rank",
    ];
}

/// Rows for every valid objective, plus how many objectives were valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveRanking {
    pub rows: Vec<ObjectiveRow>,
    pub valid_objectives: usize,
    pub total_objectives: usize,
}

impl ObjectiveRanking {
    pub fn all_valid(&self) -> bool {
        self.total_objectives > 0 && self.valid_objectives == self.total_objectives
    }
}

/// Scores families against each objective.
pub struct ObjectiveRanker<'a> {
    entries: BTreeMap<&'a str, Vec<BurdenEntry>>,
    normalization: Normalization,
    policy: NumericPolicy,
}

impl<'a> ObjectiveRanker<'a> {
    /// Precompute normalization and the per-family burden entries.
    pub fn new(costs: &'a [CostRecord], incidents: &[IncidentRecord], policy: NumericPolicy) -> Self {
        let normalization = Normalization::compute(costs, incidents, policy);

        let mut entries: BTreeMap<&str, Vec<BurdenEntry>> = BTreeMap::new();
        for row in costs {
            let (Some(family), Some(cost_type)) = (row.family(), row.cost_type()) else {
                continue;
            };
            let Some(magnitude) = row.magnitude(policy) else {
                continue;
            };
            entries.entry(family).or_default().push(BurdenEntry {
                bucket: WeightBucket::for_cost_type(cost_type),
                shifts_burden: row.shifts_burden(),
                normalized: magnitude.abs() / normalization.type_max(cost_type),
            });
        }

        Self {
            entries,
            normalization,
            policy,
        }
    }

    /// Score every family under one set of weights.
    pub fn scores(&self, weights: &ObjectiveWeights) -> BTreeMap<&'a str, f64> {
        self.entries
            .iter()
            .map(|(family, entries)| {
                let cost = entries.iter().map(|e| e.contribution(weights)).sum::<f64>()
                    / entries.len() as f64;
                let incident = weights.incident_loss * self.normalization.incident_loss(family);
                (*family, cost + incident)
            })
            .collect()
    }

    /// Rank families for one objective.
    ///
    /// Returns `None` when the objective cannot be compared: unreadable
    /// weights, a baseline without scores, or fewer than two scored families.
    pub fn rank(&self, objective: &ObjectiveRecord) -> Option<Vec<ObjectiveRow>> {
        let Some(weights) = ObjectiveWeights::read(objective, self.policy) else {
            tracing::warn!(
                objective = %objective.objective_id,
                "Skipping objective with malformed weights"
            );
            return None;
        };
        let scores = self.scores(&weights);
        if scores.len() < 2 {
            tracing::debug!(objective = %objective.objective_id, "Fewer than two scored families");
            return None;
        }
        let Some(baseline) = objective
            .baseline_family()
            .and_then(|family| scores.get_key_value(family))
            .map(|(family, score)| (*family, *score))
        else {
            tracing::warn!(
                objective = %objective.objective_id,
                baseline = %objective.baseline_family,
                "Baseline family has no scored cost rows"
            );
            return None;
        };

        let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let rows = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (family, score))| ObjectiveRow {
                objective_id: objective.objective_id.trim().to_string(),
                objective_label: objective.objective_label.trim().to_string(),
                baseline_family: baseline.0.to_string(),
                mechanism_family: family.to_string(),
                objective_score: score,
                delta_vs_baseline: score - baseline.1,
                rank: i + 1,
            })
            .collect();
        Some(rows)
    }
}

/// Rank families under every objective.
pub fn rank_objectives(
    costs: &[CostRecord],
    incidents: &[IncidentRecord],
    objectives: &[ObjectiveRecord],
    policy: NumericPolicy,
) -> ObjectiveRanking {
    let ranker = ObjectiveRanker::new(costs, incidents, policy);
    let mut ranking = ObjectiveRanking {
        total_objectives: objectives.len(),
        ..Default::default()
    };

    for objective in objectives {
        if let Some(rows) = ranker.rank(objective) {
            ranking.valid_objectives += 1;
            ranking.rows.extend(rows);
        }
    }

    tracing::debug!(
        valid = ranking.valid_objectives,
        total = ranking.total_objectives,
        "Ranked decision objectives"
    );
    ranking
}
