//! Value-of-information scoring.
//!
//! Every (mechanism family, cost type) cell observed in the cost dataset is
//! scored by how much uncertain, burden-shifting and incident-linked evidence
//! it carries. Cells with the highest scores are where more evidence pays off
//! most.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{CostRecord, CostType, EvidenceGrade, IncidentRecord};
use crate::table::{two_places, Table};

pub const E2_WEIGHT: f64 = 1.0;
pub const E3_WEIGHT: f64 = 2.0;
pub const TRANSFER_WEIGHT: f64 = 1.2;
pub const INCIDENT_WEIGHT: f64 = 0.8;

/// Composite key of a scored cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub family: String,
    pub cost_type: CostType,
}

/// Evidence counts accumulated for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub e2: usize,
    pub e3: usize,
    pub transferred: usize,
    /// Incidents linked to the cell's family
    pub incidents: usize,
}

impl CellCounts {
    pub fn score(&self) -> f64 {
        E2_WEIGHT * self.e2 as f64
            + E3_WEIGHT * self.e3 as f64
            + TRANSFER_WEIGHT * self.transferred as f64
            + INCIDENT_WEIGHT * self.incidents as f64
    }
}

/// One row of the VOI priority ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiRow {
    pub priority_rank: usize,
    pub mechanism_family: String,
    pub cost_type: CostType,
    pub e2_rows: usize,
    pub e3_rows: usize,
    pub transfer_externalized_rows: usize,
    pub incident_link_rows: usize,
    #[serde(serialize_with = "two_places")]
    pub voi_score: f64,
}

impl Table for VoiRow {
    const HEADERS: &'static [&'static str] = &[
        "priority_rank",
        "mechanism_family",
        "cost_type",
        "e2_rows",
        "e3_rows",
        "transfer_externalized_rows",
        "incident_link_rows",
        "voi_score",
    ];
}

/// Count incidents per linked family.
pub fn incident_counts(incidents: &[IncidentRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for family in incidents.iter().filter_map(|r| r.linked_family()) {
        *counts.entry(family).or_insert(0) += 1;
    }
    counts
}

/// Accumulate evidence counts per cell. Rows without a family or a
/// recognised cost type have no cell and are skipped.
pub fn cell_counts(
    costs: &[CostRecord],
    incidents: &[IncidentRecord],
) -> BTreeMap<CellKey, CellCounts> {
    let mut cells: BTreeMap<CellKey, CellCounts> = BTreeMap::new();

    for row in costs {
        let (Some(family), Some(cost_type)) = (row.family(), row.cost_type()) else {
            continue;
        };
        let counts = cells
            .entry(CellKey {
                family: family.to_string(),
                cost_type,
            })
            .or_default();

        match row.evidence_grade() {
            Some(EvidenceGrade::E2) => counts.e2 += 1,
            Some(EvidenceGrade::E3) => counts.e3 += 1,
            _ => {}
        }
        if row.shifts_burden() {
            counts.transferred += 1;
        }
    }

    // Linkage is family-granular: every cell of a family sees all its incidents
    let linked = incident_counts(incidents);
    for (key, counts) in cells.iter_mut() {
        counts.incidents = linked.get(key.family.as_str()).copied().unwrap_or(0);
    }

    cells
}

/// Score every cell and rank them, highest score first.
///
/// Scores compare at the two-decimal precision they are reported with, and
/// ties fall back to (family, cost type), so ranks are exactly 1..=N.
pub fn score_cells(costs: &[CostRecord], incidents: &[IncidentRecord]) -> Vec<VoiRow> {
    let mut scored: Vec<(CellKey, CellCounts, f64)> = cell_counts(costs, incidents)
        .into_iter()
        .map(|(key, counts)| {
            let score = counts.score();
            (key, counts, score)
        })
        .collect();

    scored.sort_by_key(|(key, _, score)| (Reverse(cents(*score)), key.clone()));

    let rows: Vec<VoiRow> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (key, counts, score))| VoiRow {
            priority_rank: i + 1,
            mechanism_family: key.family,
            cost_type: key.cost_type,
            e2_rows: counts.e2,
            e3_rows: counts.e3,
            transfer_externalized_rows: counts.transferred,
            incident_link_rows: counts.incidents,
            voi_score: score,
        })
        .collect();

    tracing::debug!(cells = rows.len(), "Scored VOI cells");
    rows
}

fn cents(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(family: &str, cost_type: &str, grade: &str, bearing: &str) -> CostRecord {
        CostRecord {
            mechanism_family: family.to_string(),
            cost_type: cost_type.to_string(),
            evidence_grade: grade.to_string(),
            bearing_mode: bearing.to_string(),
            ..Default::default()
        }
    }

    fn incident(family: &str) -> IncidentRecord {
        IncidentRecord {
            linked_family: family.to_string(),
            loss_magnitude: "5".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_cell_with_one_incident() {
        let rows = score_cells(
            &[cost("F1", "MicroarchitecturalPerformanceCost", "E1", "Internalized")],
            &[incident("F1")],
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.priority_rank, 1);
        assert_eq!(row.e2_rows, 0);
        assert_eq!(row.e3_rows, 0);
        assert_eq!(row.transfer_externalized_rows, 0);
        assert_eq!(row.incident_link_rows, 1);
        assert!((row.voi_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_score_formula() {
        let counts = CellCounts {
            e2: 2,
            e3: 1,
            transferred: 3,
            incidents: 1,
        };
        assert!((counts.score() - (2.0 + 2.0 + 3.6 + 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_incidents_attach_to_every_cell_of_family() {
        let rows = score_cells(
            &[
                cost("F1", "EngineeringLaborCost", "E1", "Internalized"),
                cost("F1", "OpportunityCost", "E1", "Internalized"),
                cost("F2", "OpportunityCost", "E1", "Internalized"),
            ],
            &[incident("F1"), incident("F1"), incident(" ")],
        );
        let f1: Vec<usize> = rows
            .iter()
            .filter(|r| r.mechanism_family == "F1")
            .map(|r| r.incident_link_rows)
            .collect();
        assert_eq!(f1, vec![2, 2]);
        let f2 = rows.iter().find(|r| r.mechanism_family == "F2").unwrap();
        assert_eq!(f2.incident_link_rows, 0);
    }

    #[test]
    fn test_ranking_descends_with_key_tie_break() {
        let rows = score_cells(
            &[
                cost("B", "OpportunityCost", "E2", "Internalized"),
                cost("A", "OpportunityCost", "E2", "Internalized"),
                cost("C", "OpportunityCost", "E3", "Transferred"),
                cost("A", "EngineeringLaborCost", "E2", "Internalized"),
            ],
            &[],
        );
        let order: Vec<(&str, CostType)> = rows
            .iter()
            .map(|r| (r.mechanism_family.as_str(), r.cost_type))
            .collect();
        assert_eq!(
            order,
            vec![
                ("C", CostType::OpportunityCost),
                ("A", CostType::EngineeringLaborCost),
                ("A", CostType::OpportunityCost),
                ("B", CostType::OpportunityCost),
            ]
        );
        let ranks: Vec<usize> = rows.iter().map(|r| r.priority_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_without_key_are_skipped() {
        let rows = score_cells(
            &[
                cost("", "OpportunityCost", "E3", "Transferred"),
                cost("F1", "", "E3", "Transferred"),
                cost("F1", "NotACostType", "E3", "Transferred"),
            ],
            &[],
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_float_noise_does_not_split_ties() {
        // Three transfers score 1.2 * 3; one E3 row and two incidents score
        // 2.0 + 1.6. Both report as 3.60.
        let rows = score_cells(
            &[
                cost("Y", "OpportunityCost", "E1", "Transferred"),
                cost("Y", "OpportunityCost", "E1", "Transferred"),
                cost("Y", "OpportunityCost", "E1", "Externalized"),
                cost("X", "OpportunityCost", "E3", "Internalized"),
            ],
            &[incident("X"), incident("X")],
        );
        // Equal at two decimals, so the family name decides
        assert_eq!(rows[0].mechanism_family, "X");
        assert_eq!(rows[1].mechanism_family, "Y");
    }
}
