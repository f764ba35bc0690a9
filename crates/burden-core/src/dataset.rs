//! The three evidence datasets, loaded together for one run.

use std::path::Path;

use serde::Serialize;

use crate::error::EngineError;
use crate::records::{parse_number, CostRecord, IncidentRecord, ObjectiveRecord};
use crate::table::read_table;

/// Immutable record sets shared by every engine component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceSet {
    pub costs: Vec<CostRecord>,
    pub incidents: Vec<IncidentRecord>,
    pub objectives: Vec<ObjectiveRecord>,
}

/// Row counts and numeric hygiene of a loaded evidence set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub cost_rows: usize,
    pub incident_rows: usize,
    pub objective_rows: usize,
    pub malformed_numeric_fields: usize,
}

impl EvidenceSet {
    pub fn new(
        costs: Vec<CostRecord>,
        incidents: Vec<IncidentRecord>,
        objectives: Vec<ObjectiveRecord>,
    ) -> Self {
        Self {
            costs,
            incidents,
            objectives,
        }
    }

    /// Load all three datasets from table files.
    pub fn load(
        cost_path: impl AsRef<Path>,
        incident_path: impl AsRef<Path>,
        objective_path: impl AsRef<Path>,
    ) -> Result<Self, EngineError> {
        let set = Self::new(
            read_table(cost_path)?,
            read_table(incident_path)?,
            read_table(objective_path)?,
        );

        let stats = set.stats();
        tracing::info!(
            cost_rows = stats.cost_rows,
            incident_rows = stats.incident_rows,
            objective_rows = stats.objective_rows,
            "Loaded evidence datasets"
        );
        if stats.malformed_numeric_fields > 0 {
            tracing::warn!(
                count = stats.malformed_numeric_fields,
                "Malformed or missing numeric fields found"
            );
        }

        Ok(set)
    }

    pub fn stats(&self) -> DatasetStats {
        let malformed = |raw: &str| usize::from(parse_number(raw).is_none());

        let cost_fields: usize = self.costs.iter().map(|r| malformed(&r.magnitude)).sum();
        let incident_fields: usize = self
            .incidents
            .iter()
            .map(|r| malformed(&r.loss_magnitude))
            .sum();
        let objective_fields: usize = self
            .objectives
            .iter()
            .flat_map(|r| r.weight_fields())
            .map(malformed)
            .sum();

        DatasetStats {
            cost_rows: self.costs.len(),
            incident_rows: self.incidents.len(),
            objective_rows: self.objectives.len(),
            malformed_numeric_fields: cost_fields + incident_fields + objective_fields,
        }
    }
}
