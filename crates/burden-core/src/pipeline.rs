//! End-to-end batch run: check preconditions, load, evaluate, write.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::EngineConfig;
use crate::consistency::RuleManifest;
use crate::dataset::{DatasetStats, EvidenceSet};
use crate::error::EngineError;
use crate::records::NumericPolicy;
use crate::table::write_table;
use crate::{evaluate, Evaluation};

/// Where each output artifact is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    pub cq: PathBuf,
    pub voi: PathBuf,
    pub sensitivity: PathBuf,
    pub objectives: PathBuf,
    pub consistency: PathBuf,
}

impl OutputPaths {
    pub const CQ_FILE: &'static str = "cq_results.csv";
    pub const VOI_FILE: &'static str = "voi_priorities.csv";
    pub const SENSITIVITY_FILE: &'static str = "sensitivity_microperf.csv";
    pub const OBJECTIVES_FILE: &'static str = "objective_comparison.csv";
    pub const CONSISTENCY_FILE: &'static str = "consistency_report.csv";

    /// Default file names inside one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cq: dir.join(Self::CQ_FILE),
            voi: dir.join(Self::VOI_FILE),
            sensitivity: dir.join(Self::SENSITIVITY_FILE),
            objectives: dir.join(Self::OBJECTIVES_FILE),
            consistency: dir.join(Self::CONSISTENCY_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 5] {
        [
            self.cq.as_path(),
            self.voi.as_path(),
            self.sensitivity.as_path(),
            self.objectives.as_path(),
            self.consistency.as_path(),
        ]
    }
}

/// Inputs and outputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub cost: PathBuf,
    pub incidents: PathBuf,
    pub objectives: PathBuf,
    pub rules: PathBuf,
    pub outputs: OutputPaths,
}

/// What a run read and wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub stats: DatasetStats,
    pub numeric_policy: NumericPolicy,
    pub cq_passed: usize,
    pub cq_total: usize,
    pub voi_cells: usize,
    pub valid_objectives: usize,
    pub rule_violations: usize,
    pub outputs: OutputPaths,
}

/// Write every artifact of an evaluation.
pub fn write_outputs(evaluation: &Evaluation, outputs: &OutputPaths) -> Result<(), EngineError> {
    write_table(&outputs.sensitivity, &evaluation.sensitivity.rows())?;
    write_table(&outputs.voi, &evaluation.voi)?;
    write_table(&outputs.objectives, &evaluation.objectives.rows)?;
    write_table(&outputs.consistency, &evaluation.consistency.rows)?;
    write_table(&outputs.cq, &evaluation.report)?;
    Ok(())
}

/// Run the whole batch.
///
/// The rule-definitions file is checked before anything else; if it is
/// missing nothing is read and nothing is written.
pub fn run(paths: &RunPaths, config: &EngineConfig) -> Result<RunSummary, EngineError> {
    let manifest = RuleManifest::load(&paths.rules)?;
    let set = EvidenceSet::load(&paths.cost, &paths.incidents, &paths.objectives)?;

    let evaluation = evaluate(&set, &manifest, config);
    write_outputs(&evaluation, &paths.outputs)?;

    for path in paths.outputs.all() {
        tracing::info!(path = %path.display(), "Wrote artifact");
    }

    Ok(RunSummary {
        stats: set.stats(),
        numeric_policy: config.numeric_policy,
        cq_passed: evaluation.passed(),
        cq_total: evaluation.report.len(),
        voi_cells: evaluation.voi.len(),
        valid_objectives: evaluation.objectives.valid_objectives,
        rule_violations: evaluation.consistency.total_violations(),
        outputs: paths.outputs.clone(),
    })
}
