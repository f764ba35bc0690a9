//! # burden-core
//!
//! Deterministic competency-question evaluation over evidentiary cost/risk
//! datasets.
//!
//! Given cost records, incident records and decision-objective weights, this
//! crate answers whether each competency question (CQ) is executably
//! answerable and produces the derived artifacts:
//! - a value-of-information priority ranking
//! - a sensitivity-of-ranking table
//! - an objective-weighted multi-criteria ranking
//! - a rule-based consistency report
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same datasets always produce byte-identical artifacts
//! 2. **Tolerant**: Malformed rows degrade a CQ to `partial`, never abort a run
//! 3. **Independent components**: Every component reads the same immutable
//!    record sets; only the report assembler combines their outputs
//!
//! ## Example
//!
//! ```rust,ignore
//! use burden_core::{evaluate, EngineConfig, EvidenceSet, RuleManifest};
//!
//! let set = EvidenceSet::load("cost.csv", "incidents.csv", "objectives.csv")?;
//! let manifest = RuleManifest::load("rules.yaml")?;
//! let evaluation = evaluate(&set, &manifest, &EngineConfig::default());
//!
//! for row in &evaluation.report {
//!     println!("{:?}: {:?} ({})", row.cq_id, row.status, row.coverage_metric);
//! }
//! ```

pub mod config;
pub mod consistency;
pub mod coverage;
pub mod dataset;
pub mod error;
pub mod microperf;
pub mod objectives;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod table;
pub mod validator;
pub mod voi;

// Re-export main types at crate root
pub use config::{ComparabilityThresholds, EngineConfig};
pub use consistency::{ConsistencyReport, ConsistencyRow, ConsistencyRule, RuleManifest, RuleStatus};
pub use coverage::DatasetCoverage;
pub use dataset::{DatasetStats, EvidenceSet};
pub use error::EngineError;
pub use microperf::{SensitivityAnalysis, SensitivityRow};
pub use objectives::{ObjectiveRanking, ObjectiveRow};
pub use pipeline::{run, OutputPaths, RunPaths, RunSummary};
pub use records::{
    BearingMode, CostRecord, CostType, EvidenceGrade, IncidentRecord, NumericPolicy,
    ObjectiveRecord, TimeHorizon,
};
pub use report::{CqId, CqRow, CqStatus, ReportAssembler};
pub use voi::VoiRow;

use report::ComponentOutputs;

/// Everything one evaluation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub coverage: DatasetCoverage,
    pub sensitivity: SensitivityAnalysis,
    pub voi: Vec<VoiRow>,
    pub objectives: ObjectiveRanking,
    pub consistency: ConsistencyReport,
    pub report: Vec<CqRow>,
}

impl Evaluation {
    pub fn passed(&self) -> usize {
        self.report.iter().filter(|r| r.status.is_pass()).count()
    }
}

/// Evaluate an evidence set.
///
/// This is the main entry point for the engine. It is a pure function of its
/// inputs.
///
/// # Arguments
///
/// * `set` - Cost, incident and objective records
/// * `manifest` - Rule settings from the rule-definitions file
/// * `config` - Numeric policy and comparability thresholds
pub fn evaluate(set: &EvidenceSet, manifest: &RuleManifest, config: &EngineConfig) -> Evaluation {
    let policy = config.numeric_policy;

    // Fan-out: components are independent of one another
    let coverage = coverage::assess(set, &config.comparability);
    let sensitivity = SensitivityAnalysis::run(&set.costs, policy);
    let voi = voi::score_cells(&set.costs, &set.incidents);
    let objectives =
        objectives::rank_objectives(&set.costs, &set.incidents, &set.objectives, policy);
    let consistency = consistency::check(&set.costs, manifest);

    // Fan-in
    let report = ReportAssembler::new().assemble(ComponentOutputs {
        coverage: &coverage,
        sensitivity: &sensitivity,
        voi: &voi,
        objectives: &objectives,
        consistency: &consistency,
    });

    Evaluation {
        coverage,
        sensitivity,
        voi,
        objectives,
        consistency,
        report,
    }
}
