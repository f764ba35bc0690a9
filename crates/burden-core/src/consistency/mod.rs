//! Consistency checker: declarative rules over bearing-mode semantics.
//!
//! Each rule is an independent predicate over a cost record with its own
//! violation counter. Rules check relationships between fields (who decides,
//! who bears, who receives a transfer), not their presence.
//!
//! | Rule | Applies to | Violated when |
//! |------|------------|---------------|
//! | R1 | Internalized rows | decision maker and stakeholder both given and differ |
//! | R2 | Transferred / Externalized rows | transfer target empty or equal to decision maker |

mod internalized;
mod manifest;
mod transfer;

pub use internalized::InternalizedBearerRule;
pub use manifest::{RuleEntry, RuleManifest};
pub use transfer::TransferTargetRule;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::records::CostRecord;
use crate::table::Table;

/// Name reported in the `validator` column.
pub const VALIDATOR_NAME: &str = "builtin-rules";

/// A consistency rule over cost records.
pub trait ConsistencyRule {
    /// Stable identifier (e.g., "R1").
    fn id(&self) -> &'static str;

    /// Human-readable statement of the invariant.
    fn description(&self) -> &'static str;

    /// Whether the rule has anything to say about this row.
    fn applies_to(&self, row: &CostRecord) -> bool;

    /// Whether an applicable row breaks the invariant.
    fn is_violated(&self, row: &CostRecord) -> bool;

    /// Count applicable rows and violations over a dataset.
    fn check(&self, rows: &[CostRecord]) -> RuleTally {
        rows.iter()
            .filter(|row| self.applies_to(row))
            .fold(RuleTally::default(), |tally, row| RuleTally {
                checked: tally.checked + 1,
                violations: tally.violations + usize::from(self.is_violated(row)),
            })
    }
}

/// Built-in rules, in report order.
pub fn builtin_rules() -> Vec<Box<dyn ConsistencyRule>> {
    vec![
        Box::new(InternalizedBearerRule::new()),
        Box::new(TransferTargetRule::new()),
    ]
}

/// Rows checked and violations found by one rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleTally {
    pub checked: usize,
    pub violations: usize,
}

/// Outcome of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Fail,
    /// Disabled by the rule manifest
    Skipped,
}

/// One row of the consistency report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyRow {
    pub rule_id: String,
    pub description: String,
    pub violations: usize,
    pub checked_rows: usize,
    pub status: RuleStatus,
    pub validator: String,
}

impl Table for ConsistencyRow {
    const HEADERS: &'static [&'static str] = &[
        "rule_id",
        "description",
        "violations",
        "checked_rows",
        "status",
        "validator",
    ];
}

/// Results of every rule plus the instance/stakeholder diagnostic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyReport {
    pub rows: Vec<ConsistencyRow>,

    /// Distinct (mechanism instance, stakeholder) pairs seen in the data.
    /// Diagnostic only; never gates a status.
    pub instance_stakeholder_pairs: usize,
}

impl ConsistencyReport {
    /// True when at least one rule ran and none failed.
    pub fn all_pass(&self) -> bool {
        let evaluated = self
            .rows
            .iter()
            .filter(|r| r.status != RuleStatus::Skipped)
            .count();
        evaluated > 0 && self.rows.iter().all(|r| r.status != RuleStatus::Fail)
    }

    pub fn total_violations(&self) -> usize {
        self.rows.iter().map(|r| r.violations).sum()
    }
}

/// Run the built-in rules as configured by the manifest.
pub fn check(costs: &[CostRecord], manifest: &RuleManifest) -> ConsistencyReport {
    let rows = builtin_rules()
        .iter()
        .map(|rule| {
            let entry = manifest.entry(rule.id());
            let description = entry
                .and_then(|e| e.description.clone())
                .unwrap_or_else(|| rule.description().to_string());

            let (tally, status) = if entry.is_some_and(|e| !e.enabled) {
                (RuleTally::default(), RuleStatus::Skipped)
            } else {
                let tally = rule.check(costs);
                let status = if tally.violations == 0 {
                    RuleStatus::Pass
                } else {
                    RuleStatus::Fail
                };
                (tally, status)
            };

            tracing::debug!(
                rule = rule.id(),
                checked = tally.checked,
                violations = tally.violations,
                ?status,
                "Evaluated consistency rule"
            );

            ConsistencyRow {
                rule_id: rule.id().to_string(),
                description,
                violations: tally.violations,
                checked_rows: tally.checked,
                status,
                validator: VALIDATOR_NAME.to_string(),
            }
        })
        .collect();

    ConsistencyReport {
        rows,
        instance_stakeholder_pairs: instance_stakeholder_pairs(costs),
    }
}

/// Count distinct (mechanism instance, stakeholder) pairs.
pub fn instance_stakeholder_pairs(costs: &[CostRecord]) -> usize {
    costs
        .iter()
        .filter_map(|r| Some((r.instance()?, r.stakeholder()?)))
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bearing: &str, decision_maker: &str, stakeholder: &str, target: &str) -> CostRecord {
        CostRecord {
            mechanism_instance: "inst".to_string(),
            bearing_mode: bearing.to_string(),
            decision_maker: decision_maker.to_string(),
            stakeholder: stakeholder.to_string(),
            transfer_target: target.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_rows_pass() {
        let costs = vec![
            row("Internalized", "A", "A", ""),
            row("Transferred", "A", "B", "B"),
        ];
        let report = check(&costs, &RuleManifest::default());
        assert!(report.all_pass());
        assert_eq!(report.total_violations(), 0);
        assert_eq!(report.rows.len(), 2);
        assert!(report.rows.iter().all(|r| r.validator == VALIDATOR_NAME));
    }

    #[test]
    fn test_each_violation_counts_once() {
        let costs = vec![
            row("Internalized", "A", "B", ""),
            row("Transferred", "A", "A", ""),
        ];
        let report = check(&costs, &RuleManifest::default());
        assert_eq!(report.rows[0].rule_id, "R1");
        assert_eq!(report.rows[0].violations, 1);
        assert_eq!(report.rows[0].checked_rows, 1);
        assert_eq!(report.rows[0].status, RuleStatus::Fail);
        assert_eq!(report.rows[1].rule_id, "R2");
        assert_eq!(report.rows[1].violations, 1);
        assert!(!report.all_pass());
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let manifest = RuleManifest::from_yaml(
            r#"
rules:
  - id: R1
    enabled: false
"#,
        )
        .unwrap();
        let costs = vec![row("Internalized", "A", "B", "")];
        let report = check(&costs, &manifest);
        assert_eq!(report.rows[0].status, RuleStatus::Skipped);
        assert_eq!(report.rows[0].violations, 0);
        assert!(report.all_pass());
    }

    #[test]
    fn test_all_rules_skipped_does_not_pass() {
        let manifest = RuleManifest::from_yaml(
            r#"
rules:
  - id: R1
    enabled: false
  - id: R2
    enabled: false
"#,
        )
        .unwrap();
        assert!(!check(&[], &manifest).all_pass());
    }

    #[test]
    fn test_manifest_description_overrides_builtin() {
        let manifest = RuleManifest::from_yaml(
            r#"
rules:
  - id: R2
    description: "Transfers name a distinct recipient"
"#,
        )
        .unwrap();
        let report = check(&[], &manifest);
        assert_eq!(report.rows[1].description, "Transfers name a distinct recipient");
        assert_eq!(
            report.rows[0].description,
            InternalizedBearerRule::new().description()
        );
    }

    #[test]
    fn test_instance_stakeholder_pairs() {
        let mut costs = vec![
            row("Internalized", "A", "A", ""),
            row("Internalized", "A", "A", ""),
            row("Internalized", "A", "B", ""),
            row("Internalized", "A", "", ""),
        ];
        costs[2].mechanism_instance = "other".to_string();
        assert_eq!(instance_stakeholder_pairs(&costs), 2);
    }
}
