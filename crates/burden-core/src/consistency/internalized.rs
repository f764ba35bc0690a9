//! R1: internalized costs are borne by their own decision maker.

use crate::records::{BearingMode, CostRecord};

use super::ConsistencyRule;

/// Flags internalized rows whose stakeholder is someone other than the
/// decision maker. Rows missing either party are not judged.
pub struct InternalizedBearerRule;

impl InternalizedBearerRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InternalizedBearerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsistencyRule for InternalizedBearerRule {
    fn id(&self) -> &'static str {
        "R1"
    }

    fn description(&self) -> &'static str {
        "Internalized costs must be borne by their decision maker"
    }

    fn applies_to(&self, row: &CostRecord) -> bool {
        row.bearing_mode() == Some(BearingMode::Internalized)
    }

    fn is_violated(&self, row: &CostRecord) -> bool {
        match (row.decision_maker(), row.stakeholder()) {
            (Some(decision_maker), Some(stakeholder)) => decision_maker != stakeholder,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bearing: &str, decision_maker: &str, stakeholder: &str) -> CostRecord {
        CostRecord {
            bearing_mode: bearing.to_string(),
            decision_maker: decision_maker.to_string(),
            stakeholder: stakeholder.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_differing_bearer_is_one_violation() {
        let tally = InternalizedBearerRule::new().check(&[row("Internalized", "A", "B")]);
        assert_eq!(tally.violations, 1);
        assert_eq!(tally.checked, 1);
    }

    #[test]
    fn test_missing_party_is_not_a_violation() {
        let rule = InternalizedBearerRule::new();
        assert!(!rule.is_violated(&row("Internalized", "", "B")));
        assert!(!rule.is_violated(&row("Internalized", "A", "  ")));
    }

    #[test]
    fn test_comparison_ignores_padding() {
        assert!(!InternalizedBearerRule::new().is_violated(&row("Internalized", " A", "A ")));
    }

    #[test]
    fn test_other_modes_are_not_checked() {
        let tally = InternalizedBearerRule::new().check(&[
            row("Transferred", "A", "B"),
            row("", "A", "B"),
        ]);
        assert_eq!(tally.checked, 0);
        assert_eq!(tally.violations, 0);
    }
}
