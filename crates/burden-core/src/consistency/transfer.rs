//! R2: transferred and externalized costs name a distinct recipient.

use crate::records::CostRecord;

use super::ConsistencyRule;

/// Flags burden-shifting rows with no transfer target, or whose target is
/// the decision maker itself.
pub struct TransferTargetRule;

impl TransferTargetRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransferTargetRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsistencyRule for TransferTargetRule {
    fn id(&self) -> &'static str {
        "R2"
    }

    fn description(&self) -> &'static str {
        "Transferred or externalized costs must name a transfer target distinct from the decision maker"
    }

    fn applies_to(&self, row: &CostRecord) -> bool {
        row.shifts_burden()
    }

    fn is_violated(&self, row: &CostRecord) -> bool {
        match row.transfer_target() {
            None => true,
            Some(target) => row.decision_maker() == Some(target),
        }
    }
}
