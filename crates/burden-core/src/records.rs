//! Evidence records: cost tuples, incidents and objective weight profiles.
//!
//! Records keep the raw strings read from the datasets so that field
//! completeness is judged on exactly what was supplied. Typed views (cost
//! type, evidence grade, bearing mode, numerics) are parsed on demand and
//! return `None` when the underlying field is missing or unrecognised.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;
use crate::validator::Fields;

/// Declares a closed vocabulary whose textual form is the variant name.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

vocabulary! {
    /// Category of an observed cost.
    CostType, "cost type" {
        MicroarchitecturalPerformanceCost,
        PhysicalResourceCost,
        EngineeringLaborCost,
        VerificationValidationCost,
        ToolchainInfrastructureCost,
        LifecycleOperationsCost,
        ComplianceAssuranceCost,
        MarketContractualCost,
        LiabilityRedressCost,
        ReputationTrustCost,
        OpportunityCost,
    }
}

// Cost types order by their textual form so that (family, cost_type)
// tie-breaks match a plain string comparison of the dataset values.
impl Ord for CostType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for CostType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

vocabulary! {
    /// When a cost is incurred.
    TimeHorizon, "time horizon" {
        Upfront,
        Recurring,
    }
}

vocabulary! {
    /// Evidence grade, in ascending order of uncertainty.
    EvidenceGrade, "evidence grade" {
        E1,
        E2,
        E3,
    }
}

impl EvidenceGrade {
    /// E2 and E3 evidence is treated as uncertain and is stress-tested.
    pub fn is_uncertain(&self) -> bool {
        matches!(self, EvidenceGrade::E2 | EvidenceGrade::E3)
    }
}

vocabulary! {
    /// Who ends up carrying a cost.
    BearingMode, "bearing mode" {
        Internalized,
        Transferred,
        Externalized,
    }
}

impl BearingMode {
    /// True when the cost leaves its originator.
    pub fn shifts_burden(&self) -> bool {
        matches!(self, BearingMode::Transferred | BearingMode::Externalized)
    }
}

/// How malformed or missing numeric fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Substitute `0.0` and keep the row.
    #[default]
    Coerce,
    /// Drop the row from the numeric computation.
    Exclude,
}

impl NumericPolicy {
    /// Read a numeric field under this policy.
    pub fn read(&self, raw: &str) -> Option<f64> {
        match parse_number(raw) {
            Some(value) => Some(value),
            None => match self {
                NumericPolicy::Coerce => {
                    tracing::trace!(raw, "coercing malformed numeric field to 0.0");
                    Some(0.0)
                }
                NumericPolicy::Exclude => {
                    tracing::trace!(raw, "excluding row with malformed numeric field");
                    None
                }
            },
        }
    }
}

/// Parse a finite number, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// One observed cost tuple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRecord {
    pub mechanism_family: String,
    pub mechanism_instance: String,
    pub cost_type: String,
    pub stakeholder: String,
    pub time_horizon: String,
    pub magnitude: String,
    pub unit: String,
    pub evidence_grade: String,
    pub bearing_mode: String,
    pub decision_maker: String,
    pub transfer_target: String,
    pub data_origin: String,
    pub source_key: String,
    pub source_locator: String,

    // Only meaningful on OpportunityCost rows
    pub foregone_alternative: String,
    pub foregone_resource: String,
    pub foregone_benefit: String,
    pub design_constraint: String,
}

impl CostRecord {
    pub fn family(&self) -> Option<&str> {
        non_empty(&self.mechanism_family)
    }

    pub fn instance(&self) -> Option<&str> {
        non_empty(&self.mechanism_instance)
    }

    pub fn stakeholder(&self) -> Option<&str> {
        non_empty(&self.stakeholder)
    }

    pub fn decision_maker(&self) -> Option<&str> {
        non_empty(&self.decision_maker)
    }

    pub fn transfer_target(&self) -> Option<&str> {
        non_empty(&self.transfer_target)
    }

    pub fn cost_type(&self) -> Option<CostType> {
        self.cost_type.parse().ok()
    }

    pub fn time_horizon(&self) -> Option<TimeHorizon> {
        self.time_horizon.parse().ok()
    }

    pub fn evidence_grade(&self) -> Option<EvidenceGrade> {
        self.evidence_grade.parse().ok()
    }

    pub fn bearing_mode(&self) -> Option<BearingMode> {
        self.bearing_mode.parse().ok()
    }

    pub fn magnitude(&self, policy: NumericPolicy) -> Option<f64> {
        policy.read(&self.magnitude)
    }

    /// Whether the magnitude is expressed as a share of runtime.
    pub fn is_percent_runtime(&self) -> bool {
        self.unit.contains("percent_runtime")
    }

    pub fn shifts_burden(&self) -> bool {
        self.bearing_mode().is_some_and(|m| m.shifts_burden())
    }
}

impl Fields for CostRecord {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "mechanism_family" => &self.mechanism_family,
            "mechanism_instance" => &self.mechanism_instance,
            "cost_type" => &self.cost_type,
            "stakeholder" => &self.stakeholder,
            "time_horizon" => &self.time_horizon,
            "magnitude" => &self.magnitude,
            "unit" => &self.unit,
            "evidence_grade" => &self.evidence_grade,
            "bearing_mode" => &self.bearing_mode,
            "decision_maker" => &self.decision_maker,
            "transfer_target" => &self.transfer_target,
            "data_origin" => &self.data_origin,
            "source_key" => &self.source_key,
            "source_locator" => &self.source_locator,
            "foregone_alternative" => &self.foregone_alternative,
            "foregone_resource" => &self.foregone_resource,
            "foregone_benefit" => &self.foregone_benefit,
            "design_constraint" => &self.design_constraint,
            _ => return None,
        };
        Some(value)
    }
}

/// An observed loss event, linked by name to a mechanism family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentRecord {
    pub incident_label: String,
    pub linked_family: String,
    pub residual_risk_bearer: String,
    pub loss_magnitude: String,
    pub loss_unit: String,
    pub attribution_confidence: String,
    pub attribution_evidence_type: String,
    pub linkage_mechanism: String,
    pub counterfactual_effect: String,
    pub evidence_grade: String,
    pub data_origin: String,
    pub source_key: String,
    pub source_locator: String,
}

impl IncidentRecord {
    pub fn linked_family(&self) -> Option<&str> {
        non_empty(&self.linked_family)
    }

    pub fn loss_magnitude(&self, policy: NumericPolicy) -> Option<f64> {
        policy.read(&self.loss_magnitude)
    }
}

impl Fields for IncidentRecord {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "incident_label" => &self.incident_label,
            "linked_family" => &self.linked_family,
            "residual_risk_bearer" => &self.residual_risk_bearer,
            "loss_magnitude" => &self.loss_magnitude,
            "loss_unit" => &self.loss_unit,
            "attribution_confidence" => &self.attribution_confidence,
            "attribution_evidence_type" => &self.attribution_evidence_type,
            "linkage_mechanism" => &self.linkage_mechanism,
            "counterfactual_effect" => &self.counterfactual_effect,
            "evidence_grade" => &self.evidence_grade,
            "data_origin" => &self.data_origin,
            "source_key" => &self.source_key,
            "source_locator" => &self.source_locator,
            _ => return None,
        };
        Some(value)
    }
}

/// A decision objective: a weighting profile compared against a baseline family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveRecord {
    pub objective_id: String,
    pub objective_label: String,
    pub baseline_family: String,
    pub w_perf: String,
    pub w_labor: String,
    pub w_ops: String,
    pub w_compliance: String,
    pub w_opportunity: String,
    pub w_transfer_externalized: String,
    pub w_incident_loss: String,
}

impl ObjectiveRecord {
    pub fn baseline_family(&self) -> Option<&str> {
        non_empty(&self.baseline_family)
    }

    /// The raw weight columns, in declaration order.
    pub fn weight_fields(&self) -> [&str; 7] {
        [
            &self.w_perf,
            &self.w_labor,
            &self.w_ops,
            &self.w_compliance,
            &self.w_opportunity,
            &self.w_transfer_externalized,
            &self.w_incident_loss,
        ]
    }
}

impl Fields for ObjectiveRecord {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "objective_id" => &self.objective_id,
            "objective_label" => &self.objective_label,
            "baseline_family" => &self.baseline_family,
            "w_perf" => &self.w_perf,
            "w_labor" => &self.w_labor,
            "w_ops" => &self.w_ops,
            "w_compliance" => &self.w_compliance,
            "w_opportunity" => &self.w_opportunity,
            "w_transfer_externalized" => &self.w_transfer_externalized,
            "w_incident_loss" => &self.w_incident_loss,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_type_parses_trimmed_names() {
        assert_eq!(
            " OpportunityCost ".parse::<CostType>(),
            Ok(CostType::OpportunityCost)
        );
        assert!("opportunitycost".parse::<CostType>().is_err());
        assert_eq!(CostType::ALL.len(), 11);
    }

    #[test]
    fn test_cost_type_orders_by_name() {
        assert!(CostType::ComplianceAssuranceCost < CostType::EngineeringLaborCost);
        assert!(CostType::OpportunityCost < CostType::PhysicalResourceCost);
    }

    #[test]
    fn test_grade_and_bearing_flags() {
        assert!(!EvidenceGrade::E1.is_uncertain());
        assert!(EvidenceGrade::E3.is_uncertain());
        assert!(!BearingMode::Internalized.shifts_burden());
        assert!(BearingMode::Externalized.shifts_burden());
    }

    #[test]
    fn test_numeric_policy() {
        assert_eq!(NumericPolicy::Coerce.read(" 2.5 "), Some(2.5));
        assert_eq!(NumericPolicy::Coerce.read("n/a"), Some(0.0));
        assert_eq!(NumericPolicy::Coerce.read(""), Some(0.0));
        assert_eq!(NumericPolicy::Exclude.read("n/a"), None);
        assert_eq!(NumericPolicy::Exclude.read("NaN"), None);
    }

    #[test]
    fn test_family_is_trimmed() {
        let row = CostRecord {
            mechanism_family: "  F1 ".to_string(),
            ..Default::default()
        };
        assert_eq!(row.family(), Some("F1"));
        assert_eq!(CostRecord::default().family(), None);
    }

    #[test]
    fn test_field_lookup() {
        let row = IncidentRecord {
            loss_unit: "usd".to_string(),
            ..Default::default()
        };
        assert_eq!(row.field("loss_unit"), Some("usd"));
        assert_eq!(row.field("no_such_column"), None);
    }
}
