//! Dataset coverage: completeness counts and the comparability rule.
//!
//! These are the presence-based measurements behind CQ1 through CQ4 and CQ7.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::ComparabilityThresholds;
use crate::dataset::EvidenceSet;
use crate::records::{BearingMode, CostRecord, CostType, TimeHorizon};
use crate::validator::{
    Coverage, COST_REQUIRED_FIELDS, INCIDENT_REQUIRED_FIELDS, OPPORTUNITY_REQUIRED_FIELDS,
};

/// How many families meet the comparability rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Comparability {
    pub comparable: usize,
    pub families: usize,
    pub thresholds: ComparabilityThresholds,
}

impl Comparability {
    pub fn is_full(&self) -> bool {
        self.families > 0 && self.comparable == self.families
    }
}

/// Completeness measurements over all three datasets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetCoverage {
    /// Cost rows carrying bearer, horizon, magnitude, unit, grade and provenance
    pub cost_fields: Coverage,

    /// Cost rows carrying a bearing mode
    pub bearing_modes: Coverage,

    /// Cost rows whose bearing mode is Externalized
    pub externalized: usize,

    pub comparability: Comparability,

    /// Incident rows carrying label, linkage, loss, confidence and provenance
    pub incident_fields: Coverage,

    /// OpportunityCost rows carrying the foregone-alternative fields
    pub opportunity_fields: Coverage,
}

/// Measure completeness of an evidence set.
pub fn assess(set: &EvidenceSet, thresholds: &ComparabilityThresholds) -> DatasetCoverage {
    let opportunity_rows = set
        .costs
        .iter()
        .filter(|r| r.cost_type() == Some(CostType::OpportunityCost));

    let coverage = DatasetCoverage {
        cost_fields: Coverage::of(&set.costs, COST_REQUIRED_FIELDS),
        bearing_modes: Coverage::of(&set.costs, &["bearing_mode"]),
        externalized: set
            .costs
            .iter()
            .filter(|r| r.bearing_mode() == Some(BearingMode::Externalized))
            .count(),
        comparability: comparability(&set.costs, thresholds),
        incident_fields: Coverage::of(&set.incidents, INCIDENT_REQUIRED_FIELDS),
        opportunity_fields: Coverage::of(opportunity_rows, OPPORTUNITY_REQUIRED_FIELDS),
    };

    tracing::debug!(?coverage, "Assessed dataset coverage");
    coverage
}

#[derive(Default)]
struct FamilyProfile<'a> {
    cost_types: BTreeSet<&'a str>,
    stakeholders: BTreeSet<&'a str>,
    upfront: bool,
    recurring: bool,
}

/// A family is comparable when its costs span enough cost types and
/// stakeholders and are observed both upfront and recurring.
pub fn comparability(costs: &[CostRecord], thresholds: &ComparabilityThresholds) -> Comparability {
    let mut profiles: BTreeMap<&str, FamilyProfile> = BTreeMap::new();

    for row in costs {
        let Some(family) = row.family() else {
            continue;
        };
        let profile = profiles.entry(family).or_default();

        let cost_type = row.cost_type.trim();
        if !cost_type.is_empty() {
            profile.cost_types.insert(cost_type);
        }
        if let Some(stakeholder) = row.stakeholder() {
            profile.stakeholders.insert(stakeholder);
        }
        match row.time_horizon() {
            Some(TimeHorizon::Upfront) => profile.upfront = true,
            Some(TimeHorizon::Recurring) => profile.recurring = true,
            None => {}
        }
    }

    let comparable = profiles
        .values()
        .filter(|p| {
            p.cost_types.len() >= thresholds.min_cost_types
                && p.stakeholders.len() >= thresholds.min_stakeholders
                && p.upfront
                && p.recurring
        })
        .count();

    Comparability {
        comparable,
        families: profiles.len(),
        thresholds: *thresholds,
    }
}
