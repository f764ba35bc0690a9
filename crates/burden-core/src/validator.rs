//! Record validator: structural completeness of records.
//!
//! A record is complete for a required-field list when every named field is
//! present and non-empty after trimming. This module only checks presence;
//! semantic relationships between fields belong to [`crate::consistency`].

use std::fmt;

use serde::Serialize;

/// Fields required on every cost row.
pub const COST_REQUIRED_FIELDS: &[&str] = &[
    "stakeholder",
    "time_horizon",
    "magnitude",
    "unit",
    "evidence_grade",
    "data_origin",
    "source_key",
    "source_locator",
];

/// Fields required on every incident row.
pub const INCIDENT_REQUIRED_FIELDS: &[&str] = &[
    "incident_label",
    "linked_family",
    "loss_magnitude",
    "loss_unit",
    "attribution_confidence",
    "evidence_grade",
    "data_origin",
    "source_key",
    "source_locator",
];

/// Additional fields required on OpportunityCost rows.
pub const OPPORTUNITY_REQUIRED_FIELDS: &[&str] = &[
    "foregone_alternative",
    "foregone_resource",
    "foregone_benefit",
    "design_constraint",
];

/// Named-field access over a record.
pub trait Fields {
    /// The raw value of a column, or `None` if the record has no such column.
    fn field(&self, name: &str) -> Option<&str>;
}

/// True iff every required field is present and non-blank.
pub fn is_complete<R: Fields + ?Sized>(record: &R, required: &[&str]) -> bool {
    required
        .iter()
        .all(|name| record.field(name).is_some_and(|v| !v.trim().is_empty()))
}

/// An ok/total count of records passing a completeness check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub ok: usize,
    pub total: usize,
}

impl Coverage {
    /// Count how many `records` are complete for `required`.
    pub fn of<'a, R, I>(records: I, required: &[&str]) -> Self
    where
        R: Fields + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        records.into_iter().fold(Self::default(), |acc, record| Self {
            ok: acc.ok + usize::from(is_complete(record, required)),
            total: acc.total + 1,
        })
    }

    /// Full coverage over a non-empty set.
    pub fn is_full(&self) -> bool {
        self.total > 0 && self.ok == self.total
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ok, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CostRecord;

    fn complete_cost_row() -> CostRecord {
        CostRecord {
            stakeholder: "Vendor".to_string(),
            time_horizon: "Upfront".to_string(),
            magnitude: "3".to_string(),
            unit: "percent_runtime".to_string(),
            evidence_grade: "E1".to_string(),
            data_origin: "measured".to_string(),
            source_key: "smith2021".to_string(),
            source_locator: "table 2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_row_passes() {
        assert!(is_complete(&complete_cost_row(), COST_REQUIRED_FIELDS));
    }

    #[test]
    fn test_whitespace_only_field_fails() {
        let mut row = complete_cost_row();
        row.source_locator = "   ".to_string();
        assert!(!is_complete(&row, COST_REQUIRED_FIELDS));
    }

    #[test]
    fn test_unknown_field_name_fails() {
        assert!(!is_complete(&complete_cost_row(), &["not_a_column"]));
    }

    #[test]
    fn test_empty_requirement_list_is_vacuous() {
        assert!(is_complete(&CostRecord::default(), &[]));
    }

    #[test]
    fn test_coverage_counts() {
        let rows = vec![complete_cost_row(), CostRecord::default()];
        let coverage = Coverage::of(&rows, COST_REQUIRED_FIELDS);
        assert_eq!(coverage, Coverage { ok: 1, total: 2 });
        assert_eq!(coverage.to_string(), "1/2");
        assert!(!coverage.is_full());
        assert!(!Coverage::default().is_full());
    }
}
