//! The rule-definitions file.
//!
//! The file must exist for a run to start. When it is a YAML rule manifest
//! it can relabel or disable built-in rules; any other content (a shapes
//! graph, for instance) is accepted as a marker and the built-in rules run
//! unchanged.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::builtin_rules;

lazy_static! {
    static ref RULE_ID_PATTERN: Regex = Regex::new(r"^R[0-9]+$").unwrap();
}

fn enabled_by_default() -> bool {
    true
}

/// Per-rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Built-in rule identifier (e.g., "R1")
    pub id: String,

    /// Replacement for the built-in description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Rule settings read from the rule-definitions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleManifest {
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl RuleManifest {
    /// Parse and validate a YAML manifest.
    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        let manifest: RuleManifest = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the rule-definitions file.
    ///
    /// A missing file is fatal. Content that is not a YAML manifest falls back
    /// to the built-in rules; a manifest that parses but names unknown or
    /// duplicate rules is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EngineError::RulesFileMissing(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;

        match Self::from_yaml(&contents) {
            Ok(manifest) => {
                tracing::info!(
                    path = %path.display(),
                    entries = manifest.rules.len(),
                    "Loaded rule manifest"
                );
                Ok(manifest)
            }
            Err(EngineError::Yaml(err)) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Rule file is not a YAML manifest; running built-in rules"
                );
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Settings for a rule, if the manifest mentions it.
    pub fn entry(&self, id: &str) -> Option<&RuleEntry> {
        self.rules.iter().find(|e| e.id == id)
    }

    fn validate(&self) -> Result<(), EngineError> {
        let known: HashSet<&str> = builtin_rules().iter().map(|r| r.id()).collect();
        let mut seen = HashSet::new();

        for entry in &self.rules {
            if !RULE_ID_PATTERN.is_match(&entry.id) {
                return Err(EngineError::InvalidRuleManifest(format!(
                    "Malformed rule ID: {}",
                    entry.id
                )));
            }
            if !known.contains(entry.id.as_str()) {
                return Err(EngineError::InvalidRuleManifest(format!(
                    "Unknown rule ID: {}",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(EngineError::InvalidRuleManifest(format!(
                    "Duplicate rule ID: {}",
                    entry.id
                )));
            }
        }

        Ok(())
    }
}
