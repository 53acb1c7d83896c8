//! Gate result types.

use serde::{Deserialize, Serialize};

/// Result of gate evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    /// Whether every blocking condition passed
    pub passed: bool,

    /// Human-readable summary of result
    pub summary: String,

    pub conditions: Vec<GateCondition>,

    /// Reasons the blocking conditions failed
    pub failure_reasons: Vec<String>,

    /// Findings from advisory conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
}

impl GateResult {
    #[must_use]
    pub fn condition(&self, name: &str) -> Option<&GateCondition> {
        self.conditions.iter().find(|c| c.name == name)
    }

    /// Whether the named condition exists and passed.
    #[must_use]
    pub fn passed(&self, name: &str) -> bool {
        self.condition(name).is_some_and(|c| c.passed)
    }
}

/// Individual condition evaluated by a gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCondition {
    pub name: String,

    /// What the condition checks
    pub description: String,

    pub passed: bool,

    /// Actual value observed
    pub actual: Option<String>,

    /// Expected value for passing
    pub expected: Option<String>,

    /// Advisory conditions are reported but never fail the gate.
    #[serde(default)]
    pub advisory: bool,
}
