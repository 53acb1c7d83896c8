//! Gate policy and evaluation.

use crate::lexical::find_leaks;
use crate::types::{GateCondition, GateResult};

pub const AI_CHECK: &str = "ai_check";
pub const PLAGIARISM_CHECK: &str = "plagiarism_check";
pub const LEXICAL_LEAK_CHECK: &str = "lexical_leak_check";

/// Thresholds for the blocking gates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    pub min_originality_score: f64,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            min_originality_score: 70.0,
        }
    }
}

/// What the gates look at for one run.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    /// The readiness signal of the stage that produced the final text.
    pub ready_signal: bool,
    pub originality_score: f64,
    /// Labelled texts scanned by the advisory leak check.
    pub texts: &'a [(&'a str, &'a str)],
    pub forbidden_terms: &'a [String],
}

impl GatePolicy {
    #[must_use]
    pub fn new(min_originality_score: f64) -> Self {
        Self {
            min_originality_score,
        }
    }

    #[must_use]
    pub fn evaluate(&self, input: &GateInput<'_>) -> GateResult {
        let mut conditions = Vec::with_capacity(3);
        let mut failure_reasons = Vec::new();
        let mut advisories = Vec::new();

        conditions.push(GateCondition {
            name: AI_CHECK.to_string(),
            description: "Final text was declared free of machine-sounding patterns".to_string(),
            passed: input.ready_signal,
            actual: Some(input.ready_signal.to_string()),
            expected: Some("true".to_string()),
            advisory: false,
        });
        if !input.ready_signal {
            failure_reasons.push("final text was not declared ready to publish".to_string());
        }

        let original_enough = input.originality_score >= self.min_originality_score;
        conditions.push(GateCondition {
            name: PLAGIARISM_CHECK.to_string(),
            description: "Originality versus the source post meets the threshold".to_string(),
            passed: original_enough,
            actual: Some(input.originality_score.to_string()),
            expected: Some(format!(">= {}", self.min_originality_score)),
            advisory: false,
        });
        if !original_enough {
            failure_reasons.push(format!(
                "originality {} is below {}",
                input.originality_score, self.min_originality_score
            ));
        }

        let mut leaked: Vec<String> = Vec::new();
        for (label, text) in input.texts {
            let hits = find_leaks(text, input.forbidden_terms);
            if !hits.is_empty() {
                advisories.push(format!("{label} mentions {}", hits.join(", ")));
                leaked.extend(hits);
            }
        }
        leaked.sort();
        leaked.dedup();
        conditions.push(GateCondition {
            name: LEXICAL_LEAK_CHECK.to_string(),
            description: "No source-specific names appear in the output".to_string(),
            passed: leaked.is_empty(),
            actual: Some(if leaked.is_empty() {
                "none".to_string()
            } else {
                leaked.join(", ")
            }),
            expected: Some("none".to_string()),
            advisory: true,
        });

        let passed = failure_reasons.is_empty();
        let summary = match (passed, advisories.is_empty()) {
            (true, true) => "All gates passed".to_string(),
            (true, false) => format!("Gates passed with {} advisory finding(s)", advisories.len()),
            (false, _) => format!("{} gate(s) failed", failure_reasons.len()),
        };

        GateResult {
            passed,
            summary,
            conditions,
            failure_reasons,
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        ready: bool,
        originality: f64,
        texts: &'a [(&'a str, &'a str)],
        terms: &'a [String],
    ) -> GateInput<'a> {
        GateInput {
            ready_signal: ready,
            originality_score: originality,
            texts,
            forbidden_terms: terms,
        }
    }

    #[test]
    fn originality_threshold_is_inclusive() {
        let policy = GatePolicy::default();
        let at = policy.evaluate(&input(true, 70.0, &[], &[]));
        assert!(at.passed(PLAGIARISM_CHECK));
        let below = policy.evaluate(&input(true, 69.9, &[], &[]));
        assert!(!below.passed(PLAGIARISM_CHECK));
        assert!(!below.passed);
        assert_eq!(below.failure_reasons.len(), 1);
    }

    #[test]
    fn ai_check_follows_ready_signal() {
        let result = GatePolicy::default().evaluate(&input(false, 95.0, &[], &[]));
        assert!(!result.passed(AI_CHECK));
        assert!(result.passed(PLAGIARISM_CHECK));
        assert_eq!(result.summary, "1 gate(s) failed");
    }

    #[test]
    fn leaks_are_advisory_only() {
        let terms = vec!["Acme".to_string()];
        let texts = [("final_post", "Acme taught me this."), ("universal_theme", "Resilience")];
        let result = GatePolicy::default().evaluate(&input(true, 80.0, &texts, &terms));
        assert!(result.passed);
        assert!(!result.passed(LEXICAL_LEAK_CHECK));
        assert!(result.condition(LEXICAL_LEAK_CHECK).unwrap().advisory);
        assert_eq!(result.advisories, vec!["final_post mentions Acme"]);
        assert_eq!(result.summary, "Gates passed with 1 advisory finding(s)");
    }

    #[test]
    fn serialized_result_omits_empty_advisories() {
        let result = GatePolicy::default().evaluate(&input(true, 80.0, &[], &[]));
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("advisories").is_none());
        assert_eq!(value["conditions"].as_array().unwrap().len(), 3);
    }
}
