//! Score engine for candidate selection.
//!
//! Combines scoring rules into one weighted sum and picks the lowest-scoring
//! candidate for a slot.

use std::sync::Arc;

use super::{rules, RuleScore, ScoringContext, ScoringRule};
use crate::models::{Employee, Shift};

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn ScoringRule>,
    weight: f64,
}

/// A composable candidate scorer.
///
/// Scores are summed in insertion order, so the standard mix is
/// bit-for-bit reproducible across runs.
///
/// # Example
/// ```
/// use u_roster::dispatching::{rules, ScoreEngine};
///
/// let engine = ScoreEngine::new()
///     .with_rule(rules::WorkloadDays)
///     .with_rule(rules::SkillFit);
/// assert_eq!(engine.rule_names(), vec!["DAYS", "SKILL"]);
/// ```
#[derive(Clone)]
pub struct ScoreEngine {
    rules: Vec<WeightedRule>,
}

impl ScoreEngine {
    /// Creates an empty engine (every candidate scores 0).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard roster mix, all weights 1.0.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(rules::WorkloadDays)
            .with_rule(rules::SkillFit)
            .with_rule(rules::Preference)
            .with_rule(rules::WorkloadHours)
            .with_rule(rules::RotationContinuity)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: ScoringRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: ScoringRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    /// Total score of assigning `employee` to `shift`.
    pub fn score(&self, employee: &Employee, shift: &Shift, context: &ScoringContext) -> RuleScore {
        self.rules.iter().fold(0.0, |acc, wr| {
            acc + wr.rule.evaluate(employee, shift, context) * wr.weight
        })
    }

    /// Weighted score of each rule, in evaluation order.
    pub fn breakdown(
        &self,
        employee: &Employee,
        shift: &Shift,
        context: &ScoringContext,
    ) -> Vec<(&'static str, RuleScore)> {
        self.rules
            .iter()
            .map(|wr| {
                (
                    wr.rule.name(),
                    wr.rule.evaluate(employee, shift, context) * wr.weight,
                )
            })
            .collect()
    }

    /// Lowest-scoring candidate. Ties go to the earliest candidate.
    pub fn select_best<'e, I>(
        &self,
        candidates: I,
        shift: &Shift,
        context: &ScoringContext,
    ) -> Option<&'e Employee>
    where
        I: IntoIterator<Item = &'e Employee>,
    {
        let mut best: Option<(&'e Employee, f64)> = None;
        for employee in candidates {
            let score = self.score(employee, shift, context);
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((employee, score)),
            }
        }
        best.map(|(employee, _)| employee)
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ScoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
