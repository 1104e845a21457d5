//! Candidate scoring for shift assignment.
//!
//! Each open slot is filled by scoring every eligible employee and taking
//! the lowest score. A score is the weighted sum of independent terms
//! ([`ScoringRule`]s), so deployments can reweight or extend the standard
//! mix without touching the engine.
//!
//! # Usage
//!
//! ```
//! use u_roster::dispatching::{rules, ScoreEngine};
//!
//! // The standard mix: workload days, skill fit, preference, hours, rotation.
//! let engine = ScoreEngine::standard();
//! assert_eq!(engine.rule_names(), vec!["DAYS", "SKILL", "PREF", "HOURS", "ROTATION"]);
//!
//! // A custom mix that ignores preferences.
//! let custom = ScoreEngine::new()
//!     .with_rule(rules::WorkloadDays)
//!     .with_weighted_rule(rules::RotationContinuity, 2.0);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::{ScoringContext, Workload};
pub use engine::ScoreEngine;

use crate::models::{Employee, Shift};
use std::fmt::Debug;

/// Score returned by a scoring rule.
///
/// Lower scores = better candidate.
pub type RuleScore = f64;

/// One additive term of a candidate's score.
///
/// # Score Convention
/// **Lower score = better candidate.** Bonuses are negative, penalties
/// positive.
pub trait ScoringRule: Send + Sync + Debug {
    /// Rule name (e.g., "DAYS", "ROTATION").
    fn name(&self) -> &'static str;

    /// Evaluates assigning `employee` to `shift` on `context.date`.
    fn evaluate(&self, employee: &Employee, shift: &Shift, context: &ScoringContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
