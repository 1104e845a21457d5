//! Built-in scoring terms.
//!
//! # Categories
//!
//! - **Workload balance**: DAYS, HOURS
//! - **Fit**: SKILL, PREF
//! - **Continuity**: ROTATION
//!
//! # Score Convention
//! All rules return lower scores for better candidates. With unit weights
//! the standard mix reproduces the reference cost:
//!
//! `10·days − 10 (skill match) / +50 (no match) − 5 (preferred) + 0.1·hours
//! − 5 (post-rest flip) / − 3 (same run)`

use super::{RuleScore, ScoringContext, ScoringRule};
use crate::models::{Employee, Shift};

// ======================== Workload balance ========================

/// Days already worked in this run, ×10.
///
/// Spreads working days evenly across the team.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadDays;

impl ScoringRule for WorkloadDays {
    fn name(&self) -> &'static str {
        "DAYS"
    }

    fn evaluate(&self, employee: &Employee, _shift: &Shift, context: &ScoringContext) -> RuleScore {
        context.workload_of(&employee.id).days as f64 * 10.0
    }

    fn description(&self) -> &'static str {
        "Days worked balance"
    }
}

/// Hours already worked in this run, ×0.1.
///
/// Secondary balance term; separates employees with equal day counts but
/// different shift lengths.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadHours;

impl ScoringRule for WorkloadHours {
    fn name(&self) -> &'static str {
        "HOURS"
    }

    fn evaluate(&self, employee: &Employee, _shift: &Shift, context: &ScoringContext) -> RuleScore {
        context.workload_of(&employee.id).hours * 0.1
    }

    fn description(&self) -> &'static str {
        "Hours worked balance"
    }
}

// ======================== Fit ========================

/// −10 if the employee holds one of the shift's required skills, +50 if
/// not. Zero for shifts without skill requirements.
#[derive(Debug, Clone, Copy)]
pub struct SkillFit;

impl ScoringRule for SkillFit {
    fn name(&self) -> &'static str {
        "SKILL"
    }

    fn evaluate(&self, employee: &Employee, shift: &Shift, _context: &ScoringContext) -> RuleScore {
        if !shift.requires_skills() {
            0.0
        } else if employee.has_any_skill(&shift.required_skills) {
            -10.0
        } else {
            50.0
        }
    }

    fn description(&self) -> &'static str {
        "Skill fit"
    }
}

/// −5 if the shift is one of the employee's preferred shifts.
#[derive(Debug, Clone, Copy)]
pub struct Preference;

impl ScoringRule for Preference {
    fn name(&self) -> &'static str {
        "PREF"
    }

    fn evaluate(&self, employee: &Employee, shift: &Shift, _context: &ScoringContext) -> RuleScore {
        if employee.prefers(&shift.id) {
            -5.0
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Preferred shift"
    }
}

// ======================== Continuity ========================

/// Rotation continuity.
///
/// - Just past a rest day in a rotating run: −5 for the opposite category,
///   0 otherwise.
/// - Otherwise: −3 for the current run's category.
///
/// Fixed-role employees always score 0.
#[derive(Debug, Clone, Copy)]
pub struct RotationContinuity;

impl ScoringRule for RotationContinuity {
    fn name(&self) -> &'static str {
        "ROTATION"
    }

    fn evaluate(&self, employee: &Employee, shift: &Shift, context: &ScoringContext) -> RuleScore {
        if context.is_fixed_role(employee) {
            return 0.0;
        }
        let rotation = context.rotation;
        if let Some(target) = rotation.post_rest_category(employee, context.date) {
            return if shift.category == target { -5.0 } else { 0.0 };
        }
        match rotation.current_category(&employee.id) {
            Some(current) if current == shift.category => -3.0,
            _ => 0.0,
        }
    }

    fn description(&self) -> &'static str {
        "Rotation continuity"
    }
}
