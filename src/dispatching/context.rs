//! Scoring context for candidate evaluation.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Employee, SpecialRules};
use crate::scheduler::RotationTracker;

/// Days and hours an employee has been given so far in the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Workload {
    /// Number of assigned days.
    pub days: u32,
    /// Sum of assigned shift durations (hours).
    pub hours: f64,
}

impl Workload {
    /// Adds one worked day of `hours`.
    pub fn add_shift(&mut self, hours: f64) {
        self.days += 1;
        self.hours += hours;
    }
}

/// Run state passed to scoring rules.
///
/// Borrowed from the engine for the duration of one candidate selection;
/// rules never mutate it.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// Date being staffed.
    pub date: NaiveDate,
    /// Workload per employee ID.
    pub workload: &'a HashMap<String, Workload>,
    /// Rotation state per employee.
    pub rotation: &'a RotationTracker,
    /// Special rules (fixed-role membership).
    pub special_rules: &'a SpecialRules,
}

impl<'a> ScoringContext<'a> {
    /// Creates a context for `date`.
    pub fn new(
        date: NaiveDate,
        workload: &'a HashMap<String, Workload>,
        rotation: &'a RotationTracker,
        special_rules: &'a SpecialRules,
    ) -> Self {
        Self {
            date,
            workload,
            rotation,
            special_rules,
        }
    }

    /// Workload of an employee (zero if not tracked).
    pub fn workload_of(&self, employee_id: &str) -> Workload {
        self.workload.get(employee_id).copied().unwrap_or_default()
    }

    /// Whether the employee is exempt from rotation scoring.
    pub fn is_fixed_role(&self, employee: &Employee) -> bool {
        self.special_rules.is_fixed_role(&employee.id)
    }
}
