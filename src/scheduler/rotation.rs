//! Rotation tracking.
//!
//! Each employee works runs of same-category shifts between occurrences of
//! their fixed rest weekday, and flips to the opposite rotating category
//! right after a rest day has passed. The tracker keeps, per employee, the
//! category of the current run and the last date worked.
//!
//! State is ephemeral: it is rebuilt from scratch on every generation run
//! and only changes as a side effect of a committed assignment.
//!
//! # Update rule
//! On an assignment of a shift with category `c` on date `d`:
//! - fixed-role employee: only `last_worked` is updated;
//! - rest day passed and current category rotating: `current = c`;
//! - otherwise: `current` is initialized to `c` if unset.
//!
//! `last_worked = d` in every case.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{weekday_between, Employee, RotationPair, ShiftCategory};

/// Rotation state of one employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationState {
    /// Category of the current run.
    pub current: Option<ShiftCategory>,
    /// Last date the employee worked.
    pub last_worked: Option<NaiveDate>,
}

/// Per-employee rotation state for one generation run.
#[derive(Debug, Clone, Default)]
pub struct RotationTracker {
    pair: RotationPair,
    states: HashMap<String, RotationState>,
}

impl RotationTracker {
    /// Creates an empty tracker for the given rotation pair.
    pub fn new(pair: RotationPair) -> Self {
        Self {
            pair,
            states: HashMap::new(),
        }
    }

    /// The configured rotation pair.
    pub fn pair(&self) -> RotationPair {
        self.pair
    }

    /// State of an employee (default if never assigned).
    pub fn state(&self, employee_id: &str) -> RotationState {
        self.states.get(employee_id).copied().unwrap_or_default()
    }

    /// Current run category of an employee.
    pub fn current_category(&self, employee_id: &str) -> Option<ShiftCategory> {
        self.state(employee_id).current
    }

    /// The current category, if it takes part in rotation.
    pub fn rotating_category(&self, employee_id: &str) -> Option<ShiftCategory> {
        self.current_category(employee_id)
            .filter(|c| self.pair.is_rotating(*c))
    }

    /// Whether the employee's fixed rest weekday falls strictly after their
    /// last worked date and on or before `date`.
    ///
    /// Always `false` for employees who have not worked yet or have no
    /// fixed rest weekday.
    pub fn just_rested(&self, employee: &Employee, date: NaiveDate) -> bool {
        let Some(rest_day) = employee.rest_day else {
            return false;
        };
        match self.state(&employee.id).last_worked {
            Some(last) => weekday_between(last, date, rest_day),
            None => false,
        }
    }

    /// The category the employee should move to after a passed rest day.
    ///
    /// `Some` only if the employee just rested and is in a rotating run.
    pub fn post_rest_category(&self, employee: &Employee, date: NaiveDate) -> Option<ShiftCategory> {
        if !self.just_rested(employee, date) {
            return None;
        }
        self.rotating_category(&employee.id)
            .map(|c| self.pair.opposite(c))
    }

    /// Records a committed assignment.
    pub fn record(
        &mut self,
        employee: &Employee,
        category: ShiftCategory,
        date: NaiveDate,
        fixed_role: bool,
    ) {
        let rotate = !fixed_role
            && self.just_rested(employee, date)
            && self.rotating_category(&employee.id).is_some();

        let state = self.states.entry(employee.id.clone()).or_default();
        if !fixed_role && (rotate || state.current.is_none()) {
            state.current = Some(category);
        }
        state.last_worked = Some(date);
    }
}
