//! Employee model.
//!
//! Employees are the people the roster assigns to shifts. Each employee
//! carries a skill set, a weekly-hours target, an optional fixed rest
//! weekday, preferred shifts, and explicit unavailable dates.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A person that can be assigned to shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Skills held by this employee (e.g., "bar", "cashier").
    #[serde(default)]
    pub skills: BTreeSet<String>,
    /// Target working hours per week (used by KPI reporting only).
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: f64,
    /// Fixed weekly rest day. `None` = no fixed rest day, no rotation.
    #[serde(default)]
    pub rest_day: Option<Weekday>,
    /// Shift IDs this employee prefers.
    #[serde(default)]
    pub preferred_shifts: BTreeSet<String>,
    /// Dates on which this employee cannot work.
    #[serde(default)]
    pub unavailable_dates: BTreeSet<NaiveDate>,
}

fn default_weekly_hours() -> f64 {
    40.0
}

impl Employee {
    /// Creates an employee with no skills, rest day, or preferences.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: BTreeSet::new(),
            weekly_hours: default_weekly_hours(),
            rest_day: None,
            preferred_shifts: BTreeSet::new(),
            unavailable_dates: BTreeSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    /// Sets the weekly-hours target.
    pub fn with_weekly_hours(mut self, hours: f64) -> Self {
        self.weekly_hours = hours;
        self
    }

    /// Sets the fixed rest weekday.
    pub fn with_rest_day(mut self, weekday: Weekday) -> Self {
        self.rest_day = Some(weekday);
        self
    }

    /// Adds a preferred shift.
    pub fn with_preferred_shift(mut self, shift_id: impl Into<String>) -> Self {
        self.preferred_shifts.insert(shift_id.into());
        self
    }

    /// Marks a date as unavailable.
    pub fn with_unavailable_date(mut self, date: NaiveDate) -> Self {
        self.unavailable_dates.insert(date);
        self
    }

    /// Name for display, falling back to the ID when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Whether this employee holds a given skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// Whether any of the given skills is held by this employee.
    pub fn has_any_skill<'a, I>(&self, skills: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        skills.into_iter().any(|s| self.skills.contains(s))
    }

    /// Whether `date` falls on this employee's fixed rest weekday.
    pub fn is_rest_day(&self, date: NaiveDate) -> bool {
        self.rest_day == Some(date.weekday())
    }

    /// Whether `date` is explicitly marked unavailable.
    pub fn is_unavailable_on(&self, date: NaiveDate) -> bool {
        self.unavailable_dates.contains(&date)
    }

    /// Whether this employee prefers the given shift.
    pub fn prefers(&self, shift_id: &str) -> bool {
        self.preferred_shifts.contains(shift_id)
    }
}
