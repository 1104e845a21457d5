//! Shift model.
//!
//! A shift is a recurring daily slot (e.g., "Bar - early") that needs a
//! number of employees, optionally with specific skills. Each shift carries
//! an explicit [`ShiftCategory`] which drives rotation continuity.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rotation classification of a shift.
///
/// Which two categories are mutually opposite is configured by
/// [`RotationPair`](super::RotationPair); every other category is
/// non-rotating.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Morning-type shift.
    Early,
    /// Evening-type shift.
    Late,
    /// Mid-day shift.
    Middle,
    /// Anything else (fixed posts, special duties).
    #[default]
    Other,
}

/// A daily shift that employees are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Start time of day.
    pub start_time: NaiveTime,
    /// End time of day (may be before `start_time` for overnight shifts).
    pub end_time: NaiveTime,
    /// Paid duration in hours.
    pub duration_hours: f64,
    /// Skills of which an employee needs at least one. Empty = no restriction.
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// Base headcount required per day.
    #[serde(default = "default_required_staff")]
    pub required_staff: u32,
    /// Rotation category.
    #[serde(default)]
    pub category: ShiftCategory,
}

fn default_required_staff() -> u32 {
    1
}

impl Shift {
    /// Creates a shift between two times of day.
    ///
    /// The duration is derived from the times (wrapping past midnight) and
    /// can be overridden with [`with_duration_hours`](Self::with_duration_hours).
    pub fn new(id: impl Into<String>, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let mut seconds = (end_time - start_time).num_seconds();
        if seconds <= 0 {
            seconds += 24 * 3600;
        }
        Self {
            id: id.into(),
            name: String::new(),
            start_time,
            end_time,
            duration_hours: seconds as f64 / 3600.0,
            required_skills: BTreeSet::new(),
            required_staff: default_required_staff(),
            category: ShiftCategory::Other,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the paid duration.
    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Adds a required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.insert(skill.into());
        self
    }

    /// Sets the base headcount.
    pub fn with_required_staff(mut self, staff: u32) -> Self {
        self.required_staff = staff;
        self
    }

    /// Sets the rotation category.
    pub fn with_category(mut self, category: ShiftCategory) -> Self {
        self.category = category;
        self
    }

    /// Whether the shift restricts who may work it.
    #[inline]
    pub fn requires_skills(&self) -> bool {
        !self.required_skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_shift_builder() {
        let s = Shift::new("S1", t(7, 0), t(15, 0))
            .with_name("Bar early")
            .with_required_skill("bar")
            .with_required_staff(2)
            .with_category(ShiftCategory::Early);

        assert_eq!(s.id, "S1");
        assert_eq!(s.name, "Bar early");
        assert!((s.duration_hours - 8.0).abs() < 1e-10);
        assert!(s.requires_skills());
        assert_eq!(s.required_staff, 2);
        assert_eq!(s.category, ShiftCategory::Early);
    }

    #[test]
    fn test_overnight_duration() {
        let s = Shift::new("N", t(22, 0), t(6, 0));
        assert!((s.duration_hours - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_duration_override() {
        let s = Shift::new("S1", t(9, 0), t(18, 0)).with_duration_hours(8.0);
        assert!((s.duration_hours - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_default_category_is_other() {
        let s = Shift::new("S1", t(9, 0), t(17, 0));
        assert_eq!(s.category, ShiftCategory::Other);
        assert!(!s.requires_skills());
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&ShiftCategory::Late).unwrap();
        assert_eq!(json, "\"late\"");
        let back: ShiftCategory = serde_json::from_str("\"early\"").unwrap();
        assert_eq!(back, ShiftCategory::Early);
    }
}
