//! Rule configuration.
//!
//! Holds the advisory working-time limits (audited after generation, never
//! enforced during it) and the special rules that shape generation:
//! fixed-role employees, a per-weekday shift exclusion, dynamic staffing
//! links between shifts, and shifts allowed to stay empty.
//!
//! All identifiers are data. Nothing in the engine refers to a particular
//! shift or employee by name.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::ShiftCategory;

/// Rostering rules for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum rest between two shifts (hours). Advisory.
    pub min_rest_hours: u32,
    /// Maximum consecutive working days. Advisory, checked by the audit.
    pub max_consecutive_days: u32,
    /// Minimum hours per full week. Advisory, checked by the audit.
    pub min_weekly_hours: f64,
    /// Maximum hours per full week. Advisory, checked by the audit.
    pub max_weekly_hours: f64,
    /// The pair of mutually opposite rotating categories.
    pub rotation: RotationPair,
    /// Generation-shaping special rules.
    pub special_rules: SpecialRules,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_rest_hours: 8,
            max_consecutive_days: 5,
            min_weekly_hours: 30.0,
            max_weekly_hours: 50.0,
            rotation: RotationPair::default(),
            special_rules: SpecialRules::default(),
        }
    }
}

impl RuleConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the advisory consecutive-day limit.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the advisory weekly-hour band.
    pub fn with_weekly_hours(mut self, min: f64, max: f64) -> Self {
        self.min_weekly_hours = min;
        self.max_weekly_hours = max;
        self
    }

    /// Sets the rotation pair.
    pub fn with_rotation(mut self, rotation: RotationPair) -> Self {
        self.rotation = rotation;
        self
    }

    /// Pins employees to a shift.
    pub fn with_fixed_role(mut self, rule: FixedRoleRule) -> Self {
        self.special_rules.fixed_role = Some(rule);
        self
    }

    /// Excludes a shift on one weekday.
    pub fn with_excluded_shift(mut self, exclusion: WeekdayExclusion) -> Self {
        self.special_rules.excluded_shift = Some(exclusion);
        self
    }

    /// Registers a dynamic staffing rule.
    pub fn with_dynamic_staffing(mut self, rule: DynamicStaffingRule) -> Self {
        self.special_rules.dynamic_staffing.push(rule);
        self
    }

    /// Allows a shift to remain under-filled after backfill.
    pub fn with_allow_empty(mut self, shift_id: impl Into<String>) -> Self {
        self.special_rules.allow_empty_shifts.push(shift_id.into());
        self
    }
}

/// Generation-shaping rules beyond per-employee and per-shift data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialRules {
    /// Employees permanently pinned to one shift.
    pub fixed_role: Option<FixedRoleRule>,
    /// A shift that is not staffed on a given weekday.
    pub excluded_shift: Option<WeekdayExclusion>,
    /// Headcount links between shifts on the same day.
    pub dynamic_staffing: Vec<DynamicStaffingRule>,
    /// Shifts that may stay short without further backfill attempts.
    pub allow_empty_shifts: Vec<String>,
}

impl SpecialRules {
    /// Whether `employee_id` is a fixed-role employee.
    pub fn is_fixed_role(&self, employee_id: &str) -> bool {
        self.fixed_role
            .as_ref()
            .is_some_and(|r| r.employee_ids.iter().any(|id| id == employee_id))
    }

    /// The shift fixed-role employees are pinned to, if any.
    pub fn fixed_role_shift(&self) -> Option<&str> {
        self.fixed_role.as_ref().map(|r| r.shift_id.as_str())
    }

    /// Whether `shift_id` is excluded on `date`.
    pub fn is_excluded(&self, shift_id: &str, date: NaiveDate) -> bool {
        self.excluded_shift
            .as_ref()
            .is_some_and(|x| x.applies_to(shift_id, date))
    }

    /// Whether `shift_id` may stay under-filled.
    pub fn allows_empty(&self, shift_id: &str) -> bool {
        self.allow_empty_shifts.iter().any(|id| id == shift_id)
    }

    /// The dynamic staffing rule naming `shift_id` as dependent, if any.
    ///
    /// The first registered rule wins when several name the same shift.
    pub fn dynamic_rule_for(&self, shift_id: &str) -> Option<&DynamicStaffingRule> {
        self.dynamic_staffing
            .iter()
            .find(|r| r.dependent_shift == shift_id)
    }
}

/// Employees pinned to one designated shift.
///
/// Fixed-role employees are pre-assigned to `shift_id` (in list order) before
/// any other staffing happens, and are exempt from rotation scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRoleRule {
    /// The designated shift.
    pub shift_id: String,
    /// Pinned employees, in priority order.
    pub employee_ids: Vec<String>,
}

impl FixedRoleRule {
    /// Creates a fixed-role rule.
    pub fn new(shift_id: impl Into<String>, employee_ids: Vec<String>) -> Self {
        Self {
            shift_id: shift_id.into(),
            employee_ids,
        }
    }
}

/// A shift that is not staffed on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayExclusion {
    /// The excluded shift.
    pub shift_id: String,
    /// The weekday on which it is excluded.
    pub weekday: Weekday,
}

impl WeekdayExclusion {
    /// Creates an exclusion.
    pub fn new(shift_id: impl Into<String>, weekday: Weekday) -> Self {
        Self {
            shift_id: shift_id.into(),
            weekday,
        }
    }

    /// Whether this exclusion removes `shift_id` on `date`.
    pub fn applies_to(&self, shift_id: &str, date: NaiveDate) -> bool {
        self.shift_id == shift_id && date.weekday() == self.weekday
    }
}

/// Headcount of `dependent_shift` derived from `trigger_shift` on the same day.
///
/// When the trigger shift has nobody assigned, the dependent shift needs
/// `when_trigger_empty` people; otherwise `when_trigger_staffed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicStaffingRule {
    /// The shift whose requirement varies.
    pub dependent_shift: String,
    /// The shift whose headcount is inspected.
    pub trigger_shift: String,
    /// Requirement when the trigger shift is empty.
    #[serde(default = "default_when_trigger_empty")]
    pub when_trigger_empty: u32,
    /// Requirement when the trigger shift has at least one person.
    #[serde(default = "default_when_trigger_staffed")]
    pub when_trigger_staffed: u32,
}

fn default_when_trigger_empty() -> u32 {
    2
}

fn default_when_trigger_staffed() -> u32 {
    1
}

impl DynamicStaffingRule {
    /// Creates a rule with the standard 2 / 1 requirements.
    pub fn new(dependent_shift: impl Into<String>, trigger_shift: impl Into<String>) -> Self {
        Self {
            dependent_shift: dependent_shift.into(),
            trigger_shift: trigger_shift.into(),
            when_trigger_empty: default_when_trigger_empty(),
            when_trigger_staffed: default_when_trigger_staffed(),
        }
    }

    /// Overrides both requirements.
    pub fn with_requirements(mut self, when_empty: u32, when_staffed: u32) -> Self {
        self.when_trigger_empty = when_empty;
        self.when_trigger_staffed = when_staffed;
        self
    }

    /// Requirement given the trigger shift's current headcount.
    #[inline]
    pub fn requirement(&self, trigger_count: u32) -> u32 {
        if trigger_count == 0 {
            self.when_trigger_empty
        } else {
            self.when_trigger_staffed
        }
    }
}

/// The two mutually opposite rotating categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPair {
    pub first: ShiftCategory,
    pub second: ShiftCategory,
}

impl Default for RotationPair {
    fn default() -> Self {
        Self {
            first: ShiftCategory::Early,
            second: ShiftCategory::Late,
        }
    }
}

impl RotationPair {
    /// Creates a rotation pair.
    pub fn new(first: ShiftCategory, second: ShiftCategory) -> Self {
        Self { first, second }
    }

    /// Whether `category` takes part in rotation.
    #[inline]
    pub fn is_rotating(&self, category: ShiftCategory) -> bool {
        category == self.first || category == self.second
    }

    /// The opposite of a rotating category; non-rotating categories map to
    /// themselves.
    pub fn opposite(&self, category: ShiftCategory) -> ShiftCategory {
        if category == self.first {
            self.second
        } else if category == self.second {
            self.first
        } else {
            category
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let r = RuleConfig::default();
        assert_eq!(r.min_rest_hours, 8);
        assert_eq!(r.max_consecutive_days, 5);
        assert!((r.min_weekly_hours - 30.0).abs() < 1e-10);
        assert!((r.max_weekly_hours - 50.0).abs() < 1e-10);
        assert_eq!(r.rotation, RotationPair::default());
        assert!(r.special_rules.fixed_role.is_none());
    }

    #[test]
    fn test_rotation_pair() {
        let pair = RotationPair::default();
        assert!(pair.is_rotating(ShiftCategory::Early));
        assert!(pair.is_rotating(ShiftCategory::Late));
        assert!(!pair.is_rotating(ShiftCategory::Other));
        assert_eq!(pair.opposite(ShiftCategory::Early), ShiftCategory::Late);
        assert_eq!(pair.opposite(ShiftCategory::Late), ShiftCategory::Early);
        assert_eq!(pair.opposite(ShiftCategory::Middle), ShiftCategory::Middle);
    }

    #[test]
    fn test_custom_rotation_pair() {
        let pair = RotationPair::new(ShiftCategory::Middle, ShiftCategory::Late);
        assert!(!pair.is_rotating(ShiftCategory::Early));
        assert_eq!(pair.opposite(ShiftCategory::Middle), ShiftCategory::Late);
    }

    #[test]
    fn test_special_rules_lookup() {
        let rules = RuleConfig::new()
            .with_fixed_role(FixedRoleRule::new("EE", vec!["E1".into(), "E2".into()]))
            .with_excluded_shift(WeekdayExclusion::new("EE", Weekday::Mon))
            .with_dynamic_staffing(DynamicStaffingRule::new("E", "EE"))
            .with_allow_empty("E");
        let sr = &rules.special_rules;

        assert!(sr.is_fixed_role("E1"));
        assert!(!sr.is_fixed_role("E3"));
        assert_eq!(sr.fixed_role_shift(), Some("EE"));
        // 2024-01-01 is a Monday
        assert!(sr.is_excluded("EE", date(2024, 1, 1)));
        assert!(!sr.is_excluded("EE", date(2024, 1, 2)));
        assert!(!sr.is_excluded("E", date(2024, 1, 1)));
        assert!(sr.allows_empty("E"));
        assert!(!sr.allows_empty("EE"));
        assert_eq!(sr.dynamic_rule_for("E").unwrap().trigger_shift, "EE");
        assert!(sr.dynamic_rule_for("EE").is_none());
    }

    #[test]
    fn test_dynamic_requirement() {
        let rule = DynamicStaffingRule::new("E", "EE");
        assert_eq!(rule.requirement(0), 2);
        assert_eq!(rule.requirement(1), 1);
        assert_eq!(rule.requirement(3), 1);

        let custom = rule.with_requirements(3, 2);
        assert_eq!(custom.requirement(0), 3);
        assert_eq!(custom.requirement(1), 2);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{
            "max_consecutive_days": 6,
            "special_rules": {
                "dynamic_staffing": [{"dependent_shift": "E", "trigger_shift": "EE"}]
            }
        }"#;
        let r: RuleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(r.max_consecutive_days, 6);
        assert_eq!(r.min_rest_hours, 8);
        let rule = r.special_rules.dynamic_rule_for("E").unwrap();
        assert_eq!(rule.when_trigger_empty, 2);
        assert_eq!(rule.when_trigger_staffed, 1);
    }
}
