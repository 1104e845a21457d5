//! Schedule (roster) model.
//!
//! A schedule maps each date of the planning range to a [`DayEntry`]: which
//! employee works which shift, plus a per-shift headcount. The headcount is
//! always derived from the assignments; [`DayEntry::assign`] is the only way
//! to add an assignment, so the two can never disagree.
//!
//! Serialized form (JSON):
//!
//! ```json
//! { "2024-01-01": { "assignments": { "E1": "S1" }, "shift_counts": { "S1": 1 } } }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assignments and headcounts for one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(default)]
    assignments: BTreeMap<String, String>,
    #[serde(default)]
    shift_counts: BTreeMap<String, u32>,
}

impl DayEntry {
    /// Creates an empty day with a zero count for each given shift.
    pub fn with_shifts<'a, I>(shift_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            assignments: BTreeMap::new(),
            shift_counts: shift_ids.into_iter().map(|id| (id.to_string(), 0)).collect(),
        }
    }

    /// Assigns an employee to a shift.
    ///
    /// Returns `false` (and changes nothing) if the employee already has an
    /// assignment on this day.
    pub fn assign(&mut self, employee_id: &str, shift_id: &str) -> bool {
        if self.assignments.contains_key(employee_id) {
            return false;
        }
        self.assignments
            .insert(employee_id.to_string(), shift_id.to_string());
        *self.shift_counts.entry(shift_id.to_string()).or_insert(0) += 1;
        true
    }

    /// Shift assigned to an employee, if any.
    pub fn shift_of(&self, employee_id: &str) -> Option<&str> {
        self.assignments.get(employee_id).map(String::as_str)
    }

    /// Whether the employee works on this day.
    pub fn is_assigned(&self, employee_id: &str) -> bool {
        self.assignments.contains_key(employee_id)
    }

    /// Current headcount of a shift (0 if unknown).
    pub fn count(&self, shift_id: &str) -> u32 {
        self.shift_counts.get(shift_id).copied().unwrap_or(0)
    }

    /// Employee → shift assignments.
    pub fn assignments(&self) -> &BTreeMap<String, String> {
        &self.assignments
    }

    /// Shift → headcount.
    pub fn shift_counts(&self) -> &BTreeMap<String, u32> {
        &self.shift_counts
    }

    /// Employees assigned to a shift, in ID order.
    pub fn employees_on(&self, shift_id: &str) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, s)| s.as_str() == shift_id)
            .map(|(e, _)| e.as_str())
            .collect()
    }

    /// Number of assignments on this day.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Rebuilds headcounts from assignments, keeping known shifts at zero.
    pub fn recount(&mut self) {
        for count in self.shift_counts.values_mut() {
            *count = 0;
        }
        for shift_id in self.assignments.values() {
            *self.shift_counts.entry(shift_id.clone()).or_insert(0) += 1;
        }
    }

    /// Whether every headcount matches the assignments.
    pub fn is_consistent(&self) -> bool {
        let mut derived: BTreeMap<&str, u32> = BTreeMap::new();
        for shift_id in self.assignments.values() {
            *derived.entry(shift_id.as_str()).or_insert(0) += 1;
        }
        let counts_match = self
            .shift_counts
            .iter()
            .all(|(s, &n)| derived.get(s.as_str()).copied().unwrap_or(0) == n);
        let all_counted = derived
            .iter()
            .all(|(s, &n)| self.shift_counts.get(*s).copied() == Some(n));
        counts_match && all_counted
    }
}

/// A complete roster over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: BTreeMap<NaiveDate, DayEntry>,
}

/// Kind of difference between two schedules for one employee and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The employee gained a shift.
    Added,
    /// The employee lost their shift.
    Removed,
    /// The employee moved to a different shift.
    Changed,
}

/// One assignment that differs between two schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChange {
    pub date: NaiveDate,
    pub employee_id: String,
    /// Shift in the current schedule.
    pub before: Option<String>,
    /// Shift in the other schedule.
    pub after: Option<String>,
    pub kind: ChangeKind,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule with an empty day for each date.
    pub fn with_days<'a, D, S>(dates: D, shift_ids: S) -> Self
    where
        D: IntoIterator<Item = NaiveDate>,
        S: IntoIterator<Item = &'a str> + Clone,
    {
        let days = dates
            .into_iter()
            .map(|d| (d, DayEntry::with_shifts(shift_ids.clone())))
            .collect();
        Self { days }
    }

    /// Entry for a date.
    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days.get(&date)
    }

    /// Mutable entry for a date.
    pub fn day_mut(&mut self, date: NaiveDate) -> Option<&mut DayEntry> {
        self.days.get_mut(&date)
    }

    /// Inserts or replaces a day.
    pub fn insert_day(&mut self, date: NaiveDate, entry: DayEntry) {
        self.days.insert(date, entry);
    }

    /// Days in chronological order.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &DayEntry)> {
        self.days.iter().map(|(d, e)| (*d, e))
    }

    /// Dates in chronological order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Number of days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Whether the schedule has no days.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Shift assigned to an employee on a date.
    pub fn shift_of(&self, employee_id: &str, date: NaiveDate) -> Option<&str> {
        self.days.get(&date).and_then(|d| d.shift_of(employee_id))
    }

    /// Headcount of a shift on a date (0 if the date is not scheduled).
    pub fn count(&self, shift_id: &str, date: NaiveDate) -> u32 {
        self.days.get(&date).map_or(0, |d| d.count(shift_id))
    }

    /// Total number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.days.values().map(DayEntry::assignment_count).sum()
    }

    /// Dates an employee works, with the shift, in chronological order.
    pub fn assignments_for_employee(&self, employee_id: &str) -> Vec<(NaiveDate, &str)> {
        self.days
            .iter()
            .filter_map(|(d, e)| e.shift_of(employee_id).map(|s| (*d, s)))
            .collect()
    }

    /// Rebuilds every day's headcounts from its assignments.
    ///
    /// Used for snapshots produced outside the engine.
    pub fn recount(&mut self) {
        for entry in self.days.values_mut() {
            entry.recount();
        }
    }

    /// Whether every day's headcounts match its assignments.
    pub fn is_consistent(&self) -> bool {
        self.days.values().all(DayEntry::is_consistent)
    }

    /// Lists every (date, employee) whose assignment differs in `other`.
    ///
    /// Dates present in only one of the schedules are compared against an
    /// empty day. Results are ordered by date, then employee ID.
    pub fn diff(&self, other: &Schedule) -> Vec<AssignmentChange> {
        let empty = DayEntry::default();
        let mut dates: Vec<NaiveDate> = self.days.keys().chain(other.days.keys()).copied().collect();
        dates.sort();
        dates.dedup();

        let mut changes = Vec::new();
        for date in dates {
            let before_day = self.days.get(&date).unwrap_or(&empty);
            let after_day = other.days.get(&date).unwrap_or(&empty);

            let mut employees: Vec<&String> = before_day
                .assignments
                .keys()
                .chain(after_day.assignments.keys())
                .collect();
            employees.sort();
            employees.dedup();

            for employee_id in employees {
                let before = before_day.assignments.get(employee_id);
                let after = after_day.assignments.get(employee_id);
                let kind = match (before, after) {
                    (Some(b), Some(a)) if b == a => continue,
                    (Some(_), Some(_)) => ChangeKind::Changed,
                    (None, Some(_)) => ChangeKind::Added,
                    (Some(_), None) => ChangeKind::Removed,
                    (None, None) => continue,
                };
                changes.push(AssignmentChange {
                    date,
                    employee_id: employee_id.clone(),
                    before: before.cloned(),
                    after: after.cloned(),
                    kind,
                });
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::with_days([date(2024, 1, 1), date(2024, 1, 2)], ["S1", "S2"]);
        let d1 = s.day_mut(date(2024, 1, 1)).unwrap();
        d1.assign("E1", "S1");
        d1.assign("E2", "S1");
        let d2 = s.day_mut(date(2024, 1, 2)).unwrap();
        d2.assign("E1", "S2");
        s
    }

    #[test]
    fn test_assign_keeps_counts() {
        let s = sample_schedule();
        assert_eq!(s.count("S1", date(2024, 1, 1)), 2);
        assert_eq!(s.count("S2", date(2024, 1, 1)), 0);
        assert_eq!(s.count("S2", date(2024, 1, 2)), 1);
        assert_eq!(s.assignment_count(), 3);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_assign_rejects_second_shift() {
        let mut day = DayEntry::with_shifts(["S1", "S2"]);
        assert!(day.assign("E1", "S1"));
        assert!(!day.assign("E1", "S2"));
        assert_eq!(day.shift_of("E1"), Some("S1"));
        assert_eq!(day.count("S2"), 0);
    }

    #[test]
    fn test_employees_on_shift() {
        let s = sample_schedule();
        let day = s.day(date(2024, 1, 1)).unwrap();
        assert_eq!(day.employees_on("S1"), vec!["E1", "E2"]);
        assert!(day.employees_on("S2").is_empty());
    }

    #[test]
    fn test_assignments_for_employee() {
        let s = sample_schedule();
        let e1 = s.assignments_for_employee("E1");
        assert_eq!(e1, vec![(date(2024, 1, 1), "S1"), (date(2024, 1, 2), "S2")]);
        assert!(s.assignments_for_employee("E9").is_empty());
    }

    #[test]
    fn test_recount_repairs_snapshot() {
        let json = r#"{"2024-01-01": {"assignments": {"E1": "S1", "E2": "S1"}, "shift_counts": {"S1": 5, "S2": 1}}}"#;
        let mut s: Schedule = serde_json::from_str(json).unwrap();
        assert!(!s.is_consistent());
        s.recount();
        assert!(s.is_consistent());
        assert_eq!(s.count("S1", date(2024, 1, 1)), 2);
        assert_eq!(s.count("S2", date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut s = Schedule::with_days([date(2024, 1, 1)], ["S1"]);
        s.day_mut(date(2024, 1, 1)).unwrap().assign("E1", "S1");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(
            json,
            r#"{"2024-01-01":{"assignments":{"E1":"S1"},"shift_counts":{"S1":1}}}"#
        );
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_diff() {
        let current = sample_schedule();
        let mut proposed = Schedule::with_days([date(2024, 1, 1), date(2024, 1, 2)], ["S1", "S2"]);
        let d1 = proposed.day_mut(date(2024, 1, 1)).unwrap();
        d1.assign("E1", "S2"); // changed
        d1.assign("E3", "S1"); // added
        // E2 removed on day 1, E1 removed on day 2

        let changes = current.diff(&proposed);
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[0].employee_id, "E1");
        assert_eq!(changes[0].kind, ChangeKind::Changed);
        assert_eq!(changes[0].before.as_deref(), Some("S1"));
        assert_eq!(changes[0].after.as_deref(), Some("S2"));
        assert_eq!(changes[1].kind, ChangeKind::Removed);
        assert_eq!(changes[1].employee_id, "E2");
        assert_eq!(changes[2].kind, ChangeKind::Added);
        assert_eq!(changes[2].employee_id, "E3");
        assert_eq!(changes[3].date, date(2024, 1, 2));
        assert_eq!(changes[3].kind, ChangeKind::Removed);
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let s = sample_schedule();
        assert!(s.diff(&s.clone()).is_empty());
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.assignment_count(), 0);
        assert_eq!(s.count("S1", date(2024, 1, 1)), 0);
        assert!(s.is_consistent());
    }
}
