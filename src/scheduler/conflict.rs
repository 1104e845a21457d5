//! Conflict checking.
//!
//! Decides whether an employee may take a shift on a date given the day's
//! partial assignments. Every reason is detected independently, so a
//! caller sees all of them at once.
//!
//! Weekly-hour and consecutive-day limits are advisory and are not checked
//! here (see [`audit_schedule`](super::audit_schedule)).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DayEntry, Employee, Shift};

/// Why an employee cannot take a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Employee ID is not known.
    UnknownEmployee { employee_id: String },
    /// Shift ID is not known.
    UnknownShift { shift_id: String },
    /// The date falls on the employee's fixed rest weekday.
    RestDay,
    /// The date is one of the employee's unavailable dates.
    Unavailable,
    /// The employee holds none of the shift's required skills.
    MissingSkill,
    /// The employee already works another shift that day.
    AlreadyAssigned { shift_id: String },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::UnknownEmployee { employee_id } => {
                write!(f, "unknown employee {employee_id}")
            }
            Conflict::UnknownShift { shift_id } => write!(f, "unknown shift {shift_id}"),
            Conflict::RestDay => write!(f, "fixed rest day"),
            Conflict::Unavailable => write!(f, "marked unavailable"),
            Conflict::MissingSkill => write!(f, "lacks required skills"),
            Conflict::AlreadyAssigned { shift_id } => {
                write!(f, "already assigned to {shift_id}")
            }
        }
    }
}

/// Conflicts of assigning `employee` to `shift` on `date`.
///
/// `day` is the schedule entry for `date`; `None` means nothing has been
/// assigned on that date yet. An empty result means the assignment is
/// permissible.
pub fn check_conflicts(
    employee: &Employee,
    shift: &Shift,
    date: NaiveDate,
    day: Option<&DayEntry>,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if employee.is_rest_day(date) {
        conflicts.push(Conflict::RestDay);
    }
    if employee.is_unavailable_on(date) {
        conflicts.push(Conflict::Unavailable);
    }
    if shift.requires_skills() && !employee.has_any_skill(&shift.required_skills) {
        conflicts.push(Conflict::MissingSkill);
    }
    if let Some(assigned) = day.and_then(|d| d.shift_of(&employee.id)) {
        conflicts.push(Conflict::AlreadyAssigned {
            shift_id: assigned.to_string(),
        });
    }

    conflicts
}

/// Whether the assignment has no conflicts.
///
/// Short-circuiting form of [`check_conflicts`] used on the hot path.
pub fn is_permissible(
    employee: &Employee,
    shift: &Shift,
    date: NaiveDate,
    day: Option<&DayEntry>,
) -> bool {
    !employee.is_rest_day(date)
        && !employee.is_unavailable_on(date)
        && (!shift.requires_skills() || employee.has_any_skill(&shift.required_skills))
        && !day.is_some_and(|d| d.is_assigned(&employee.id))
}

/// Id-based lookup form of [`check_conflicts`].
///
/// Unknown IDs are reported and end the check, since nothing else can be
/// evaluated without the record.
pub fn check_conflicts_by_id(
    employees: &[Employee],
    shifts: &[Shift],
    employee_id: &str,
    shift_id: &str,
    date: NaiveDate,
    day: Option<&DayEntry>,
) -> Vec<Conflict> {
    let Some(employee) = employees.iter().find(|e| e.id == employee_id) else {
        return vec![Conflict::UnknownEmployee {
            employee_id: employee_id.to_string(),
        }];
    };
    let Some(shift) = shifts.iter().find(|s| s.id == shift_id) else {
        return vec![Conflict::UnknownShift {
            shift_id: shift_id.to_string(),
        }];
    };
    check_conflicts(employee, shift, date, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar_shift() -> Shift {
        Shift::new(
            "bar",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        )
        .with_required_skill("barista")
    }

    #[test]
    fn test_no_conflicts() {
        let e = Employee::new("E1").with_skill("barista");
        let c = check_conflicts(&e, &bar_shift(), date(2024, 1, 2), None);
        assert!(c.is_empty());
        assert!(is_permissible(&e, &bar_shift(), date(2024, 1, 2), None));
    }

    #[test]
    fn test_rest_day() {
        // 2024-01-01 is a Monday.
        let e = Employee::new("E1")
            .with_skill("barista")
            .with_rest_day(Weekday::Mon);
        let c = check_conflicts(&e, &bar_shift(), date(2024, 1, 1), None);
        assert_eq!(c, vec![Conflict::RestDay]);
        assert!(check_conflicts(&e, &bar_shift(), date(2024, 1, 2), None).is_empty());
    }

    #[test]
    fn test_all_reasons_reported() {
        let d = date(2024, 1, 1);
        let e = Employee::new("E1")
            .with_rest_day(Weekday::Mon)
            .with_unavailable_date(d);
        let mut day = DayEntry::default();
        day.assign("E1", "other");

        let c = check_conflicts(&e, &bar_shift(), d, Some(&day));
        assert_eq!(
            c,
            vec![
                Conflict::RestDay,
                Conflict::Unavailable,
                Conflict::MissingSkill,
                Conflict::AlreadyAssigned {
                    shift_id: "other".into()
                },
            ]
        );
        assert!(!is_permissible(&e, &bar_shift(), d, Some(&day)));
    }

    #[test]
    fn test_open_shift_needs_no_skill() {
        let open = Shift::new(
            "open",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        let e = Employee::new("E2");
        assert!(check_conflicts(&e, &open, date(2024, 1, 2), None).is_empty());
    }

    #[test]
    fn test_unknown_ids() {
        let employees = vec![Employee::new("E1").with_skill("barista")];
        let shifts = vec![bar_shift()];
        let d = date(2024, 1, 2);

        assert_eq!(
            check_conflicts_by_id(&employees, &shifts, "X", "bar", d, None),
            vec![Conflict::UnknownEmployee {
                employee_id: "X".into()
            }]
        );
        assert_eq!(
            check_conflicts_by_id(&employees, &shifts, "E1", "nope", d, None),
            vec![Conflict::UnknownShift {
                shift_id: "nope".into()
            }]
        );
        assert!(check_conflicts_by_id(&employees, &shifts, "E1", "bar", d, None).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Conflict::RestDay.to_string(), "fixed rest day");
        assert_eq!(
            Conflict::AlreadyAssigned {
                shift_id: "S".into()
            }
            .to_string(),
            "already assigned to S"
        );
    }
}
