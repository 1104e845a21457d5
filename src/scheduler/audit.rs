//! Post-hoc schedule audit.
//!
//! Consecutive-day and weekly-hour limits are never enforced during
//! generation. This pass reports where a finished schedule breaks them,
//! together with slots left short. Findings are advisory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kpi::FALLBACK_SHIFT_HOURS;
use super::staffing::required_staff;
use crate::models::{Employee, RuleConfig, Schedule, Shift};

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational.
    Info,
    /// Below a soft target.
    Minor,
    /// Above a limit.
    Major,
}

/// Kinds of audit findings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// A run of consecutive working days longer than allowed.
    ConsecutiveDays,
    /// Fewer weekly hours than the minimum.
    WeeklyHoursBelow,
    /// More weekly hours than the maximum.
    WeeklyHoursAbove,
    /// A shift ended a date under its resolved requirement.
    Understaffed,
}

/// One audit finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// Type of finding.
    pub violation_type: ViolationType,
    /// Employee ID, or shift ID for understaffing.
    pub entity_id: String,
    /// First date concerned (run start, week start, or the short date).
    pub date: NaiveDate,
    /// Human-readable description.
    pub message: String,
    /// Severity level.
    pub severity: Severity,
}

/// Audits a finished schedule against the advisory limits in `rules`.
///
/// Findings are ordered: consecutive days (per employee), weekly hours (per
/// employee, per week), understaffing (per date, per shift).
///
/// Weekly hours are summed over full 7-day chunks counted from the first
/// scheduled date; a trailing partial week is not audited.
pub fn audit_schedule(
    schedule: &Schedule,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &RuleConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for employee in employees {
        violations.extend(consecutive_days(schedule, employee, rules.max_consecutive_days));
    }
    for employee in employees {
        violations.extend(weekly_hours(schedule, employee, shifts, rules));
    }
    violations.extend(understaffing(schedule, shifts, rules));
    violations
}

fn consecutive_days(schedule: &Schedule, employee: &Employee, limit: u32) -> Option<Violation> {
    let mut longest = 0u32;
    let mut longest_start: Option<NaiveDate> = None;
    let mut run = 0u32;
    let mut run_start: Option<NaiveDate> = None;
    let mut previous: Option<NaiveDate> = None;

    for (date, _) in schedule.assignments_for_employee(&employee.id) {
        let continues = previous.and_then(|p| p.succ_opt()) == Some(date);
        if continues {
            run += 1;
        } else {
            run = 1;
            run_start = Some(date);
        }
        if run > longest {
            longest = run;
            longest_start = run_start;
        }
        previous = Some(date);
    }

    let start = longest_start?;
    (longest > limit).then(|| Violation {
        violation_type: ViolationType::ConsecutiveDays,
        entity_id: employee.id.clone(),
        date: start,
        message: format!(
            "{} works {} consecutive days from {} (limit {})",
            employee.display_name(),
            longest,
            start,
            limit
        ),
        severity: Severity::Major,
    })
}

fn weekly_hours(
    schedule: &Schedule,
    employee: &Employee,
    shifts: &[Shift],
    rules: &RuleConfig,
) -> Vec<Violation> {
    let dates: Vec<NaiveDate> = schedule.dates().collect();
    let mut violations = Vec::new();

    for (week_idx, week) in dates.chunks_exact(7).enumerate() {
        let hours: f64 = week
            .iter()
            .filter_map(|d| schedule.shift_of(&employee.id, *d))
            .map(|shift_id| {
                shifts
                    .iter()
                    .find(|s| s.id == shift_id)
                    .map_or(FALLBACK_SHIFT_HOURS, |s| s.duration_hours)
            })
            .sum();

        let (violation_type, bound, severity) = if hours < rules.min_weekly_hours {
            (ViolationType::WeeklyHoursBelow, rules.min_weekly_hours, Severity::Minor)
        } else if hours > rules.max_weekly_hours {
            (ViolationType::WeeklyHoursAbove, rules.max_weekly_hours, Severity::Major)
        } else {
            continue;
        };
        let relation = match violation_type {
            ViolationType::WeeklyHoursBelow => "minimum",
            _ => "maximum",
        };
        violations.push(Violation {
            violation_type,
            entity_id: employee.id.clone(),
            date: week[0],
            message: format!(
                "{} works {:.1} h in week {} ({} {:.1} h)",
                employee.display_name(),
                hours,
                week_idx + 1,
                relation,
                bound
            ),
            severity,
        });
    }
    violations
}

fn understaffing(schedule: &Schedule, shifts: &[Shift], rules: &RuleConfig) -> Vec<Violation> {
    let special = &rules.special_rules;
    let mut violations = Vec::new();

    for (date, day) in schedule.days() {
        for shift in shifts {
            if special.is_excluded(&shift.id, date) {
                continue;
            }
            let required = required_staff(shift, date, schedule, special);
            let actual = day.employees_on(&shift.id).len() as u32;
            if actual >= required {
                continue;
            }
            violations.push(Violation {
                violation_type: ViolationType::Understaffed,
                entity_id: shift.id.clone(),
                date,
                message: format!(
                    "{} on {} has {} of {} required",
                    shift.id, date, actual, required
                ),
                severity: Severity::Minor,
            });
        }
    }
    violations
}
