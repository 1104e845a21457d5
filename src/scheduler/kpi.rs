//! Roster quality metrics (KPIs).
//!
//! Computes coverage and workload indicators from a finalized schedule and
//! its input records. Read-only: nothing here mutates the schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total required | Sum of resolved headcount requirements over all staffed slots |
//! | Total vacancies | Sum of max(0, required − actual) |
//! | Coverage rate | assignments ÷ required, in % |
//! | Avg weekly hours | hours ÷ (days in range ÷ 7) |
//! | Completion | avg weekly hours ÷ weekly target, in % |
//!
//! Requirements come from the dynamic staffing resolver applied to the
//! final schedule; a shift excluded on a weekday does not count on that
//! weekday.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::staffing::required_staff;
use crate::models::{Employee, Schedule, Shift, SpecialRules};

/// Hours credited for an assignment whose shift is no longer configured.
pub(crate) const FALLBACK_SHIFT_HOURS: f64 = 8.0;

/// Workload band relative to an employee's weekly target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    /// Above 110 % of target.
    Over,
    /// 90 % to 110 % of target.
    Balanced,
    /// Below 90 % of target.
    Under,
}

impl IntensityBand {
    /// Band for a completion percentage.
    pub fn from_completion(completion_pct: f64) -> Self {
        if completion_pct > 110.0 {
            IntensityBand::Over
        } else if completion_pct >= 90.0 {
            IntensityBand::Balanced
        } else {
            IntensityBand::Under
        }
    }
}

/// Workload summary of one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeKpi {
    pub employee_id: String,
    /// Assigned days.
    pub days: u32,
    /// Assigned hours.
    pub hours: f64,
    /// Assigned days per 7 calendar days.
    pub avg_weekly_days: f64,
    /// Assigned hours per 7 calendar days.
    pub avg_weekly_hours: f64,
    /// Weekly hours target.
    pub target_weekly_hours: f64,
    /// `avg_weekly_hours / target_weekly_hours` in % (0 without a target).
    pub completion_pct: f64,
    pub intensity: IntensityBand,
}

/// Staffing summary of one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftUsage {
    pub shift_id: String,
    /// Dates on which the shift was staffed (not excluded).
    pub appearance_days: u32,
    /// Sum of resolved requirements.
    pub total_required: u32,
    /// Sum of actual headcounts.
    pub total_actual: u32,
    /// Dates on which the shift ended short.
    pub vacancy_days: u32,
}

impl ShiftUsage {
    /// `total_actual / total_required` in % (0 without requirements).
    pub fn coverage_pct(&self) -> f64 {
        if self.total_required == 0 {
            0.0
        } else {
            self.total_actual as f64 / self.total_required as f64 * 100.0
        }
    }
}

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterKpi {
    /// Dates in the schedule.
    pub total_days: usize,
    /// Assignments over all dates.
    pub total_assignments: usize,
    /// Resolved requirements over all staffed slots.
    pub total_required: u32,
    /// Unfilled headcount over all staffed slots.
    pub total_vacancies: u32,
    /// `total_assignments / total_required` in % (0 without requirements).
    pub coverage_rate: f64,
    /// Per employee, in input order.
    pub employees: Vec<EmployeeKpi>,
    /// Per shift, in input order.
    pub shifts: Vec<ShiftUsage>,
}

impl RosterKpi {
    /// Computes KPIs from a schedule and its input records.
    ///
    /// # Arguments
    /// * `schedule` - The finalized roster.
    /// * `employees` - Employees to report on (targets).
    /// * `shifts` - Shift definitions (durations, base requirements).
    /// * `special_rules` - Dynamic staffing and weekday exclusion.
    pub fn calculate(
        schedule: &Schedule,
        employees: &[Employee],
        shifts: &[Shift],
        special_rules: &SpecialRules,
    ) -> Self {
        let total_days = schedule.day_count();
        let total_assignments = schedule.assignment_count();

        let mut usage: Vec<ShiftUsage> = shifts
            .iter()
            .map(|s| ShiftUsage {
                shift_id: s.id.clone(),
                appearance_days: 0,
                total_required: 0,
                total_actual: 0,
                vacancy_days: 0,
            })
            .collect();

        let mut total_vacancies = 0u32;
        for date in schedule.dates() {
            for (shift, stats) in shifts.iter().zip(usage.iter_mut()) {
                if special_rules.is_excluded(&shift.id, date) {
                    continue;
                }
                let required = required_staff(shift, date, schedule, special_rules);
                let actual = actual_count(schedule, &shift.id, date);
                stats.appearance_days += 1;
                stats.total_required += required;
                stats.total_actual += actual;
                if actual < required {
                    stats.vacancy_days += 1;
                    total_vacancies += required - actual;
                }
            }
        }

        let total_required: u32 = usage.iter().map(|u| u.total_required).sum();
        let coverage_rate = if total_required == 0 {
            0.0
        } else {
            total_assignments as f64 / total_required as f64 * 100.0
        };

        let weeks = total_days as f64 / 7.0;
        let employees = employees
            .iter()
            .map(|e| employee_kpi(e, schedule, shifts, weeks))
            .collect();

        Self {
            total_days,
            total_assignments,
            total_required,
            total_vacancies,
            coverage_rate,
            employees,
            shifts: usage,
        }
    }

    /// KPI of one employee.
    pub fn employee(&self, employee_id: &str) -> Option<&EmployeeKpi> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    /// Usage of one shift.
    pub fn shift(&self, shift_id: &str) -> Option<&ShiftUsage> {
        self.shifts.iter().find(|s| s.shift_id == shift_id)
    }

    /// Whether coverage reaches `min_coverage_pct` with at most
    /// `max_vacancies` open slots.
    pub fn meets_thresholds(&self, min_coverage_pct: f64, max_vacancies: u32) -> bool {
        self.coverage_rate >= min_coverage_pct && self.total_vacancies <= max_vacancies
    }
}

/// Headcount derived from assignments; stored counts are not trusted.
fn actual_count(schedule: &Schedule, shift_id: &str, date: NaiveDate) -> u32 {
    schedule
        .day(date)
        .map_or(0, |d| d.employees_on(shift_id).len() as u32)
}

fn employee_kpi(employee: &Employee, schedule: &Schedule, shifts: &[Shift], weeks: f64) -> EmployeeKpi {
    let worked = schedule.assignments_for_employee(&employee.id);
    let days = worked.len() as u32;
    let hours: f64 = worked
        .iter()
        .map(|(_, shift_id)| {
            shifts
                .iter()
                .find(|s| s.id == *shift_id)
                .map_or(FALLBACK_SHIFT_HOURS, |s| s.duration_hours)
        })
        .sum();

    let (avg_weekly_days, avg_weekly_hours) = if weeks > 0.0 {
        (days as f64 / weeks, hours / weeks)
    } else {
        (0.0, 0.0)
    };
    let target = employee.weekly_hours;
    let completion_pct = if target > 0.0 {
        avg_weekly_hours / target * 100.0
    } else {
        0.0
    };

    EmployeeKpi {
        employee_id: employee.id.clone(),
        days,
        hours,
        avg_weekly_days,
        avg_weekly_hours,
        target_weekly_hours: target,
        completion_pct,
        intensity: IntensityBand::from_completion(completion_pct),
    }
}
