//! Four-phase greedy roster generator.
//!
//! # Algorithm
//!
//! Every date of the range starts empty. Four phases then run in order,
//! each scanning dates chronologically. Within a date, shifts are visited
//! in staffing order: a dynamic rule's trigger shift before its dependent
//! shift, configured order otherwise.
//!
//! 1. **Fixed-role pre-assignment**: pinned employees, in configured order,
//!    fill their designated shift up to its base headcount.
//! 2. **Primary fill**: every other shift is filled to its (dynamic)
//!    requirement by repeatedly picking the lowest-scoring conflict-free
//!    employee.
//! 3. **Vacancy backfill**: up to `backfill_passes` passes retry one pick
//!    per short shift; a pass that fills nothing ends the phase.
//! 4. **Idle-employee backfill**: employees still free on a date, least
//!    loaded first, take the first short shift they may work, ordered by
//!    rotation affinity.
//!
//! No phase ever removes or moves an earlier assignment. Slots that stay
//! short are left short.
//!
//! # Complexity
//! O(d · s · e · r) for d dates, s shifts, e employees and a per-slot
//! requirement r.
//!
//! # Determinism
//! Iteration follows the given employee order and the staffing order; ties
//! in scoring go to the earlier employee. Identical inputs produce identical schedules.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::conflict::is_permissible;
use super::rotation::RotationTracker;
use super::staffing::{required_base, required_staff, shortage, staffing_order};
use crate::dispatching::{ScoreEngine, ScoringContext, Workload};
use crate::error::PreconditionError;
use crate::models::{DateRange, Employee, RuleConfig, Schedule, Shift, ShiftCategory, SpecialRules};

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Maximum number of vacancy backfill passes (phase 3).
    pub backfill_passes: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { backfill_passes: 3 }
    }
}

impl GenerationOptions {
    /// Sets the number of backfill passes.
    pub fn with_backfill_passes(mut self, passes: u32) -> Self {
        self.backfill_passes = passes;
        self
    }
}

/// Input container for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Employees, in enumeration (tie-break) order.
    pub employees: Vec<Employee>,
    /// Shifts, in per-day processing order.
    pub shifts: Vec<Shift>,
    /// Rules, including special rules.
    pub rules: RuleConfig,
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
}

impl GenerationRequest {
    /// Creates a request with default rules.
    pub fn new(employees: Vec<Employee>, shifts: Vec<Shift>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            employees,
            shifts,
            rules: RuleConfig::default(),
            start,
            end,
        }
    }

    /// Sets the rule configuration.
    pub fn with_rules(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }
}

/// Greedy multi-phase roster generator.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_roster::models::{Employee, Shift};
/// use u_roster::scheduler::{GenerationRequest, RosterScheduler};
///
/// let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let employees = vec![
///     Employee::new("E1").with_skill("bar"),
///     Employee::new("E2"),
/// ];
/// let shifts = vec![Shift::new("S", t(9), t(17)).with_required_skill("bar")];
/// let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
///
/// let request = GenerationRequest::new(employees, shifts, start, end);
/// let schedule = RosterScheduler::new().generate(&request).unwrap();
///
/// assert_eq!(schedule.shift_of("E1", start), Some("S"));
/// assert_eq!(schedule.shift_of("E2", start), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RosterScheduler {
    options: GenerationOptions,
    engine: ScoreEngine,
}

impl RosterScheduler {
    /// Creates a scheduler with the standard score mix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets engine tunables.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the candidate score mix.
    pub fn with_score_engine(mut self, engine: ScoreEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The configured options.
    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    /// Generates a roster for a request.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Schedule, PreconditionError> {
        self.generate_from(
            &request.employees,
            &request.shifts,
            &request.rules,
            request.start,
            request.end,
        )
    }

    /// Generates a roster from borrowed inputs.
    ///
    /// # Errors
    /// [`PreconditionError`] if there are no employees, no shifts, or
    /// `start` is not before `end`. Nothing is produced in that case.
    pub fn generate_from(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &RuleConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Schedule, PreconditionError> {
        if employees.is_empty() {
            return Err(PreconditionError::NoEmployees);
        }
        if shifts.is_empty() {
            return Err(PreconditionError::NoShifts);
        }
        if start >= end {
            return Err(PreconditionError::InvalidDateRange { start, end });
        }

        let range = DateRange::new(start, end);
        info!(
            %start,
            %end,
            dates = range.len(),
            employees = employees.len(),
            shifts = shifts.len(),
            "roster generation started"
        );

        let mut run = Run::new(employees, shifts, rules, &self.engine, range);
        run.fixed_role_phase();
        run.primary_phase();
        run.backfill_phase(self.options.backfill_passes);
        run.idle_phase();

        let vacancies = run.vacancies();
        let schedule = run.schedule;
        info!(
            assignments = schedule.assignment_count(),
            vacancies, "roster generation finished"
        );
        Ok(schedule)
    }
}

/// Generates a roster with default options.
///
/// Shorthand for [`RosterScheduler::generate_from`].
pub fn generate(
    employees: &[Employee],
    shifts: &[Shift],
    rules: &RuleConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Schedule, PreconditionError> {
    RosterScheduler::new().generate_from(employees, shifts, rules, start, end)
}

/// Mutable state of one generation run.
struct Run<'a> {
    employees: &'a [Employee],
    shifts: &'a [Shift],
    /// Shifts in staffing order, triggers ahead of dependents.
    order: Vec<&'a Shift>,
    special: &'a SpecialRules,
    engine: &'a ScoreEngine,
    dates: Vec<NaiveDate>,
    schedule: Schedule,
    workload: HashMap<String, Workload>,
    rotation: RotationTracker,
}

impl<'a> Run<'a> {
    fn new(
        employees: &'a [Employee],
        shifts: &'a [Shift],
        rules: &'a RuleConfig,
        engine: &'a ScoreEngine,
        range: DateRange,
    ) -> Self {
        let dates: Vec<NaiveDate> = range.iter().collect();
        let schedule = Schedule::with_days(
            dates.iter().copied(),
            shifts.iter().map(|s| s.id.as_str()),
        );
        let workload = employees
            .iter()
            .map(|e| (e.id.clone(), Workload::default()))
            .collect();
        Self {
            employees,
            shifts,
            order: staffing_order(shifts, &rules.special_rules),
            special: &rules.special_rules,
            engine,
            dates,
            schedule,
            workload,
            rotation: RotationTracker::new(rules.rotation),
        }
    }

    /// Shifts staffed on `date`, in staffing order.
    fn shifts_on(&self, date: NaiveDate) -> Vec<&'a Shift> {
        let special = self.special;
        self.order
            .iter()
            .copied()
            .filter(|s| !special.is_excluded(&s.id, date))
            .collect()
    }

    fn commit(&mut self, date: NaiveDate, employee: &Employee, shift: &Shift) {
        let Some(day) = self.schedule.day_mut(date) else {
            return;
        };
        if !day.assign(&employee.id, &shift.id) {
            return;
        }
        self.workload
            .entry(employee.id.clone())
            .or_default()
            .add_shift(shift.duration_hours);
        let fixed = self.special.is_fixed_role(&employee.id);
        self.rotation.record(employee, shift.category, date, fixed);
        trace!(%date, employee = %employee.id, shift = %shift.id, "assigned");
    }

    /// Assigns the best conflict-free candidate to `shift` if it is short.
    ///
    /// Returns whether an assignment was made.
    fn fill_one(&mut self, date: NaiveDate, shift: &Shift) -> bool {
        let required = required_staff(shift, date, &self.schedule, self.special);
        if self.schedule.count(&shift.id, date) >= required {
            return false;
        }

        let employees = self.employees;
        let day = self.schedule.day(date);
        let context = ScoringContext::new(date, &self.workload, &self.rotation, self.special);
        let candidates = employees
            .iter()
            .filter(|e| is_permissible(e, shift, date, day));
        let Some(best) = self.engine.select_best(candidates, shift, &context) else {
            return false;
        };

        self.commit(date, best, shift);
        true
    }

    fn fixed_role_phase(&mut self) {
        let special = self.special;
        let Some(rule) = special.fixed_role.as_ref() else {
            return;
        };
        let shifts = self.shifts;
        let Some(shift) = shifts.iter().find(|s| s.id == rule.shift_id) else {
            debug!(shift = %rule.shift_id, "fixed-role shift not configured; phase skipped");
            return;
        };
        let employees = self.employees;
        let required = required_base(shift);
        let before = self.schedule.assignment_count();

        for date in self.dates.clone() {
            if special.is_excluded(&shift.id, date) {
                continue;
            }
            for employee_id in &rule.employee_ids {
                if self.schedule.count(&shift.id, date) >= required {
                    break;
                }
                let Some(employee) = employees.iter().find(|e| &e.id == employee_id) else {
                    continue;
                };
                if is_permissible(employee, shift, date, self.schedule.day(date)) {
                    self.commit(date, employee, shift);
                }
            }
        }

        debug!(
            assigned = self.schedule.assignment_count() - before,
            "fixed-role phase done"
        );
    }

    fn primary_phase(&mut self) {
        let special = self.special;
        let fixed_shift = special.fixed_role_shift();
        let before = self.schedule.assignment_count();

        for date in self.dates.clone() {
            for shift in self.shifts_on(date) {
                if Some(shift.id.as_str()) == fixed_shift {
                    continue;
                }
                while self.fill_one(date, shift) {}
            }
        }

        debug!(
            assigned = self.schedule.assignment_count() - before,
            "primary phase done"
        );
    }

    fn backfill_phase(&mut self, passes: u32) {
        // Allow-empty slots that already failed once on a date.
        let mut given_up: HashSet<(NaiveDate, &'a str)> = HashSet::new();
        let special = self.special;

        for pass in 0..passes {
            let mut filled = 0usize;
            for date in self.dates.clone() {
                for shift in self.shifts_on(date) {
                    if given_up.contains(&(date, shift.id.as_str())) {
                        continue;
                    }
                    if shortage(shift, date, &self.schedule, special) == 0 {
                        continue;
                    }
                    if self.fill_one(date, shift) {
                        filled += 1;
                    } else if special.allows_empty(&shift.id) {
                        given_up.insert((date, shift.id.as_str()));
                    }
                }
            }
            debug!(pass, filled, "backfill pass done");
            if filled == 0 {
                break;
            }
        }
    }

    fn idle_phase(&mut self) {
        let employees = self.employees;
        let before = self.schedule.assignment_count();

        for date in self.dates.clone() {
            let shifts_today = self.shifts_on(date);

            let mut idle: Vec<&'a Employee> = employees
                .iter()
                .filter(|e| !self.schedule.day(date).is_some_and(|d| d.is_assigned(&e.id)))
                .collect();
            idle.sort_by(|a, b| {
                let wa = self.workload_of(&a.id);
                let wb = self.workload_of(&b.id);
                wa.days
                    .cmp(&wb.days)
                    .then_with(|| wa.hours.total_cmp(&wb.hours))
            });

            for employee in idle {
                let mut short: Vec<(&'a Shift, u32)> = shifts_today
                    .iter()
                    .map(|s| (*s, shortage(s, date, &self.schedule, self.special)))
                    .filter(|(_, n)| *n > 0)
                    .collect();
                if short.is_empty() {
                    continue;
                }

                match self.preferred_category(employee, date) {
                    Some(target) => {
                        short.sort_by_key(|(s, n)| (s.category != target, Reverse(*n)))
                    }
                    None => short.sort_by_key(|(_, n)| Reverse(*n)),
                }

                let day = self.schedule.day(date);
                let chosen = short
                    .iter()
                    .map(|(s, _)| *s)
                    .find(|s| is_permissible(employee, s, date, day));
                if let Some(shift) = chosen {
                    self.commit(date, employee, shift);
                }
            }
        }

        debug!(
            assigned = self.schedule.assignment_count() - before,
            "idle-employee phase done"
        );
    }

    /// Category an idle employee should take first: the opposite one right
    /// after a rest day, else the current one. `None` outside a rotating run.
    fn preferred_category(&self, employee: &Employee, date: NaiveDate) -> Option<ShiftCategory> {
        let current = self.rotation.rotating_category(&employee.id)?;
        Some(
            self.rotation
                .post_rest_category(employee, date)
                .unwrap_or(current),
        )
    }

    fn workload_of(&self, employee_id: &str) -> Workload {
        self.workload.get(employee_id).copied().unwrap_or_default()
    }

    /// Remaining vacancies over all staffed date/shift slots.
    fn vacancies(&self) -> u32 {
        self.dates
            .iter()
            .flat_map(|d| self.shifts_on(*d).into_iter().map(move |s| (*d, s)))
            .map(|(d, s)| shortage(s, d, &self.schedule, self.special))
            .sum()
    }
}
