//! Generation service over a repository.
//!
//! [`RosterService`] is the only place where generation meets storage:
//!
//! - [`generate`](RosterService::generate) loads the stored inputs, runs the
//!   engine and replaces the stored schedule in one step. A run that fails
//!   its preconditions leaves the stored schedule untouched.
//! - At most one run is in flight per repository, however many services
//!   share it; a second caller gets [`ServiceError::Busy`] instead of
//!   waiting.
//! - Externally produced snapshots go through
//!   [`propose`](RosterService::propose) and are only stored by an explicit
//!   [`commit`](RosterService::commit).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{NaiveDate, NaiveTime};
//! use u_roster::models::{Employee, Shift};
//! use u_roster::repository::{InMemoryRepository, RosterRepository};
//! use u_roster::service::RosterService;
//!
//! let repo = Arc::new(InMemoryRepository::new());
//! repo.save_employees(&[Employee::new("E1")]).unwrap();
//! repo.save_shifts(&[Shift::new(
//!     "A",
//!     NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
//! )])
//! .unwrap();
//!
//! let service = RosterService::new(Arc::clone(&repo));
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
//! let schedule = service.generate(start, end).unwrap();
//!
//! assert_eq!(schedule.assignment_count(), 3);
//! assert_eq!(repo.schedule().unwrap(), schedule);
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::models::{AssignmentChange, Employee, RuleConfig, Schedule, Shift};
use crate::repository::{RosterRepository, RunLease};
use crate::scheduler::{audit_schedule, RosterKpi, RosterScheduler, Violation};
use crate::validation::validate_input;

/// A candidate schedule awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleProposal {
    /// The candidate, with headcounts rebuilt from its assignments.
    pub schedule: Schedule,
    /// Differences from the stored schedule, by date then employee.
    pub changes: Vec<AssignmentChange>,
    base: Schedule,
}

impl ScheduleProposal {
    /// Returns `true` if committing would change nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Roster operations against one repository.
pub struct RosterService<R> {
    repository: Arc<R>,
    scheduler: RosterScheduler,
}

impl<R> RosterService<R>
where
    R: RosterRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            scheduler: RosterScheduler::new(),
        }
    }

    /// Uses a configured scheduler instead of the default one.
    pub fn with_scheduler(mut self, scheduler: RosterScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Returns `true` while a generation or commit holds the roster.
    pub fn is_busy(&self) -> bool {
        self.repository.run_lock().is_held()
    }

    fn try_begin(&self) -> Result<RunLease<'_>, ServiceError> {
        self.repository
            .run_lock()
            .try_acquire()
            .ok_or(ServiceError::Busy)
    }

    /// Generates a roster for `start..=end` from the stored inputs and
    /// stores it.
    ///
    /// # Errors
    /// - [`ServiceError::Busy`] if another run is in flight
    /// - [`ServiceError::Precondition`] if the stored inputs cannot be
    ///   scheduled; the stored schedule is kept
    /// - [`ServiceError::Repository`] on storage failure
    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> Result<Schedule, ServiceError> {
        let _guard = self.try_begin().inspect_err(|_| {
            warn!(%start, %end, "generation rejected: run already in flight");
        })?;

        let inputs = self.repository.load()?;
        let schedule = self.scheduler.generate_from(
            &inputs.employees,
            &inputs.shifts,
            &inputs.rules,
            start,
            end,
        )?;
        self.repository.replace_schedule(&schedule)?;
        Ok(schedule)
    }

    /// Validates and stores employees, shifts and rules together.
    ///
    /// The records are written through
    /// [`RosterRepository::save_configuration`]; how atomic that is depends
    /// on the repository.
    ///
    /// # Errors
    /// [`ServiceError::Invalid`] with every problem found; nothing is
    /// stored in that case.
    pub fn update_configuration(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &RuleConfig,
    ) -> Result<(), ServiceError> {
        validate_input(employees, shifts, rules).map_err(ServiceError::Invalid)?;
        self.repository.save_configuration(employees, shifts, rules)?;
        info!(
            employees = employees.len(),
            shifts = shifts.len(),
            "configuration stored"
        );
        Ok(())
    }

    /// Diffs an externally produced schedule against the stored one.
    ///
    /// The candidate's headcounts are rebuilt from its assignments. Nothing
    /// is stored.
    pub fn propose(&self, mut candidate: Schedule) -> Result<ScheduleProposal, ServiceError> {
        candidate.recount();
        let base = self.repository.schedule()?;
        let changes = base.diff(&candidate);
        Ok(ScheduleProposal {
            schedule: candidate,
            changes,
            base,
        })
    }

    /// Stores a confirmed proposal.
    ///
    /// # Errors
    /// - [`ServiceError::Busy`] if a generation run is in flight
    /// - [`ServiceError::StaleProposal`] if the stored schedule no longer
    ///   matches the one the proposal was diffed against
    pub fn commit(&self, proposal: ScheduleProposal) -> Result<Schedule, ServiceError> {
        let _guard = self.try_begin()?;
        if self.repository.schedule()? != proposal.base {
            return Err(ServiceError::StaleProposal);
        }
        self.repository.replace_schedule(&proposal.schedule)?;
        info!(changes = proposal.changes.len(), "proposal committed");
        Ok(proposal.schedule)
    }

    /// Audits the stored schedule against the stored rules.
    pub fn audit(&self) -> Result<Vec<Violation>, ServiceError> {
        let data = self.repository.load()?;
        Ok(audit_schedule(
            &data.schedule,
            &data.employees,
            &data.shifts,
            &data.rules,
        ))
    }

    /// Coverage and workload metrics for the stored schedule.
    pub fn kpi(&self) -> Result<RosterKpi, ServiceError> {
        let data = self.repository.load()?;
        Ok(RosterKpi::calculate(
            &data.schedule,
            &data.employees,
            &data.shifts,
            &data.rules.special_rules,
        ))
    }
}
