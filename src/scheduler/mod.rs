//! Roster generation, auditing and KPI evaluation.
//!
//! # Algorithm
//!
//! `RosterScheduler` is a greedy, non-backtracking, four-phase heuristic
//! (fixed-role pre-assignment, primary fill, vacancy backfill, idle-employee
//! backfill). It is not optimal; understaffing it cannot resolve is left in
//! place and reported by the audit.
//!
//! # Building blocks
//!
//! - [`check_conflicts`]: whether an employee may take a shift on a date
//! - [`required_staff`]: a shift's effective headcount on a date
//! - [`staffing_order`]: triggers ahead of their dependent shifts
//! - [`RotationTracker`]: per-employee shift-category runs across rest days
//!
//! # After generation
//!
//! - [`audit_schedule`]: advisory consecutive-day, weekly-hour and
//!   understaffing findings
//! - [`RosterKpi`]: coverage and workload metrics

mod audit;
mod conflict;
mod kpi;
mod roster;
mod rotation;
mod staffing;

pub use audit::{audit_schedule, Severity, Violation, ViolationType};
pub use conflict::{check_conflicts, check_conflicts_by_id, is_permissible, Conflict};
pub use kpi::{EmployeeKpi, IntensityBand, RosterKpi, ShiftUsage};
pub use roster::{generate, GenerationOptions, GenerationRequest, RosterScheduler};
pub use rotation::{RotationState, RotationTracker};
pub use staffing::{cyclic_dependencies, required_base, required_staff, shortage, staffing_order};
