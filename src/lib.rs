//! Staff rostering engine.
//!
//! Assigns employees to daily shifts over a date range, respecting rest
//! days, unavailability and skills, while balancing workload and keeping
//! each employee's early/late rotation continuous across rest days.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `Shift`, `RuleConfig`,
//!   `SpecialRules`, `Schedule`, `DateRange`
//! - **`validation`**: Configuration checks (duplicate IDs, dangling rule
//!   references, inverted limits)
//! - **`dispatching`**: Candidate scoring: `ScoringRule` terms combined by a
//!   `ScoreEngine`
//! - **`scheduler`**: Conflict checking, dynamic staffing, rotation
//!   tracking, the four-phase `RosterScheduler`, audit and KPIs
//! - **`repository`**: Storage boundary (`InMemoryRepository`,
//!   `JsonFileRepository`)
//! - **`service`**: Serialized generation and proposal confirmation over a
//!   repository
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime, Weekday};
//! use u_roster::models::{Employee, RuleConfig, Shift, ShiftCategory};
//! use u_roster::scheduler::generate;
//!
//! let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
//! let shifts = vec![
//!     Shift::new("early", t(7), t(15)).with_category(ShiftCategory::Early),
//!     Shift::new("late", t(15), t(23)).with_category(ShiftCategory::Late),
//! ];
//! let employees = vec![
//!     Employee::new("E1").with_rest_day(Weekday::Wed),
//!     Employee::new("E2"),
//!     Employee::new("E3"),
//! ];
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let schedule = generate(&employees, &shifts, &RuleConfig::default(), start, end).unwrap();
//!
//! let wednesday = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
//! assert_eq!(schedule.shift_of("E1", wednesday), None);
//! assert!(schedule.days().all(|(_, day)| day.count("early") == 1 && day.count("late") == 1));
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events (run summaries at `info`, phase
//! summaries at `debug`, single assignments at `trace`) and never installs
//! a subscriber.

pub mod dispatching;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod validation;
