//! Rostering domain models.
//!
//! Provides the data types for describing a staffing problem and its
//! solution. Every type is `serde`-serializable so the persistence layer can
//! store it as-is.
//!
//! | Type | Role |
//! |------|------|
//! | `Employee` | A person with skills, rest day, preferences |
//! | `Shift` | A daily slot with headcount, skills, rotation category |
//! | `RuleConfig` | Advisory limits and generation-shaping special rules |
//! | `Schedule` | Per-date assignments and headcounts |
//! | `DateRange` | The inclusive planning range |

mod calendar;
mod employee;
mod rules;
mod schedule;
mod shift;

pub use calendar::{weekday_between, DateRange};
pub use employee::Employee;
pub use rules::{
    DynamicStaffingRule, FixedRoleRule, RotationPair, RuleConfig, SpecialRules, WeekdayExclusion,
};
pub use schedule::{AssignmentChange, ChangeKind, DayEntry, Schedule};
pub use shift::{Shift, ShiftCategory};
