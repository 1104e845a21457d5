//! Input validation for rostering problems.
//!
//! Run when configuration is saved, never inside generation. Detects:
//! - Duplicate employee or shift IDs
//! - Minimum weekly hours above the maximum
//! - Special rules referencing unknown employees or shifts
//! - A rotation pair naming the same category twice
//! - Dynamic staffing rules that depend on themselves, or on each other in
//!   a cycle

use crate::models::{Employee, RuleConfig, Shift};
use crate::scheduler::cyclic_dependencies;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// `min_weekly_hours` exceeds `max_weekly_hours`.
    InvalidWeeklyHours,
    /// A special rule names an employee that doesn't exist.
    UnknownEmployee,
    /// A special rule names a shift that doesn't exist.
    UnknownShift,
    /// The rotation pair is not two distinct categories.
    InvalidRotationPair,
    /// A dynamic staffing rule's trigger is its own dependent shift.
    SelfDependentStaffing,
    /// Dynamic staffing rules whose triggers depend on each other.
    CyclicStaffing,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates employees, shifts and rules together.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(employees: &[Employee], shifts: &[Shift], rules: &RuleConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut employee_ids = HashSet::new();
    for e in employees {
        if !employee_ids.insert(e.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }
    }

    let mut shift_ids = HashSet::new();
    for s in shifts {
        if !shift_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", s.id),
            ));
        }
    }

    if rules.min_weekly_hours > rules.max_weekly_hours {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWeeklyHours,
            format!(
                "Minimum weekly hours ({}) exceed maximum ({})",
                rules.min_weekly_hours, rules.max_weekly_hours
            ),
        ));
    }

    if rules.rotation.first == rules.rotation.second {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRotationPair,
            format!("Rotation pair names {:?} twice", rules.rotation.first),
        ));
    }

    let mut check_shift = |shift_id: &str, context: &str| {
        if !shift_ids.contains(shift_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownShift,
                format!("{context} references unknown shift '{shift_id}'"),
            ));
        }
    };

    let special = &rules.special_rules;
    if let Some(fixed) = &special.fixed_role {
        check_shift(&fixed.shift_id, "Fixed-role rule");
    }
    if let Some(excluded) = &special.excluded_shift {
        check_shift(&excluded.shift_id, "Weekday exclusion");
    }
    for rule in &special.dynamic_staffing {
        check_shift(&rule.dependent_shift, "Dynamic staffing rule");
        check_shift(&rule.trigger_shift, "Dynamic staffing rule");
    }
    for shift_id in &special.allow_empty_shifts {
        check_shift(shift_id, "Allow-empty list");
    }

    if let Some(fixed) = &special.fixed_role {
        for employee_id in &fixed.employee_ids {
            if !employee_ids.contains(employee_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownEmployee,
                    format!("Fixed-role rule references unknown employee '{employee_id}'"),
                ));
            }
        }
    }

    for rule in &special.dynamic_staffing {
        if rule.dependent_shift == rule.trigger_shift {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfDependentStaffing,
                format!("Shift '{}' cannot trigger its own staffing", rule.dependent_shift),
            ));
        }
    }

    let cyclic = cyclic_dependencies(shifts, special);
    if !cyclic.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::CyclicStaffing,
            format!(
                "Dynamic staffing rules form a cycle through: {}",
                cyclic.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
