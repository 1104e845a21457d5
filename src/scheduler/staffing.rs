//! Dynamic staffing resolution.
//!
//! A shift's headcount requirement normally comes from the shift itself.
//! A [`DynamicStaffingRule`](crate::models::DynamicStaffingRule) can make it
//! depend on another shift's headcount on the same day, so the requirement
//! must be re-resolved on every query: the trigger's count changes while
//! the day is being staffed.
//!
//! [`staffing_order`] puts every trigger ahead of the shifts that depend on
//! it, so a dependent shift is only staffed once its trigger is settled.

use chrono::NaiveDate;

use crate::models::{Schedule, Shift, SpecialRules};

/// Effective required headcount of `shift` on `date`, given the schedule
/// built so far.
///
/// # Example
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_roster::models::{DynamicStaffingRule, Schedule, Shift, SpecialRules};
/// use u_roster::scheduler::required_staff;
///
/// let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let early = Shift::new("early", t(7), t(15));
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let special = SpecialRules {
///     dynamic_staffing: vec![DynamicStaffingRule::new("early", "dawn")],
///     ..SpecialRules::default()
/// };
///
/// let mut schedule = Schedule::with_days([date], ["dawn", "early"]);
/// assert_eq!(required_staff(&early, date, &schedule, &special), 2);
///
/// schedule.day_mut(date).unwrap().assign("E1", "dawn");
/// assert_eq!(required_staff(&early, date, &schedule, &special), 1);
/// ```
pub fn required_staff(
    shift: &Shift,
    date: NaiveDate,
    schedule: &Schedule,
    special_rules: &SpecialRules,
) -> u32 {
    match special_rules.dynamic_rule_for(&shift.id) {
        Some(rule) => rule.requirement(schedule.count(&rule.trigger_shift, date)),
        None => required_base(shift),
    }
}

/// Base headcount, ignoring dynamic rules.
#[inline]
pub fn required_base(shift: &Shift) -> u32 {
    shift.required_staff
}

/// Headcount still missing for `shift` on `date` (0 when met).
pub fn shortage(
    shift: &Shift,
    date: NaiveDate,
    schedule: &Schedule,
    special_rules: &SpecialRules,
) -> u32 {
    required_staff(shift, date, schedule, special_rules).saturating_sub(schedule.count(&shift.id, date))
}

/// Shifts in the order a day should be staffed.
///
/// Each dynamic rule's trigger comes before its dependent shift; otherwise
/// the configured order is kept. Shifts caught in a dependency cycle keep
/// their configured order at the end.
///
/// # Algorithm
/// Repeatedly takes the first pending shift that waits on no pending
/// trigger. O(s² · r) for s shifts and r rules.
pub fn staffing_order<'a>(shifts: &'a [Shift], special_rules: &SpecialRules) -> Vec<&'a Shift> {
    let (mut ordered, cyclic) = resolve_order(shifts, special_rules);
    ordered.extend(cyclic);
    ordered
}

/// IDs of shifts whose dynamic rules depend on each other in a cycle,
/// including shifts that depend on such a cycle. Empty when every shift
/// can be ordered.
pub fn cyclic_dependencies<'a>(shifts: &'a [Shift], special_rules: &SpecialRules) -> Vec<&'a str> {
    let (_, cyclic) = resolve_order(shifts, special_rules);
    cyclic.into_iter().map(|s| s.id.as_str()).collect()
}

fn resolve_order<'a>(
    shifts: &'a [Shift],
    special_rules: &SpecialRules,
) -> (Vec<&'a Shift>, Vec<&'a Shift>) {
    let mut ordered = Vec::with_capacity(shifts.len());
    let mut pending: Vec<&'a Shift> = shifts.iter().collect();

    while let Some(pos) = pending
        .iter()
        .position(|s| !waits_on_pending(s, &pending, special_rules))
    {
        ordered.push(pending.remove(pos));
    }
    (ordered, pending)
}

// A shift naming itself as trigger does not wait on itself.
fn waits_on_pending(shift: &Shift, pending: &[&Shift], special_rules: &SpecialRules) -> bool {
    special_rules.dynamic_staffing.iter().any(|rule| {
        rule.dependent_shift == shift.id
            && rule.trigger_shift != shift.id
            && pending.iter().any(|p| p.id == rule.trigger_shift)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DynamicStaffingRule;
    use chrono::NaiveTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn shift(id: &str, staff: u32) -> Shift {
        Shift::new(
            id,
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        )
        .with_required_staff(staff)
    }

    fn special() -> SpecialRules {
        SpecialRules {
            dynamic_staffing: vec![DynamicStaffingRule::new("early", "dawn")],
            ..SpecialRules::default()
        }
    }

    #[test]
    fn test_base_requirement() {
        let schedule = Schedule::with_days([date()], ["late"]);
        let late = shift("late", 3);
        assert_eq!(required_staff(&late, date(), &schedule, &special()), 3);
        assert_eq!(required_base(&late), 3);
    }

    #[test]
    fn test_dependent_tracks_trigger() {
        let mut schedule = Schedule::with_days([date()], ["dawn", "early"]);
        // Base staff of the dependent shift is ignored once a rule applies.
        let early = shift("early", 5);
        assert_eq!(required_staff(&early, date(), &schedule, &special()), 2);

        schedule.day_mut(date()).unwrap().assign("E1", "dawn");
        assert_eq!(required_staff(&early, date(), &schedule, &special()), 1);

        schedule.day_mut(date()).unwrap().assign("E2", "dawn");
        assert_eq!(required_staff(&early, date(), &schedule, &special()), 1);
    }

    #[test]
    fn test_missing_day_counts_as_empty_trigger() {
        let schedule = Schedule::new();
        let early = shift("early", 1);
        assert_eq!(required_staff(&early, date(), &schedule, &special()), 2);
    }

    #[test]
    fn test_custom_requirements() {
        let special = SpecialRules {
            dynamic_staffing: vec![DynamicStaffingRule::new("early", "dawn").with_requirements(3, 0)],
            ..SpecialRules::default()
        };
        let mut schedule = Schedule::with_days([date()], ["dawn", "early"]);
        let early = shift("early", 1);
        assert_eq!(required_staff(&early, date(), &schedule, &special), 3);
        schedule.day_mut(date()).unwrap().assign("E1", "dawn");
        assert_eq!(required_staff(&early, date(), &schedule, &special), 0);
    }

    #[test]
    fn test_shortage() {
        let mut schedule = Schedule::with_days([date()], ["late"]);
        let late = shift("late", 2);
        assert_eq!(shortage(&late, date(), &schedule, &special()), 2);
        schedule.day_mut(date()).unwrap().assign("E1", "late");
        schedule.day_mut(date()).unwrap().assign("E2", "late");
        schedule.day_mut(date()).unwrap().assign("E3", "late");
        assert_eq!(shortage(&late, date(), &schedule, &special()), 0);
    }

    fn ids<'a>(shifts: &[&'a Shift]) -> Vec<&'a str> {
        shifts.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_order_puts_trigger_first() {
        let shifts = vec![shift("early", 1), shift("late", 1), shift("dawn", 1)];
        let order = staffing_order(&shifts, &special());
        assert_eq!(ids(&order), vec!["late", "dawn", "early"]);
    }

    #[test]
    fn test_order_keeps_configured_order_without_rules() {
        let shifts = vec![shift("b", 1), shift("a", 1), shift("c", 1)];
        let order = staffing_order(&shifts, &SpecialRules::default());
        assert_eq!(ids(&order), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_order_follows_chains() {
        // c <- b <- a: a staffs first even though it is listed last.
        let special = SpecialRules {
            dynamic_staffing: vec![
                DynamicStaffingRule::new("c", "b"),
                DynamicStaffingRule::new("b", "a"),
            ],
            ..SpecialRules::default()
        };
        let shifts = vec![shift("c", 1), shift("b", 1), shift("a", 1)];
        assert_eq!(ids(&staffing_order(&shifts, &special)), vec!["a", "b", "c"]);
        assert!(cyclic_dependencies(&shifts, &special).is_empty());
    }

    #[test]
    fn test_cycle_falls_back_to_configured_order() {
        let special = SpecialRules {
            dynamic_staffing: vec![
                DynamicStaffingRule::new("a", "b"),
                DynamicStaffingRule::new("b", "a"),
                DynamicStaffingRule::new("c", "c"),
            ],
            ..SpecialRules::default()
        };
        let shifts = vec![shift("b", 1), shift("c", 1), shift("a", 1)];
        assert_eq!(ids(&staffing_order(&shifts, &special)), vec!["c", "b", "a"]);
        assert_eq!(cyclic_dependencies(&shifts, &special), vec!["b", "a"]);
    }
}
