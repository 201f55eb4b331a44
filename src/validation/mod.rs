//! Rule-based roster validation.
//!
//! Checks a roster against the configured rule set and reports every
//! breach as a [`RuleViolation`] carrying the rule's severity and
//! priority. Evaluation is deterministic and idempotent: the same roster
//! and rules always yield the same violation list.
//!
//! # Dispatch
//! One evaluator function per [`RuleKind`] variant. Disabled rules are
//! skipped; unknown kinds are logged and skipped so rule configs from
//! newer versions degrade gracefully instead of failing.
//!
//! # Indices
//! [`RuleContext`] pre-builds (day, shift) → assignees and
//! (employee, day) → shift maps once per pass, so individual rules avoid
//! rescanning the full entry list inside their loops.
//!
//! # Rule parameter defaults
//!
//! | Kind | Parameter | Default |
//! |------|-----------|---------|
//! | max_consecutive_work_days | max_days | 5 |
//! | min_employees_per_shift | min | 1 |
//! | max_employees_per_shift | max | 10 |
//! | max_hours_per_week | max_hours | 40 |
//! | min_rest_between_shifts | hours | 12 |
//! | required_roles_per_shift | min_count | 1 |
//! | max_shifts_per_week | max | 5 |
//! | max_hours_per_month | max_hours | 160 |

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::models::{
    Employee, Roster, RosterMonth, RosterRule, RuleKind, RuleViolation, Shift,
};
use crate::policy::GenerationPolicy;

const DEFAULT_MAX_CONSECUTIVE_DAYS: u32 = 5;
const DEFAULT_MIN_EMPLOYEES: u32 = 1;
const DEFAULT_MAX_EMPLOYEES: u32 = 10;
const DEFAULT_MAX_WEEK_HOURS: f64 = 40.0;
const DEFAULT_MIN_REST_HOURS: f64 = 12.0;
const DEFAULT_MIN_ROLE_COUNT: u32 = 1;
const DEFAULT_MAX_WEEK_SHIFTS: u32 = 5;
const DEFAULT_MAX_MONTH_HOURS: f64 = 160.0;

/// Pre-built lookup indices over one roster, shared by all rule evaluators
/// within a single validation pass.
pub struct RuleContext<'a> {
    month: RosterMonth,
    employees: &'a [Employee],
    shifts: &'a [Shift],
    policy: &'a GenerationPolicy,
    shift_by_id: HashMap<&'a str, &'a Shift>,
    employee_by_id: HashMap<&'a str, &'a Employee>,
    /// (day, shift id) → assigned employee ids, in entry order.
    by_cell: HashMap<(u32, &'a str), Vec<&'a str>>,
    /// (employee id, day) → shift id, every entry including day-offs.
    assignment: HashMap<(&'a str, u32), &'a str>,
    /// employee id → day-sorted (day, shift id) pairs, day-offs excluded.
    work_days: HashMap<&'a str, Vec<(u32, &'a str)>>,
}

impl<'a> RuleContext<'a> {
    /// Builds the indices for one validation pass.
    pub fn build(
        roster: &'a Roster,
        employees: &'a [Employee],
        shifts: &'a [Shift],
        policy: &'a GenerationPolicy,
    ) -> Self {
        let shift_by_id = shifts.iter().map(|s| (s.id.as_str(), s)).collect();
        let employee_by_id = employees.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut by_cell: HashMap<(u32, &str), Vec<&str>> = HashMap::new();
        let mut assignment: HashMap<(&str, u32), &str> = HashMap::new();
        let mut work_days: HashMap<&str, Vec<(u32, &str)>> = HashMap::new();

        for entry in &roster.entries {
            assignment.insert((entry.employee_id.as_str(), entry.day), &entry.shift_id);
            if policy.is_day_off(&entry.shift_id) {
                continue;
            }
            by_cell
                .entry((entry.day, entry.shift_id.as_str()))
                .or_default()
                .push(&entry.employee_id);
            work_days
                .entry(entry.employee_id.as_str())
                .or_default()
                .push((entry.day, &entry.shift_id));
        }
        for days in work_days.values_mut() {
            days.sort_by_key(|(day, _)| *day);
        }

        Self {
            month: roster.month,
            employees,
            shifts,
            policy,
            shift_by_id,
            employee_by_id,
            by_cell,
            assignment,
            work_days,
        }
    }

    /// Headcount assigned to a (day, shift) cell.
    fn headcount(&self, day: u32, shift_id: &str) -> u32 {
        self.by_cell
            .get(&(day, shift_id))
            .map(|ids| ids.len() as u32)
            .unwrap_or(0)
    }

    /// Non-day-off shifts, in input order.
    fn staffed_shifts(&self) -> impl Iterator<Item = &'a Shift> + '_ {
        self.shifts
            .iter()
            .filter(|s| !self.policy.is_day_off(&s.id))
    }

    /// Hour value of a shift id, 0 for unknown shifts.
    fn shift_hours(&self, shift_id: &str) -> f64 {
        self.shift_by_id.get(shift_id).map(|s| s.hours).unwrap_or(0.0)
    }

    /// Day-sorted non-day-off entries of an employee.
    fn work_days_of(&self, employee_id: &str) -> &[(u32, &'a str)] {
        self.work_days
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Week-bucketed hour totals of an employee, keyed by week.
    fn weekly_hours(&self, employee_id: &str) -> BTreeMap<i64, f64> {
        let mut weeks = BTreeMap::new();
        for (day, shift_id) in self.work_days_of(employee_id) {
            *weeks.entry(self.month.week_key(*day)).or_insert(0.0) +=
                self.shift_hours(shift_id);
        }
        weeks
    }

    /// Week-bucketed shift counts of an employee, keyed by week.
    fn weekly_shift_counts(&self, employee_id: &str) -> BTreeMap<i64, u32> {
        let mut weeks = BTreeMap::new();
        for (day, _) in self.work_days_of(employee_id) {
            *weeks.entry(self.month.week_key(*day)).or_insert(0) += 1;
        }
        weeks
    }
}

fn display_name(employee: &Employee) -> &str {
    if employee.name.is_empty() {
        &employee.id
    } else {
        &employee.name
    }
}

/// Evaluates every enabled rule against a roster.
///
/// Violations across rules are concatenated in rule order. Unknown rule
/// kinds contribute nothing and are logged at `warn`.
pub fn evaluate(
    roster: &Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
) -> Vec<RuleViolation> {
    let ctx = RuleContext::build(roster, employees, shifts, policy);
    let mut violations = Vec::new();

    for rule in rules.iter().filter(|r| r.enabled) {
        match &rule.kind {
            RuleKind::MaxConsecutiveWorkDays => {
                check_max_consecutive_work_days(rule, &ctx, &mut violations)
            }
            RuleKind::MinEmployeesPerShift => {
                check_min_employees_per_shift(rule, &ctx, &mut violations)
            }
            RuleKind::MaxEmployeesPerShift => {
                check_max_employees_per_shift(rule, &ctx, &mut violations)
            }
            RuleKind::MaxHoursPerWeek => check_max_hours_per_week(rule, &ctx, &mut violations),
            RuleKind::ApprovedDayOffRequests => {
                check_approved_day_off_requests(rule, &ctx, &mut violations)
            }
            RuleKind::MinRestBetweenShifts => {
                check_min_rest_between_shifts(rule, &ctx, &mut violations)
            }
            RuleKind::RequiredRolesPerShift => {
                check_required_roles_per_shift(rule, &ctx, &mut violations)
            }
            RuleKind::MaxShiftsPerWeek => check_max_shifts_per_week(rule, &ctx, &mut violations),
            RuleKind::MaxHoursPerMonth => check_max_hours_per_month(rule, &ctx, &mut violations),
            RuleKind::Unknown(name) => {
                warn!(kind = %name, "skipping unknown rule kind");
            }
        }
    }

    violations
}

/// One violation per day a consecutive run extends beyond `max_days`.
fn check_max_consecutive_work_days(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let max_days = rule.config.max_days.unwrap_or(DEFAULT_MAX_CONSECUTIVE_DAYS);

    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        let mut run: u32 = 0;
        let mut prev_day: Option<u32> = None;

        for (day, _) in ctx.work_days_of(&employee.id) {
            run = match prev_day {
                Some(p) if *day == p + 1 => run + 1,
                _ => 1,
            };
            prev_day = Some(*day);

            if run > max_days {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "{} works {} consecutive days by day {} (limit {})",
                            display_name(employee),
                            run,
                            day,
                            max_days
                        ),
                    )
                    .for_employee(&employee.id)
                    .on_day(*day),
                );
            }
        }
    }
}

/// Understaffed (day, shift) cells over the full month grid.
fn check_min_employees_per_shift(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let min = rule.config.min.unwrap_or(DEFAULT_MIN_EMPLOYEES);

    for day in ctx.month.days() {
        for shift in ctx.staffed_shifts() {
            let count = ctx.headcount(day, &shift.id);
            if count < min {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "Shift '{}' on day {} has {} assigned, needs at least {}",
                            shift.name, day, count, min
                        ),
                    )
                    .on_day(day)
                    .for_shift(&shift.id),
                );
            }
        }
    }
}

/// Overstaffed (day, shift) cells over the full month grid.
fn check_max_employees_per_shift(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let max = rule.config.max.unwrap_or(DEFAULT_MAX_EMPLOYEES);

    for day in ctx.month.days() {
        for shift in ctx.staffed_shifts() {
            let count = ctx.headcount(day, &shift.id);
            if count > max {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "Shift '{}' on day {} has {} assigned, allows at most {}",
                            shift.name, day, count, max
                        ),
                    )
                    .on_day(day)
                    .for_shift(&shift.id),
                );
            }
        }
    }
}

/// Weekly hour totals over Sunday-to-Saturday weeks.
fn check_max_hours_per_week(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let max_hours = rule.config.max_hours.unwrap_or(DEFAULT_MAX_WEEK_HOURS);

    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        for (week, hours) in ctx.weekly_hours(&employee.id) {
            if hours > max_hours {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "{} is scheduled {} hours in the week of day {} (limit {})",
                            display_name(employee),
                            hours,
                            week.max(1),
                            max_hours
                        ),
                    )
                    .for_employee(&employee.id),
                );
            }
        }
    }
}

/// Approved in-month day-off requests that the roster does not honor.
fn check_approved_day_off_requests(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        for pref in &employee.preferences {
            if pref.kind != crate::models::PreferenceKind::DayOff || !pref.is_approved() {
                continue;
            }
            let Some(day) = ctx.month.day_of(pref.date) else {
                continue;
            };
            let honored = ctx
                .assignment
                .get(&(employee.id.as_str(), day))
                .map(|shift_id| ctx.policy.is_day_off(shift_id))
                .unwrap_or(false);
            if !honored {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "Approved day off for {} on day {} is not scheduled",
                            display_name(employee),
                            day
                        ),
                    )
                    .for_employee(&employee.id)
                    .on_day(day),
                );
            }
        }
    }
}

/// Rest hours between shifts on immediately consecutive calendar days.
///
/// Rest is measured from the previous shift's end time to the next
/// shift's start time, wrapping past midnight when the end time is later
/// in the day than the start time. Shifts without start/end times are
/// skipped.
fn check_min_rest_between_shifts(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let min_rest = rule.config.hours.unwrap_or(DEFAULT_MIN_REST_HOURS);

    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        let days = ctx.work_days_of(&employee.id);
        for pair in days.windows(2) {
            let (prev_day, prev_shift_id) = pair[0];
            let (next_day, next_shift_id) = pair[1];
            if next_day != prev_day + 1 {
                continue;
            }
            let (Some(prev), Some(next)) = (
                ctx.shift_by_id.get(prev_shift_id),
                ctx.shift_by_id.get(next_shift_id),
            ) else {
                continue;
            };
            let (Some(end), Some(start)) = (prev.end, next.start) else {
                continue;
            };

            let gap = start.signed_duration_since(end);
            let rest_hours = if gap >= chrono::Duration::zero() {
                gap.num_minutes() as f64 / 60.0
            } else {
                (gap + chrono::Duration::hours(24)).num_minutes() as f64 / 60.0
            };

            if rest_hours < min_rest {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "{} has {} hours rest between day {} and day {} (minimum {})",
                            display_name(employee),
                            rest_hours,
                            prev_day,
                            next_day,
                            min_rest
                        ),
                    )
                    .for_employee(&employee.id)
                    .on_day(next_day),
                );
            }
        }
    }
}

/// Role headcount per (day, shift) cell. No-op without a configured role.
fn check_required_roles_per_shift(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let Some(role) = rule.config.role.as_deref() else {
        return;
    };
    let min_count = rule.config.min_count.unwrap_or(DEFAULT_MIN_ROLE_COUNT);

    for day in ctx.month.days() {
        for shift in ctx.staffed_shifts() {
            let count = ctx
                .by_cell
                .get(&(day, shift.id.as_str()))
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| ctx.employee_by_id.get(id))
                        .filter(|e| e.role == role)
                        .count() as u32
                })
                .unwrap_or(0);
            if count < min_count {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "Shift '{}' on day {} has {} of role '{}', needs at least {}",
                            shift.name, day, count, role, min_count
                        ),
                    )
                    .on_day(day)
                    .for_shift(&shift.id),
                );
            }
        }
    }
}

/// Weekly non-day-off shift counts over Sunday-to-Saturday weeks.
fn check_max_shifts_per_week(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let max = rule.config.max.unwrap_or(DEFAULT_MAX_WEEK_SHIFTS);

    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        for (week, count) in ctx.weekly_shift_counts(&employee.id) {
            if count > max {
                out.push(
                    RuleViolation::of(
                        rule,
                        format!(
                            "{} has {} shifts in the week of day {} (limit {})",
                            display_name(employee),
                            count,
                            week.max(1),
                            max
                        ),
                    )
                    .for_employee(&employee.id),
                );
            }
        }
    }
}

/// Whole-month hour totals, one violation per employee over the limit.
fn check_max_hours_per_month(
    rule: &RosterRule,
    ctx: &RuleContext<'_>,
    out: &mut Vec<RuleViolation>,
) {
    let max_hours = rule.config.max_hours.unwrap_or(DEFAULT_MAX_MONTH_HOURS);

    for employee in ctx.employees.iter().filter(|e| rule.applies_to(e)) {
        let total: f64 = ctx
            .work_days_of(&employee.id)
            .iter()
            .map(|(_, shift_id)| ctx.shift_hours(shift_id))
            .sum();
        if total > max_hours {
            out.push(
                RuleViolation::of(
                    rule,
                    format!(
                        "{} is scheduled {} hours this month (limit {})",
                        display_name(employee),
                        total,
                        max_hours
                    ),
                )
                .for_employee(&employee.id),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preference, RuleConfig, RuleScope, Severity};
    use chrono::{NaiveDate, NaiveTime};

    fn month() -> RosterMonth {
        // June 2024: day 1 is a Saturday, day 2 a Sunday.
        RosterMonth::new(2024, 6).unwrap()
    }

    fn policy() -> GenerationPolicy {
        GenerationPolicy::default().with_day_off_shift_id("off")
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day_shift() -> Shift {
        Shift::new("day", 8.0)
            .with_name("Day")
            .with_times(time(8, 0), time(16, 0))
    }

    fn night_shift() -> Shift {
        Shift::new("night", 8.0)
            .with_name("Night")
            .with_times(time(22, 0), time(6, 0))
    }

    fn off_shift() -> Shift {
        Shift::new("off", 0.0).with_name("Day off")
    }

    fn rule(kind: RuleKind, config: RuleConfig) -> RosterRule {
        RosterRule::new(kind, Severity::Error).with_config(config)
    }

    #[test]
    fn test_min_employees_flags_understaffed_cell() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        roster.set("E1", 3, "day");

        let rules = vec![rule(
            RuleKind::MinEmployeesPerShift,
            RuleConfig {
                min: Some(2),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());

        // Day 3 gets exactly one violation citing counts and shift name.
        let day3: Vec<_> = violations
            .iter()
            .filter(|v| v.day == Some(3) && v.shift_id.as_deref() == Some("day"))
            .collect();
        assert_eq!(day3.len(), 1);
        assert!(day3[0].message.contains("Day"));
        assert!(day3[0].message.contains("day 3"));
        assert!(day3[0].message.contains('1'));
        assert!(day3[0].message.contains('2'));
        assert_eq!(day3[0].severity, Severity::Error);

        // The grid covers the whole month: empty cells are violations too.
        assert_eq!(violations.len(), month().day_count() as usize);
    }

    #[test]
    fn test_max_employees_flags_overstaffed_cell() {
        let employees: Vec<Employee> = (0..3)
            .map(|i| Employee::new(format!("E{i}"), "nurse"))
            .collect();
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for e in &employees {
            roster.set(&e.id, 5, "day");
        }

        let rules = vec![rule(
            RuleKind::MaxEmployeesPerShift,
            RuleConfig {
                max: Some(2),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].day, Some(5));
    }

    #[test]
    fn test_max_consecutive_one_violation_per_excess_day() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in 3..=8 {
            roster.set("E1", day, "day");
        }

        let rules = vec![rule(
            RuleKind::MaxConsecutiveWorkDays,
            RuleConfig {
                max_days: Some(3),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());

        // Days 6, 7, 8 exceed a 3-day limit.
        assert_eq!(violations.len(), 3);
        let days: Vec<_> = violations.iter().map(|v| v.day.unwrap()).collect();
        assert_eq!(days, vec![6, 7, 8]);
    }

    #[test]
    fn test_max_consecutive_gap_resets_run() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in [3, 4, 5, 7, 8, 9] {
            roster.set("E1", day, "day");
        }

        let rules = vec![rule(
            RuleKind::MaxConsecutiveWorkDays,
            RuleConfig {
                max_days: Some(3),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_day_off_entries_do_not_extend_runs() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        roster.set("E1", 3, "day");
        roster.set("E1", 4, "day");
        roster.set("E1", 5, "off");
        roster.set("E1", 6, "day");
        roster.set("E1", 7, "day");

        let rules = vec![rule(
            RuleKind::MaxConsecutiveWorkDays,
            RuleConfig {
                max_days: Some(3),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_max_hours_per_week_cites_totals() {
        let employees = vec![Employee::new("E1", "nurse").with_name("Anna")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        // Days 3-8 are Monday through Saturday of the week starting Sunday
        // day 2: six 8-hour shifts = 48 hours.
        for day in 3..=8 {
            roster.set("E1", day, "day");
        }

        let rules = vec![rule(
            RuleKind::MaxHoursPerWeek,
            RuleConfig {
                max_hours: Some(40.0),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("48"));
        assert!(violations[0].message.contains("40"));
        assert_eq!(violations[0].employee_id.as_deref(), Some("E1"));
    }

    #[test]
    fn test_week_boundary_splits_hours() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        // Three shifts at the end of one week (days 6-8), three at the start
        // of the next (days 9-11): 24 hours each, no breach.
        for day in 6..=11 {
            roster.set("E1", day, "day");
        }

        let rules = vec![rule(
            RuleKind::MaxHoursPerWeek,
            RuleConfig {
                max_hours: Some(40.0),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_approved_day_off_missing_is_flagged() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let employees = vec![Employee::new("E1", "nurse")
            .with_preference(Preference::day_off("E1", date).approved())];
        let shifts = vec![day_shift(), off_shift()];
        let roster = Roster::new(month());

        let rules = vec![rule(RuleKind::ApprovedDayOffRequests, RuleConfig::default())];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].day, Some(15));
        assert_eq!(violations[0].employee_id.as_deref(), Some("E1"));
    }

    #[test]
    fn test_approved_day_off_honored_is_clean() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let employees = vec![Employee::new("E1", "nurse")
            .with_preference(Preference::day_off("E1", date).approved())];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        roster.set("E1", 15, "off");

        let rules = vec![rule(RuleKind::ApprovedDayOffRequests, RuleConfig::default())];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_pending_day_off_not_enforced() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let employees =
            vec![Employee::new("E1", "nurse").with_preference(Preference::day_off("E1", date))];
        let shifts = vec![day_shift(), off_shift()];
        let roster = Roster::new(month());

        let rules = vec![rule(RuleKind::ApprovedDayOffRequests, RuleConfig::default())];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_min_rest_short_gap_flagged() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), night_shift(), off_shift()];
        let mut roster = Roster::new(month());
        // Night ends 06:00, day starts 08:00 next day: 2 hours rest.
        roster.set("E1", 3, "night");
        roster.set("E1", 4, "day");

        let rules = vec![rule(
            RuleKind::MinRestBetweenShifts,
            RuleConfig {
                hours: Some(12.0),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].day, Some(4));
        assert!(violations[0].message.contains('2'));
    }

    #[test]
    fn test_min_rest_wraps_past_midnight() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        // Day ends 16:00, day starts 08:00 next day: 16 hours rest.
        roster.set("E1", 3, "day");
        roster.set("E1", 4, "day");

        let rules = vec![rule(
            RuleKind::MinRestBetweenShifts,
            RuleConfig {
                hours: Some(12.0),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_min_rest_skips_shifts_without_times() {
        let employees = vec![Employee::new("E1", "nurse")];
        let untimed = Shift::new("untimed", 8.0);
        let shifts = vec![untimed, night_shift(), off_shift()];
        let mut roster = Roster::new(month());
        roster.set("E1", 3, "night");
        roster.set("E1", 4, "untimed");

        let rules = vec![rule(RuleKind::MinRestBetweenShifts, RuleConfig::default())];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_required_roles_counts_matching_role() {
        let employees = vec![
            Employee::new("E1", "doctor"),
            Employee::new("E2", "nurse"),
        ];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        roster.set("E1", 2, "day"); // Doctor only
        roster.set("E1", 3, "day");
        roster.set("E2", 3, "day"); // Nurse present

        let rules = vec![rule(
            RuleKind::RequiredRolesPerShift,
            RuleConfig {
                role: Some("nurse".into()),
                min_count: Some(1),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());

        assert!(violations.iter().any(|v| v.day == Some(2)));
        assert!(!violations.iter().any(|v| v.day == Some(3)));
    }

    #[test]
    fn test_required_roles_without_role_is_noop() {
        let employees = vec![Employee::new("E1", "doctor")];
        let shifts = vec![day_shift(), off_shift()];
        let roster = Roster::new(month());

        let rules = vec![rule(RuleKind::RequiredRolesPerShift, RuleConfig::default())];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_max_shifts_per_week() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in 3..=8 {
            roster.set("E1", day, "day"); // 6 shifts in one week
        }

        let rules = vec![rule(
            RuleKind::MaxShiftsPerWeek,
            RuleConfig {
                max: Some(5),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains('6'));
    }

    #[test]
    fn test_max_hours_per_month() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in [3, 4, 5, 6, 7, 10] {
            roster.set("E1", day, "day"); // 48 hours total
        }

        let rules = vec![rule(
            RuleKind::MaxHoursPerMonth,
            RuleConfig {
                max_hours: Some(40.0),
                ..Default::default()
            },
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("48"));
    }

    #[test]
    fn test_unknown_rule_kind_is_skipped() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let roster = Roster::new(month());

        let rules = vec![RosterRule::new(
            RuleKind::Unknown("weekend_rotation".into()),
            Severity::Error,
        )];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), off_shift()];
        let roster = Roster::new(month());

        let rules =
            vec![rule(RuleKind::MinEmployeesPerShift, RuleConfig::default()).disabled()];
        let violations = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_scope_limits_employee_rules() {
        let employees = vec![
            Employee::new("E1", "nurse"),
            Employee::new("E2", "doctor"),
        ];
        let shifts = vec![day_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in 3..=8 {
            roster.set("E1", day, "day");
            roster.set("E2", day, "day");
        }

        let scoped = rule(
            RuleKind::MaxShiftsPerWeek,
            RuleConfig {
                max: Some(5),
                ..Default::default()
            },
        )
        .with_scope(RuleScope {
            employee_ids: vec![],
            roles: vec!["nurse".into()],
        });
        let violations = evaluate(&roster, &employees, &shifts, &[scoped], &policy());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].employee_id.as_deref(), Some("E1"));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let employees = vec![Employee::new("E1", "nurse")];
        let shifts = vec![day_shift(), night_shift(), off_shift()];
        let mut roster = Roster::new(month());
        for day in 3..=9 {
            roster.set("E1", day, if day % 2 == 0 { "day" } else { "night" });
        }

        let rules = vec![
            rule(RuleKind::MaxConsecutiveWorkDays, RuleConfig::default()),
            rule(RuleKind::MinEmployeesPerShift, RuleConfig::default()),
            rule(RuleKind::MinRestBetweenShifts, RuleConfig::default()),
            rule(RuleKind::MaxHoursPerWeek, RuleConfig::default()),
        ];
        let first = evaluate(&roster, &employees, &shifts, &rules, &policy());
        let second = evaluate(&roster, &employees, &shifts, &rules, &policy());
        assert_eq!(first, second);
    }
}
