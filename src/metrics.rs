//! Roster quality metrics.
//!
//! Aggregate indicators computed after generation or validation: staffing
//! coverage, workload balance, and preference satisfaction, each on a 0-100
//! scale, plus violation tallies.
//!
//! # Reference
//! Ernst, Jiang, Krishnamoorthy & Sier (2004), "Staff scheduling and
//! rostering: A review of applications, methods and models"

use serde::{Deserialize, Serialize};

use crate::models::{Employee, PreferenceKind, Roster, RuleViolation, Shift};
use crate::policy::GenerationPolicy;

/// Aggregate quality indicators for a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMetrics {
    /// Non-day-off assignments in the roster.
    pub total_shifts: u32,
    /// Filled staffing demand as a percentage, capped at 100.
    pub coverage_pct: f64,
    /// Workload evenness on a 0-100 scale (100 = perfectly even).
    pub balance_score: f64,
    /// Honored in-month day-off requests as a percentage.
    pub preference_satisfaction_pct: f64,
    /// Total violations recorded against the roster.
    pub violation_count: u32,
    /// Violations with error severity.
    pub error_count: u32,
    /// Violations with warning severity.
    pub warning_count: u32,
}

impl RosterMetrics {
    /// Computes metrics for a roster with no violation record.
    pub fn calculate(
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        policy: &GenerationPolicy,
    ) -> Self {
        Self::with_violations(roster, employees, shifts, policy, &[])
    }

    /// Computes metrics for a roster together with its violation record.
    pub fn with_violations(
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        policy: &GenerationPolicy,
        violations: &[RuleViolation],
    ) -> Self {
        let error_count = violations.iter().filter(|v| v.is_error()).count() as u32;
        Self {
            total_shifts: total_shifts(roster, policy),
            coverage_pct: coverage_pct(roster, shifts, policy),
            balance_score: balance_score(roster, employees, policy),
            preference_satisfaction_pct: preference_satisfaction_pct(roster, employees, policy),
            violation_count: violations.len() as u32,
            error_count,
            warning_count: violations.len() as u32 - error_count,
        }
    }
}

fn total_shifts(roster: &Roster, policy: &GenerationPolicy) -> u32 {
    roster
        .entries
        .iter()
        .filter(|e| !policy.is_day_off(&e.shift_id))
        .count() as u32
}

/// Filled demand over required demand, where demand is the sum of
/// `min_staff` over every (day, shift) cell of the month. Overstaffing can
/// push the raw ratio past 100, so the result is capped there.
fn coverage_pct(roster: &Roster, shifts: &[Shift], policy: &GenerationPolicy) -> f64 {
    let mut required = 0u64;
    let mut filled = 0u64;
    for day in roster.month.days() {
        for shift in shifts {
            if policy.is_day_off(&shift.id) {
                continue;
            }
            required += u64::from(shift.min_staff);
            filled += u64::from(roster.assigned_count(day, &shift.id));
        }
    }
    if required == 0 {
        return 100.0;
    }
    (filled as f64 / required as f64 * 100.0).min(100.0)
}

/// `max(0, 100 - 2 * variance)` of per-employee non-day-off assignment
/// counts. Employees flagged `exclude_from_reports` do not enter the
/// variance.
fn balance_score(roster: &Roster, employees: &[Employee], policy: &GenerationPolicy) -> f64 {
    let counts: Vec<f64> = employees
        .iter()
        .filter(|e| !e.exclude_from_reports)
        .map(|e| {
            roster
                .entries_for_employee(&e.id)
                .filter(|entry| !policy.is_day_off(&entry.shift_id))
                .count() as f64
        })
        .collect();
    if counts.is_empty() {
        return 100.0;
    }
    (100.0 - 2.0 * population_variance(&counts)).max(0.0)
}

/// Percentage of in-month day-off requests (any approval status) honored
/// by the roster. A request is honored when its employee has either no
/// entry or the day-off entry on that day. 100 when there are no requests.
fn preference_satisfaction_pct(
    roster: &Roster,
    employees: &[Employee],
    policy: &GenerationPolicy,
) -> f64 {
    let mut total = 0u32;
    let mut honored = 0u32;
    for employee in employees {
        for pref in &employee.preferences {
            if pref.kind != PreferenceKind::DayOff {
                continue;
            }
            let Some(day) = roster.month.day_of(pref.date) else {
                continue;
            };
            total += 1;
            let off = match roster.entry_for(&employee.id, day) {
                None => true,
                Some(entry) => policy.is_day_off(&entry.shift_id),
            };
            if off {
                honored += 1;
            }
        }
    }
    if total == 0 {
        return 100.0;
    }
    f64::from(honored) / f64::from(total) * 100.0
}

pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
