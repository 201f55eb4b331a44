//! Roster generation strategies.
//!
//! # Strategies
//!
//! - **Greedy**: day-by-day, shift-by-shift assignment of the locally
//!   best-scoring candidates, without backtracking.
//! - **ConstraintSearch**: reserved for a propagation/backtracking search;
//!   currently an honest alias for Greedy.
//! - **Hybrid** (default): Greedy followed by local-search refinement.
//!
//! Unfilled slots are never an error — a shortfall surfaces later as a
//! staffing-rule violation.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

pub mod local_search;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Employee, PreferenceKind, Roster, Shift};
use crate::policy::GenerationPolicy;

/// How a roster is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Locally best-scoring candidates, no backtracking.
    Greedy,
    /// Falls back to greedy; real backtracking search is not implemented.
    ConstraintSearch,
    /// Greedy followed by local search.
    #[default]
    Hybrid,
}

/// Pre-seeds a roster with approved day-off requests.
///
/// Every approved day-off preference inside the roster's month becomes a
/// day-off entry. Insertion goes through [`Roster::set`], so a re-run on a
/// non-empty roster replaces whatever was there — the day off always wins.
pub fn apply_day_off_requests(
    roster: &mut Roster,
    employees: &[Employee],
    policy: &GenerationPolicy,
) {
    for employee in employees {
        for pref in &employee.preferences {
            if pref.kind != PreferenceKind::DayOff || !pref.is_approved() {
                continue;
            }
            if let Some(day) = roster.month.day_of(pref.date) {
                roster.set(&employee.id, day, &policy.day_off_shift_id);
            }
        }
    }
}

/// Length of the consecutive worked-day run ending the day before `day`.
///
/// Day-off entries break a run.
pub(crate) fn consecutive_run_before(
    roster: &Roster,
    employee_id: &str,
    day: u32,
    policy: &GenerationPolicy,
) -> u32 {
    let mut run = 0;
    let mut d = day;
    while d > 1 {
        d -= 1;
        match roster.entry_for(employee_id, d) {
            Some(entry) if !policy.is_day_off(&entry.shift_id) => run += 1,
            _ => break,
        }
    }
    run
}

/// Scores one (employee, day, shift) candidacy.
///
/// Starts from a base of 10 and accumulates: +20 for an approved
/// preferred-shift match on this date, -50 for an avoid-shift match
/// (any status), -2 per shift of distance from the ideal monthly load,
/// +15 when the employee's role is required by the shift, and -10 per day
/// a prospective consecutive run extends past 3 days.
pub fn candidate_score(
    employee: &Employee,
    date: chrono::NaiveDate,
    shift: &Shift,
    assigned_count: u32,
    run_before: u32,
    policy: &GenerationPolicy,
) -> f64 {
    let mut score = 10.0;

    for pref in &employee.preferences {
        if pref.date != date || !pref.targets_shift(&shift.id) {
            continue;
        }
        match pref.kind {
            PreferenceKind::PreferredShift if pref.is_approved() => score += 20.0,
            PreferenceKind::AvoidShift => score -= 50.0,
            _ => {}
        }
    }

    score -= 2.0 * (assigned_count as f64 - policy.target_monthly_shifts as f64).abs();

    if shift.requires_role(&employee.role) {
        score += 15.0;
    }

    let prospective_run = run_before + 1;
    if prospective_run >= 4 {
        score -= 10.0 * (prospective_run - 3) as f64;
    }

    score
}

/// Fills understaffed (working day, shift) cells greedily.
///
/// Iterates calendar days ascending, skipping non-working days, and shifts
/// in input order, skipping the day-off shift. For each cell needing staff,
/// ranks eligible employees by [`candidate_score`] descending (stable, so
/// ties keep the input employee order) and assigns the top of the pool.
/// Employees already assigned that day, at the consecutive-day cutoff, or
/// explicitly unavailable are excluded outright.
pub fn greedy_fill(
    roster: &mut Roster,
    employees: &[Employee],
    shifts: &[Shift],
    policy: &GenerationPolicy,
) {
    // Non-day-off counts per employee, seeded from pre-existing entries.
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for employee in employees {
        let assigned = roster
            .entries_for_employee(&employee.id)
            .filter(|e| !policy.is_day_off(&e.shift_id))
            .count() as u32;
        counts.insert(&employee.id, assigned);
    }

    for day in roster.month.days() {
        let date = roster.month.date(day);
        if !policy.is_working_day(date) {
            continue;
        }

        for shift in shifts.iter().filter(|s| !policy.is_day_off(&s.id)) {
            let assigned = roster.assigned_count(day, &shift.id);
            let needed = shift.min_staff.saturating_sub(assigned);
            if needed == 0 {
                continue;
            }

            let mut pool: Vec<(&Employee, f64)> = Vec::new();
            for employee in employees {
                if roster.entry_for(&employee.id, day).is_some() {
                    continue;
                }
                if !employee.is_available(date) {
                    continue;
                }
                let run = consecutive_run_before(roster, &employee.id, day, policy);
                if run >= policy.max_consecutive_days {
                    continue;
                }
                let count = counts.get(employee.id.as_str()).copied().unwrap_or(0);
                let score = candidate_score(employee, date, shift, count, run, policy);
                pool.push((employee, score));
            }

            // Stable sort: equal scores keep the input employee order.
            pool.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            for (employee, _) in pool.into_iter().take(needed as usize) {
                roster.set(&employee.id, day, &shift.id);
                *counts.entry(employee.id.as_str()).or_insert(0) += 1;
            }
        }
    }

    debug!(entries = roster.len(), "greedy fill complete");
}
