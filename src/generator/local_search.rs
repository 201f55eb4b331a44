//! Local-search refinement of a candidate roster.
//!
//! # Algorithm
//!
//! Repeats up to the policy's iteration cap: for every unordered pair of
//! entries sharing a day but not a shift, tentatively swap their shift
//! ids, re-score the whole roster, and keep the swap only on strict
//! improvement. A pass with no improving swap terminates the search.
//! Entries are indexed by day up front — different-day pairs can never
//! improve a same-day rule, so skipping them is pure pruning.
//!
//! Because only improving swaps are kept, the working roster is always the
//! best found so far; an optional deadline checked between pairs makes the
//! search return early with that roster.
//!
//! # Reference
//! Aarts & Lenstra (1997), "Local Search in Combinatorial Optimization"

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::models::{Employee, PreferenceKind, Roster, RosterRule, Shift};
use crate::policy::GenerationPolicy;
use crate::validation;

/// Reward for a satisfied preferred-shift preference, and for an
/// avoid-shift preference that is not violated.
const PREFERENCE_REWARD: f64 = 10.0;
/// Penalty per rule violation.
const VIOLATION_PENALTY: f64 = 100.0;

/// Whole-roster quality score used to accept or reject search moves.
///
/// `-100` per rule violation, `+10` per preferred-shift preference
/// satisfied on its target day, `+10` per avoid-shift preference not
/// violated on its target day. Higher is better.
pub fn schedule_score(
    roster: &Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
) -> f64 {
    let violations = validation::evaluate(roster, employees, shifts, rules, policy);
    preference_component(roster, employees) - VIOLATION_PENALTY * violations.len() as f64
}

/// The preference portion of [`schedule_score`].
pub fn preference_component(roster: &Roster, employees: &[Employee]) -> f64 {
    let mut score = 0.0;
    for employee in employees {
        for pref in &employee.preferences {
            let Some(day) = roster.month.day_of(pref.date) else {
                continue;
            };
            let assigned = roster
                .entry_for(&employee.id, day)
                .map(|e| e.shift_id.as_str());
            match pref.kind {
                PreferenceKind::PreferredShift => {
                    if assigned.is_some() && assigned == pref.shift_id.as_deref() {
                        score += PREFERENCE_REWARD;
                    }
                }
                PreferenceKind::AvoidShift => {
                    if assigned != pref.shift_id.as_deref() {
                        score += PREFERENCE_REWARD;
                    }
                }
                PreferenceKind::DayOff => {}
            }
        }
    }
    score
}

fn swap_shift_ids(roster: &mut Roster, a: usize, b: usize) {
    let tmp = roster.entries[a].shift_id.clone();
    roster.entries[a].shift_id = std::mem::replace(&mut roster.entries[b].shift_id, tmp);
}

fn deadline_reached(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Same-day entry index pairs, the only swap candidates.
fn same_day_pairs(roster: &Roster) -> Vec<(usize, usize)> {
    let mut by_day: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, entry) in roster.entries.iter().enumerate() {
        by_day.entry(entry.day).or_default().push(idx);
    }
    let mut pairs = Vec::new();
    for indices in by_day.values() {
        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                pairs.push((indices[i], indices[j]));
            }
        }
    }
    pairs
}

/// Improves a roster in place via pairwise same-day shift swaps.
///
/// Returns the final whole-roster score. The result never scores below
/// the input: every kept swap is a strict improvement.
pub fn optimize(
    roster: &mut Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
    deadline: Option<Instant>,
) -> f64 {
    let mut best = schedule_score(roster, employees, shifts, rules, policy);
    // Swaps never touch entry days, so the day index survives all passes.
    let pairs = same_day_pairs(roster);

    for pass in 0..policy.optimizer_iteration_cap {
        if deadline_reached(deadline) {
            debug!(pass, score = best, "local search stopped at deadline");
            return best;
        }
        let mut improved = false;

        for &(a, b) in &pairs {
            if roster.entries[a].shift_id == roster.entries[b].shift_id {
                continue;
            }
            if deadline_reached(deadline) {
                debug!(pass, score = best, "local search stopped at deadline");
                return best;
            }
            swap_shift_ids(roster, a, b);
            let score = schedule_score(roster, employees, shifts, rules, policy);
            if score > best {
                best = score;
                improved = true;
            } else {
                swap_shift_ids(roster, a, b);
            }
        }

        if !improved {
            debug!(pass, score = best, "local search converged");
            break;
        }
    }

    best
}

/// A per-focus optimization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationFocus {
    /// Top up understaffed cells.
    Coverage,
    /// Even out per-employee shift counts.
    Balance,
    /// Honor more shift preferences.
    Preferences,
}

impl OptimizationFocus {
    /// All focuses, in suggestion order.
    pub const ALL: [OptimizationFocus; 3] = [Self::Coverage, Self::Balance, Self::Preferences];

    /// The focus name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coverage => "coverage",
            Self::Balance => "balance",
            Self::Preferences => "preferences",
        }
    }
}

impl FromStr for OptimizationFocus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coverage" => Ok(Self::Coverage),
            "balance" => Ok(Self::Balance),
            "preferences" => Ok(Self::Preferences),
            other => Err(EngineError::UnknownOptimization(other.to_string())),
        }
    }
}

impl std::fmt::Display for OptimizationFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Improves a roster in place toward one focus.
///
/// Returns the final whole-roster score. No focus ever degrades the
/// whole-roster score of its input.
pub fn optimize_focus(
    focus: OptimizationFocus,
    roster: &mut Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
) -> f64 {
    match focus {
        OptimizationFocus::Coverage => {
            // Understaffed cells are exactly what the greedy pass fills.
            super::greedy_fill(roster, employees, shifts, policy);
            schedule_score(roster, employees, shifts, rules, policy)
        }
        OptimizationFocus::Preferences => optimize_preferences(roster, employees, shifts, rules, policy),
        OptimizationFocus::Balance => optimize_balance(roster, employees, shifts, rules, policy),
    }
}

/// Swap search accepting only swaps that win preference reward without
/// adding violations.
fn optimize_preferences(
    roster: &mut Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
) -> f64 {
    let mut best_pref = preference_component(roster, employees);
    let mut best_violations =
        validation::evaluate(roster, employees, shifts, rules, policy).len();
    let pairs = same_day_pairs(roster);

    for _pass in 0..policy.optimizer_iteration_cap {
        let mut improved = false;

        for &(a, b) in &pairs {
            if roster.entries[a].shift_id == roster.entries[b].shift_id {
                continue;
            }
            swap_shift_ids(roster, a, b);
            let pref = preference_component(roster, employees);
            let violations =
                validation::evaluate(roster, employees, shifts, rules, policy).len();
            if pref > best_pref && violations <= best_violations {
                best_pref = pref;
                best_violations = violations;
                improved = true;
            } else {
                swap_shift_ids(roster, a, b);
            }
        }

        if !improved {
            break;
        }
    }

    schedule_score(roster, employees, shifts, rules, policy)
}

/// Moves entries from the most-loaded employee to free least-loaded
/// employees while the whole-roster score does not degrade.
fn optimize_balance(
    roster: &mut Roster,
    employees: &[Employee],
    shifts: &[Shift],
    rules: &[RosterRule],
    policy: &GenerationPolicy,
) -> f64 {
    let mut score = schedule_score(roster, employees, shifts, rules, policy);

    for _pass in 0..policy.optimizer_iteration_cap {
        let counts = shift_counts(roster, employees, policy);
        let Some(donor) = employees
            .iter()
            .max_by_key(|e| counts.get(e.id.as_str()).copied().unwrap_or(0))
        else {
            break;
        };
        let donor_count = counts.get(donor.id.as_str()).copied().unwrap_or(0);

        let entry_indices: Vec<usize> = roster
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.employee_id == donor.id && !policy.is_day_off(&e.shift_id))
            .map(|(idx, _)| idx)
            .collect();

        let mut applied = false;
        'moves: for idx in entry_indices {
            let day = roster.entries[idx].day;
            let date = roster.month.date(day);

            // Recipients from least loaded up; a transfer only evens the
            // load when the gap is at least 2.
            let mut recipients: Vec<&Employee> = employees.iter().collect();
            recipients.sort_by_key(|e| counts.get(e.id.as_str()).copied().unwrap_or(0));

            for recipient in recipients {
                let gap =
                    donor_count - counts.get(recipient.id.as_str()).copied().unwrap_or(0);
                if gap < 2 {
                    break;
                }
                if roster.entry_for(&recipient.id, day).is_some()
                    || !recipient.is_available(date)
                {
                    continue;
                }

                let previous = std::mem::replace(
                    &mut roster.entries[idx].employee_id,
                    recipient.id.clone(),
                );
                let moved = schedule_score(roster, employees, shifts, rules, policy);
                if moved >= score {
                    score = moved;
                    applied = true;
                    break 'moves;
                }
                roster.entries[idx].employee_id = previous;
            }
        }

        if !applied {
            break;
        }
    }

    score
}

/// Non-day-off entry counts per employee.
fn shift_counts<'a>(
    roster: &Roster,
    employees: &'a [Employee],
    policy: &GenerationPolicy,
) -> HashMap<&'a str, u32> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for employee in employees {
        let count = roster
            .entries_for_employee(&employee.id)
            .filter(|e| !policy.is_day_off(&e.shift_id))
            .count() as u32;
        counts.insert(&employee.id, count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preference, RosterMonth};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn month() -> RosterMonth {
        RosterMonth::new(2024, 6).unwrap()
    }

    fn policy() -> GenerationPolicy {
        GenerationPolicy::default().with_day_off_shift_id("off")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn two_shifts() -> Vec<Shift> {
        vec![Shift::new("day", 8.0), Shift::new("night", 8.0)]
    }

    #[test]
    fn test_swap_improves_avoided_assignment() {
        // E0 avoids the day shift on day 3; swapping with E1's night shift
        // gains preference reward.
        let employees = vec![
            Employee::new("E0", "nurse")
                .with_preference(Preference::avoid_shift("E0", date(3), "day")),
            Employee::new("E1", "nurse"),
        ];
        let shifts = two_shifts();
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day");
        roster.set("E1", 3, "night");

        let before = schedule_score(&roster, &employees, &shifts, &[], &policy());
        let after = optimize(&mut roster, &employees, &shifts, &[], &policy(), None);

        assert!(after > before);
        assert_eq!(roster.entry_for("E0", 3).unwrap().shift_id, "night");
        assert_eq!(roster.entry_for("E1", 3).unwrap().shift_id, "day");
    }

    #[test]
    fn test_score_never_degrades() {
        let employees = vec![
            Employee::new("E0", "nurse")
                .with_preference(Preference::preferred_shift("E0", date(4), "day")),
            Employee::new("E1", "nurse"),
        ];
        let shifts = two_shifts();
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day");
        roster.set("E1", 3, "night");
        roster.set("E0", 4, "night");
        roster.set("E1", 4, "day");

        let before = schedule_score(&roster, &employees, &shifts, &[], &policy());
        let after = optimize(&mut roster, &employees, &shifts, &[], &policy(), None);
        assert!(after >= before);
    }

    #[test]
    fn test_no_improvement_leaves_roster_unchanged() {
        let employees = vec![Employee::new("E0", "nurse"), Employee::new("E1", "nurse")];
        let shifts = two_shifts();
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day");
        roster.set("E1", 3, "night");
        let snapshot = roster.entries.clone();

        let before = schedule_score(&roster, &employees, &shifts, &[], &policy());
        let after = optimize(&mut roster, &employees, &shifts, &[], &policy(), None);
        assert_eq!(after, before);
        assert_eq!(roster.entries, snapshot);
    }

    #[test]
    fn test_expired_deadline_returns_input_score() {
        let employees = vec![
            Employee::new("E0", "nurse")
                .with_preference(Preference::avoid_shift("E0", date(3), "day")),
            Employee::new("E1", "nurse"),
        ];
        let shifts = two_shifts();
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day");
        roster.set("E1", 3, "night");

        let before = schedule_score(&roster, &employees, &shifts, &[], &policy());
        let deadline = Instant::now() - Duration::from_millis(1);
        let after =
            optimize(&mut roster, &employees, &shifts, &[], &policy(), Some(deadline));
        // The improving swap is never reached; the input comes back as-is.
        assert_eq!(after, before);
        assert_eq!(roster.entry_for("E0", 3).unwrap().shift_id, "day");
    }

    #[test]
    fn test_preference_component() {
        let employees = vec![Employee::new("E0", "nurse")
            .with_preference(Preference::preferred_shift("E0", date(3), "day"))
            .with_preference(Preference::avoid_shift("E0", date(4), "night"))];
        let mut roster = Roster::new(month());

        // Nothing assigned: preferred unsatisfied (0), avoid unviolated (+10).
        assert_eq!(preference_component(&roster, &employees), 10.0);

        roster.set("E0", 3, "day");
        assert_eq!(preference_component(&roster, &employees), 20.0);

        roster.set("E0", 4, "night");
        assert_eq!(preference_component(&roster, &employees), 10.0);
    }

    #[test]
    fn test_focus_parsing() {
        assert_eq!(
            "coverage".parse::<OptimizationFocus>().unwrap(),
            OptimizationFocus::Coverage
        );
        assert_eq!(
            "balance".parse::<OptimizationFocus>().unwrap(),
            OptimizationFocus::Balance
        );
        let err = "speed".parse::<OptimizationFocus>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownOptimization(name) if name == "speed"));
    }

    #[test]
    fn test_coverage_focus_tops_up() {
        let employees = vec![Employee::new("E0", "nurse"), Employee::new("E1", "nurse")];
        let shifts = vec![Shift::new("day", 8.0).with_staffing(2, 5)];
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day"); // One of two required

        optimize_focus(
            OptimizationFocus::Coverage,
            &mut roster,
            &employees,
            &shifts,
            &[],
            &policy(),
        );
        assert_eq!(roster.assigned_count(3, "day"), 2);
    }

    #[test]
    fn test_balance_focus_evens_counts() {
        let employees = vec![Employee::new("E0", "nurse"), Employee::new("E1", "nurse")];
        let shifts = vec![Shift::new("day", 8.0)];
        let mut roster = Roster::new(month());
        for day in 3..=6 {
            roster.set("E0", day, "day");
        }

        optimize_focus(
            OptimizationFocus::Balance,
            &mut roster,
            &employees,
            &shifts,
            &[],
            &policy(),
        );

        let e0 = roster
            .entries_for_employee("E0")
            .filter(|e| e.shift_id == "day")
            .count();
        let e1 = roster
            .entries_for_employee("E1")
            .filter(|e| e.shift_id == "day")
            .count();
        assert_eq!(e0 + e1, 4);
        assert_eq!(e0, 2);
        assert_eq!(e1, 2);
    }

    #[test]
    fn test_preferences_focus_applies_safe_swaps() {
        let employees = vec![
            Employee::new("E0", "nurse")
                .with_preference(Preference::preferred_shift("E0", date(3), "night").approved()),
            Employee::new("E1", "nurse"),
        ];
        let shifts = two_shifts();
        let mut roster = Roster::new(month());
        roster.set("E0", 3, "day");
        roster.set("E1", 3, "night");

        optimize_focus(
            OptimizationFocus::Preferences,
            &mut roster,
            &employees,
            &shifts,
            &[],
            &policy(),
        );
        assert_eq!(roster.entry_for("E0", 3).unwrap().shift_id, "night");
    }
}
