//! Rostering domain models.
//!
//! Core data types for monthly shift rostering: the inputs (employees,
//! shifts, rules, preferences) and the outputs (roster entries, violations).
//! Every record is an immutable-per-run value — the engine is a pure
//! function of its inputs and retains no state between calls.

mod employee;
mod month;
mod roster;
mod rule;
mod shift;

pub use employee::{ApprovalStatus, AvailabilityWindow, Employee, Preference, PreferenceKind};
pub use month::RosterMonth;
pub use roster::{Roster, RosterEntry, RuleViolation};
pub use rule::{RosterRule, RuleConfig, RuleKind, RuleScope, Severity};
pub use shift::Shift;
