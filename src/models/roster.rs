//! Roster (solution) model.
//!
//! A roster is an assignment of (employee, day) → shift for one calendar
//! month, plus the violation record type produced by validating it.
//!
//! # Invariant
//! At most one entry per (employee, day). [`Roster::set`] replaces rather
//! than appends, so incremental edits cannot introduce duplicates.

use serde::{Deserialize, Serialize};

use super::{RosterMonth, RuleKind, RosterRule, Severity};

/// A single (employee, day, shift) assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Assigned employee.
    pub employee_id: String,
    /// Day of month (1-based).
    pub day: u32,
    /// Assigned shift.
    pub shift_id: String,
}

/// A complete or partial schedule for one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    /// Target month.
    pub month: RosterMonth,
    /// Assignments, in insertion order.
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    /// Creates an empty roster for a month.
    pub fn new(month: RosterMonth) -> Self {
        Self {
            month,
            entries: Vec::new(),
        }
    }

    /// Assigns `employee_id` to `shift_id` on `day`, replacing any existing
    /// entry for that (employee, day).
    pub fn set(&mut self, employee_id: impl Into<String>, day: u32, shift_id: impl Into<String>) {
        let employee_id = employee_id.into();
        let shift_id = shift_id.into();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.employee_id == employee_id && e.day == day)
        {
            existing.shift_id = shift_id;
        } else {
            self.entries.push(RosterEntry {
                employee_id,
                day,
                shift_id,
            });
        }
    }

    /// The entry for an (employee, day), if one exists.
    pub fn entry_for(&self, employee_id: &str, day: u32) -> Option<&RosterEntry> {
        self.entries
            .iter()
            .find(|e| e.employee_id == employee_id && e.day == day)
    }

    /// All entries on a given day.
    pub fn entries_for_day(&self, day: u32) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter().filter(move |e| e.day == day)
    }

    /// All entries for a given employee.
    pub fn entries_for_employee<'a>(
        &'a self,
        employee_id: &'a str,
    ) -> impl Iterator<Item = &'a RosterEntry> {
        self.entries
            .iter()
            .filter(move |e| e.employee_id == employee_id)
    }

    /// Headcount assigned to a (day, shift) cell.
    pub fn assigned_count(&self, day: u32, shift_id: &str) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.day == day && e.shift_id == shift_id)
            .count() as u32
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A detected breach of a validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Breached rule kind.
    pub kind: RuleKind,
    /// Severity inherited from the rule.
    pub severity: Severity,
    /// Affected employee, when the breach is employee-specific.
    pub employee_id: Option<String>,
    /// Affected day of month, when day-specific.
    pub day: Option<u32>,
    /// Affected shift, when shift-specific.
    pub shift_id: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Priority inherited from the rule (lower = higher priority).
    pub priority: i32,
}

impl RuleViolation {
    /// Creates a violation of the given rule.
    pub fn of(rule: &RosterRule, message: impl Into<String>) -> Self {
        Self {
            kind: rule.kind.clone(),
            severity: rule.severity,
            employee_id: None,
            day: None,
            shift_id: None,
            message: message.into(),
            priority: rule.priority,
        }
    }

    /// Tags the affected employee.
    pub fn for_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    /// Tags the affected day.
    pub fn on_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Tags the affected shift.
    pub fn for_shift(mut self, shift_id: impl Into<String>) -> Self {
        self.shift_id = Some(shift_id.into());
        self
    }

    /// Whether this violation carries error severity.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> RosterMonth {
        RosterMonth::new(2024, 6).unwrap()
    }

    #[test]
    fn test_set_appends() {
        let mut roster = Roster::new(month());
        roster.set("E1", 1, "day");
        roster.set("E2", 1, "day");
        roster.set("E1", 2, "night");
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.assigned_count(1, "day"), 2);
    }

    #[test]
    fn test_set_replaces_same_employee_day() {
        let mut roster = Roster::new(month());
        roster.set("E1", 5, "day");
        roster.set("E1", 5, "night");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.entry_for("E1", 5).unwrap().shift_id, "night");
    }

    #[test]
    fn test_accessors() {
        let mut roster = Roster::new(month());
        roster.set("E1", 3, "day");
        roster.set("E2", 3, "night");
        roster.set("E1", 4, "day");

        assert_eq!(roster.entries_for_day(3).count(), 2);
        assert_eq!(roster.entries_for_employee("E1").count(), 2);
        assert!(roster.entry_for("E2", 4).is_none());
    }

    #[test]
    fn test_violation_builder() {
        let rule = RosterRule::new(RuleKind::MinEmployeesPerShift, Severity::Error).with_priority(3);
        let v = RuleViolation::of(&rule, "understaffed")
            .on_day(7)
            .for_shift("day");
        assert_eq!(v.kind, RuleKind::MinEmployeesPerShift);
        assert!(v.is_error());
        assert_eq!(v.day, Some(7));
        assert_eq!(v.shift_id.as_deref(), Some("day"));
        assert_eq!(v.priority, 3);
        assert!(v.employee_id.is_none());
    }
}
