//! Employee and preference models.
//!
//! Employees are loaded fresh per engine call with their role, preferences,
//! and availability joined in. The engine never mutates them — edits belong
//! to the UI/persistence layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An employee that can be assigned to shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role name (matched against shift role requirements).
    pub role: String,
    /// Excludes this employee from aggregate reporting (e.g. balance score).
    pub exclude_from_reports: bool,
    /// Scheduling preferences, in priority order.
    pub preferences: Vec<Preference>,
    /// Per-date availability overrides. Empty = always available.
    pub availability: Vec<AvailabilityWindow>,
}

/// A scheduling preference expressed by an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    /// Owning employee.
    pub employee_id: String,
    /// What is being requested.
    pub kind: PreferenceKind,
    /// Target calendar date.
    pub date: NaiveDate,
    /// Target shift, for shift preferences.
    pub shift_id: Option<String>,
    /// Approval workflow state.
    pub status: ApprovalStatus,
    /// Request priority (lower = more important).
    pub priority: i32,
}

/// Preference classification.
///
/// Only approved `DayOff` preferences are hard constraints; shift
/// preferences act as soft scoring signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    /// Request the whole day off.
    DayOff,
    /// Prefer a specific shift on the date.
    PreferredShift,
    /// Avoid a specific shift on the date.
    AvoidShift,
}

/// Approval workflow state of a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A per-date availability override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Date this override applies to.
    pub date: NaiveDate,
    /// Whether the employee is available on that date.
    pub available: bool,
}

impl Employee {
    /// Creates a new employee with the given role.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            role: role.into(),
            exclude_from_reports: false,
            preferences: Vec::new(),
            availability: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Excludes this employee from aggregate reporting.
    pub fn excluded_from_reports(mut self) -> Self {
        self.exclude_from_reports = true;
        self
    }

    /// Adds a preference.
    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preferences.push(preference);
        self
    }

    /// Adds an availability override.
    pub fn with_availability(mut self, date: NaiveDate, available: bool) -> Self {
        self.availability.push(AvailabilityWindow { date, available });
        self
    }

    /// Whether the employee is available on a date.
    ///
    /// With no override for the date the employee is available; otherwise
    /// the last matching override wins.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.availability
            .iter()
            .filter(|w| w.date == date)
            .map(|w| w.available)
            .last()
            .unwrap_or(true)
    }
}

impl Preference {
    /// Creates a day-off request.
    pub fn day_off(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: PreferenceKind::DayOff,
            date,
            shift_id: None,
            status: ApprovalStatus::Pending,
            priority: 0,
        }
    }

    /// Creates a preferred-shift preference.
    pub fn preferred_shift(
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift_id: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: PreferenceKind::PreferredShift,
            date,
            shift_id: Some(shift_id.into()),
            status: ApprovalStatus::Pending,
            priority: 0,
        }
    }

    /// Creates an avoid-shift preference.
    pub fn avoid_shift(
        employee_id: impl Into<String>,
        date: NaiveDate,
        shift_id: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: PreferenceKind::AvoidShift,
            date,
            shift_id: Some(shift_id.into()),
            status: ApprovalStatus::Pending,
            priority: 0,
        }
    }

    /// Sets the approval status.
    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the preference approved.
    pub fn approved(self) -> Self {
        self.with_status(ApprovalStatus::Approved)
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether this preference has been approved.
    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    /// Whether this preference targets the given shift.
    pub fn targets_shift(&self, shift_id: &str) -> bool {
        self.shift_id.as_deref() == Some(shift_id)
    }
}
