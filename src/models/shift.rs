//! Shift slot model.
//!
//! A shift is a recurring slot in the daily grid: staffing bounds, hour
//! value, optional start/end times, and role requirements. One reserved
//! shift id (see [`GenerationPolicy::day_off_shift_id`]) denotes the day
//! off; that shift is never subject to staffing or role rules.
//!
//! [`GenerationPolicy::day_off_shift_id`]: crate::policy::GenerationPolicy

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A shift slot that employees can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hour value counted toward weekly/monthly hour limits.
    pub hours: f64,
    /// Start time of day, if the shift has fixed times.
    pub start: Option<NaiveTime>,
    /// End time of day, if the shift has fixed times.
    pub end: Option<NaiveTime>,
    /// Minimum headcount per day.
    pub min_staff: u32,
    /// Maximum headcount per day.
    pub max_staff: u32,
    /// Roles that should be represented on this shift.
    pub required_roles: Vec<String>,
    /// Difficulty/priority weight.
    pub weight: i32,
}

impl Shift {
    /// Creates a shift with the given hour value.
    pub fn new(id: impl Into<String>, hours: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            hours,
            start: None,
            end: None,
            min_staff: 1,
            max_staff: 10,
            required_roles: Vec::new(),
            weight: 0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets start and end times of day.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Sets minimum and maximum headcount.
    pub fn with_staffing(mut self, min_staff: u32, max_staff: u32) -> Self {
        self.min_staff = min_staff;
        self.max_staff = max_staff;
        self
    }

    /// Adds a required role.
    pub fn with_required_role(mut self, role: impl Into<String>) -> Self {
        self.required_roles.push(role.into());
        self
    }

    /// Sets the difficulty/priority weight.
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Whether this shift calls for the given role.
    pub fn requires_role(&self, role: &str) -> bool {
        self.required_roles.iter().any(|r| r == role)
    }
}
