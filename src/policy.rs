//! Generation policy.
//!
//! Lifts the policy knobs out of the algorithms: which weekdays are
//! working days, which shift id means "day off", the ideal monthly load
//! used by candidate scoring, the consecutive-day cutoff, and the
//! optimizer's iteration cap. These are deployment policy, not algorithm,
//! so they live in one configurable record.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{RosterRule, RuleKind};

/// Default reserved day-off shift id in the reference data set.
pub const DEFAULT_DAY_OFF_SHIFT_ID: &str = "Выходной";

/// Policy knobs for roster generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPolicy {
    /// Reserved shift id denoting a day off. Excluded from every coverage
    /// and role rule and from hour sums.
    pub day_off_shift_id: String,
    /// Weekdays the greedy generator never assigns.
    pub excluded_weekdays: Vec<Weekday>,
    /// Ideal non-day-off shift count per employee per month, used by
    /// candidate scoring.
    pub target_monthly_shifts: u32,
    /// Hard pool cutoff: employees with this many consecutive worked days
    /// ending the previous day are excluded from candidacy.
    pub max_consecutive_days: u32,
    /// Maximum local-search passes.
    pub optimizer_iteration_cap: u32,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            day_off_shift_id: DEFAULT_DAY_OFF_SHIFT_ID.to_string(),
            excluded_weekdays: vec![Weekday::Sun],
            target_monthly_shifts: 20,
            max_consecutive_days: 5,
            optimizer_iteration_cap: 100,
        }
    }
}

impl GenerationPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reserved day-off shift id.
    pub fn with_day_off_shift_id(mut self, id: impl Into<String>) -> Self {
        self.day_off_shift_id = id.into();
        self
    }

    /// Sets the excluded weekdays.
    pub fn with_excluded_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.excluded_weekdays = weekdays;
        self
    }

    /// Sets the ideal monthly shift count.
    pub fn with_target_monthly_shifts(mut self, target: u32) -> Self {
        self.target_monthly_shifts = target;
        self
    }

    /// Sets the consecutive-day cutoff.
    pub fn with_max_consecutive_days(mut self, days: u32) -> Self {
        self.max_consecutive_days = days;
        self
    }

    /// Sets the optimizer iteration cap.
    pub fn with_iteration_cap(mut self, cap: u32) -> Self {
        self.optimizer_iteration_cap = cap;
        self
    }

    /// Whether the generator assigns work on this date.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.excluded_weekdays.contains(&date.weekday())
    }

    /// Whether a shift id is the reserved day-off shift.
    #[inline]
    pub fn is_day_off(&self, shift_id: &str) -> bool {
        shift_id == self.day_off_shift_id
    }

    /// Aligns the consecutive-day cutoff with a configured
    /// `max_consecutive_work_days` rule, so the generator's pool filter and
    /// the validator share one source of truth.
    ///
    /// Leaves the cutoff unchanged when no such enabled rule exists or the
    /// rule carries no explicit `max_days`.
    pub fn sync_with_rules(mut self, rules: &[RosterRule]) -> Self {
        let configured = rules
            .iter()
            .filter(|r| r.enabled && r.kind == RuleKind::MaxConsecutiveWorkDays)
            .find_map(|r| r.config.max_days);
        if let Some(max_days) = configured {
            self.max_consecutive_days = max_days;
        }
        self
    }
}
