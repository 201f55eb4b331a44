//! Validation rule model.
//!
//! Rules are configuration records: a kind, per-kind parameters, an
//! enforcement severity, and a priority. The closed set of kinds is
//! extended by `Unknown`, which round-trips unrecognized kind strings from
//! newer rule configs instead of failing deserialization — the evaluator
//! logs and skips them.

use serde::{Deserialize, Serialize};

use super::Employee;

/// The closed set of supported rule kinds.
///
/// Serialized as the snake_case kind string; unrecognized strings map to
/// `Unknown` so configs from newer versions stay loadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    MaxConsecutiveWorkDays,
    MinEmployeesPerShift,
    MaxEmployeesPerShift,
    MaxHoursPerWeek,
    ApprovedDayOffRequests,
    MinRestBetweenShifts,
    RequiredRolesPerShift,
    MaxShiftsPerWeek,
    MaxHoursPerMonth,
    /// A kind this version does not recognize. Evaluates to nothing.
    Unknown(String),
}

impl RuleKind {
    /// The serialized kind string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MaxConsecutiveWorkDays => "max_consecutive_work_days",
            Self::MinEmployeesPerShift => "min_employees_per_shift",
            Self::MaxEmployeesPerShift => "max_employees_per_shift",
            Self::MaxHoursPerWeek => "max_hours_per_week",
            Self::ApprovedDayOffRequests => "approved_day_off_requests",
            Self::MinRestBetweenShifts => "min_rest_between_shifts",
            Self::RequiredRolesPerShift => "required_roles_per_shift",
            Self::MaxShiftsPerWeek => "max_shifts_per_week",
            Self::MaxHoursPerMonth => "max_hours_per_month",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "max_consecutive_work_days" => Self::MaxConsecutiveWorkDays,
            "min_employees_per_shift" => Self::MinEmployeesPerShift,
            "max_employees_per_shift" => Self::MaxEmployeesPerShift,
            "max_hours_per_week" => Self::MaxHoursPerWeek,
            "approved_day_off_requests" => Self::ApprovedDayOffRequests,
            "min_rest_between_shifts" => Self::MinRestBetweenShifts,
            "required_roles_per_shift" => Self::RequiredRolesPerShift,
            "max_shifts_per_week" => Self::MaxShiftsPerWeek,
            "max_hours_per_month" => Self::MaxHoursPerMonth,
            _ => Self::Unknown(s),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enforcement severity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A breach makes the schedule unsuccessful.
    Error,
    /// A breach is reported but never affects success.
    Warning,
}

/// Per-kind rule parameters.
///
/// Each rule reads the fields it understands and falls back to its
/// documented default when a field is unset. Unknown JSON keys are ignored
/// for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// `max_consecutive_work_days`: run length limit (default 5).
    pub max_days: Option<u32>,
    /// `min_employees_per_shift`: minimum headcount (default 1).
    pub min: Option<u32>,
    /// `max_employees_per_shift`: maximum headcount (default 10).
    pub max: Option<u32>,
    /// `max_hours_per_week` / `max_hours_per_month`: hour limit
    /// (defaults 40 / 160).
    pub max_hours: Option<f64>,
    /// `min_rest_between_shifts`: minimum rest hours (default 12).
    pub hours: Option<f64>,
    /// `required_roles_per_shift`: role name. Unset = rule is a no-op.
    pub role: Option<String>,
    /// `required_roles_per_shift`: minimum role headcount (default 1).
    pub min_count: Option<u32>,
}

/// Optional employee/role scoping of a rule.
///
/// Empty scope matches every employee. A non-empty scope matches an
/// employee listed by id or carrying a listed role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleScope {
    pub employee_ids: Vec<String>,
    pub roles: Vec<String>,
}

impl RuleScope {
    /// Whether the scope covers the given employee.
    pub fn covers(&self, employee: &Employee) -> bool {
        if self.employee_ids.is_empty() && self.roles.is_empty() {
            return true;
        }
        self.employee_ids.iter().any(|id| *id == employee.id)
            || self.roles.iter().any(|r| *r == employee.role)
    }
}

/// A configured validation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRule {
    /// Rule kind.
    pub kind: RuleKind,
    /// Disabled rules are skipped entirely.
    pub enabled: bool,
    /// Per-kind parameters.
    pub config: RuleConfig,
    /// Enforcement severity.
    pub severity: Severity,
    /// Ordering/tie-break priority (lower = higher priority).
    pub priority: i32,
    /// Optional employee/role scoping.
    pub scope: Option<RuleScope>,
}

impl RosterRule {
    /// Creates an enabled rule with default config and priority.
    pub fn new(kind: RuleKind, severity: Severity) -> Self {
        Self {
            kind,
            enabled: true,
            config: RuleConfig::default(),
            severity,
            priority: 0,
            scope: None,
        }
    }

    /// Sets the parameters.
    pub fn with_config(mut self, config: RuleConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the scope.
    pub fn with_scope(mut self, scope: RuleScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Disables the rule.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the rule applies to the given employee.
    pub fn applies_to(&self, employee: &Employee) -> bool {
        self.scope.as_ref().map_or(true, |s| s.covers(employee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            RuleKind::MaxConsecutiveWorkDays,
            RuleKind::MinEmployeesPerShift,
            RuleKind::MaxEmployeesPerShift,
            RuleKind::MaxHoursPerWeek,
            RuleKind::ApprovedDayOffRequests,
            RuleKind::MinRestBetweenShifts,
            RuleKind::RequiredRolesPerShift,
            RuleKind::MaxShiftsPerWeek,
            RuleKind::MaxHoursPerMonth,
        ] {
            let s = String::from(kind.clone());
            assert_eq!(RuleKind::from(s), kind);
        }
    }

    #[test]
    fn test_unknown_kind_preserved() {
        let kind = RuleKind::from("min_night_shift_gap".to_string());
        assert_eq!(kind, RuleKind::Unknown("min_night_shift_gap".into()));
        assert_eq!(kind.as_str(), "min_night_shift_gap");
    }

    #[test]
    fn test_rule_json_with_unknown_kind() {
        // A config from a newer version must deserialize, not fail.
        let json = r#"{
            "kind": "weekend_rotation",
            "enabled": true,
            "config": { "rotation_weeks": 2 },
            "severity": "warning",
            "priority": 7,
            "scope": null
        }"#;
        let rule: RosterRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, RuleKind::Unknown("weekend_rotation".into()));
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.priority, 7);
        // Unknown config keys are ignored.
        assert_eq!(rule.config, RuleConfig::default());
    }

    #[test]
    fn test_rule_json_known_kind() {
        let json = r#"{
            "kind": "min_employees_per_shift",
            "enabled": true,
            "config": { "min": 2 },
            "severity": "error",
            "priority": 1,
            "scope": null
        }"#;
        let rule: RosterRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, RuleKind::MinEmployeesPerShift);
        assert_eq!(rule.config.min, Some(2));
    }

    #[test]
    fn test_scope_covers() {
        let nurse = Employee::new("E1", "nurse");
        let doctor = Employee::new("E2", "doctor");

        let empty = RuleScope::default();
        assert!(empty.covers(&nurse));
        assert!(empty.covers(&doctor));

        let by_role = RuleScope {
            employee_ids: vec![],
            roles: vec!["nurse".into()],
        };
        assert!(by_role.covers(&nurse));
        assert!(!by_role.covers(&doctor));

        let by_id = RuleScope {
            employee_ids: vec!["E2".into()],
            roles: vec![],
        };
        assert!(!by_id.covers(&nurse));
        assert!(by_id.covers(&doctor));
    }

    #[test]
    fn test_rule_builder() {
        let rule = RosterRule::new(RuleKind::MaxHoursPerWeek, Severity::Error)
            .with_config(RuleConfig {
                max_hours: Some(36.0),
                ..Default::default()
            })
            .with_priority(2);
        assert!(rule.enabled);
        assert_eq!(rule.config.max_hours, Some(36.0));

        let off = rule.clone().disabled();
        assert!(!off.enabled);
    }
}
