//! Rostering engine facade.
//!
//! One stateless entry point over generation, validation, metrics, and
//! optimization. Input data arrives fully joined per call — the engine
//! holds no caches and never mutates its inputs, so a single engine value
//! can serve concurrent callers.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::generator::local_search::{self, OptimizationFocus};
use crate::generator::{self, Strategy};
use crate::metrics::RosterMetrics;
use crate::models::{Employee, Roster, RosterMonth, RosterRule, RuleViolation, Shift};
use crate::policy::GenerationPolicy;
use crate::validation;

/// Inputs to one generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Employees eligible for assignment.
    pub employees: Vec<Employee>,
    /// Shift catalog, including any reserved day-off shift.
    pub shifts: Vec<Shift>,
    /// Validation rules; disabled rules are carried but not enforced.
    pub rules: Vec<RosterRule>,
    /// Target month.
    pub month: RosterMonth,
    /// Generation strategy.
    pub strategy: Strategy,
    /// Wall-clock budget for the refinement phase. `None` = unbounded.
    pub timeout: Option<Duration>,
}

impl GenerateRequest {
    /// Creates a request with the default (hybrid) strategy and no timeout.
    pub fn new(month: RosterMonth) -> Self {
        Self {
            employees: Vec::new(),
            shifts: Vec::new(),
            rules: Vec::new(),
            month,
            strategy: Strategy::default(),
            timeout: None,
        }
    }

    /// Sets the employees.
    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    /// Sets the shift catalog.
    pub fn with_shifts(mut self, shifts: Vec<Shift>) -> Self {
        self.shifts = shifts;
        self
    }

    /// Sets the validation rules.
    pub fn with_rules(mut self, rules: Vec<RosterRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the refinement time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of one generation call.
///
/// Generation itself cannot fail on constraint grounds: an infeasible
/// input yields a best-effort roster with `success == false` and the
/// violations that explain why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// The generated roster.
    pub roster: Roster,
    /// All violations found in the generated roster.
    pub violations: Vec<RuleViolation>,
    /// Quality metrics of the generated roster.
    pub metrics: RosterMetrics,
    /// True when no error-severity violation remains.
    pub success: bool,
}

impl GenerationOutcome {
    /// Error-severity violations.
    pub fn errors(&self) -> impl Iterator<Item = &RuleViolation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    /// Warning-severity violations.
    pub fn warnings(&self) -> impl Iterator<Item = &RuleViolation> {
        self.violations.iter().filter(|v| !v.is_error())
    }
}

/// Result of validating an externally supplied roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// All violations found.
    pub violations: Vec<RuleViolation>,
    /// Quality metrics of the validated roster.
    pub metrics: RosterMetrics,
    /// True when no error-severity violation was found.
    pub success: bool,
}

/// Result of one focused optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// The focus that was applied.
    pub focus: OptimizationFocus,
    /// Metrics before optimization.
    pub metrics_before: RosterMetrics,
    /// Metrics after optimization.
    pub metrics_after: RosterMetrics,
    /// Whole-roster score gain (never negative).
    pub score_delta: f64,
    /// The optimized roster.
    pub roster: Roster,
}

/// Joined scheduling data for one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterData {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub rules: Vec<RosterRule>,
}

/// External provider of scheduling data.
///
/// Implementations load employees (with preferences and availability
/// joined in), the shift catalog, and the rule set for a month. Load
/// failures propagate out of the engine unchanged.
pub trait RosterDataSource {
    fn load(&self, month: RosterMonth)
        -> Result<RosterData, Box<dyn std::error::Error + Send + Sync>>;
}

/// The rostering engine.
#[derive(Debug, Clone, Default)]
pub struct RosterEngine {
    policy: GenerationPolicy,
}

impl RosterEngine {
    /// Creates an engine with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom policy.
    pub fn with_policy(policy: GenerationPolicy) -> Self {
        Self { policy }
    }

    /// The engine's policy.
    #[inline]
    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Generates a roster for the request's month.
    ///
    /// Approved day-off requests are placed first and survive every later
    /// phase. The strategy then fills the remaining demand, the rule set is
    /// evaluated, and metrics are computed over the final roster.
    pub fn generate(&self, request: &GenerateRequest) -> GenerationOutcome {
        let policy = self.policy.clone().sync_with_rules(&request.rules);
        let deadline = request.timeout.map(|t| Instant::now() + t);

        info!(
            year = request.month.year(),
            month = request.month.month(),
            employees = request.employees.len(),
            shifts = request.shifts.len(),
            strategy = ?request.strategy,
            "generating roster"
        );

        let mut roster = Roster::new(request.month);
        generator::apply_day_off_requests(&mut roster, &request.employees, &policy);

        match request.strategy {
            Strategy::Greedy => {
                generator::greedy_fill(&mut roster, &request.employees, &request.shifts, &policy);
            }
            Strategy::ConstraintSearch => {
                debug!("constraint search is not implemented, using greedy");
                generator::greedy_fill(&mut roster, &request.employees, &request.shifts, &policy);
            }
            Strategy::Hybrid => {
                generator::greedy_fill(&mut roster, &request.employees, &request.shifts, &policy);
                local_search::optimize(
                    &mut roster,
                    &request.employees,
                    &request.shifts,
                    &request.rules,
                    &policy,
                    deadline,
                );
            }
        }

        let violations = validation::evaluate(
            &roster,
            &request.employees,
            &request.shifts,
            &request.rules,
            &policy,
        );
        let metrics = RosterMetrics::with_violations(
            &roster,
            &request.employees,
            &request.shifts,
            &policy,
            &violations,
        );
        let success = !violations.iter().any(RuleViolation::is_error);

        info!(
            entries = roster.len(),
            violations = violations.len(),
            success,
            "generation complete"
        );

        GenerationOutcome {
            roster,
            violations,
            metrics,
            success,
        }
    }

    /// Generates a roster from data loaded by an external source.
    pub fn generate_from(
        &self,
        source: &dyn RosterDataSource,
        month: RosterMonth,
        strategy: Strategy,
        timeout: Option<Duration>,
    ) -> Result<GenerationOutcome, EngineError> {
        let data = source.load(month)?;
        let mut request = GenerateRequest::new(month)
            .with_employees(data.employees)
            .with_shifts(data.shifts)
            .with_rules(data.rules)
            .with_strategy(strategy);
        request.timeout = timeout;
        Ok(self.generate(&request))
    }

    /// Validates an externally supplied roster against a rule set.
    pub fn validate(
        &self,
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &[RosterRule],
    ) -> ValidationOutcome {
        let policy = self.policy.clone().sync_with_rules(rules);
        let violations = validation::evaluate(roster, employees, shifts, rules, &policy);
        let metrics =
            RosterMetrics::with_violations(roster, employees, shifts, &policy, &violations);
        let success = !violations.iter().any(RuleViolation::is_error);
        ValidationOutcome {
            violations,
            metrics,
            success,
        }
    }

    /// Runs every optimization focus against a copy of the roster and
    /// returns the ones that strictly improved the whole-roster score, best
    /// first.
    pub fn suggest_improvements(
        &self,
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &[RosterRule],
    ) -> Vec<OptimizationResult> {
        let mut results: Vec<OptimizationResult> = OptimizationFocus::ALL
            .into_iter()
            .filter_map(|focus| {
                let result = self.run_focus(focus, roster, employees, shifts, rules);
                (result.score_delta > 0.0).then_some(result)
            })
            .collect();
        results.sort_by(|a, b| {
            b.score_delta
                .partial_cmp(&a.score_delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }

    /// Applies one optimization focus, named by string, to a copy of the
    /// roster.
    pub fn apply_optimization(
        &self,
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &[RosterRule],
        focus: &str,
    ) -> Result<OptimizationResult, EngineError> {
        let focus: OptimizationFocus = focus.parse()?;
        Ok(self.run_focus(focus, roster, employees, shifts, rules))
    }

    fn run_focus(
        &self,
        focus: OptimizationFocus,
        roster: &Roster,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &[RosterRule],
    ) -> OptimizationResult {
        let policy = self.policy.clone().sync_with_rules(rules);
        let before = local_search::schedule_score(roster, employees, shifts, rules, &policy);
        let metrics_before = {
            let violations = validation::evaluate(roster, employees, shifts, rules, &policy);
            RosterMetrics::with_violations(roster, employees, shifts, &policy, &violations)
        };

        let mut optimized = roster.clone();
        let after = local_search::optimize_focus(
            focus,
            &mut optimized,
            employees,
            shifts,
            rules,
            &policy,
        );

        let violations = validation::evaluate(&optimized, employees, shifts, rules, &policy);
        let metrics_after =
            RosterMetrics::with_violations(&optimized, employees, shifts, &policy, &violations);

        debug!(focus = %focus, delta = after - before, "focused optimization finished");

        OptimizationResult {
            focus,
            metrics_before,
            metrics_after,
            score_delta: after - before,
            roster: optimized,
        }
    }
}
