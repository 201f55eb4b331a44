//! Employee shift rostering engine for the U-Engine ecosystem.
//!
//! Generates, validates, and optimizes monthly shift rosters: an
//! assignment of (employee, day) → shift for one calendar month, checked
//! against a configurable rule set and scored with aggregate quality
//! metrics.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Employee`, `Shift`, `RosterRule`,
//!   `Roster`, `RosterMonth`, `RuleViolation`
//! - **`validation`**: The nine-rule validation engine
//! - **`generator`**: Greedy construction and local-search refinement
//! - **`metrics`**: Coverage, balance, and preference-satisfaction scores
//! - **`engine`**: The `RosterEngine` facade tying the phases together
//!
//! # Design
//!
//! Constraint breaches are data, not errors: generation always returns a
//! best-effort roster plus the violations that explain any shortfall, and
//! `success` simply means no error-severity violation remains. `Result` is
//! reserved for invalid arguments and data-source failures.
//!
//! # References
//!
//! - Burke, De Causmaecker, Vanden Berghe & Van Landeghem (2004),
//!   "The State of the Art of Nurse Rostering"
//! - Ernst, Jiang, Krishnamoorthy & Sier (2004), "Staff scheduling and
//!   rostering: A review of applications, methods and models"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod engine;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod validation;

pub use engine::{
    GenerateRequest, GenerationOutcome, OptimizationResult, RosterData, RosterDataSource,
    RosterEngine, ValidationOutcome,
};
pub use error::EngineError;
pub use generator::local_search::OptimizationFocus;
pub use generator::Strategy;
pub use metrics::RosterMetrics;
pub use models::{
    ApprovalStatus, Employee, Preference, PreferenceKind, Roster, RosterEntry, RosterMonth,
    RosterRule, RuleConfig, RuleKind, RuleScope, RuleViolation, Severity, Shift,
};
pub use policy::{GenerationPolicy, DEFAULT_DAY_OFF_SHIFT_ID};
