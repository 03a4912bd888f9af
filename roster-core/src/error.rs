//! Error taxonomy for problem construction and validation.
//!
//! Everything here is raised *before* search begins; infeasibility and
//! timeouts are reported through [`crate::models::SearchStatus`] instead so
//! that callers can retry with relaxed constraint families.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors produced while turning raw records into a solvable instance.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScheduleError {
    /// The input streams disagree with each other: the roster and demand
    /// task sets differ, or an availability mark references an unknown
    /// person key or day label.
    #[error("inconsistent inputs: {0}")]
    InconsistentInputs(String),

    /// A minimum quota exceeds the total headcount quota for one or more
    /// (day, task) cells. Every offending cell is listed.
    #[error("demand quotas are inconsistent: {}", list_violations(.0))]
    ConsistencyError(Vec<QuotaViolation>),

    /// A matrix or triple handed to the instance builder does not match the
    /// declared dimensions.
    #[error("shape mismatch: {0}")]
    ShapeError(String),

    /// A group operation referenced a unit that is not in the roster.
    #[error("unknown unit in group operation: {0}")]
    UnknownUnit(String),
}

/// One demand cell whose minimum quota is larger than its headcount quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaViolation {
    pub day: usize,
    pub task: usize,
    pub kind: QuotaKind,
    /// The offending minimum (women or experienced adults).
    pub quota: u32,
    /// The total headcount demanded for the same cell.
    pub headcount: u32,
}

/// Which minimum quota the violation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuotaKind {
    Women,
    Experienced,
}

impl fmt::Display for QuotaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            QuotaKind::Women => "women",
            QuotaKind::Experienced => "experienced",
        };
        write!(
            f,
            "{} quota {} exceeds headcount {} at (day {}, task {})",
            kind, self.quota, self.headcount, self.day, self.task
        )
    }
}

fn list_violations(violations: &[QuotaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
