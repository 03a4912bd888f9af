//! # roster-core: volunteer roster enumeration engine
//!
//! This crate schedules a fixed population of *placement units* (people, or
//! couples/groups fused into one atomic unit) over a grid of days and tasks.
//! Given per-task demand quotas (total headcount, minimum women, minimum
//! experienced adults) and per-person preference/availability records, it
//! enumerates every feasible roster — a boolean `unit × day × task`
//! assignment tensor — up to a configured cap, using a constraint solver in
//! enumerate-all mode.
//!
//! The pipeline is:
//!
//! ```text
//! raw records -> normalize -> ProblemInfo -> apply_groups -> ProblemInfo'
//!             -> constraint model -> enumeration -> SolutionBundle
//! ```
//!
//! The core consumes only the typed [`models::ProblemInput`] and produces a
//! [`models::SolutionBundle`]; spreadsheet parsing, configuration files and
//! workbook writing belong to adapters such as `roster-cli`.
//!
//! Infeasibility is a *status*, not an error: the seven constraint families
//! carry stable labels (1..7) and callers are expected to retry infeasible
//! instances with progressively larger relaxation sets (start with the
//! spacing family 7, then the quota minimums 3 and 2).
//!
//! ## Quick example
//!
//! ```no_run
//! use roster_core::models::*;
//! use std::collections::HashMap;
//!
//! let input = ProblemInput {
//!     tasks: vec!["Nursery".to_string()],
//!     days: vec!["03/02/2019".to_string()],
//!     persons: vec![
//!         PersonRecord {
//!             key: "ana".to_string(),
//!             name: "Ana".to_string(),
//!             gender: Gender::F,
//!             exp_level: 4,
//!             task_answers: HashMap::new(),
//!         },
//!         PersonRecord {
//!             key: "beto".to_string(),
//!             name: "Beto".to_string(),
//!             gender: Gender::M,
//!             exp_level: 1,
//!             task_answers: HashMap::new(),
//!         },
//!     ],
//!     demand: HashMap::from([(
//!         "Nursery".to_string(),
//!         TaskDemand { people: 1, women: 1, experienced: 1 },
//!     )]),
//!     availability: vec![],
//!     groups: vec![],
//!     exp_threshold: 3,
//!     solver: SolverSettings::default(),
//! };
//!
//! let bundle = roster_core::solve_roster(&input).unwrap();
//! assert_eq!(bundle.status, SearchStatus::Optimal);
//! assert_eq!(bundle.solutions.len(), 1);
//! ```

use log::info;

pub mod error;
pub mod grouping;
pub mod models;
pub mod normalize;
pub mod problem;
pub mod report;
pub mod solver;

pub use error::ScheduleError;
pub use models::{ProblemInput, SearchStatus, SolutionBundle, SolverSettings};
pub use problem::ProblemInfo;

/// Runs the whole pipeline: normalize, apply group operations, check
/// consistency, build the model and enumerate.
///
/// # Errors
///
/// Returns a [`ScheduleError`] for any validation failure (inconsistent
/// input streams, quota inconsistencies, malformed shapes, unknown units in
/// group operations). Infeasibility and timeouts are reported through
/// [`SolutionBundle::status`] instead.
pub fn solve_roster(input: &ProblemInput) -> Result<SolutionBundle, ScheduleError> {
    let info = normalize::normalize(input)?;
    let info = grouping::apply_groups(info, &input.groups)?;
    solve_instance(&info, &input.solver)
}

/// Solves an already-normalized instance.
///
/// This is the entry point for callers that build or transform a
/// [`ProblemInfo`] themselves (extra group operations, relaxation retries on
/// the same instance, tests).
pub fn solve_instance(
    info: &ProblemInfo,
    settings: &SolverSettings,
) -> Result<SolutionBundle, ScheduleError> {
    info.check_consistency()?;
    info!(
        "solving instance: {} units, {} days, {} tasks, cap {}, {} relaxed families",
        info.num_units(),
        info.num_days(),
        info.num_tasks(),
        settings.max_solutions,
        settings.relaxed.len()
    );

    let outcome = match solver::build(info, settings) {
        solver::ModelOutcome::Built(model) => solver::enumerate(model, info, settings),
        solver::ModelOutcome::RootConflict => solver::SolveOutcome::infeasible(),
    };

    Ok(SolutionBundle {
        tasks: info.tasks().to_vec(),
        days: info.days().to_vec(),
        unit_names: info.unit_names(),
        solutions: outcome.solutions,
        status: outcome.status,
    })
}
