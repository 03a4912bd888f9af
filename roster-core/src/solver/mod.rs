//! Constraint model construction and enumerative search.
//!
//! The model builder posts one 0/1 decision variable per `(unit, day, task)`
//! triple and the seven labeled constraint families; the driver then runs
//! the solver's solution iterator in enumerate-all mode, materializing each
//! emitted assignment into an owned boolean tensor until the solution cap or
//! the time budget is hit.

mod model;

use std::time::Duration;

use log::{debug, info};
use pumpkin_solver::results::solution_iterator::IteratedSolution;
use pumpkin_solver::results::ProblemSolution;
use pumpkin_solver::termination::TimeBudget;

use crate::models::{SearchStatus, SolutionTensor, SolverSettings};
use crate::problem::ProblemInfo;

pub(crate) use model::{build, CandidateModel, ModelOutcome};

/// What one enumeration run produced. Solutions are in emission order.
pub struct SolveOutcome {
    pub status: SearchStatus,
    pub solutions: Vec<SolutionTensor>,
}

impl SolveOutcome {
    pub(crate) fn infeasible() -> SolveOutcome {
        SolveOutcome {
            status: SearchStatus::Infeasible,
            solutions: Vec::new(),
        }
    }
}

/// Enumerates satisfying assignments up to the solution cap, under the
/// wall-time budget.
///
/// Each solution is read out of the solver synchronously before search
/// resumes, so the collected tensors are always complete. Hitting the time
/// budget is not an error: whatever was found so far is returned as
/// `Feasible` (or `Unknown` when nothing was).
pub(crate) fn enumerate(
    candidate: CandidateModel,
    info: &ProblemInfo,
    settings: &SolverSettings,
) -> SolveOutcome {
    let CandidateModel { mut solver, vars } = candidate;
    let num_units = info.num_units();
    let num_days = info.num_days();
    let num_tasks = info.num_tasks();

    let mut solutions: Vec<SolutionTensor> = Vec::new();
    let mut brancher = solver.default_brancher();
    let mut termination =
        TimeBudget::starting_now(Duration::from_secs(settings.max_time_seconds));
    let mut iterator = solver.get_solution_iterator(&mut brancher, &mut termination);

    let status = loop {
        if solutions.len() >= settings.max_solutions {
            debug!("solution cap {} reached, stopping search", settings.max_solutions);
            break SearchStatus::Feasible;
        }
        match iterator.next_solution() {
            IteratedSolution::Solution(solution, ..) => {
                let mut tensor = vec![vec![vec![false; num_tasks]; num_days]; num_units];
                for (unit, unit_vars) in vars.iter().enumerate() {
                    for (day, day_vars) in unit_vars.iter().enumerate() {
                        for (task, &var) in day_vars.iter().enumerate() {
                            tensor[unit][day][task] = solution.get_integer_value(var) == 1;
                        }
                    }
                }
                solutions.push(tensor);
            }
            // Both terminal proofs mean the enumeration is exhaustive.
            IteratedSolution::Finished | IteratedSolution::Unsatisfiable => {
                break if solutions.is_empty() {
                    SearchStatus::Infeasible
                } else {
                    SearchStatus::Optimal
                };
            }
            IteratedSolution::Unknown => {
                break if solutions.is_empty() {
                    SearchStatus::Unknown
                } else {
                    SearchStatus::Feasible
                };
            }
        }
    };

    info!(
        "enumeration finished: {} solution(s), status {:?}",
        solutions.len(),
        status
    );
    SolveOutcome { status, solutions }
}
