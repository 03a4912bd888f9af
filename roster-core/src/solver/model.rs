//! Translation of a [`ProblemInfo`] into a constraint model.
//!
//! One 0/1 integer variable per `(unit, day, task)` triple, and the seven
//! labeled constraint families posted as integer linear constraints.
//! Families whose label is in the relaxation set are omitted entirely.

use log::debug;
use pumpkin_solver::constraints as cp;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use pumpkin_solver::Solver;

use crate::models::{ConstraintId, SolverSettings};
use crate::problem::ProblemInfo;

/// A built model: the solver plus the decision-variable tensor
/// `vars[unit][day][task]`, each with domain `{0, 1}`.
pub(crate) struct CandidateModel {
    pub(crate) solver: Solver,
    pub(crate) vars: Vec<Vec<Vec<DomainId>>>,
}

pub(crate) enum ModelOutcome {
    Built(CandidateModel),
    /// A constraint conflicted at the root during posting; the instance is
    /// infeasible and no search is needed.
    RootConflict,
}

pub(crate) fn build(info: &ProblemInfo, settings: &SolverSettings) -> ModelOutcome {
    let num_units = info.num_units();
    let num_days = info.num_days();
    let num_tasks = info.num_tasks();

    let mut solver = Solver::default();
    let tag = solver.new_constraint_tag();

    let vars: Vec<Vec<Vec<DomainId>>> = (0..num_units)
        .map(|_| {
            (0..num_days)
                .map(|_| {
                    (0..num_tasks)
                        .map(|_| solver.new_bounded_integer(0, 1))
                        .collect()
                })
                .collect()
        })
        .collect();

    macro_rules! post {
        ($constraint:expr) => {
            if solver.add_constraint($constraint).post().is_err() {
                return ModelOutcome::RootConflict;
            }
        };
    }

    let active = |family: ConstraintId| !settings.relaxed.contains(&family);

    // 1: exact headcount per (day, task). Equality is deliberate:
    // overstaffing is disallowed, over-qualification (families 2 and 3) is
    // not.
    if active(ConstraintId::HeadcountQuota) {
        for day in 0..num_days {
            for task in 0..num_tasks {
                let mut terms = Vec::with_capacity(num_units);
                for (unit, unit_vars) in vars.iter().enumerate() {
                    terms.push(unit_vars[day][task].scaled(info.units()[unit].headcount as i32));
                }
                post!(cp::equals(
                    terms,
                    info.demand().people[day][task] as i32,
                    tag
                ));
            }
        }
    }

    // 2: minimum experienced adults per (day, task).
    if active(ConstraintId::ExperienceQuota) {
        for day in 0..num_days {
            for task in 0..num_tasks {
                let mut terms = Vec::with_capacity(num_units);
                for (unit, unit_vars) in vars.iter().enumerate() {
                    let coeff = info.units()[unit].experienced as i32;
                    if coeff != 0 {
                        terms.push(unit_vars[day][task].scaled(coeff));
                    }
                }
                post!(cp::greater_than_or_equals(
                    terms,
                    info.demand().experienced[day][task] as i32,
                    tag
                ));
            }
        }
    }

    // 3: minimum women per (day, task).
    if active(ConstraintId::FemaleQuota) {
        for day in 0..num_days {
            for task in 0..num_tasks {
                let mut terms = Vec::with_capacity(num_units);
                for (unit, unit_vars) in vars.iter().enumerate() {
                    let coeff = info.units()[unit].female as i32;
                    if coeff != 0 {
                        terms.push(unit_vars[day][task].scaled(coeff));
                    }
                }
                post!(cp::greater_than_or_equals(
                    terms,
                    info.demand().women[day][task] as i32,
                    tag
                ));
            }
        }
    }

    // 4: at most one task per day per unit.
    if active(ConstraintId::OneTaskPerDay) {
        for unit_vars in &vars {
            for day_vars in unit_vars {
                let terms: Vec<_> = day_vars.iter().map(|&x| x.scaled(1)).collect();
                post!(cp::less_than_or_equals(terms, 1, tag));
            }
        }
    }

    // 5 and 6: forced and rejected assignments.
    if active(ConstraintId::ForcedAssignments) {
        for &(unit, day, task) in info.force() {
            post!(cp::equals(vec![vars[unit][day][task].scaled(1)], 1, tag));
        }
    }
    if active(ConstraintId::RejectedAssignments) {
        for &(unit, day, task) in info.reject() {
            post!(cp::equals(vec![vars[unit][day][task].scaled(1)], 0, tag));
        }
    }

    // 7: at most one allocation inside any window of `min_gap_days`
    // consecutive days. Windows of width < 2 are implied by family 4.
    if active(ConstraintId::Spacing) {
        let gap = settings.min_gap_days;
        if gap >= 2 && num_days >= gap {
            for unit_vars in &vars {
                for start in 0..=(num_days - gap) {
                    let mut terms = Vec::with_capacity(gap * num_tasks);
                    for day_vars in &unit_vars[start..start + gap] {
                        for &x in day_vars {
                            terms.push(x.scaled(1));
                        }
                    }
                    post!(cp::less_than_or_equals(terms, 1, tag));
                }
            }
        }
    }

    debug!(
        "built model: {} decision variables over {} units x {} days x {} tasks",
        num_units * num_days * num_tasks,
        num_units,
        num_days,
        num_tasks
    );
    ModelOutcome::Built(CandidateModel { solver, vars })
}
