//! Shared helpers for roster-core integration tests.

use roster_core::models::{ConstraintId, SolutionTensor, SolverSettings};
use roster_core::problem::{DemandMatrix, ProblemInfo, Unit, UnitId};

/// A one-person unit with the given attribute flags.
#[allow(dead_code)]
pub fn person_unit(key: &str, female: u32, experienced: u32) -> Unit {
    Unit {
        id: UnitId::Person(key.to_string()),
        name: key.to_uppercase(),
        headcount: 1,
        female,
        experienced,
    }
}

/// A pre-fused unit with the given attribute counts.
#[allow(dead_code)]
pub fn group_unit(keys: &[&str], headcount: u32, female: u32, experienced: u32) -> Unit {
    Unit {
        id: UnitId::Group(keys.iter().map(|k| k.to_string()).collect()),
        name: keys.join(", ").to_uppercase(),
        headcount,
        female,
        experienced,
    }
}

#[allow(dead_code)]
pub fn labels(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

/// Builds an instance whose per-task quotas repeat on every day.
#[allow(dead_code)]
pub fn uniform_instance(
    units: Vec<Unit>,
    num_days: usize,
    people: Vec<u32>,
    women: Vec<u32>,
    experienced: Vec<u32>,
) -> ProblemInfo {
    let num_tasks = people.len();
    ProblemInfo::builder(labels("task", num_tasks), labels("day", num_days))
        .units(units)
        .demand(DemandMatrix::broadcast(people, women, experienced, num_days))
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn settings(max_solutions: usize, min_gap_days: usize) -> SolverSettings {
    SolverSettings {
        max_solutions,
        min_gap_days,
        ..SolverSettings::default()
    }
}

/// Asserts every constraint family the settings left active against one
/// solution tensor.
#[allow(dead_code)]
pub fn assert_roster_invariants(
    info: &ProblemInfo,
    settings: &SolverSettings,
    solution: &SolutionTensor,
) {
    let num_units = info.num_units();
    let num_days = info.num_days();
    let num_tasks = info.num_tasks();
    let active = |family: ConstraintId| !settings.relaxed.contains(&family);

    assert_eq!(solution.len(), num_units);
    for unit_solution in solution {
        assert_eq!(unit_solution.len(), num_days);
        for day_solution in unit_solution {
            assert_eq!(day_solution.len(), num_tasks);
        }
    }

    for day in 0..num_days {
        for task in 0..num_tasks {
            let total: u32 = (0..num_units)
                .filter(|&unit| solution[unit][day][task])
                .map(|unit| info.units()[unit].headcount)
                .sum();
            let women: u32 = (0..num_units)
                .filter(|&unit| solution[unit][day][task])
                .map(|unit| info.units()[unit].female)
                .sum();
            let experienced: u32 = (0..num_units)
                .filter(|&unit| solution[unit][day][task])
                .map(|unit| info.units()[unit].experienced)
                .sum();
            if active(ConstraintId::HeadcountQuota) {
                assert_eq!(
                    total,
                    info.demand().people[day][task],
                    "headcount quota violated at (day {day}, task {task})"
                );
            }
            if active(ConstraintId::ExperienceQuota) {
                assert!(
                    experienced >= info.demand().experienced[day][task],
                    "experience quota violated at (day {day}, task {task})"
                );
            }
            if active(ConstraintId::FemaleQuota) {
                assert!(
                    women >= info.demand().women[day][task],
                    "female quota violated at (day {day}, task {task})"
                );
            }
        }
    }

    if active(ConstraintId::OneTaskPerDay) {
        for (unit, unit_solution) in solution.iter().enumerate() {
            for (day, day_solution) in unit_solution.iter().enumerate() {
                let assigned = day_solution.iter().filter(|&&x| x).count();
                assert!(
                    assigned <= 1,
                    "unit {unit} has {assigned} tasks on day {day}"
                );
            }
        }
    }

    if active(ConstraintId::ForcedAssignments) {
        for &(unit, day, task) in info.force() {
            assert!(
                solution[unit][day][task],
                "forced triple ({unit}, {day}, {task}) not honored"
            );
        }
    }
    if active(ConstraintId::RejectedAssignments) {
        for &(unit, day, task) in info.reject() {
            assert!(
                !solution[unit][day][task],
                "rejected triple ({unit}, {day}, {task}) not honored"
            );
        }
    }

    if active(ConstraintId::Spacing) {
        let gap = settings.min_gap_days;
        if gap >= 2 && num_days >= gap {
            for (unit, unit_solution) in solution.iter().enumerate() {
                for start in 0..=(num_days - gap) {
                    let in_window: usize = unit_solution[start..start + gap]
                        .iter()
                        .map(|day_solution| day_solution.iter().filter(|&&x| x).count())
                        .sum();
                    assert!(
                        in_window <= 1,
                        "unit {unit} allocated {in_window} times in window starting day {start}"
                    );
                }
            }
        }
    }
}

/// Asserts the enumeration produced no duplicate tensors.
#[allow(dead_code)]
pub fn assert_no_duplicate_solutions(solutions: &[SolutionTensor]) {
    for (a, first) in solutions.iter().enumerate() {
        for second in solutions.iter().skip(a + 1) {
            assert_ne!(first, second, "duplicate solution emitted");
        }
    }
}
