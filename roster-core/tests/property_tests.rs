//! Property-based tests for normalization, grouping and the solver.
//!
//! These use proptest to verify the core invariants hold across randomly
//! generated instances: every emitted solution satisfies the
//! active constraint families, the grouper's index remap never loses a
//! preference triple, and normalization is deterministic.

mod common;

use std::collections::{BTreeSet, HashMap};

use common::*;
use proptest::prelude::*;
use roster_core::grouping::fuse_units;
use roster_core::models::{
    AvailabilityMark, Gender, PersonRecord, ProblemInput, SolverSettings, TaskAnswer, TaskDemand,
};
use roster_core::normalize::normalize;
use roster_core::problem::{DemandMatrix, ProblemInfo, Triple, Unit, UnitId};
use roster_core::solve_instance;

#[derive(Debug, Clone)]
struct RandomInstance {
    units: Vec<Unit>,
    num_days: usize,
    num_tasks: usize,
    demand: Vec<(u32, u32, u32)>,
    force: Vec<Triple>,
    reject: Vec<Triple>,
}

impl RandomInstance {
    fn build(&self) -> ProblemInfo {
        let people: Vec<u32> = self.demand.iter().map(|d| d.0).collect();
        let women: Vec<u32> = self.demand.iter().map(|d| d.1).collect();
        let experienced: Vec<u32> = self.demand.iter().map(|d| d.2).collect();
        ProblemInfo::builder(labels("task", self.num_tasks), labels("day", self.num_days))
            .units(self.units.clone())
            .demand(DemandMatrix::broadcast(
                people,
                women,
                experienced,
                self.num_days,
            ))
            .force(self.force.iter().copied())
            .reject(self.reject.iter().copied())
            .build()
            .unwrap()
    }
}

fn unit_strategy(index: usize) -> impl Strategy<Value = Unit> {
    (1..=2u32).prop_flat_map(move |headcount| {
        (0..=headcount, 0..=headcount).prop_map(move |(female, experienced)| Unit {
            id: UnitId::Person(format!("p{index}")),
            name: format!("P{index}"),
            headcount,
            female,
            experienced,
        })
    })
}

fn units_strategy(count: usize) -> impl Strategy<Value = Vec<Unit>> {
    (0..count).map(unit_strategy).collect::<Vec<_>>()
}

fn triple_strategy(
    num_units: usize,
    num_days: usize,
    num_tasks: usize,
) -> impl Strategy<Value = Triple> {
    (0..num_units, 0..num_days, 0..num_tasks)
}

fn instance_strategy() -> impl Strategy<Value = RandomInstance> {
    (2..=4usize, 1..=3usize, 1..=2usize).prop_flat_map(|(num_units, num_days, num_tasks)| {
        let demand_cell = (0..=2u32).prop_flat_map(|people| {
            (0..=people, 0..=people).prop_map(move |(women, experienced)| {
                (people, women, experienced)
            })
        });
        (
            units_strategy(num_units),
            proptest::collection::vec(demand_cell, num_tasks),
            proptest::collection::vec(triple_strategy(num_units, num_days, num_tasks), 0..3),
            proptest::collection::vec(triple_strategy(num_units, num_days, num_tasks), 0..3),
        )
            .prop_map(move |(units, demand, force, reject)| RandomInstance {
                units,
                num_days,
                num_tasks,
                demand,
                force,
                reject,
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every solution the driver emits satisfies every active family.
    #[test]
    fn emitted_solutions_satisfy_all_families(
        instance in instance_strategy(),
        gap in 1..=3usize,
    ) {
        let info = instance.build();
        let settings = settings(4, gap);
        let bundle = solve_instance(&info, &settings).unwrap();
        prop_assert!(bundle.solutions.len() <= settings.max_solutions);
        for solution in &bundle.solutions {
            assert_roster_invariants(&info, &settings, solution);
        }
    }
}

proptest! {
    /// The remap in `fuse_units` sends every triple to its semantic target:
    /// fused units collapse onto the composite, survivors shift in order.
    #[test]
    fn fusing_preserves_triple_targets(instance in instance_strategy()) {
        let info = instance.build();
        let num_units = info.num_units();
        prop_assume!(num_units >= 3);

        let members = [info.units()[0].id.clone(), info.units()[2].id.clone()];
        let fused = fuse_units(info.clone(), &members).unwrap();
        let composite_index = fused.num_units() - 1;

        // Units 0 and 2 collapse; unit 1 becomes 0, units 3.. shift by 2.
        let remap = |unit: usize| -> usize {
            match unit {
                0 | 2 => composite_index,
                1 => 0,
                other => other - 2,
            }
        };

        let expected_reject: BTreeSet<Triple> = info
            .reject()
            .iter()
            .map(|&(unit, day, task)| (remap(unit), day, task))
            .collect();
        prop_assert_eq!(fused.reject(), &expected_reject);

        let expected_force: BTreeSet<Triple> = info
            .force()
            .iter()
            .map(|&(unit, day, task)| (remap(unit), day, task))
            .filter(|triple| !expected_reject.contains(triple))
            .collect();
        prop_assert_eq!(fused.force(), &expected_force);
    }

    /// Fusing a set G and then fusing the singleton {composite-of-G} leaves
    /// the instance unchanged.
    #[test]
    fn regrouping_a_composite_is_identity(instance in instance_strategy()) {
        let info = instance.build();
        prop_assume!(info.num_units() >= 2);

        let members = [info.units()[0].id.clone(), info.units()[1].id.clone()];
        let once = fuse_units(info, &members).unwrap();
        let composite_id = once.units()[once.num_units() - 1].id.clone();
        let twice = fuse_units(once.clone(), &[composite_id]).unwrap();
        prop_assert_eq!(once, twice);
    }
}

fn person_strategy(index: usize, tasks: &'static [&'static str]) -> impl Strategy<Value = PersonRecord> {
    let answers = proptest::collection::vec(
        proptest::sample::select(vec![TaskAnswer::Preferred, TaskAnswer::Accept, TaskAnswer::Refuse]),
        tasks.len(),
    );
    (any::<bool>(), 0..=5u8, answers).prop_map(move |(is_female, exp_level, answers)| {
        PersonRecord {
            key: format!("p{index}"),
            name: format!("Person {index}"),
            gender: if is_female { Gender::F } else { Gender::M },
            exp_level,
            task_answers: tasks
                .iter()
                .zip(answers)
                .map(|(task, answer)| (task.to_string(), answer))
                .collect(),
        }
    })
}

fn input_strategy() -> impl Strategy<Value = ProblemInput> {
    static TASKS: [&str; 2] = ["nursery", "kids"];
    static DAYS: [&str; 3] = ["03/02/2019", "10/02/2019", "17/02/2019"];

    (1..=4usize).prop_flat_map(|num_persons| {
        let persons = (0..num_persons)
            .map(|i| person_strategy(i, &TASKS))
            .collect::<Vec<_>>();
        let mark = (0..num_persons, 0..DAYS.len(), 0..4usize).prop_map(|(person, day, value)| {
            AvailabilityMark {
                key: format!("p{person}"),
                day: DAYS[day].to_string(),
                value: ["nursery", "kids", "indisp", "not_allocated"][value].to_string(),
            }
        });
        (persons, proptest::collection::vec(mark, 0..4)).prop_map(|(persons, availability)| {
            ProblemInput {
                tasks: TASKS.iter().map(|t| t.to_string()).collect(),
                days: DAYS.iter().map(|d| d.to_string()).collect(),
                persons,
                demand: HashMap::from([
                    (
                        "nursery".to_string(),
                        TaskDemand { people: 2, women: 1, experienced: 1 },
                    ),
                    (
                        "kids".to_string(),
                        TaskDemand { people: 1, women: 0, experienced: 0 },
                    ),
                ]),
                availability,
                groups: Vec::new(),
                exp_threshold: 3,
                solver: SolverSettings::default(),
            }
        })
    })
}

proptest! {
    /// Identical raw inputs always normalize to the identical instance.
    #[test]
    fn normalization_is_deterministic(input in input_strategy()) {
        let first = normalize(&input).unwrap();
        let second = normalize(&input).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Refusals and unavailability marks always land in `reject`; forced
    /// task cells land in `force` unless rejected on the same cell.
    #[test]
    fn normalized_triples_cover_refusals(input in input_strategy()) {
        let info = normalize(&input).unwrap();
        for (i, person) in input.persons.iter().enumerate() {
            for (task, answer) in &person.task_answers {
                if *answer == TaskAnswer::Refuse {
                    let task_index = input.tasks.iter().position(|t| t == task).unwrap();
                    for day in 0..info.num_days() {
                        prop_assert!(info.reject().contains(&(i, day, task_index)));
                    }
                }
            }
        }
        for triple in info.force() {
            prop_assert!(!info.reject().contains(triple));
        }
    }
}
