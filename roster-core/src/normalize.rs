//! Normalization of raw record streams into a [`ProblemInfo`].
//!
//! The normalizer cross-checks the roster and demand streams, derives the
//! per-person unit attributes, and expands answers and availability marks
//! into force/reject triples:
//!
//! - a `Refuse` answer rejects the person from that task on *every* day,
//! - an availability value naming a task forces the person onto it that day,
//! - the `indisp` value rejects the person from *every* task that day,
//! - anything else in an availability cell is ignored.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::error::ScheduleError;
use crate::models::{Gender, ProblemInput, TaskAnswer};
use crate::problem::{DemandMatrix, ProblemInfo, Triple, Unit, UnitId};

/// The literal availability value marking a person as away for a day.
pub const UNAVAILABLE_MARK: &str = "indisp";

/// Builds a normalized instance from the raw input streams.
///
/// Unit order follows the person record order and day order follows the
/// first appearance of each label, so the produced index assignment is
/// stable across runs.
pub fn normalize(input: &ProblemInput) -> Result<ProblemInfo, ScheduleError> {
    let tasks = input.tasks.clone();

    let roster_tasks: BTreeSet<&str> = tasks.iter().map(String::as_str).collect();
    let demand_tasks: BTreeSet<&str> = input.demand.keys().map(String::as_str).collect();
    if roster_tasks != demand_tasks {
        let missing: Vec<&&str> = roster_tasks.difference(&demand_tasks).collect();
        let extra: Vec<&&str> = demand_tasks.difference(&roster_tasks).collect();
        return Err(ScheduleError::InconsistentInputs(format!(
            "task sets differ between roster and demand streams \
             (missing from demand: {missing:?}, unknown to roster: {extra:?})"
        )));
    }

    // Day labels deduplicate in first-seen order.
    let mut days: Vec<String> = Vec::new();
    for label in &input.days {
        if !days.contains(label) {
            days.push(label.clone());
        }
    }

    let task_index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(k, name)| (name.as_str(), k))
        .collect();
    let day_index: HashMap<&str, usize> = days
        .iter()
        .enumerate()
        .map(|(j, label)| (label.as_str(), j))
        .collect();

    let mut units = Vec::with_capacity(input.persons.len());
    let mut person_index: HashMap<&str, usize> = HashMap::new();
    let mut force: Vec<Triple> = Vec::new();
    let mut reject: Vec<Triple> = Vec::new();

    for (i, person) in input.persons.iter().enumerate() {
        if person_index.insert(person.key.as_str(), i).is_some() {
            return Err(ScheduleError::InconsistentInputs(format!(
                "duplicate person key in roster: {}",
                person.key
            )));
        }
        units.push(Unit {
            id: UnitId::Person(person.key.clone()),
            name: person.name.clone(),
            headcount: 1,
            female: u32::from(person.gender == Gender::F),
            experienced: u32::from(person.exp_level >= input.exp_threshold),
        });
        for (task, answer) in &person.task_answers {
            let &k = task_index.get(task.as_str()).ok_or_else(|| {
                ScheduleError::InconsistentInputs(format!(
                    "person {} answered for unknown task {task}",
                    person.key
                ))
            })?;
            if *answer == TaskAnswer::Refuse {
                reject.extend((0..days.len()).map(|j| (i, j, k)));
            }
        }
    }

    for mark in &input.availability {
        let &i = person_index.get(mark.key.as_str()).ok_or_else(|| {
            ScheduleError::InconsistentInputs(format!(
                "availability mark references unknown person key: {}",
                mark.key
            ))
        })?;
        let &j = day_index.get(mark.day.as_str()).ok_or_else(|| {
            ScheduleError::InconsistentInputs(format!(
                "availability mark references unknown day label: {}",
                mark.day
            ))
        })?;
        if let Some(&k) = task_index.get(mark.value.as_str()) {
            force.push((i, j, k));
        } else if mark.value == UNAVAILABLE_MARK {
            reject.extend((0..tasks.len()).map(|k| (i, j, k)));
        } else {
            // Legacy sheets carry sentinels like `not_allocated`; skip them.
            debug!(
                "ignoring availability value {:?} for person {} on {}",
                mark.value, mark.key, mark.day
            );
        }
    }

    let num_days = days.len();
    let demand_for = |task: &str| input.demand[task];
    let people: Vec<u32> = tasks.iter().map(|t| demand_for(t).people).collect();
    let women: Vec<u32> = tasks.iter().map(|t| demand_for(t).women).collect();
    let experienced: Vec<u32> = tasks.iter().map(|t| demand_for(t).experienced).collect();

    ProblemInfo::builder(tasks, days)
        .units(units)
        .demand(DemandMatrix::broadcast(people, women, experienced, num_days))
        .force(force)
        .reject(reject)
        .build()
}
