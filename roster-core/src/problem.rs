//! The normalized problem instance shared by the grouper and the solver.
//!
//! A [`ProblemInfo`] is only ever produced through its builder, which
//! validates every dimension and relationship at once and yields an
//! immutable value. Both the normalizer and the grouper go through the same
//! builder, so the invariants (dense in-range indices, deduplicated
//! preference triples, reject-wins conflict resolution) hold everywhere.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QuotaKind, QuotaViolation, ScheduleError};

/// A `(unit, day, task)` index triple, the coordinate of one decision
/// variable.
pub type Triple = (usize, usize, usize);

/// Stable identifier of a placement unit.
///
/// Singletons keep their person key; composites carry the flattened,
/// order-preserving list of constituent keys. Flattening is what makes
/// re-grouping an existing composite a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitId {
    Person(String),
    Group(Vec<String>),
}

impl UnitId {
    /// The person keys behind this unit, singleton or composite.
    pub fn keys(&self) -> &[String] {
        match self {
            UnitId::Person(key) => std::slice::from_ref(key),
            UnitId::Group(keys) => keys,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Person(key) => write!(f, "{key}"),
            UnitId::Group(keys) => write!(f, "[{}]", keys.join(", ")),
        }
    }
}

/// One placement unit: a person, or a group fused into a single atomic
/// allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Display name; composites concatenate their constituents' names.
    pub name: String,
    /// 1 for singletons, the sum of constituents for composites.
    pub headcount: u32,
    /// How many of the heads are women, 0..headcount.
    pub female: u32,
    /// How many of the heads are experienced adults, 0..headcount.
    pub experienced: u32,
}

/// The three parallel `days × tasks` quota matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandMatrix {
    /// Exact headcount `P[day][task]`.
    pub people: Vec<Vec<u32>>,
    /// Minimum women `W[day][task]`.
    pub women: Vec<Vec<u32>>,
    /// Minimum experienced adults `E[day][task]`.
    pub experienced: Vec<Vec<u32>>,
}

impl DemandMatrix {
    /// Broadcasts one per-task quota row to every day of the horizon.
    /// Demand sheets specify quotas once; they are assumed equal on all
    /// days.
    pub fn broadcast(
        people: Vec<u32>,
        women: Vec<u32>,
        experienced: Vec<u32>,
        num_days: usize,
    ) -> DemandMatrix {
        DemandMatrix {
            people: vec![people; num_days],
            women: vec![women; num_days],
            experienced: vec![experienced; num_days],
        }
    }
}

/// A fully validated, immutable problem instance.
///
/// Indices are dense and stable for the lifetime of one value: units are
/// `0..U`, days `0..D`, tasks `0..T`. The grouper consumes a `ProblemInfo`
/// and builds a new one rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInfo {
    tasks: Vec<String>,
    days: Vec<String>,
    units: Vec<Unit>,
    demand: DemandMatrix,
    force: BTreeSet<Triple>,
    reject: BTreeSet<Triple>,
}

impl ProblemInfo {
    pub fn builder(tasks: Vec<String>, days: Vec<String>) -> ProblemInfoBuilder {
        ProblemInfoBuilder {
            tasks,
            days,
            units: Vec::new(),
            demand: None,
            force: Vec::new(),
            reject: Vec::new(),
        }
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn demand(&self) -> &DemandMatrix {
        &self.demand
    }

    /// Triples that must be 1 in every solution.
    pub fn force(&self) -> &BTreeSet<Triple> {
        &self.force
    }

    /// Triples that must be 0 in every solution.
    pub fn reject(&self) -> &BTreeSet<Triple> {
        &self.reject
    }

    pub fn unit_names(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name.clone()).collect()
    }

    /// Verifies `W ≤ P` and `E ≤ P` element-wise, reporting every offending
    /// cell at once. Run before any solve is attempted.
    pub fn check_consistency(&self) -> Result<(), ScheduleError> {
        let mut violations = Vec::new();
        for day in 0..self.num_days() {
            for task in 0..self.num_tasks() {
                let headcount = self.demand.people[day][task];
                let women = self.demand.women[day][task];
                let experienced = self.demand.experienced[day][task];
                if women > headcount {
                    violations.push(QuotaViolation {
                        day,
                        task,
                        kind: QuotaKind::Women,
                        quota: women,
                        headcount,
                    });
                }
                if experienced > headcount {
                    violations.push(QuotaViolation {
                        day,
                        task,
                        kind: QuotaKind::Experienced,
                        quota: experienced,
                        headcount,
                    });
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::ConsistencyError(violations))
        }
    }
}

/// Accumulates the pieces of a [`ProblemInfo`] and validates them atomically
/// in [`build`](ProblemInfoBuilder::build).
pub struct ProblemInfoBuilder {
    tasks: Vec<String>,
    days: Vec<String>,
    units: Vec<Unit>,
    demand: Option<DemandMatrix>,
    force: Vec<Triple>,
    reject: Vec<Triple>,
}

impl ProblemInfoBuilder {
    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn demand(mut self, demand: DemandMatrix) -> Self {
        self.demand = Some(demand);
        self
    }

    pub fn force(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.force.extend(triples);
        self
    }

    pub fn reject(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.reject.extend(triples);
        self
    }

    /// Validates everything at once and freezes the instance.
    ///
    /// Checks performed:
    /// - task names and unit identifiers are unique,
    /// - the three demand matrices are exactly `days × tasks`,
    /// - every force/reject triple is in range,
    /// - per-unit attribute counts stay within the headcount.
    ///
    /// Force and reject are deduplicated; a triple present in both lands in
    /// `reject` only.
    pub fn build(self) -> Result<ProblemInfo, ScheduleError> {
        let num_days = self.days.len();
        let num_tasks = self.tasks.len();
        let num_units = self.units.len();

        let mut seen_tasks = BTreeSet::new();
        for task in &self.tasks {
            if !seen_tasks.insert(task.as_str()) {
                return Err(ScheduleError::InconsistentInputs(format!(
                    "duplicate task name: {task}"
                )));
            }
        }
        let mut seen_ids = BTreeSet::new();
        for unit in &self.units {
            if !seen_ids.insert(unit.id.keys().to_vec()) {
                return Err(ScheduleError::InconsistentInputs(format!(
                    "duplicate unit identifier: {}",
                    unit.id
                )));
            }
            if unit.female > unit.headcount || unit.experienced > unit.headcount {
                return Err(ScheduleError::ShapeError(format!(
                    "unit {} has {} women / {} experienced for headcount {}",
                    unit.id, unit.female, unit.experienced, unit.headcount
                )));
            }
        }

        let demand = self.demand.ok_or_else(|| {
            ScheduleError::ShapeError("demand matrix was not supplied".to_string())
        })?;
        for (matrix, label) in [
            (&demand.people, "people"),
            (&demand.women, "women"),
            (&demand.experienced, "experienced"),
        ] {
            if matrix.len() != num_days || matrix.iter().any(|row| row.len() != num_tasks) {
                return Err(ScheduleError::ShapeError(format!(
                    "wrong shape for {label} demand, expected {num_days} x {num_tasks}"
                )));
            }
        }

        let check_triples = |triples: &[Triple], label: &str| -> Result<(), ScheduleError> {
            for &(unit, day, task) in triples {
                if unit >= num_units || day >= num_days || task >= num_tasks {
                    return Err(ScheduleError::ShapeError(format!(
                        "{label} triple ({unit}, {day}, {task}) out of range for \
                         {num_units} units, {num_days} days, {num_tasks} tasks"
                    )));
                }
            }
            Ok(())
        };
        check_triples(&self.force, "force")?;
        check_triples(&self.reject, "reject")?;

        let reject: BTreeSet<Triple> = self.reject.into_iter().collect();
        // Reject wins: a forced assignment that is also rejected is dropped.
        let force: BTreeSet<Triple> = self
            .force
            .into_iter()
            .filter(|triple| !reject.contains(triple))
            .collect();

        Ok(ProblemInfo {
            tasks: self.tasks,
            days: self.days,
            units: self.units,
            demand,
            force,
            reject,
        })
    }
}
