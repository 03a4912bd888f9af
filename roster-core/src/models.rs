//! Boundary types for the roster-core API.
//!
//! These are the structures adapters exchange with the core: the raw
//! [`ProblemInput`] consumed by the normalizer and the [`SolutionBundle`]
//! produced by the search driver. Everything is serializable (JSON/YAML) so
//! front-ends and configuration files can construct inputs directly.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// A full solution: `solution[unit][day][task]` is `true` when the unit is
/// assigned to the task on that day.
pub type SolutionTensor = Vec<Vec<Vec<bool>>>;

/// Complete raw input for one scheduling run.
///
/// This mirrors the three record streams of the spreadsheet era — the roster
/// ("who can do what"), the demand quotas ("how many per task") and the
/// availability grid ("who is away or pre-assigned when") — plus the group
/// operations and solver settings.
///
/// # Example
///
/// ```no_run
/// use roster_core::models::*;
/// use std::collections::HashMap;
///
/// let input = ProblemInput {
///     tasks: vec!["Nursery".to_string(), "Kids".to_string()],
///     days: vec!["03/02/2019".to_string(), "10/02/2019".to_string()],
///     persons: vec![PersonRecord {
///         key: "ana".to_string(),
///         name: "Ana".to_string(),
///         gender: Gender::F,
///         exp_level: 4,
///         task_answers: HashMap::from([
///             ("Nursery".to_string(), TaskAnswer::Preferred),
///             ("Kids".to_string(), TaskAnswer::Refuse),
///         ]),
///     }],
///     demand: HashMap::from([
///         ("Nursery".to_string(), TaskDemand { people: 1, women: 1, experienced: 0 }),
///         ("Kids".to_string(), TaskDemand { people: 0, women: 0, experienced: 0 }),
///     ]),
///     availability: vec![],
///     groups: vec![],
///     exp_threshold: 3,
///     solver: SolverSettings::default(),
/// };
/// let bundle = roster_core::solve_roster(&input).unwrap();
/// println!("{:?}: {} roster(s)", bundle.status, bundle.solutions.len());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProblemInput {
    /// Work stations to staff each day. Names must be unique.
    pub tasks: Vec<String>,
    /// Day labels in scheduling order, typically `DD/MM/YYYY` dates.
    pub days: Vec<String>,
    /// One record per person in the roster stream.
    pub persons: Vec<PersonRecord>,
    /// Per-task quotas, keyed by task name. The key set must equal `tasks`.
    pub demand: HashMap<String, TaskDemand>,
    /// Availability / pre-assignment marks from the planning sheet.
    #[serde(default)]
    pub availability: Vec<AvailabilityMark>,
    /// Group operations: each entry lists the person keys to fuse into one
    /// composite placement unit (couples, families, ...).
    #[serde(default)]
    pub groups: Vec<Vec<String>>,
    /// Lowest experience level (0..5) that counts as an experienced adult.
    #[serde(default = "default_exp_threshold")]
    pub exp_threshold: u8,
    /// Search configuration.
    #[serde(default)]
    pub solver: SolverSettings,
}

fn default_exp_threshold() -> u8 {
    3
}

/// One person from the roster stream.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PersonRecord {
    /// Stable key, unique across the roster (spreadsheet row id).
    pub key: String,
    /// Display name used in reports.
    pub name: String,
    pub gender: Gender,
    /// Self-reported experience level, 0..5.
    pub exp_level: u8,
    /// Per-task answer. Tasks missing from the map count as plain accepts.
    #[serde(default)]
    pub task_answers: HashMap<String, TaskAnswer>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    F,
    M,
}

/// A person's answer for one task on the sign-up sheet.
///
/// `Preferred` ("accept with preference") is carried through but currently
/// weighs the same as `Accept`; only `Refuse` affects the model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskAnswer {
    Preferred,
    Accept,
    Refuse,
}

/// Demand quotas for one task, applied to every day of the horizon.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDemand {
    /// Exact number of people required (composite units count per head).
    pub people: u32,
    /// Minimum number of women.
    #[serde(default)]
    pub women: u32,
    /// Minimum number of experienced adults.
    #[serde(default)]
    pub experienced: u32,
}

/// One cell of the availability sheet: what `key` marked for `day`.
///
/// The value is a task name (the person is pre-assigned to it that day), the
/// literal `indisp` (the person is away that day) or anything else, which is
/// ignored — legacy sheets contain sentinels such as `not_allocated`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AvailabilityMark {
    pub key: String,
    pub day: String,
    pub value: String,
}

/// The seven constraint families of the model, with their stable labels.
///
/// Serialized as the bare label so configuration files can write
/// `relaxed: [7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ConstraintId {
    /// Exact headcount per (day, task): oversupply is disallowed.
    HeadcountQuota = 1,
    /// Minimum experienced adults per (day, task).
    ExperienceQuota = 2,
    /// Minimum women per (day, task).
    FemaleQuota = 3,
    /// Each unit takes at most one task per day.
    OneTaskPerDay = 4,
    /// Forced assignments (pre-allocations).
    ForcedAssignments = 5,
    /// Rejected assignments (refusals and unavailability).
    RejectedAssignments = 6,
    /// At most one allocation per sliding window of `min_gap_days` days.
    Spacing = 7,
}

impl ConstraintId {
    pub const ALL: [ConstraintId; 7] = [
        ConstraintId::HeadcountQuota,
        ConstraintId::ExperienceQuota,
        ConstraintId::FemaleQuota,
        ConstraintId::OneTaskPerDay,
        ConstraintId::ForcedAssignments,
        ConstraintId::RejectedAssignments,
        ConstraintId::Spacing,
    ];

    /// The stable integer label callers use to relax this family.
    pub fn label(self) -> u8 {
        self as u8
    }
}

impl From<ConstraintId> for u8 {
    fn from(id: ConstraintId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for ConstraintId {
    type Error = String;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        ConstraintId::ALL
            .into_iter()
            .find(|id| id.label() == label)
            .ok_or_else(|| format!("constraint label out of range 1..7: {label}"))
    }
}

/// Search configuration: caps and the relaxation set.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SolverSettings {
    /// Stop enumerating after this many solutions.
    #[serde(default = "default_max_solutions")]
    pub max_solutions: usize,
    /// Wall-time cap for the whole search. Hitting it is not an error.
    #[serde(default = "default_max_time_seconds")]
    pub max_time_seconds: u64,
    /// Width of the spacing window: at most one allocation per unit within
    /// any `min_gap_days` consecutive days.
    #[serde(default = "default_min_gap_days")]
    pub min_gap_days: usize,
    /// Constraint families to omit entirely from the model. Callers retry
    /// with progressively larger sets when an instance is infeasible.
    #[serde(default)]
    pub relaxed: BTreeSet<ConstraintId>,
}

fn default_max_solutions() -> usize {
    30
}

fn default_max_time_seconds() -> u64 {
    100
}

fn default_min_gap_days() -> usize {
    4
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            max_solutions: default_max_solutions(),
            max_time_seconds: default_max_time_seconds(),
            min_gap_days: default_min_gap_days(),
            relaxed: BTreeSet::new(),
        }
    }
}

/// Terminal state of one enumeration run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Enumeration completed: every satisfying assignment (up to the cap)
    /// was emitted and the solver proved no more exist.
    Optimal,
    /// Solutions were found but search stopped early (cap or time budget).
    Feasible,
    /// No satisfying assignment exists under the given relaxation set.
    Infeasible,
    /// The solver rejected the model itself.
    ModelInvalid,
    /// The time budget expired before anything was proven.
    Unknown,
}

/// Everything a solve produces, in the shape output adapters consume.
///
/// `solutions` preserves the solver's emission order; `unit_names` is
/// aligned with the unit axis of every tensor.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SolutionBundle {
    pub tasks: Vec<String>,
    pub days: Vec<String>,
    pub unit_names: Vec<String>,
    pub solutions: Vec<SolutionTensor>,
    pub status: SearchStatus,
}
