//! Boundary helper that flattens a solution tensor into the table shape
//! output adapters write: a `task × day` grid of comma-joined unit names
//! plus a per-unit count of assigned days.

use crate::models::{SolutionBundle, SolutionTensor};

/// One solution rendered as strings, ready for a workbook or terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionReport {
    /// `grid[task][day]`: the names of the units staffing that cell, joined
    /// with `", "` in unit index order.
    pub grid: Vec<Vec<String>>,
    /// Number of assigned days per unit, aligned with `unit_names`.
    pub days_assigned: Vec<u32>,
}

/// Derives the report for one solution of the bundle.
pub fn solution_report(bundle: &SolutionBundle, solution: &SolutionTensor) -> SolutionReport {
    let num_days = bundle.days.len();
    let num_tasks = bundle.tasks.len();
    let mut grid = vec![vec![String::new(); num_days]; num_tasks];
    let mut days_assigned = vec![0u32; bundle.unit_names.len()];

    for task in 0..num_tasks {
        for day in 0..num_days {
            let mut staffed: Vec<&str> = Vec::new();
            for (unit, unit_solution) in solution.iter().enumerate() {
                if unit_solution[day][task] {
                    staffed.push(&bundle.unit_names[unit]);
                    days_assigned[unit] += 1;
                }
            }
            grid[task][day] = staffed.join(", ");
        }
    }

    SolutionReport {
        grid,
        days_assigned,
    }
}
