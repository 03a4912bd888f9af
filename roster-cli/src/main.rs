//! roster-cli: command-line front-end for the roster solver.
//!
//! The CLI owns everything the core leaves to adapters: reading
//! `config.yml`, loading the problem file it names (JSON or YAML
//! `ProblemInput`), and writing the solution workbooks. Working-directory
//! convention: configuration at `./config.yml`, outputs under
//! `./solutions/<solution_name>/`.
//!
//! # Commands
//!
//! - `solve`: run the solver and write the workbooks
//! - `validate`: normalize, group and consistency-check without solving

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use roster_core::models::{ConstraintId, ProblemInput, SearchStatus, SolutionBundle};
use roster_core::report::solution_report;
use roster_core::{grouping, normalize, solve_roster};
use rust_xlsxwriter::Workbook;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "roster-cli")]
#[command(version = "0.1.0")]
#[command(about = "Volunteer roster solver CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the configured problem and write solution workbooks
    Solve {
        /// Configuration file path
        #[arg(value_name = "CONFIG", default_value = "config.yml")]
        config: PathBuf,

        /// Directory to place `solutions/` in (defaults to the current dir)
        #[arg(short, long)]
        output_root: Option<PathBuf>,
    },

    /// Validate the configured problem without solving
    Validate {
        /// Configuration file path
        #[arg(value_name = "CONFIG", default_value = "config.yml")]
        config: PathBuf,
    },
}

/// The `config.yml` shape. Solver-related keys override whatever the
/// problem file carries; couples are appended to its group operations.
#[derive(Deserialize, Debug, Clone)]
struct Config {
    /// Path to the `ProblemInput` file (`.json`, `.yml` or `.yaml`),
    /// relative to the configuration file.
    problem_path: PathBuf,
    /// Name of this run; workbooks land under `solutions/<solution_name>`.
    solution_name: String,
    #[serde(default)]
    couples: Vec<Vec<String>>,
    #[serde(default)]
    exp_threshold: Option<u8>,
    #[serde(default)]
    maximum_number_of_solutions: Option<usize>,
    #[serde(default)]
    max_solve_time_seconds: Option<u64>,
    #[serde(default)]
    one_allocation_every_how_many_weeks: Option<usize>,
    #[serde(default)]
    relaxed_constraints: Vec<u8>,
    /// One workbook with a sheet per solution instead of one workbook per
    /// solution.
    #[serde(default)]
    solutions_in_single_file: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Solve {
            config,
            output_root,
        } => cmd_solve(&config, output_root.as_deref()),
        Commands::Validate { config } => cmd_validate(&config),
    };
    match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn load_problem(config_path: &Path, config: &Config) -> Result<ProblemInput> {
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let path = base.join(&config.problem_path);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read problem file {}", path.display()))?;
    let mut input: ProblemInput = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse problem file {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse problem file {}", path.display()))?
    };

    input.groups.extend(config.couples.iter().cloned());
    if let Some(threshold) = config.exp_threshold {
        input.exp_threshold = threshold;
    }
    if let Some(max_solutions) = config.maximum_number_of_solutions {
        input.solver.max_solutions = max_solutions;
    }
    if let Some(max_time) = config.max_solve_time_seconds {
        input.solver.max_time_seconds = max_time;
    }
    if let Some(gap) = config.one_allocation_every_how_many_weeks {
        input.solver.min_gap_days = gap;
    }
    if !config.relaxed_constraints.is_empty() {
        let relaxed: BTreeSet<ConstraintId> = config
            .relaxed_constraints
            .iter()
            .map(|&label| {
                ConstraintId::try_from(label)
                    .map_err(|message| anyhow::anyhow!("bad relaxed_constraints entry: {message}"))
            })
            .collect::<Result<_>>()?;
        input.solver.relaxed = relaxed;
    }
    Ok(input)
}

fn cmd_solve(config_path: &Path, output_root: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let input = load_problem(config_path, &config)?;

    eprintln!(
        "solving {} ({} persons, {} days, {} tasks)...",
        config.solution_name,
        input.persons.len(),
        input.days.len(),
        input.tasks.len()
    );
    let bundle = solve_roster(&input)?;

    match bundle.status {
        SearchStatus::Infeasible => {
            eprintln!("no feasible roster under the current constraints.");
            eprintln!(
                "hint: retry with relaxed_constraints: [7] (spacing), then [7, 3] and \
                 [7, 3, 2] (quota minimums)."
            );
            return Ok(ExitCode::FAILURE);
        }
        SearchStatus::ModelInvalid => {
            bail!("the solver rejected the model");
        }
        SearchStatus::Unknown if bundle.solutions.is_empty() => {
            eprintln!("time budget expired before any roster was found.");
            return Ok(ExitCode::FAILURE);
        }
        _ => {}
    }

    let root = output_root.unwrap_or_else(|| Path::new("."));
    let solutions_dir = root.join("solutions");
    let written = write_workbooks(
        &bundle,
        &solutions_dir,
        &config.solution_name,
        config.solutions_in_single_file,
    )?;
    eprintln!(
        "{} roster(s) found ({:?}); wrote {}",
        bundle.solutions.len(),
        bundle.status,
        written.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(config_path: &Path) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let input = load_problem(config_path, &config)?;

    let info = normalize::normalize(&input)?;
    let info = grouping::apply_groups(info, &input.groups)?;
    info.check_consistency()?;
    println!(
        "ok: {} placement units, {} days, {} tasks, {} forced, {} rejected",
        info.num_units(),
        info.num_days(),
        info.num_tasks(),
        info.force().len(),
        info.reject().len()
    );
    Ok(ExitCode::SUCCESS)
}

/// Writes the solution workbooks and returns the path they landed in.
///
/// Layout per sheet: row 0 holds the day labels, one row per task below it,
/// each cell listing the assigned unit names; two trailing columns list
/// every unit and the number of days it works in that roster.
fn write_workbooks(
    bundle: &SolutionBundle,
    solutions_dir: &Path,
    name: &str,
    single_file: bool,
) -> Result<PathBuf> {
    if single_file {
        fs::create_dir_all(solutions_dir)
            .with_context(|| format!("failed to create {}", solutions_dir.display()))?;
        let path = solutions_dir.join(format!("{name}.xlsx"));
        let mut workbook = Workbook::new();
        for (index, solution) in bundle.solutions.iter().enumerate() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(format!("Solution{index}"))?;
            write_sheet(sheet, bundle, solution)?;
        }
        workbook
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        Ok(path)
    } else {
        let dir = solutions_dir.join(name);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for (index, solution) in bundle.solutions.iter().enumerate() {
            let path = dir.join(format!("solution_{index}.xlsx"));
            let mut workbook = Workbook::new();
            let sheet = workbook.add_worksheet();
            sheet.set_name(format!("Solution{index}"))?;
            write_sheet(sheet, bundle, solution)?;
            workbook
                .save(&path)
                .with_context(|| format!("failed to save {}", path.display()))?;
        }
        Ok(dir)
    }
}

fn write_sheet(
    sheet: &mut rust_xlsxwriter::Worksheet,
    bundle: &SolutionBundle,
    solution: &roster_core::models::SolutionTensor,
) -> Result<()> {
    let report = solution_report(bundle, solution);

    for (day, label) in bundle.days.iter().enumerate() {
        sheet.write_string(0, (day + 1) as u16, label.as_str())?;
    }
    for (task, task_name) in bundle.tasks.iter().enumerate() {
        let row = (task + 1) as u32;
        sheet.write_string(row, 0, task_name.as_str())?;
        for (day, cell) in report.grid[task].iter().enumerate() {
            sheet.write_string(row, (day + 1) as u16, cell.as_str())?;
        }
    }

    let counter_column = (bundle.days.len() + 2) as u16;
    sheet.write_string(0, counter_column, "Name")?;
    sheet.write_string(0, counter_column + 1, "Number of days worked")?;
    for (unit, unit_name) in bundle.unit_names.iter().enumerate() {
        let row = (unit + 1) as u32;
        sheet.write_string(row, counter_column, unit_name.as_str())?;
        sheet.write_number(row, counter_column + 1, f64::from(report.days_assigned[unit]))?;
    }
    Ok(())
}
