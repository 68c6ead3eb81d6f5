use std::fs;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use ilpinfer::error::InferenceError;
use ilpinfer::gen::{GenConfig, generate_problem};
use ilpinfer::infer::run_inference;
use ilpinfer::problem::{Choice, TextProblem, parse_problem_str};
use ilpinfer::solver::Solver;
use ilpinfer::solver::beam::BeamSearch;

#[derive(Debug, Parser)]
#[command(name = "ilpinfer")]
#[command(about = "Constraint-based structured inference over linear programs")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Solve a problem file with the beam-search backend.
    Solve {
        path: String,
        #[arg(long, default_value_t = 50)]
        width: usize,
        /// Unbounded frontier (full search); overrides --width.
        #[arg(long)]
        full: bool,
        #[arg(long)]
        budget_ms: Option<u64>,
        /// Print the algebraic form of the assembled problem.
        #[arg(long)]
        dump: bool,
    },
    /// Write a seeded random instance in the text problem format.
    Gen {
        #[arg(long, default_value_t = 8)]
        groups: usize,
        #[arg(long, default_value_t = 4)]
        max_group_size: usize,
        #[arg(long, default_value_t = 6)]
        constraints: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        out: String,
    },
    /// Solve one instance across several beam widths, CSV rows to stdout.
    Sweep {
        path: String,
        #[arg(long, default_value = "1,2,4,8,16")]
        widths: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Cmd::Solve {
            path,
            width,
            full,
            budget_ms,
            dump,
        } => solve_cmd(&path, width, full, budget_ms, dump),
        Cmd::Gen {
            groups,
            max_group_size,
            constraints,
            seed,
            out,
        } => gen_cmd(groups, max_group_size, constraints, seed, &out),
        Cmd::Sweep { path, widths } => sweep_cmd(&path, &widths),
    }
}

fn load_problem(path: &str) -> Result<TextProblem> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let spec = parse_problem_str(&text).with_context(|| format!("parsing {}", path))?;
    Ok(TextProblem::new(spec))
}

fn solve_cmd(
    path: &str,
    width: usize,
    full: bool,
    budget_ms: Option<u64>,
    dump: bool,
) -> Result<()> {
    let mut problem = load_problem(path)?;
    let beam_width = if full { None } else { Some(width) };
    let mut solver = match budget_ms {
        Some(ms) => BeamSearch::with_time_budget(beam_width, Duration::from_millis(ms)),
        None => BeamSearch::new(beam_width),
    };

    let solution = run_inference(&mut problem, &mut solver)?;

    if dump {
        print!("{}", solver.dump());
    }
    for (name, choice) in &solution.selections {
        match choice {
            Choice::Bool(value) => println!("{} = {}", name, value),
            Choice::Value(index) => println!("{} = {}", name, index),
        }
    }
    println!("objective = {}", solution.objective);
    if solver.used_fallback() {
        println!("fallback = true");
    }
    Ok(())
}

fn gen_cmd(
    groups: usize,
    max_group_size: usize,
    constraints: usize,
    seed: u64,
    out: &str,
) -> Result<()> {
    if groups == 0 {
        bail!("need at least one group");
    }
    let cfg = GenConfig {
        groups,
        max_group_size,
        constraints,
        seed,
    };
    let problem = generate_problem(&cfg);
    let text = problem.to_spec().emit();
    fs::write(out, text).with_context(|| format!("writing {}", out))?;
    println!(
        "GEN: wrote {} | groups={} constraints={} seed={}",
        out,
        problem.groups.len(),
        problem.constraints.len(),
        seed
    );
    Ok(())
}

fn sweep_cmd(path: &str, widths: &str) -> Result<()> {
    let widths = widths
        .split(',')
        .map(|w| w.trim().parse::<usize>().map_err(Into::into))
        .collect::<Result<Vec<usize>>>()
        .context("widths must be a comma-separated list of integers")?;

    println!("width,status,objective,fallback,wall_ms");
    for width in widths {
        let mut problem = load_problem(path)?;
        let mut solver = BeamSearch::new(Some(width));
        let start = Instant::now();
        let result = run_inference(&mut problem, &mut solver);
        let wall_ms = start.elapsed().as_millis();

        let (status, objective) = match &result {
            Ok(solution) => ("ok", solution.objective.to_string()),
            Err(InferenceError::Infeasible) => ("infeasible", String::new()),
            Err(InferenceError::TimedOut) => ("timeout", String::new()),
            Err(InferenceError::NoVariables) => ("no_variables", String::new()),
            Err(InferenceError::DuplicateVariable(_)) => ("error", String::new()),
        };
        println!(
            "{},{},{},{},{}",
            width,
            status,
            objective,
            solver.used_fallback(),
            wall_ms
        );
    }
    Ok(())
}
