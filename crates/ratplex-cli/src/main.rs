mod export;
mod input;
mod logging;
mod output;
mod transcript;

use clap::{Args, Parser, Subcommand};
use ratplex_solver::{PivotRule, Solver};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ratplex")]
#[command(about = "Exact rational simplex solver for linear programs", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file, or a problem given as literals
    Solve(SolveArgs),
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Parse a problem file and output the AST
    Parse {
        /// The file to parse
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Problem file (.json, or the text format)
    file: Option<PathBuf>,
    /// Constraint matrix, e.g. "[[2, 1], [1, 2]]"
    #[arg(short = 'A', long = "matrix", conflicts_with = "file")]
    a: Option<String>,
    /// Right-hand side, e.g. "[4, 3]"
    #[arg(short = 'b', long = "rhs", conflicts_with = "file")]
    b: Option<String>,
    /// Objective coefficients, e.g. "[1, 1]"
    #[arg(short = 'c', long = "objective", conflicts_with = "file")]
    c: Option<String>,
    /// Minimize instead of maximize
    #[arg(long, conflicts_with = "file")]
    min: bool,
    /// Constraint operators, e.g. "[<=, >=]"
    #[arg(long, conflicts_with = "file")]
    ops: Option<String>,
    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    format: String,
    /// Give up after this many pivots
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Use Bland's rule, which never cycles
    #[arg(long)]
    bland: bool,
    /// Write a step by step transcript to this file
    #[arg(long)]
    transcript: Option<PathBuf>,
    /// Write one table per step to <stem>-step<k>.csv
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Field delimiter for --csv
    #[arg(long, default_value_t = ';')]
    delimiter: char,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error setting up logging: {}", e);
    }

    match cli.command {
        Commands::Solve(args) => solve(args),
        Commands::Check { file } => {
            let spec = match input::load_problem(&file) {
                Ok(spec) => spec,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            println!("✓ {} is valid", file.display());
            println!("  Sense: {}", spec.sense);
            println!("  Constraints: {}", spec.num_constraints());
            println!("  Variables: {}", spec.num_variables());
            let ops: Vec<String> = spec.resolved_ops().iter().map(|op| op.to_string()).collect();
            println!("  Operators: [{}]", ops.join(", "));
        }
        Commands::Parse { file, format } => {
            let source = match input::read_source(&file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            match ratplex_lang::Parser::parse(&source) {
                Ok(program) => {
                    if format == "json" {
                        match serde_json::to_string_pretty(&program) {
                            Ok(json) => println!("{}", json),
                            Err(e) => {
                                eprintln!("Error serializing AST: {}", e);
                                std::process::exit(1);
                            }
                        }
                    } else {
                        println!("{:#?}", program);
                    }
                }
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn solve(args: SolveArgs) {
    let problem = input::ProblemArgs {
        file: args.file.as_deref(),
        a: args.a.as_deref(),
        b: args.b.as_deref(),
        c: args.c.as_deref(),
        ops: args.ops.as_deref(),
        minimize: args.min,
    };
    let spec = match input::load(&problem) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut solver = Solver::new().with_snapshots(args.transcript.is_some() || args.csv.is_some());
    if let Some(limit) = args.max_iterations {
        solver = solver.with_max_iterations(limit);
    }
    if args.bland {
        solver = solver.with_pivot_rule(PivotRule::Bland);
    }

    let report = match solver.solve(&spec) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Solve error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.transcript {
        if let Err(e) = std::fs::write(path, transcript::render(&report)) {
            eprintln!("Error writing transcript {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    if let Some(path) = &args.csv {
        if let Err(e) = export::write_step_tables(&report.steps, path, args.delimiter) {
            eprintln!("Error writing step tables: {}", e);
            std::process::exit(1);
        }
    }

    if args.format == "json" {
        let output = output::SolveOutput::from_report(&report);
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing solution: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        output::print_pretty(&report);
    }

    if report.is_infeasible() {
        std::process::exit(1);
    }
}
