mod diagnostics;
mod language;
mod runtime;

use clap::{Parser, Subcommand};
use diagnostics::{emit_syntax_errors, report_runtime_error, report_script_error};
use runtime::bridge::to_json;
use runtime::machine::{Machine, MachineOptions};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "gosling",
    version,
    about = "Embeddable Go-like expression interpreter",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate an expression given on the command line
    Eval {
        /// The expression to evaluate
        expr: String,
        #[command(flatten)]
        options: EvalOptions,
    },
    /// Evaluate an expression read from a script file
    Run {
        /// Path to the script file
        file: PathBuf,
        #[command(flatten)]
        options: EvalOptions,
    },
}

#[derive(Debug, clap::Args)]
struct EvalOptions {
    /// Trace evaluation and environment mutations to stderr
    #[arg(long)]
    debug: bool,
    /// Bound on evaluator recursion depth
    #[arg(long)]
    max_depth: Option<usize>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Eval { expr, options } => evaluate_source("<eval>", &expr, &options),
        Commands::Run { file, options } => {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    report_script_error(&file, &err);
                    return ExitCode::FAILURE;
                }
            };
            let name = file.display().to_string();
            evaluate_source(&name, &source, &options)
        }
    }
}

fn evaluate_source(name: &str, source: &str, options: &EvalOptions) -> ExitCode {
    let mut machine_options = MachineOptions {
        debug: options.debug,
        ..MachineOptions::default()
    };
    if let Some(max_depth) = options.max_depth {
        machine_options.max_depth = max_depth;
    }
    let mut machine = Machine::with_options(machine_options);

    let expr = match machine.parse(source) {
        Ok(expr) => expr,
        Err(errs) => {
            emit_syntax_errors(name, source, &errs.errors);
            return ExitCode::FAILURE;
        }
    };

    match machine.evaluate(&expr) {
        Ok(value) => {
            if options.json {
                println!("{}", to_json(&value));
            } else {
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_runtime_error(&err);
            ExitCode::FAILURE
        }
    }
}
