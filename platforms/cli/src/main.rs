mod loader;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{io, path::PathBuf};
use tmsim::{
    analyze, Outcome, ProgramManager, Spec, StateGraph, TuringMachine, MAX_EXECUTION_STEPS,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The machine document to execute. Read from stdin when omitted and stdin is piped
    program: Option<PathBuf>,

    /// Run a bundled example machine instead of a file
    #[clap(short, long, conflicts_with = "program")]
    example: Option<String>,

    /// Input for the first tape, overriding the document's `input`
    #[clap(short, long)]
    input: Option<String>,

    /// Print each configuration of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Stop after this many steps
    #[clap(long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print the derived state graph as JSON instead of running the machine
    #[clap(long)]
    graph: bool,

    /// List the bundled example machines
    #[clap(long)]
    list: bool,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if cli.list {
        list_examples();
        return Ok(());
    }

    let mut spec = load(&cli)?;
    if let Some(input) = &cli.input {
        spec.input = Some(input.clone());
    }

    for warning in analyze(&spec) {
        warn!("{warning}");
    }

    if cli.graph {
        println!("{}", StateGraph::derive(&spec.table).to_elements_json());
        return Ok(());
    }

    let mut machine = TuringMachine::new(&spec);
    let outcome = if cli.debug {
        println!("{machine}");
        for _ in 0..cli.max_steps {
            if !machine.step() {
                break;
            }
            println!("{machine}");
        }

        let steps = machine.step_count();
        if machine.is_halted() {
            Outcome::Halted { steps }
        } else {
            Outcome::StepLimitReached { steps }
        }
    } else {
        machine.run(cli.max_steps)
    };

    match outcome {
        Outcome::Halted { steps } => {
            println!("Halted in state `{}` after {steps} steps.", machine.state())
        }
        Outcome::StepLimitReached { steps } => {
            println!("Stopped after {steps} steps in state `{}` (step limit).", machine.state())
        }
    }
    for tape in machine.tapes() {
        println!("{tape}");
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<Spec> {
    if let Some(id) = &cli.example {
        let program = ProgramManager::get_by_id(id)
            .with_context(|| format!("Unknown example `{id}`, see --list"))?;
        return Ok(program.spec.clone());
    }

    match &cli.program {
        Some(path) => loader::load_program(path),
        None if !atty::is(atty::Stream::Stdin) => {
            loader::load_program_from_reader(io::stdin().lock())
        }
        None => bail!(
            "No machine given: pass a file, --example NAME, or pipe a document to stdin"
        ),
    }
}

fn list_examples() {
    for index in 0..ProgramManager::count() {
        if let Some(info) = ProgramManager::info(index) {
            println!(
                "{:<18} {:<22} {} states, {} transitions ({})",
                info.id, info.name, info.state_count, info.transition_count, info.machine_type
            );
        }
    }
}
