//! This crate provides the core logic for a Turing machine simulator.
//! It includes modules for parsing YAML machine documents, executing single-tape and
//! multi-tape machines, deriving state graphs for visualization, analyzing machines for
//! likely mistakes, and managing a collection of bundled example machines.

pub mod analyzer;
pub mod error;
pub mod graph;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisWarning` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisWarning};
/// Re-exports the error types of parsing and execution.
pub use error::{MachineError, ParseError, SpecError, SpecErrorReason, SyntaxError};
/// Re-exports the state graph types from the graph module.
pub use graph::{Edge, StateGraph, TransitionMatch, Vertex};
/// Re-exports the execution engine and its extension points.
pub use machine::{Observer, Outcome, Transitions, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
pub use tape::{Tape, TapeState};
/// Re-exports the machine model from the types module.
pub use types::{
    Direction, Instruction, InstructionRef, MachineType, MultiInstruction, Pattern, Spec,
    StateId, Symbol, TransitionTable, MAX_EXECUTION_STEPS,
};
