//! This module provides non-fatal checks on a parsed [`Spec`]. The parser already rejects
//! anything that cannot run; the analyzer points out things that run but are probably
//! mistakes, such as states no transition can reach or input symbols no rule reads.

use crate::types::{Spec, StateId, Symbol, TransitionTable};
use std::collections::{BTreeSet, HashSet, VecDeque};
use thiserror::Error;

/// A likely mistake found in an otherwise valid machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisWarning {
    /// States declared in the table that cannot be reached from the start state.
    #[error("Unreachable states detected: {}", .0.join(", "))]
    UnreachableStates(Vec<StateId>),
    /// Symbols of the input that no rule of the first tape ever reads.
    #[error("Input contains symbols not read by any transition: {0:?}")]
    UnreadableInputSymbols(Vec<Symbol>),
}

/// Analyzes a specification and returns every warning found, in check order.
///
/// An empty result means none of the checks found anything suspicious.
pub fn analyze(spec: &Spec) -> Vec<AnalysisWarning> {
    [check_unreachable_states, check_input_symbols]
        .iter()
        .filter_map(|check| check(spec).err())
        .collect()
}

/// Breadth-first search from the start state. Instructions without a next state stay in
/// their own state, so they never make anything else reachable.
fn check_unreachable_states(spec: &Spec) -> Result<(), AnalysisWarning> {
    let table = &spec.table;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::from([spec.start_state.as_str()]);

    while let Some(state) = queue.pop_front() {
        if !visited.insert(state) {
            continue;
        }

        queue.extend(
            table
                .successors(state)
                .into_iter()
                .filter(|next| !visited.contains(next)),
        );
    }

    let unreachable: Vec<StateId> = table
        .states()
        .into_iter()
        .filter(|state| !visited.contains(state))
        .map(str::to_string)
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisWarning::UnreachableStates(unreachable))
    }
}

/// Checks that each non-blank input symbol appears in at least one rule for the first tape.
fn check_input_symbols(spec: &Spec) -> Result<(), AnalysisWarning> {
    let Some(input) = spec.input.as_deref() else {
        return Ok(());
    };

    let readable: HashSet<Symbol> = match &spec.table {
        TransitionTable::SingleTape(table) => table
            .states()
            .values()
            .flatten()
            .flat_map(|symbols| symbols.keys().copied())
            .collect(),
        TransitionTable::MultiTape(table) => {
            let first: HashSet<Symbol> = table
                .states()
                .values()
                .flatten()
                .flatten()
                .filter_map(|rule| rule.pattern.symbols().first().copied())
                .collect();

            // A wildcard on the first tape reads anything.
            if table.wildcard().is_some_and(|w| first.contains(&w)) {
                return Ok(());
            }
            first
        }
    };

    let unreadable: BTreeSet<Symbol> = input
        .chars()
        .filter(|&c| c != spec.blank && !readable.contains(&c))
        .collect();

    if unreadable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisWarning::UnreadableInputSymbols(
            unreadable.into_iter().collect(),
        ))
    }
}
