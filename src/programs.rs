//! Registry of the example machines bundled with the library.

use crate::{parser::parse, types::Spec};
use tracing::warn;

// Embedded machine documents, keyed by id.
const PROGRAM_TEXTS: [(&str, &str); 5] = [
    ("binary-increment", include_str!("../machines/binary-increment.yaml")),
    ("busy-beaver-3", include_str!("../machines/busy-beaver-3.yaml")),
    ("copy-3tape", include_str!("../machines/copy-3tape.yaml")),
    ("divisible-by-3", include_str!("../machines/divisible-by-3.yaml")),
    ("repeat01", include_str!("../machines/repeat01.yaml")),
];

/// A bundled machine: its id, document text and parsed specification.
#[derive(Debug, Clone)]
pub struct Program {
    pub id: &'static str,
    pub source: &'static str,
    pub spec: Spec,
}

impl Program {
    /// The document's `name`, falling back to the id.
    pub fn name(&self) -> &str {
        self.spec.name.as_deref().unwrap_or(self.id)
    }
}

lazy_static::lazy_static! {
    /// Parsed on first use. Documents that fail to parse are logged and left out.
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(id, source)| match parse(source) {
            Ok(spec) => Some(Program { id, source, spec }),
            Err(e) => {
                warn!(program = id, error = %e, "failed to parse bundled program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_by_index(index: usize) -> Option<&'static Program> {
        PROGRAMS.get(index)
    }

    /// Get a program by its id
    pub fn get_by_id(id: &str) -> Option<&'static Program> {
        PROGRAMS.iter().find(|program| program.id == id)
    }

    /// List all program ids
    pub fn ids() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.id).collect()
    }

    /// Get information about a program by its index
    pub fn info(index: usize) -> Option<ProgramInfo> {
        let program = Self::get_by_index(index)?;
        let spec = &program.spec;

        Some(ProgramInfo {
            index,
            id: program.id,
            name: program.name().to_string(),
            machine_type: spec.machine_type.name(),
            start_state: spec.start_state.clone(),
            input: spec.input.clone().unwrap_or_default(),
            state_count: spec.table.state_count(),
            transition_count: spec.table.transition_count(),
        })
    }

    /// Search for programs whose id or name contains `query`, ignoring case
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| {
                program.id.contains(&query) || program.name().to_lowercase().contains(&query)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub id: &'static str,
    pub name: String,
    pub machine_type: &'static str,
    pub start_state: String,
    pub input: String,
    pub state_count: usize,
    pub transition_count: usize,
}
