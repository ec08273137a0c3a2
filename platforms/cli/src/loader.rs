//! Loading machine documents from files and readers.

use anyhow::{Context, Result};
use std::{fs, io::Read, path::Path};
use tmsim::{parse, Spec};

/// Loads and parses the machine document at `path`.
pub fn load_program(path: &Path) -> Result<Spec> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;

    parse(&content).with_context(|| format!("Invalid machine document {}", path.display()))
}

/// Loads and parses a machine document from `reader`, e.g. standard input.
pub fn load_program_from_reader(mut reader: impl Read) -> Result<Spec> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("Failed to read machine document")?;

    parse(&content).context("Invalid machine document")
}
