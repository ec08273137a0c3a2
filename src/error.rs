//! Error types produced while turning a document into a machine specification and while
//! wiring a transition table to a set of tapes.

use std::fmt;
use thiserror::Error;

/// Any failure of [`crate::parser::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The document is not well-formed YAML.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// The document is well-formed YAML but not a valid machine specification.
    #[error(transparent)]
    Spec(#[from] SpecError),
}

impl ParseError {
    /// Returns the reason code if this is a specification error.
    pub fn reason(&self) -> Option<SpecErrorReason> {
        match self {
            ParseError::Spec(e) => Some(e.reason),
            ParseError::Syntax(_) => None,
        }
    }
}

/// A YAML syntax error. Line and column are one-based when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl From<serde_yaml::Error> for SyntaxError {
    fn from(error: serde_yaml::Error) -> Self {
        let location = error.location();
        Self {
            message: error.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(
                f,
                "Syntax error at line {line}, column {column}: {}",
                self.message
            ),
            _ => write!(f, "Syntax error: {}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Reason codes for [`SpecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecErrorReason {
    EmptyDocument,
    InvalidDocumentType,
    MissingBlank,
    InvalidBlankLength,
    InvalidWildLength,
    MissingStartState,
    UndeclaredStartState,
    InvalidMachineType,
    InvalidInputType,
    MissingTable,
    InvalidTableType,
    DuplicateState,
    InvalidSynonymsType,
    InvalidStateEntryType,
    InvalidSymbol,
    DuplicateSymbol,
    InvalidPattern,
    MissingInstruction,
    InvalidInstructionType,
    UnrecognizedString,
    UnrecognizedKey,
    MissingMovementDirection,
    ConflictingTapeMovements,
    InvalidWriteLength,
    InvalidTapeMove,
    InvalidMoveLength,
    InvalidMoveChar,
    InvalidStateName,
    UndeclaredState,
}

impl SpecErrorReason {
    pub fn message(self) -> &'static str {
        use SpecErrorReason::*;

        match self {
            EmptyDocument => "The document is empty",
            InvalidDocumentType => "The document has an invalid type",
            MissingBlank => "No blank symbol was specified",
            InvalidBlankLength => "The blank symbol must be a string of length 1",
            InvalidWildLength => "The wildcard symbol must be a string of length 1",
            MissingStartState => "No start state was specified",
            UndeclaredStartState => "The start state has to be declared in the transition table",
            InvalidMachineType => "Unrecognized machine type",
            InvalidInputType => "The input has an invalid type",
            MissingTable => "Missing transition table",
            InvalidTableType => "Transition table has an invalid type",
            DuplicateState => "Duplicate state",
            InvalidSynonymsType => "Synonyms table has an invalid type",
            InvalidStateEntryType => "State entry has an invalid type",
            InvalidSymbol => "A tape symbol must be a string of length 1",
            DuplicateSymbol => "Duplicate symbol",
            InvalidPattern => "Pattern length does not match the number of tapes",
            MissingInstruction => "Missing instruction",
            InvalidInstructionType => "Invalid instruction type",
            UnrecognizedString => "Unrecognized string",
            UnrecognizedKey => "Unrecognized key",
            MissingMovementDirection => "Missing movement direction",
            ConflictingTapeMovements => "Conflicting tape movements",
            InvalidWriteLength => "Write requires one symbol per tape",
            InvalidTapeMove => "Invalid tape movement",
            InvalidMoveLength => "Move requires one direction per tape",
            InvalidMoveChar => "Invalid movement direction",
            InvalidStateName => "A state name must be a plain string",
            UndeclaredState => "Undeclared state",
        }
    }
}

impl fmt::Display for SpecErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Where a [`SpecError`] happened and how to fix it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecErrorDetails {
    pub state: Option<String>,
    pub symbol: Option<String>,
    pub synonym: Option<String>,
    pub problem_value: Option<String>,
    pub info: Option<String>,
    pub suggestion: Option<String>,
}

/// A document that is valid YAML but not a valid machine specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    pub reason: SpecErrorReason,
    pub details: SpecErrorDetails,
}

impl SpecError {
    pub fn new(reason: SpecErrorReason) -> Self {
        Self {
            reason,
            details: SpecErrorDetails::default(),
        }
    }

    pub fn with_problem(mut self, value: impl Into<String>) -> Self {
        self.details.problem_value = Some(value.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.details.info = Some(info.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.details.suggestion = Some(suggestion.into());
        self
    }

    pub(crate) fn in_state(mut self, state: &str) -> Self {
        self.details.state = Some(state.to_string());
        self
    }

    pub(crate) fn in_transition(mut self, state: &str, symbol: &str) -> Self {
        self.details.state = Some(state.to_string());
        self.details.symbol = Some(symbol.to_string());
        self
    }

    pub(crate) fn in_synonym(mut self, synonym: &str) -> Self {
        self.details.synonym = Some(synonym.to_string());
        self
    }

    fn location(&self) -> Option<String> {
        let details = &self.details;
        match (&details.state, &details.symbol, &details.synonym) {
            (Some(state), Some(symbol), _) => Some(format!(
                "in the transition from state `{state}` and symbol `{symbol}`"
            )),
            (Some(state), None, _) => Some(format!("for state `{state}`")),
            (None, _, Some(synonym)) => Some(format!("in the definition of synonym `{synonym}`")),
            _ => None,
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(value) = &self.details.problem_value {
            write!(f, " `{value}`")?;
        }
        if let Some(location) = self.location() {
            write!(f, " {location}")?;
        }
        f.write_str(".")?;

        for sentence in [&self.details.info, &self.details.suggestion]
            .into_iter()
            .flatten()
        {
            write!(f, " {sentence}.")?;
        }

        Ok(())
    }
}

impl std::error::Error for SpecError {}

/// Errors raised when a machine is assembled or its tapes are addressed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Transition table expects {expected} tape(s) but {actual} were provided")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Tape index {index} is out of bounds (machine has {tapes} tapes)")]
    TapeIndex { index: usize, tapes: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_display_with_transition_location() {
        let error = SpecError::new(SpecErrorReason::UndeclaredState)
            .with_problem("qz")
            .with_suggestion("Declare every state in the transition table")
            .in_transition("q0", "1");

        assert_eq!(
            error.to_string(),
            "Undeclared state `qz` in the transition from state `q0` and symbol `1`. \
             Declare every state in the transition table."
        );
    }

    #[test]
    fn test_spec_error_display_for_synonym() {
        let error = SpecError::new(SpecErrorReason::UnrecognizedString)
            .with_problem("back")
            .with_info("Note that a synonym cannot be defined using another synonym")
            .in_synonym("loop");

        let message = error.to_string();
        assert!(message
            .starts_with("Unrecognized string `back` in the definition of synonym `loop`."));
        assert!(message.ends_with("cannot be defined using another synonym."));
    }

    #[test]
    fn test_syntax_error_display() {
        let error = SyntaxError {
            message: "did not find expected key".to_string(),
            line: Some(3),
            column: Some(5),
        };

        assert!(error.to_string().contains("line 3, column 5"));
    }

    #[test]
    fn test_parse_error_reason() {
        let error: ParseError = SpecError::new(SpecErrorReason::MissingBlank).into();
        assert_eq!(error.reason(), Some(SpecErrorReason::MissingBlank));
    }
}
