//! This module turns a YAML machine document into a validated [`Spec`].
//!
//! Parsing happens in three passes over the generic YAML value: the top-level fields are
//! collected and checked, synonyms are resolved with synonyms themselves unavailable (so one
//! synonym can never be defined through another), and finally the table is parsed with the
//! resolved synonyms. Every next state is checked against the declared states as soon as
//! its instruction is produced, so a returned table is always fully valid.

use crate::{
    error::{ParseError, SpecError, SpecErrorReason, SyntaxError},
    types::{
        Direction, Instruction, MachineType, MultiInstruction, MultiTapeTable, Pattern, Rule,
        SingleTapeTable, Spec, StateId, Symbol, SymbolMap, TransitionTable,
    },
};
use indexmap::{IndexMap, IndexSet};
use serde_yaml::{Mapping, Value};
use tracing::debug;

type Reason = SpecErrorReason;

/// Declared states in table order, with their raw entries.
type StateEntries<'a> = IndexMap<StateId, &'a Value>;

const SYNONYM_CHAIN_HINT: &str = "Note that a synonym cannot be defined using another synonym";
const UNDECLARED_STATE_SUGGESTION: &str =
    "Make sure to list all states in the transition table and define their transitions (if any)";
const NUMERIC_KEY_SUGGESTION: &str =
    "Quote symbols and patterns that look like numbers, e.g. '001'";
const INPUT_QUOTE_SUGGESTION: &str = "Quote the input so it is read as text, e.g. input: '10.50'";

/// Parses the given document into a validated [`Spec`].
///
/// # Returns
///
/// * `Ok(Spec)` if the document is a valid machine specification.
/// * `Err(ParseError::Syntax)` if the document is not well-formed YAML.
/// * `Err(ParseError::Spec)` for the first specification defect found.
pub fn parse(input: &str) -> Result<Spec, ParseError> {
    let blank_or_comment = |line: &str| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    };
    if input.lines().all(blank_or_comment) {
        return Err(empty_document().into());
    }

    let document: Value =
        serde_yaml::from_str(input).map_err(|error| match oversized_integer(&error) {
            Some(spec_error) => ParseError::from(spec_error),
            None => ParseError::from(SyntaxError::from(error)),
        })?;
    let spec = parse_document(&document)?;

    debug!(
        machine_type = spec.machine_type.name(),
        states = spec.table.state_count(),
        transitions = spec.table.transition_count(),
        "parsed machine specification"
    );

    Ok(spec)
}

/// Top-level fields of a document, before validation.
#[derive(Default)]
struct Fields<'a> {
    name: Option<&'a Value>,
    blank: Option<&'a Value>,
    wild: Option<&'a Value>,
    start_state: Option<&'a Value>,
    machine_type: Option<&'a Value>,
    input: Option<&'a Value>,
    synonyms: Option<&'a Value>,
    table: Option<&'a Value>,
}

impl<'a> Fields<'a> {
    fn collect(document: &'a Mapping) -> Self {
        let mut fields = Fields::default();

        for (key, value) in document {
            let value = Some(untag(value)).filter(|v| !v.is_null());
            match scalar_string(key).as_deref() {
                Some("name") => fields.name = value,
                Some("blank") => fields.blank = value,
                Some("wild") => fields.wild = value,
                Some("start state") => fields.start_state = value,
                Some("type") => fields.machine_type = value,
                Some("input") => fields.input = value,
                Some("synonyms") => fields.synonyms = value,
                Some("table") => fields.table = value,
                other => debug!(key = ?other, "ignoring unrecognized top-level key"),
            }
        }

        fields
    }
}

fn parse_document(document: &Value) -> Result<Spec, SpecError> {
    let document = match untag(document) {
        Value::Null => return Err(empty_document()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(SpecError::new(Reason::InvalidDocumentType)
                .with_problem(type_name(other))
                .with_info("A machine document is a mapping of fields such as `blank` and `table`"))
        }
    };
    let fields = Fields::collect(document);

    let blank = parse_blank(fields.blank)?;
    let wild = parse_wild(fields.wild)?;
    let start_state = parse_start_state(fields.start_state)?;
    let machine_type = parse_machine_type(fields.machine_type)?;
    let entries = parse_state_entries(fields.table)?;

    if wild.is_some() && machine_type == MachineType::OneTape {
        debug!("wildcard symbol has no effect on a single-tape machine");
    }

    let table = match machine_type {
        MachineType::OneTape => {
            let grammar = SingleTape;
            let synonyms = parse_synonyms(&grammar, fields.synonyms, &entries)?;
            TransitionTable::SingleTape(parse_single_tape_table(&synonyms, &entries)?)
        }
        MachineType::ThreeTape => {
            let grammar = MultiTape {
                tapes: machine_type.tapes(),
                wildcard: wild,
            };
            let synonyms = parse_synonyms(&grammar, fields.synonyms, &entries)?;
            TransitionTable::MultiTape(parse_multi_tape_table(&grammar, &synonyms, &entries)?)
        }
    };

    if !entries.contains_key(&start_state) {
        return Err(SpecError::new(Reason::UndeclaredStartState).with_problem(start_state));
    }

    Ok(Spec {
        name: fields.name.and_then(scalar_string),
        machine_type,
        blank,
        wild,
        start_state,
        input: parse_input(fields.input)?,
        table,
    })
}

/// A [`Value`] holds at most 128-bit integers, so serde_yaml rejects longer unquoted digit
/// strings with a message like "input: invalid type: integer `1011…` as u128, ...".
fn oversized_integer(error: &serde_yaml::Error) -> Option<SpecError> {
    const MARKER: &str = "invalid type: integer `";

    let message = error.to_string();
    let start = message.find(MARKER)?;
    let (digits, rest) = message[start + MARKER.len()..].split_once('`')?;
    if !(rest.starts_with(" as u128") || rest.starts_with(" as i128")) {
        return None;
    }

    let path = message[..start].trim_end_matches(": ");
    let spec_error = if path == "input" {
        SpecError::new(Reason::InvalidInputType)
            .with_info("The input is written as a string of tape symbols")
            .with_suggestion(INPUT_QUOTE_SUGGESTION)
    } else {
        SpecError::new(Reason::InvalidSymbol).with_suggestion(NUMERIC_KEY_SUGGESTION)
    };
    Some(spec_error.with_problem(digits))
}

fn empty_document() -> SpecError {
    SpecError::new(Reason::EmptyDocument).with_info(
        "Every Turing machine requires a `blank` tape symbol, a `start state`, \
         and a transition `table`",
    )
}

fn parse_blank(value: Option<&Value>) -> Result<Symbol, SpecError> {
    let suggestion = "Examples: `blank: ' '`, `blank: '0'`";
    let value = value
        .ok_or_else(|| SpecError::new(Reason::MissingBlank).with_suggestion(suggestion))?;

    scalar_string(value)
        .as_deref()
        .and_then(single_char)
        .ok_or_else(|| {
            SpecError::new(Reason::InvalidBlankLength)
                .with_problem(describe(value))
                .with_suggestion(suggestion)
        })
}

fn parse_wild(value: Option<&Value>) -> Result<Option<Symbol>, SpecError> {
    value
        .map(|value| {
            scalar_string(value)
                .as_deref()
                .and_then(single_char)
                .ok_or_else(|| {
                    SpecError::new(Reason::InvalidWildLength)
                        .with_problem(describe(value))
                        .with_suggestion("Example: `wild: '*'`")
                })
        })
        .transpose()
}

fn parse_start_state(value: Option<&Value>) -> Result<StateId, SpecError> {
    value
        .and_then(scalar_string)
        .filter(|state| !state.is_empty())
        .ok_or_else(|| {
            SpecError::new(Reason::MissingStartState)
                .with_suggestion("Assign one using `start state: `")
        })
}

fn parse_machine_type(value: Option<&Value>) -> Result<MachineType, SpecError> {
    let Some(value) = value else {
        return Ok(MachineType::default());
    };

    scalar_string(value)
        .as_deref()
        .and_then(MachineType::from_name)
        .ok_or_else(|| {
            SpecError::new(Reason::InvalidMachineType)
                .with_problem(describe(value))
                .with_info("Supported machine types are `1tape` and `3tape`")
        })
}

fn parse_input(value: Option<&Value>) -> Result<Option<String>, SpecError> {
    value
        .map(|value| {
            scalar_string(value).ok_or_else(|| {
                SpecError::new(Reason::InvalidInputType)
                    .with_problem(describe(value))
                    .with_info("The input is written as a string of tape symbols")
                    .with_suggestion(INPUT_QUOTE_SUGGESTION)
            })
        })
        .transpose()
}

/// Collects the declared states and their raw entries in table order.
fn parse_state_entries(value: Option<&Value>) -> Result<StateEntries<'_>, SpecError> {
    let value = value.ok_or_else(|| {
        SpecError::new(Reason::MissingTable).with_suggestion("Specify one using `table:`")
    })?;
    let Value::Mapping(table) = value else {
        return Err(SpecError::new(Reason::InvalidTableType)
            .with_problem(type_name(value))
            .with_info(
                "The transition table should be a nested mapping \
                 from states to symbols to instructions",
            ));
    };

    let mut entries = IndexMap::with_capacity(table.len());
    for (key, entry) in table {
        let state = scalar_string(key).ok_or_else(|| {
            SpecError::new(Reason::InvalidStateName).with_problem(describe(key))
        })?;
        if entries.insert(state.clone(), untag(entry)).is_some() {
            return Err(SpecError::new(Reason::DuplicateState).with_problem(state));
        }
    }

    Ok(entries)
}

/// How synonym names are resolved while parsing an instruction string.
enum Synonyms<'a, I> {
    /// Synonym bodies are being parsed: names are known but cannot be referenced.
    Unavailable(&'a IndexSet<String>),
    Resolved(&'a IndexMap<String, I>),
}

impl<I: Clone> Synonyms<'_, I> {
    fn resolve(&self, name: &str) -> Result<Option<I>, SpecError> {
        match self {
            Synonyms::Resolved(synonyms) => Ok(synonyms.get(name).cloned()),
            Synonyms::Unavailable(names) if names.contains(name) => {
                Err(unrecognized_string(name))
            }
            Synonyms::Unavailable(_) => Ok(None),
        }
    }
}

fn unrecognized_string(value: &str) -> SpecError {
    SpecError::new(Reason::UnrecognizedString)
        .with_problem(value)
        .with_info("An instruction can be a string if it's a synonym or a direction")
}

/// The instruction grammar of one machine arity.
trait Grammar {
    type Instruction: Clone;

    fn parse_string(
        &self,
        value: &str,
        synonyms: &Synonyms<'_, Self::Instruction>,
    ) -> Result<Self::Instruction, SpecError>;

    fn parse_mapping(&self, mapping: &Mapping) -> Result<Self::Instruction, SpecError>;

    fn next_state<'i>(&self, instruction: &'i Self::Instruction) -> Option<&'i str>;

    fn type_info(&self) -> &'static str;

    /// Parses any instruction value and checks its next state against the declared states.
    fn parse_instruction(
        &self,
        value: &Value,
        synonyms: &Synonyms<'_, Self::Instruction>,
        states: &StateEntries<'_>,
    ) -> Result<Self::Instruction, SpecError> {
        let instruction = match untag(value) {
            Value::String(s) => self.parse_string(s, synonyms)?,
            Value::Mapping(m) => self.parse_mapping(m)?,
            Value::Null => return Err(SpecError::new(Reason::MissingInstruction)),
            other => {
                return Err(SpecError::new(Reason::InvalidInstructionType)
                    .with_problem(type_name(other))
                    .with_info(self.type_info()))
            }
        };

        if let Some(state) = self.next_state(&instruction) {
            if !states.contains_key(state) {
                return Err(SpecError::new(Reason::UndeclaredState)
                    .with_problem(state)
                    .with_suggestion(UNDECLARED_STATE_SUGGESTION));
            }
        }

        Ok(instruction)
    }
}

struct SingleTape;

impl Grammar for SingleTape {
    type Instruction = Instruction;

    fn parse_string(
        &self,
        value: &str,
        synonyms: &Synonyms<'_, Instruction>,
    ) -> Result<Instruction, SpecError> {
        if let Some(direction) = single_char(value).and_then(Direction::from_letter) {
            return Ok(Instruction::movement(direction));
        }
        if let Some(instruction) = synonyms.resolve(value)? {
            return Ok(instruction);
        }

        // Shorthand: a bare state name stays in place and changes state.
        Ok(Instruction {
            write: None,
            movement: Direction::Stay,
            next_state: Some(value.to_string()),
        })
    }

    fn parse_mapping(&self, mapping: &Mapping) -> Result<Instruction, SpecError> {
        let mut movement: Option<(Direction, &Value)> = None;
        let mut conflicting = false;
        let mut write = None;

        for (key, value) in mapping {
            let key = instruction_key(key)?;
            match key.as_str() {
                "write" => write = Some(untag(value)),
                letter => match single_char(letter).and_then(Direction::from_letter) {
                    Some(direction) => {
                        conflicting |= movement.is_some();
                        movement = Some((direction, untag(value)));
                    }
                    None => {
                        return Err(SpecError::new(Reason::UnrecognizedKey)
                            .with_problem(key.as_str())
                            .with_info(
                                "An instruction always has a tape movement `L`, `R`, or `S` (stay), \
                                 and optionally can `write` a symbol",
                            ))
                    }
                },
            }
        }

        if conflicting {
            return Err(SpecError::new(Reason::ConflictingTapeMovements).with_info(
                "Each instruction needs exactly one movement direction, but more were found",
            ));
        }
        let (movement, next_state) =
            movement.ok_or_else(|| SpecError::new(Reason::MissingMovementDirection))?;

        let write = match write.filter(|v| !v.is_null()) {
            None => None,
            Some(value) => Some(
                scalar_string(value)
                    .as_deref()
                    .and_then(single_char)
                    .ok_or_else(|| {
                        SpecError::new(Reason::InvalidWriteLength)
                            .with_problem(describe(value))
                            .with_info("A single-tape write is exactly one symbol")
                    })?,
            ),
        };

        Ok(Instruction {
            write,
            movement,
            next_state: optional_state(next_state)?,
        })
    }

    fn next_state<'i>(&self, instruction: &'i Instruction) -> Option<&'i str> {
        instruction.next_state.as_deref()
    }

    fn type_info(&self) -> &'static str {
        "An instruction can be a string (a direction `L`/`R`/`S`, a synonym or a state) \
         or a mapping (examples: `{R: accept}`, `{write: ' ', L: start}`)"
    }
}

struct MultiTape {
    tapes: usize,
    wildcard: Option<Symbol>,
}

impl MultiTape {
    fn parse_moves(&self, value: &Value) -> Result<Vec<Direction>, SpecError> {
        let text = scalar_string(value).unwrap_or_default();
        if text.chars().count() != self.tapes {
            return Err(SpecError::new(Reason::InvalidMoveLength)
                .with_problem(describe(value))
                .with_info(format!(
                    "Expected {} movement letters (`L`, `R` or `S`), one per tape",
                    self.tapes
                )));
        }

        text.chars()
            .enumerate()
            .map(|(tape, letter)| {
                Direction::from_letter(letter).ok_or_else(|| {
                    SpecError::new(Reason::InvalidMoveChar)
                        .with_problem(letter.to_string())
                        .with_info(format!("Tape {tape} must move `L`, `R` or `S`"))
                })
            })
            .collect()
    }

    fn parse_write(&self, value: &Value) -> Result<Vec<Option<Symbol>>, SpecError> {
        let symbols: Vec<Symbol> = scalar_string(value).unwrap_or_default().chars().collect();
        if symbols.len() != self.tapes {
            return Err(SpecError::new(Reason::InvalidWriteLength)
                .with_problem(describe(value))
                .with_info(format!("Expected {} symbols, one per tape", self.tapes))
                .with_suggestion(NUMERIC_KEY_SUGGESTION));
        }

        // Writing the wildcard leaves that tape's cell as it was read.
        Ok(symbols
            .into_iter()
            .map(|symbol| Some(symbol).filter(|&s| Some(s) != self.wildcard))
            .collect())
    }
}

impl Grammar for MultiTape {
    type Instruction = MultiInstruction;

    fn parse_string(
        &self,
        value: &str,
        synonyms: &Synonyms<'_, MultiInstruction>,
    ) -> Result<MultiInstruction, SpecError> {
        let letters: Vec<char> = value.chars().collect();
        let moves: Option<Vec<Direction>> =
            letters.iter().map(|&c| Direction::from_letter(c)).collect();

        match moves {
            Some(moves) if letters.len() == self.tapes => return Ok(MultiInstruction::moves(moves)),
            _ => {}
        }
        if let Some(instruction) = synonyms.resolve(value)? {
            return Ok(instruction);
        }

        if letters.len() == self.tapes {
            if let Some((tape, &letter)) = letters
                .iter()
                .enumerate()
                .find(|(_, &c)| Direction::from_letter(c).is_none())
            {
                return Err(SpecError::new(Reason::InvalidTapeMove)
                    .with_problem(letter.to_string())
                    .with_info(format!("Tape {tape} must move `L`, `R` or `S`")));
            }
        }

        Err(unrecognized_string(value))
    }

    fn parse_mapping(&self, mapping: &Mapping) -> Result<MultiInstruction, SpecError> {
        let mut instruction = MultiInstruction {
            write: None,
            moves: None,
            next_state: None,
        };

        for (key, value) in mapping {
            let key = instruction_key(key)?;
            let value = untag(value);
            if value.is_null() && matches!(key.as_str(), "write" | "move" | "next") {
                continue;
            }

            match key.as_str() {
                "write" => instruction.write = Some(self.parse_write(value)?),
                "move" => instruction.moves = Some(self.parse_moves(value)?),
                "next" => instruction.next_state = optional_state(value)?,
                _ => {
                    return Err(SpecError::new(Reason::UnrecognizedKey)
                        .with_problem(key.as_str())
                        .with_info(
                            "A multi-tape instruction may have `write`, `move` and `next` keys",
                        ))
                }
            }
        }

        Ok(instruction)
    }

    fn next_state<'i>(&self, instruction: &'i MultiInstruction) -> Option<&'i str> {
        instruction.next_state.as_deref()
    }

    fn type_info(&self) -> &'static str {
        "A multi-tape instruction can be a string of movement letters (e.g. `RRS`), a synonym, \
         or a mapping (example: `{write: '1_1', move: RSL, next: done}`)"
    }
}

/// Resolves every synonym body with synonyms unavailable to each other.
fn parse_synonyms<G: Grammar>(
    grammar: &G,
    value: Option<&Value>,
    states: &StateEntries<'_>,
) -> Result<IndexMap<String, G::Instruction>, SpecError> {
    let Some(value) = value else {
        return Ok(IndexMap::new());
    };
    let Value::Mapping(mapping) = value else {
        return Err(SpecError::new(Reason::InvalidSynonymsType)
            .with_problem(type_name(value))
            .with_info(
                "Synonyms should be a mapping from string abbreviations to instructions \
                 (e.g. `accept: {R: accept}`)",
            ));
    };

    let names: IndexSet<String> = mapping.keys().filter_map(scalar_string).collect();
    let unavailable = Synonyms::Unavailable(&names);
    let mut synonyms = IndexMap::with_capacity(mapping.len());

    for (key, body) in mapping {
        let name = scalar_string(key).ok_or_else(|| {
            SpecError::new(Reason::UnrecognizedKey)
                .with_problem(describe(key))
                .with_info("Synonym names must be plain strings")
        })?;
        let instruction = grammar
            .parse_instruction(body, &unavailable, states)
            .map_err(|e| {
                let e = e.in_synonym(&name);
                if e.reason == Reason::UnrecognizedString {
                    e.with_info(SYNONYM_CHAIN_HINT)
                } else {
                    e
                }
            })?;
        synonyms.insert(name, instruction);
    }

    Ok(synonyms)
}

/// Returns the state's transitions, or `None` for a halting state (`null` or `{}`).
fn state_mapping<'a>(state: &str, value: &'a Value) -> Result<Option<&'a Mapping>, SpecError> {
    match value {
        Value::Null => Ok(None),
        Value::Mapping(m) if m.is_empty() => Ok(None),
        Value::Mapping(m) => Ok(Some(m)),
        other => Err(SpecError::new(Reason::InvalidStateEntryType)
            .with_problem(type_name(other))
            .with_info(
                "Each state should map symbols to instructions. \
                 An empty map signifies a halting state",
            )
            .in_state(state)),
    }
}

fn parse_single_tape_table(
    synonyms: &IndexMap<String, Instruction>,
    entries: &StateEntries<'_>,
) -> Result<SingleTapeTable, SpecError> {
    let synonyms = Synonyms::Resolved(synonyms);
    let mut states = IndexMap::with_capacity(entries.len());

    for (state, &entry) in entries {
        let Some(mapping) = state_mapping(state, entry)? else {
            states.insert(state.clone(), None);
            continue;
        };

        let mut symbols = SymbolMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key_text = describe(key);
            let keys = symbol_keys(key).map_err(|e| e.in_transition(state, &key_text))?;
            let instruction = SingleTape
                .parse_instruction(value, &synonyms, entries)
                .map_err(|e| e.in_transition(state, &key_text))?;

            for symbol in keys {
                if symbols.insert(symbol, instruction.clone()).is_some() {
                    return Err(SpecError::new(Reason::DuplicateSymbol)
                        .with_problem(symbol.to_string())
                        .with_info("Each symbol may appear only once per state")
                        .in_state(state));
                }
            }
        }

        states.insert(state.clone(), Some(symbols));
    }

    Ok(SingleTapeTable::new(states))
}

fn parse_multi_tape_table(
    grammar: &MultiTape,
    synonyms: &IndexMap<String, MultiInstruction>,
    entries: &StateEntries<'_>,
) -> Result<MultiTapeTable, SpecError> {
    let synonyms = Synonyms::Resolved(synonyms);
    let mut states = IndexMap::with_capacity(entries.len());

    for (state, &entry) in entries {
        let Some(mapping) = state_mapping(state, entry)? else {
            states.insert(state.clone(), None);
            continue;
        };

        let mut rules: Vec<Rule> = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key_text = describe(key);
            let pattern = scalar_string(key)
                .map(|text| Pattern::new(text.chars().collect()))
                .filter(|pattern| pattern.len() == grammar.tapes)
                .ok_or_else(|| {
                    SpecError::new(Reason::InvalidPattern)
                        .with_problem(key_text.as_str())
                        .with_info(format!(
                            "A pattern has exactly {} symbols, one per tape",
                            grammar.tapes
                        ))
                        .with_suggestion(NUMERIC_KEY_SUGGESTION)
                        .in_state(state)
                })?;

            if rules.iter().any(|rule| rule.pattern == pattern) {
                return Err(SpecError::new(Reason::DuplicateSymbol)
                    .with_problem(key_text)
                    .with_info("Each pattern may appear only once per state")
                    .in_state(state));
            }

            let instruction = grammar
                .parse_instruction(value, &synonyms, entries)
                .map_err(|e| e.in_transition(state, &key_text))?;
            rules.push(Rule {
                pattern,
                instruction,
            });
        }

        states.insert(state.clone(), Some(rules));
    }

    Ok(MultiTapeTable::new(grammar.tapes, grammar.wildcard, states))
}

/// Expands a single-tape key into its symbols: a one-character scalar, or a sequence of them.
fn symbol_keys(key: &Value) -> Result<Vec<Symbol>, SpecError> {
    let invalid = || {
        SpecError::new(Reason::InvalidSymbol)
            .with_problem(describe(key))
            .with_suggestion(NUMERIC_KEY_SUGGESTION)
    };

    match untag(key) {
        Value::Sequence(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                scalar_string(item)
                    .as_deref()
                    .and_then(single_char)
                    .ok_or_else(invalid)
            })
            .collect(),
        other => scalar_string(other)
            .as_deref()
            .and_then(single_char)
            .map(|symbol| vec![symbol])
            .ok_or_else(invalid),
    }
}

fn instruction_key(key: &Value) -> Result<String, SpecError> {
    scalar_string(key).ok_or_else(|| {
        SpecError::new(Reason::UnrecognizedKey).with_problem(describe(key))
    })
}

/// A next-state value: absent when null, otherwise a scalar state name.
fn optional_state(value: &Value) -> Result<Option<StateId>, SpecError> {
    match untag(value) {
        Value::Null => Ok(None),
        other => scalar_string(other).map(Some).ok_or_else(|| {
            SpecError::new(Reason::InvalidStateName).with_problem(describe(other))
        }),
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Scalars as the user typed them: `0` is the symbol `"0"`, `true` is `"true"`.
///
/// Floats are rejected: their text is not preserved (`.10` reads back as `0.1`).
fn scalar_string(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn single_char(text: &str) -> Option<Symbol> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Renders a value for diagnostics.
fn describe(value: &Value) -> String {
    match untag(value) {
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(describe).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Number(n) => n.to_string(),
        other => scalar_string(other).unwrap_or_else(|| type_name(other).to_string()),
    }
}
