//! This module defines the core data structures shared by the parser, the execution engine
//! and the state graph deriver: symbols, head movements, instructions, patterns and the
//! validated transition table.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single tape cell value.
pub type Symbol = char;
/// An opaque state identifier.
pub type StateId = String;

/// The maximum number of steps to execute before giving up on a run.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// Marker used in place of whitespace symbols when rendering labels.
pub const VISIBLE_BLANK: char = '␣';

/// Returns a printable stand-in for `symbol`, replacing whitespace with [`VISIBLE_BLANK`].
pub fn visible(symbol: Symbol) -> char {
    if symbol.is_whitespace() {
        VISIBLE_BLANK
    } else {
        symbol
    }
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses a movement letter (`L`, `R` or `S`).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            'S' => Some(Direction::Stay),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The machine arities recognized in a document's `type` field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MachineType {
    #[default]
    OneTape,
    ThreeTape,
}

impl MachineType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "1tape" => Some(MachineType::OneTape),
            "3tape" => Some(MachineType::ThreeTape),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MachineType::OneTape => "1tape",
            MachineType::ThreeTape => "3tape",
        }
    }

    /// Number of tapes a machine of this type operates on.
    pub fn tapes(self) -> usize {
        match self {
            MachineType::OneTape => 1,
            MachineType::ThreeTape => 3,
        }
    }
}

/// A single-tape instruction.
///
/// `write: None` leaves the cell untouched and `next_state: None` keeps the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub write: Option<Symbol>,
    pub movement: Direction,
    pub next_state: Option<StateId>,
}

impl Instruction {
    /// An instruction that only moves the head.
    pub fn movement(movement: Direction) -> Self {
        Self {
            write: None,
            movement,
            next_state: None,
        }
    }
}

/// An instruction for a machine with several tapes.
///
/// When present, `write` and `moves` hold exactly one entry per tape. A `None` write entry
/// leaves that tape's cell as read; an absent `moves` keeps every head in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiInstruction {
    pub write: Option<Vec<Option<Symbol>>>,
    pub moves: Option<Vec<Direction>>,
    pub next_state: Option<StateId>,
}

impl MultiInstruction {
    /// An instruction that only moves the heads.
    pub fn moves(moves: Vec<Direction>) -> Self {
        Self {
            write: None,
            moves: Some(moves),
            next_state: None,
        }
    }

    /// The symbol to write on `tape`, if any.
    pub fn write_for(&self, tape: usize) -> Option<Symbol> {
        self.write.as_ref().and_then(|w| w.get(tape).copied().flatten())
    }

    /// The movement for `tape`, defaulting to [`Direction::Stay`].
    pub fn move_for(&self, tape: usize) -> Direction {
        self.moves
            .as_ref()
            .and_then(|m| m.get(tape).copied())
            .unwrap_or(Direction::Stay)
    }
}

/// The left-hand side of a multi-tape rule: one symbol (or the wildcard) per tape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern(Vec<Symbol>);

impl Pattern {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks whether every position is either the wildcard or equal to the symbol read
    /// from the corresponding tape.
    pub fn matches(&self, symbols: &[Symbol], wildcard: Option<Symbol>) -> bool {
        self.0.len() == symbols.len()
            && self
                .0
                .iter()
                .zip(symbols)
                .all(|(&expected, &read)| Some(expected) == wildcard || expected == read)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// A multi-tape rule. Rules of a state are evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub pattern: Pattern,
    pub instruction: MultiInstruction,
}

/// Transitions of a single-tape state, keyed by the symbol read.
pub type SymbolMap = IndexMap<Symbol, Instruction>;

/// state → symbol → instruction. A `None` entry marks a halting state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SingleTapeTable {
    states: IndexMap<StateId, Option<SymbolMap>>,
}

impl SingleTapeTable {
    pub fn new(states: IndexMap<StateId, Option<SymbolMap>>) -> Self {
        Self { states }
    }

    pub fn states(&self) -> &IndexMap<StateId, Option<SymbolMap>> {
        &self.states
    }

    /// Direct lookup of the instruction for `state` reading `symbol`.
    pub fn get(&self, state: &str, symbol: Symbol) -> Option<&Instruction> {
        self.states.get(state)?.as_ref()?.get(&symbol)
    }
}

/// state → ordered rules, plus the tape count and the declared wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiTapeTable {
    tapes: usize,
    wildcard: Option<Symbol>,
    states: IndexMap<StateId, Option<Vec<Rule>>>,
}

impl MultiTapeTable {
    pub fn new(
        tapes: usize,
        wildcard: Option<Symbol>,
        states: IndexMap<StateId, Option<Vec<Rule>>>,
    ) -> Self {
        Self {
            tapes,
            wildcard,
            states,
        }
    }

    pub fn tapes(&self) -> usize {
        self.tapes
    }

    pub fn wildcard(&self) -> Option<Symbol> {
        self.wildcard
    }

    pub fn states(&self) -> &IndexMap<StateId, Option<Vec<Rule>>> {
        &self.states
    }

    /// Returns the first rule of `state` whose pattern matches `symbols`.
    pub fn find(&self, state: &str, symbols: &[Symbol]) -> Option<&Rule> {
        self.states
            .get(state)?
            .as_ref()?
            .iter()
            .find(|rule| rule.pattern.matches(symbols, self.wildcard))
    }
}

/// The validated transition table, dispatched explicitly on the machine's arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransitionTable {
    SingleTape(SingleTapeTable),
    MultiTape(MultiTapeTable),
}

/// A borrowed instruction of either arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionRef<'a> {
    Single(&'a Instruction),
    Multi(&'a MultiInstruction),
}

impl<'a> InstructionRef<'a> {
    pub fn next_state(&self) -> Option<&'a str> {
        match self {
            InstructionRef::Single(i) => i.next_state.as_deref(),
            InstructionRef::Multi(i) => i.next_state.as_deref(),
        }
    }
}

impl TransitionTable {
    /// Number of tapes the table is written for.
    pub fn tapes(&self) -> usize {
        match self {
            TransitionTable::SingleTape(_) => 1,
            TransitionTable::MultiTape(t) => t.tapes(),
        }
    }

    /// State names in declaration order.
    pub fn states(&self) -> Vec<&str> {
        match self {
            TransitionTable::SingleTape(t) => t.states().keys().map(String::as_str).collect(),
            TransitionTable::MultiTape(t) => t.states().keys().map(String::as_str).collect(),
        }
    }

    pub fn contains_state(&self, state: &str) -> bool {
        match self {
            TransitionTable::SingleTape(t) => t.states().contains_key(state),
            TransitionTable::MultiTape(t) => t.states().contains_key(state),
        }
    }

    /// Checks if `state` is declared without any transitions.
    pub fn is_halting_state(&self, state: &str) -> bool {
        match self {
            TransitionTable::SingleTape(t) => matches!(t.states().get(state), Some(None)),
            TransitionTable::MultiTape(t) => matches!(t.states().get(state), Some(None)),
        }
    }

    pub fn state_count(&self) -> usize {
        match self {
            TransitionTable::SingleTape(t) => t.states().len(),
            TransitionTable::MultiTape(t) => t.states().len(),
        }
    }

    /// Total number of symbol or pattern entries across all states.
    pub fn transition_count(&self) -> usize {
        match self {
            TransitionTable::SingleTape(t) => t.states().values().flatten().map(|m| m.len()).sum(),
            TransitionTable::MultiTape(t) => t.states().values().flatten().map(|r| r.len()).sum(),
        }
    }

    /// States `state` can transition to, in table order. Entries without an explicit next
    /// state loop back to `state`.
    pub fn successors<'a>(&'a self, state: &'a str) -> Vec<&'a str> {
        match self {
            TransitionTable::SingleTape(t) => t
                .states()
                .get(state)
                .and_then(Option::as_ref)
                .map(|symbols| {
                    symbols
                        .values()
                        .map(|i| i.next_state.as_deref().unwrap_or(state))
                        .collect()
                })
                .unwrap_or_default(),
            TransitionTable::MultiTape(t) => t
                .states()
                .get(state)
                .and_then(Option::as_ref)
                .map(|rules| {
                    rules
                        .iter()
                        .map(|r| r.instruction.next_state.as_deref().unwrap_or(state))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Looks up the instruction for `state` given the symbols under each head.
    ///
    /// Single-tape tables use a direct key lookup; multi-tape tables scan the state's rules
    /// and return the first pattern that matches.
    pub fn lookup(&self, state: &str, symbols: &[Symbol]) -> Option<InstructionRef<'_>> {
        match self {
            TransitionTable::SingleTape(t) => match symbols {
                [symbol] => t.get(state, *symbol).map(InstructionRef::Single),
                _ => None,
            },
            TransitionTable::MultiTape(t) => t
                .find(state, symbols)
                .map(|rule| InstructionRef::Multi(&rule.instruction)),
        }
    }
}

/// A fully validated machine specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spec {
    /// Optional document title.
    pub name: Option<String>,
    pub machine_type: MachineType,
    pub blank: Symbol,
    /// Wildcard symbol for multi-tape patterns.
    pub wild: Option<Symbol>,
    pub start_state: StateId,
    /// Initial content of the first tape.
    pub input: Option<String>,
    pub table: TransitionTable,
}

impl Spec {
    pub fn tapes(&self) -> usize {
        self.machine_type.tapes()
    }

    pub fn is_single_tape(&self) -> bool {
        self.machine_type == MachineType::OneTape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_letters() {
        for letter in ['L', 'R', 'S'] {
            let direction = Direction::from_letter(letter).unwrap();
            assert_eq!(direction.letter(), letter);
        }
        assert_eq!(Direction::from_letter('X'), None);
    }

    #[test]
    fn test_direction_serialization() {
        let json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(json, "\"Left\"");
    }

    #[test]
    fn test_machine_type_names() {
        assert_eq!(MachineType::from_name("1tape"), Some(MachineType::OneTape));
        assert_eq!(MachineType::from_name("3tape"), Some(MachineType::ThreeTape));
        assert_eq!(MachineType::from_name("2tape"), None);
        assert_eq!(MachineType::ThreeTape.tapes(), 3);
        assert_eq!(MachineType::default(), MachineType::OneTape);
    }

    #[test]
    fn test_wildcard_matches_anything() {
        let pattern = Pattern::new(vec!['*', '1', '*']);

        for (a, b) in [('0', '0'), ('x', ' '), ('1', '1')] {
            assert!(pattern.matches(&[a, '1', b], Some('*')));
            assert!(!pattern.matches(&[a, '0', b], Some('*')));
        }
    }

    #[test]
    fn test_pattern_without_wildcard_is_literal() {
        let pattern = Pattern::new(vec!['*', '1', '*']);

        assert!(!pattern.matches(&['a', '1', 'b'], None));
        assert!(pattern.matches(&['*', '1', '*'], None));
        assert!(!pattern.matches(&['*', '1'], None));
    }

    #[test]
    fn test_multi_instruction_defaults() {
        let instruction = MultiInstruction {
            write: Some(vec![Some('1'), None, Some('_')]),
            moves: None,
            next_state: None,
        };

        assert_eq!(instruction.write_for(0), Some('1'));
        assert_eq!(instruction.write_for(1), None);
        assert_eq!(instruction.move_for(2), Direction::Stay);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rule = |pattern: &str, next: &str| Rule {
            pattern: Pattern::new(pattern.chars().collect()),
            instruction: MultiInstruction {
                write: None,
                moves: None,
                next_state: Some(next.to_string()),
            },
        };
        let mut states = IndexMap::new();
        states.insert(
            "q0".to_string(),
            Some(vec![rule("0..", "a"), rule("0.1", "b")]),
        );
        let table = MultiTapeTable::new(3, Some('.'), states);

        let found = table.find("q0", &['0', 'x', '1']).unwrap();
        assert_eq!(found.instruction.next_state.as_deref(), Some("a"));
    }

    #[test]
    fn test_visible_blank() {
        assert_eq!(visible(' '), VISIBLE_BLANK);
        assert_eq!(visible('0'), '0');
    }
}
