//! This module defines the `TuringMachine` struct, which executes a transition table over
//! one or more tapes. The machine owns its tapes and current state; transitions are looked up
//! through the [`Transitions`] trait so that a caller can drive execution through something
//! other than the parsed table, such as a [`crate::graph::StateGraph`].

use crate::{
    error::MachineError,
    tape::Tape,
    types::{
        Direction, InstructionRef, Spec, StateId, Symbol, TransitionTable, MAX_EXECUTION_STEPS,
    },
};
use std::{fmt, mem};
use tracing::{debug, trace};

/// Source of instructions for a [`TuringMachine`].
pub trait Transitions {
    /// Number of tapes the instructions are written for.
    fn tapes(&self) -> usize;

    /// Returns the instruction for `state` given the symbols under each head, or `None` if
    /// the machine halts.
    fn lookup(&self, state: &str, symbols: &[Symbol]) -> Option<InstructionRef<'_>>;
}

impl Transitions for TransitionTable {
    fn tapes(&self) -> usize {
        TransitionTable::tapes(self)
    }

    fn lookup(&self, state: &str, symbols: &[Symbol]) -> Option<InstructionRef<'_>> {
        TransitionTable::lookup(self, state, symbols)
    }
}

/// Hooks invoked synchronously from [`TuringMachine::step`], in the order they appear here.
///
/// Every method has an empty default so implementors only override what they animate.
pub trait Observer {
    fn instruction_selected(
        &mut self,
        _state: &str,
        _symbols: &[Symbol],
        _instruction: InstructionRef<'_>,
    ) {
    }

    /// Called for every specified write, including one that rewrites the symbol already there.
    fn symbol_written(&mut self, _tape: usize, _previous: Symbol, _written: Symbol) {}

    fn head_moved(&mut self, _tape: usize, _direction: Direction) {}

    /// Called right after the current state is updated from an instruction's next state.
    fn state_changed(&mut self, _from: &str, _to: &str) {}
}

/// How a call to [`TuringMachine::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No instruction applied; `steps` is the total number of steps executed.
    Halted { steps: usize },
    /// The step budget ran out while an instruction was still applicable.
    StepLimitReached { steps: usize },
}

/// Represents a Turing Machine operating on one tape per table arity.
pub struct TuringMachine<T: Transitions = TransitionTable> {
    transitions: T,
    state: StateId,
    tapes: Vec<Tape>,
    step_count: usize,
    observer: Option<Box<dyn Observer>>,
}

impl TuringMachine<TransitionTable> {
    /// Creates a machine for a parsed specification.
    ///
    /// The first tape holds the document's input (if any) and every other tape starts blank.
    /// Every head starts on the first cell.
    pub fn new(spec: &Spec) -> Self {
        let input = spec.input.as_deref().unwrap_or_default();
        let tapes = (0..spec.tapes())
            .map(|i| Tape::new(spec.blank, if i == 0 { input } else { "" }))
            .collect();

        Self {
            transitions: spec.table.clone(),
            state: spec.start_state.clone(),
            tapes,
            step_count: 0,
            observer: None,
        }
    }
}

impl<T: Transitions> TuringMachine<T> {
    /// Creates a machine from any instruction source and a set of prepared tapes.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::ArityMismatch)` if the number of tapes differs from what the
    ///   transitions are written for.
    pub fn with_transitions(
        transitions: T,
        start: impl Into<StateId>,
        tapes: Vec<Tape>,
    ) -> Result<Self, MachineError> {
        if transitions.tapes() != tapes.len() {
            return Err(MachineError::ArityMismatch {
                expected: transitions.tapes(),
                actual: tapes.len(),
            });
        }

        Ok(Self {
            transitions,
            state: start.into(),
            tapes,
            step_count: 0,
            observer: None,
        })
    }

    /// Installs `observer`, replacing any previously installed one.
    pub fn set_observer(&mut self, observer: impl Observer + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn transitions(&self) -> &T {
        &self.transitions
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    pub fn tape(&self, index: usize) -> Result<&Tape, MachineError> {
        let tapes = self.tapes.len();
        self.tapes
            .get(index)
            .ok_or(MachineError::TapeIndex { index, tapes })
    }

    /// Mutable access to a tape, e.g. to set up input between steps.
    pub fn tape_mut(&mut self, index: usize) -> Result<&mut Tape, MachineError> {
        let tapes = self.tapes.len();
        self.tapes
            .get_mut(index)
            .ok_or(MachineError::TapeIndex { index, tapes })
    }

    /// Reads the symbol under the head of tape `index`.
    pub fn read(&self, index: usize) -> Result<Symbol, MachineError> {
        self.tape(index).map(Tape::read)
    }

    /// Returns the symbols currently under each head, in tape order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Finds the instruction that the next step would execute.
    pub fn next_instruction(&self) -> Option<InstructionRef<'_>> {
        self.transitions.lookup(&self.state, &self.symbols())
    }

    /// Checks if the machine is halted, i.e. no instruction applies to the current state
    /// and symbols. This is recomputed on every call because tapes can be edited in between.
    pub fn is_halted(&self) -> bool {
        self.next_instruction().is_none()
    }

    /// Executes a single step.
    ///
    /// Every head is read before anything is written. Then, tape by tape, the specified
    /// symbol is written and the head is moved; finally the state is updated if the
    /// instruction names a next state.
    ///
    /// # Returns
    ///
    /// * `true` if an instruction was executed.
    /// * `false` if the machine is halted. Nothing is mutated in that case.
    ///
    /// # Panics
    ///
    /// Panics if the selected instruction was written for a different number of tapes.
    pub fn step(&mut self) -> bool {
        let symbols = self.symbols();
        let Self {
            transitions,
            state,
            tapes,
            step_count,
            observer,
        } = self;

        let Some(instruction) = transitions.lookup(state.as_str(), &symbols) else {
            debug!(state = %state, symbols = ?symbols, steps = *step_count, "machine halted");
            return false;
        };

        let mut observer = observer.as_deref_mut();
        if let Some(observer) = observer.as_mut() {
            observer.instruction_selected(state.as_str(), &symbols, instruction);
        }

        for (index, (tape, (write, direction))) in tapes
            .iter_mut()
            .zip(actions(instruction, symbols.len()))
            .enumerate()
        {
            if let Some(symbol) = write {
                let previous = tape.read();
                tape.write(symbol);
                if let Some(observer) = observer.as_mut() {
                    observer.symbol_written(index, previous, symbol);
                }
            }

            tape.move_head(direction);
            if let Some(observer) = observer.as_mut() {
                observer.head_moved(index, direction);
            }
        }

        if let Some(next) = instruction.next_state() {
            let previous = mem::replace(state, next.to_string());
            if let Some(observer) = observer.as_mut() {
                observer.state_changed(&previous, state.as_str());
            }
        }

        *step_count += 1;
        trace!(step = *step_count, state = %state, read = ?symbols, "executed step");

        true
    }

    /// Steps until the machine halts or `max_steps` steps were executed by this call.
    pub fn run(&mut self, max_steps: usize) -> Outcome {
        for _ in 0..max_steps {
            if !self.step() {
                return Outcome::Halted {
                    steps: self.step_count,
                };
            }
        }

        if self.is_halted() {
            Outcome::Halted {
                steps: self.step_count,
            }
        } else {
            Outcome::StepLimitReached {
                steps: self.step_count,
            }
        }
    }

    /// Runs with the default [`MAX_EXECUTION_STEPS`] budget.
    pub fn run_to_completion(&mut self) -> Outcome {
        self.run(MAX_EXECUTION_STEPS)
    }
}

/// Expands an instruction into one (write, move) pair per tape.
fn actions(instruction: InstructionRef<'_>, tapes: usize) -> Vec<(Option<Symbol>, Direction)> {
    match instruction {
        InstructionRef::Single(i) => {
            assert_eq!(tapes, 1, "single-tape instruction executed on {tapes} tapes");
            vec![(i.write, i.movement)]
        }
        InstructionRef::Multi(i) => {
            let widths = [i.write.as_ref().map(Vec::len), i.moves.as_ref().map(Vec::len)];
            for width in widths.into_iter().flatten() {
                assert_eq!(width, tapes, "instruction for {width} tapes executed on {tapes}");
            }
            (0..tapes).map(|t| (i.write_for(t), i.move_for(t))).collect()
        }
    }
}

impl<T: Transitions> fmt::Display for TuringMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        for tape in &self.tapes {
            write!(f, " {tape}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::{cell::RefCell, rc::Rc};

    fn machine(input: &str) -> TuringMachine {
        TuringMachine::new(&parse(input).unwrap())
    }

    const UNARY_INCREMENT: &str = r#"
blank: '0'
start state: q0
input: '11'
table:
  q0:
    1: {R: q0}
    0: {write: 1, R: halt}
  halt: {}
"#;

    const THREE_TAPE_COPY: &str = r#"
type: 3tape
blank: _
start state: q0
input: '111'
table:
  q0:
    1__: {write: 11_, move: RRS, next: q0}
    ___: {move: SSS, next: done}
  done: {}
"#;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Selected(String, Vec<Symbol>),
        Written(usize, Symbol, Symbol),
        Moved(usize, Direction),
        StateChanged(String, String),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl Observer for Recorder {
        fn instruction_selected(&mut self, state: &str, symbols: &[Symbol], _: InstructionRef<'_>) {
            self.0
                .borrow_mut()
                .push(Event::Selected(state.into(), symbols.to_vec()));
        }

        fn symbol_written(&mut self, tape: usize, previous: Symbol, written: Symbol) {
            self.0
                .borrow_mut()
                .push(Event::Written(tape, previous, written));
        }

        fn head_moved(&mut self, tape: usize, direction: Direction) {
            self.0.borrow_mut().push(Event::Moved(tape, direction));
        }

        fn state_changed(&mut self, from: &str, to: &str) {
            self.0
                .borrow_mut()
                .push(Event::StateChanged(from.into(), to.into()));
        }
    }

    #[test]
    fn test_unary_increment() {
        let mut machine = machine(UNARY_INCREMENT);

        assert_eq!(machine.run(100), Outcome::Halted { steps: 3 });
        assert_eq!(machine.state(), "halt");

        let tape = machine.tape(0).unwrap();
        let window: String = (0..3).map(|i| tape.cell(i)).collect();
        assert_eq!(window, "111");
    }

    #[test]
    fn test_halting_state_does_not_mutate() {
        let spec = parse("blank: ' '\nstart state: a\ninput: xy\ntable:\n  a: {}\n").unwrap();
        let mut machine = TuringMachine::new(&spec);
        let before = machine.tapes().to_vec();

        assert!(machine.is_halted());
        assert!(!machine.step());
        assert_eq!(machine.tapes(), &before[..]);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.state(), "a");
    }

    #[test]
    fn test_unknown_state_halts() {
        let spec = parse(UNARY_INCREMENT).unwrap();
        let tapes = vec![Tape::new('0', "1")];
        let mut machine = TuringMachine::with_transitions(spec.table, "elsewhere", tapes).unwrap();

        assert!(!machine.step());
        assert_eq!(machine.read(0).unwrap(), '1');
    }

    #[test]
    fn test_missing_symbol_halts_in_non_halting_state() {
        let mut machine = machine(UNARY_INCREMENT);
        machine.tape_mut(0).unwrap().write('x');

        assert!(machine.is_halted());
        assert!(!machine.step());
        assert_eq!(machine.state(), "q0");

        // Halting is recomputed from the tape, not remembered.
        machine.tape_mut(0).unwrap().write('1');
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_three_tape_copy_step() {
        let mut machine = machine(THREE_TAPE_COPY);
        assert_eq!(machine.symbols(), vec!['1', '_', '_']);

        assert!(machine.step());
        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.tape(0).unwrap().cell(0), '1');
        assert_eq!(machine.tape(1).unwrap().cell(0), '1');
        assert_eq!(machine.tape(2).unwrap().cell(0), '_');

        let positions: Vec<isize> = machine.tapes().iter().map(Tape::position).collect();
        assert_eq!(positions, vec![1, 1, 0]);
    }

    #[test]
    fn test_three_tape_copy_runs_to_done() {
        let mut machine = machine(THREE_TAPE_COPY);

        assert_eq!(machine.run(100), Outcome::Halted { steps: 4 });
        assert_eq!(machine.state(), "done");
        assert_eq!(machine.tape(1).unwrap().contents(), "111_");
        assert_eq!(machine.tape(2).unwrap().contents(), "_");
    }

    #[test]
    fn test_first_matching_pattern_is_executed() {
        let input = r#"
type: 3tape
blank: _
wild: '.'
start state: s
input: '0'
table:
  s:
    '0..': {next: a}
    '0.1': {next: b}
  a: {}
  b: {}
"#;
        let mut machine = machine(input);
        machine.tape_mut(1).unwrap().write('x');
        machine.tape_mut(2).unwrap().write('1');

        assert!(machine.step());
        assert_eq!(machine.state(), "a");
    }

    #[test]
    fn test_identical_write_is_reported_but_content_unchanged() {
        let input =
            "blank: ' '\nstart state: a\ninput: x\ntable:\n  a:\n    x: {write: x, S: b}\n  b:\n";
        let mut machine = machine(input);
        let recorder = Recorder::default();
        machine.set_observer(recorder.clone());
        let before = machine.tape(0).unwrap().clone();

        assert!(machine.step());
        assert_eq!(machine.tape(0).unwrap(), &before);
        assert!(recorder
            .0
            .borrow()
            .contains(&Event::Written(0, 'x', 'x')));
    }

    #[test]
    fn test_observer_event_order() {
        let mut machine = machine(UNARY_INCREMENT);
        let recorder = Recorder::default();
        machine.set_observer(recorder.clone());

        machine.step();
        machine.step();
        machine.step();
        assert!(!machine.step());

        let events = recorder.0.borrow();
        assert_eq!(
            &events[..3],
            &[
                Event::Selected("q0".into(), vec!['1']),
                Event::Moved(0, Direction::Right),
                Event::StateChanged("q0".into(), "q0".into()),
            ]
        );
        assert_eq!(
            &events[events.len() - 4..],
            &[
                Event::Selected("q0".into(), vec!['0']),
                Event::Written(0, '0', '1'),
                Event::Moved(0, Direction::Right),
                Event::StateChanged("q0".into(), "halt".into()),
            ]
        );
    }

    #[test]
    fn test_instruction_without_next_state_keeps_state() {
        let input = "blank: ' '\nstart state: a\ninput: ab\ntable:\n  a:\n    a: R\n";
        let mut machine = machine(input);
        let recorder = Recorder::default();
        machine.set_observer(recorder.clone());

        assert_eq!(machine.run(10), Outcome::Halted { steps: 1 });
        assert_eq!(machine.state(), "a");
        assert!(!recorder
            .0
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::StateChanged(..))));
    }

    #[test]
    fn test_step_limit() {
        let input = "blank: ' '\nstart state: a\ntable:\n  a:\n    ' ': R\n";
        let mut machine = machine(input);

        assert_eq!(machine.run(20), Outcome::StepLimitReached { steps: 20 });
        assert_eq!(machine.tape(0).unwrap().position(), 20);
    }

    #[test]
    fn test_arity_mismatch() {
        let spec = parse(THREE_TAPE_COPY).unwrap();
        let result = TuringMachine::with_transitions(spec.table, "q0", vec![Tape::new('_', "")]);

        assert_eq!(
            result.err(),
            Some(MachineError::ArityMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_tape_index_out_of_bounds() {
        let machine = machine(UNARY_INCREMENT);

        assert_eq!(
            machine.read(1),
            Err(MachineError::TapeIndex { index: 1, tapes: 1 })
        );
    }

    #[test]
    fn test_display() {
        let mut machine = machine(UNARY_INCREMENT);
        machine.step();

        assert_eq!(machine.to_string(), "q0 1[1]");
    }
}
