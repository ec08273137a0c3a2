//! Derives a state graph from a transition table.
//!
//! Every declared state becomes a vertex. All transitions from one state to another are
//! merged into a single edge that carries one label per transition, so a visualizer draws
//! one arrow per ordered pair of states. Each vertex keeps its instructions together with the
//! index of the edge they travel along, which lets an animator highlight the edge for the
//! instruction the machine is about to execute.

use crate::{
    machine::Transitions,
    types::{
        visible, Instruction, InstructionRef, MultiInstruction, Pattern, StateId, Symbol,
        TransitionTable,
    },
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

/// An instruction of a vertex and the edge it follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<I> {
    pub instruction: I,
    pub edge: usize,
}

/// Outgoing transitions of a non-halting vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VertexTransitions {
    Single(IndexMap<Symbol, Entry<Instruction>>),
    /// Ordered by declaration; the first matching pattern applies.
    Multi(Vec<(Pattern, Entry<MultiInstruction>)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vertex {
    pub label: String,
    /// `None` for a halting state.
    pub transitions: Option<VertexTransitions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: StateId,
    pub target: StateId,
    /// One label per merged transition, in table order.
    pub labels: Vec<String>,
}

/// The instruction found for a configuration and the edge it travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionMatch<'a> {
    pub instruction: InstructionRef<'a>,
    pub edge: &'a Edge,
    pub edge_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateGraph {
    vertices: IndexMap<StateId, Vertex>,
    edges: Vec<Edge>,
    tapes: usize,
    wildcard: Option<Symbol>,
}

/// Collects the edges leaving one source state, reusing an edge per target.
struct EdgeBuilder<'g> {
    source: &'g str,
    edges: &'g mut Vec<Edge>,
    by_target: IndexMap<StateId, usize>,
}

impl<'g> EdgeBuilder<'g> {
    fn new(source: &'g str, edges: &'g mut Vec<Edge>) -> Self {
        Self {
            source,
            edges,
            by_target: IndexMap::new(),
        }
    }

    /// Appends `label` to the edge toward `next_state` (or a self-loop) and returns its index.
    fn add(&mut self, next_state: Option<&str>, label: String) -> usize {
        let target = next_state.unwrap_or(self.source);
        let index = match self.by_target.get(target) {
            Some(&index) => index,
            None => {
                self.edges.push(Edge {
                    source: self.source.to_string(),
                    target: target.to_string(),
                    labels: Vec::new(),
                });
                let index = self.edges.len() - 1;
                self.by_target.insert(target.to_string(), index);
                index
            }
        };

        self.edges[index].labels.push(label);
        index
    }
}

impl StateGraph {
    /// Derives the graph of `table`. Vertices follow the table's state order.
    pub fn derive(table: &TransitionTable) -> Self {
        let mut vertices = IndexMap::new();
        let mut edges = Vec::new();

        match table {
            TransitionTable::SingleTape(table) => {
                for (state, symbols) in table.states() {
                    let transitions = symbols.as_ref().map(|symbols| {
                        let mut builder = EdgeBuilder::new(state, &mut edges);
                        let entries = symbols
                            .iter()
                            .map(|(&symbol, instruction)| {
                                let edge = builder.add(
                                    instruction.next_state.as_deref(),
                                    single_label(symbol, instruction),
                                );
                                let entry = Entry {
                                    instruction: instruction.clone(),
                                    edge,
                                };
                                (symbol, entry)
                            })
                            .collect();
                        VertexTransitions::Single(entries)
                    });
                    vertices.insert(state.clone(), vertex(state, transitions));
                }
            }
            TransitionTable::MultiTape(table) => {
                for (state, rules) in table.states() {
                    let transitions = rules.as_ref().map(|rules| {
                        let mut builder = EdgeBuilder::new(state, &mut edges);
                        let entries = rules
                            .iter()
                            .map(|rule| {
                                let edge = builder.add(
                                    rule.instruction.next_state.as_deref(),
                                    multi_label(&rule.pattern, &rule.instruction),
                                );
                                let entry = Entry {
                                    instruction: rule.instruction.clone(),
                                    edge,
                                };
                                (rule.pattern.clone(), entry)
                            })
                            .collect();
                        VertexTransitions::Multi(entries)
                    });
                    vertices.insert(state.clone(), vertex(state, transitions));
                }
            }
        }

        Self {
            vertices,
            edges,
            tapes: table.tapes(),
            wildcard: match table {
                TransitionTable::SingleTape(_) => None,
                TransitionTable::MultiTape(t) => t.wildcard(),
            },
        }
    }

    pub fn vertices(&self) -> &IndexMap<StateId, Vertex> {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edges between an ordered pair of states (zero or one).
    pub fn edges_between<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == source && e.target == target)
    }

    /// Finds the instruction for `state` reading `symbols`, along with its edge.
    ///
    /// Single-tape vertices are looked up by key; multi-tape vertices return the first
    /// pattern that matches. Unknown and halting states yield `None`.
    pub fn get_instruction_and_edge(
        &self,
        state: &str,
        symbols: &[Symbol],
    ) -> Option<TransitionMatch<'_>> {
        let transitions = self.vertices.get(state)?.transitions.as_ref()?;

        let (instruction, edge_index) = match (transitions, symbols) {
            (VertexTransitions::Single(entries), [symbol]) => {
                let entry = entries.get(symbol)?;
                (InstructionRef::Single(&entry.instruction), entry.edge)
            }
            (VertexTransitions::Single(_), _) => return None,
            (VertexTransitions::Multi(entries), _) => {
                let (_, entry) = entries
                    .iter()
                    .find(|(pattern, _)| pattern.matches(symbols, self.wildcard))?;
                (InstructionRef::Multi(&entry.instruction), entry.edge)
            }
        };

        Some(TransitionMatch {
            instruction,
            edge: self.edges.get(edge_index)?,
            edge_index,
        })
    }

    /// Identifier of the edge at `index`, as used in [`StateGraph::to_elements`].
    pub fn edge_id(&self, index: usize) -> Option<String> {
        self.edges
            .get(index)
            .map(|edge| format!("{}-{}-{}", edge.source, edge.target, index))
    }

    /// Renders the graph as a list of cytoscape elements: every node, then every edge.
    /// Halting states carry the `halt` class.
    pub fn to_elements(&self) -> Value {
        let nodes = self.vertices.iter().map(|(id, vertex)| {
            let classes = if vertex.transitions.is_none() { "halt" } else { "" };
            json!({
                "data": {
                    "id": id,
                    "label": vertex.label,
                },
                "classes": classes
            })
        });

        let edges = self.edges.iter().enumerate().map(|(i, edge)| {
            json!({
                "data": {
                    "id": format!("{}-{}-{}", edge.source, edge.target, i),
                    "source": edge.source,
                    "target": edge.target,
                    "label": edge.labels.join("\n"),
                }
            })
        });

        Value::Array(nodes.chain(edges).collect())
    }

    pub fn to_elements_json(&self) -> String {
        self.to_elements().to_string()
    }
}

impl Transitions for StateGraph {
    fn tapes(&self) -> usize {
        self.tapes
    }

    fn lookup(&self, state: &str, symbols: &[Symbol]) -> Option<InstructionRef<'_>> {
        self.get_instruction_and_edge(state, symbols)
            .map(|found| found.instruction)
    }
}

fn vertex(state: &str, transitions: Option<VertexTransitions>) -> Vertex {
    Vertex {
        label: state.to_string(),
        transitions,
    }
}

fn single_label(symbol: Symbol, instruction: &Instruction) -> String {
    format!(
        "{} → {},{}",
        visible(symbol),
        visible(instruction.write.unwrap_or(symbol)),
        instruction.movement
    )
}

fn multi_label(pattern: &Pattern, instruction: &MultiInstruction) -> String {
    let read: String = pattern.symbols().iter().map(|&s| visible(s)).collect();
    let write: String = pattern
        .symbols()
        .iter()
        .enumerate()
        .map(|(tape, &s)| visible(instruction.write_for(tape).unwrap_or(s)))
        .collect();
    let moves: String = (0..pattern.len())
        .map(|tape| instruction.move_for(tape).letter())
        .collect();

    format!("{read} → {write},{moves}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{machine::TuringMachine, parser::parse, tape::Tape};

    const BINARY_INCREMENT: &str = r#"
blank: ' '
start state: right
table:
  right:
    [1, 0]: R
    ' ': {L: carry}
  carry:
    1: {write: 0, L: carry}
    [0, ' ']: {write: 1, L: done}
  done:
"#;

    fn graph(input: &str) -> StateGraph {
        StateGraph::derive(&parse(input).unwrap().table)
    }

    #[test]
    fn test_vertices_follow_table_order() {
        let graph = graph(BINARY_INCREMENT);

        let ids: Vec<&str> = graph.vertices().keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["right", "carry", "done"]);
        assert!(graph.vertices()["done"].transitions.is_none());
    }

    #[test]
    fn test_edges_are_merged_per_pair() {
        let graph = graph(BINARY_INCREMENT);

        let pairs: Vec<(&str, &str, usize)> = graph
            .edges()
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.labels.len()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("right", "right", 2),
                ("right", "carry", 1),
                ("carry", "carry", 1),
                ("carry", "done", 2),
            ]
        );

        for edge in graph.edges() {
            assert_eq!(graph.edges_between(&edge.source, &edge.target).count(), 1);
        }
    }

    #[test]
    fn test_single_tape_labels() {
        let graph = graph(BINARY_INCREMENT);

        assert_eq!(graph.edges()[0].labels, vec!["1 → 1,R", "0 → 0,R"]);
        assert_eq!(graph.edges()[1].labels, vec!["␣ → ␣,L"]);
        assert_eq!(graph.edges()[3].labels, vec!["0 → 1,L", "␣ → 1,L"]);
    }

    #[test]
    fn test_multi_tape_labels() {
        let input = r#"
type: 3tape
blank: _
wild: '*'
start state: q0
table:
  q0:
    '1**': {write: '11*', move: RRS}
    '_**': {next: done}
  done: {}
"#;
        let graph = graph(input);

        assert_eq!(graph.edges()[0].labels, vec!["1** → 11*,RRS"]);
        assert_eq!(graph.edges()[1].labels, vec!["_** → _**,SSS"]);
    }

    #[test]
    fn test_get_instruction_and_edge() {
        let graph = graph(BINARY_INCREMENT);

        let found = graph.get_instruction_and_edge("carry", &[' ']).unwrap();
        assert_eq!(found.edge_index, 3);
        assert_eq!(found.edge.target, "done");
        assert_eq!(found.instruction.next_state(), Some("done"));

        assert!(graph.get_instruction_and_edge("carry", &['x']).is_none());
        assert!(graph.get_instruction_and_edge("done", &[' ']).is_none());
        assert!(graph.get_instruction_and_edge("missing", &[' ']).is_none());
    }

    #[test]
    fn test_multi_tape_lookup_uses_wildcard() {
        let input = r#"
type: 3tape
blank: _
wild: '*'
start state: q0
table:
  q0:
    '*1*': {next: a}
    '01*': {next: b}
  a: {}
  b: {}
"#;
        let graph = graph(input);

        let found = graph.get_instruction_and_edge("q0", &['0', '1', 'x']).unwrap();
        assert_eq!(found.edge.target, "a");
        assert!(graph.get_instruction_and_edge("q0", &['0', '0', 'x']).is_none());
    }

    #[test]
    fn test_machine_runs_through_graph() {
        let graph = graph(BINARY_INCREMENT);
        let tapes = vec![Tape::new(' ', "1011")];
        let mut machine = TuringMachine::with_transitions(graph, "right", tapes).unwrap();

        machine.run(100);

        assert_eq!(machine.state(), "done");
        assert_eq!(machine.tape(0).unwrap().contents().trim(), "1100");
    }

    #[test]
    fn test_elements_json() {
        let graph = graph(BINARY_INCREMENT);
        let elements = graph.to_elements();
        let elements = elements.as_array().unwrap();

        assert_eq!(elements.len(), 3 + 4);
        assert_eq!(elements[0]["data"]["id"], "right");
        assert_eq!(elements[2]["classes"], "halt");
        assert_eq!(elements[3]["data"]["id"], "right-right-0");
        assert_eq!(elements[3]["data"]["label"], "1 → 1,R\n0 → 0,R");
        assert_eq!(graph.edge_id(3).as_deref(), Some("carry-done-3"));

        let parsed: Value = serde_json::from_str(&graph.to_elements_json()).unwrap();
        assert_eq!(&parsed, &graph.to_elements());
    }
}
