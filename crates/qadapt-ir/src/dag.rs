//! Dependency graph of a circuit.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};

use crate::error::IrResult;
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// Instructions as nodes, with an edge labelled `q` from each instruction to
/// the next one acting on wire `q`.
///
/// Nodes are only ever appended, so node order is program order and a valid
/// topological order. The layer of every node is fixed when it is added.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<Instruction, QubitId, u32>,
    layer: Vec<usize>,
    /// Last instruction on each wire.
    front: Vec<Option<NodeIndex>>,
    /// Layer count of each wire.
    wire_depth: Vec<usize>,
}

impl CircuitDag {
    /// Empty DAG over `num_qubits` wires.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            graph: DiGraph::default(),
            layer: Vec::new(),
            front: vec![None; num_qubits],
            wire_depth: vec![0; num_qubits],
        }
    }

    /// Append a wire.
    pub fn add_qubit(&mut self) -> QubitId {
        self.front.push(None);
        self.wire_depth.push(0);
        QubitId::from(self.front.len() - 1)
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        instruction.validate(self.num_qubits())?;
        let wires = instruction.qubit_indices();
        let layer = wires.iter().map(|&q| self.wire_depth[q]).max().unwrap_or(0) + 1;

        let node = self.graph.add_node(instruction);
        for q in wires {
            if let Some(prev) = self.front[q] {
                self.graph.add_edge(prev, node, QubitId::from(q));
            }
            self.front[q] = Some(node);
            self.wire_depth[q] = layer;
        }
        self.layer.push(layer);
        Ok(node)
    }

    /// Instructions in program order.
    pub fn ops(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.graph.node_weights()
    }

    pub fn get(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node)
    }

    /// Instructions that must run immediately before `node`.
    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Incoming)
    }

    /// One-based layer of `node` in an as-soon-as-possible schedule.
    pub fn layer(&self, node: NodeIndex) -> Option<usize> {
        self.layer.get(node.index()).copied()
    }

    pub fn num_qubits(&self) -> usize {
        self.front.len()
    }

    pub fn num_ops(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.wire_depth.iter().copied().max().unwrap_or(0)
    }

    pub fn graph(&self) -> &DiGraph<Instruction, QubitId, u32> {
        &self.graph
    }
}
