//! Control flow graph over statement-level evaluation nodes.
//!
//! Nodes are evaluation units (a statement, or the head expression of a
//! control construct), each carrying its ordered micro-steps. Edges carry the
//! branch kind, including the conservative exception edges the analysis needs
//! for try/catch/finally.

pub mod builder;
pub mod steps;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use steps::Step;

/// Edge kind in the control flow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Fallthrough to the next evaluation unit
    Fall,
    /// Branch taken (condition true / dispatch match / iteration continues)
    True,
    /// Branch not taken
    False,
    /// Unconditional jump (break, continue, return, loop back-edge)
    Uncond,
    /// Control may transfer here mid-node if the node throws
    Exception,
}

/// One evaluation unit.
#[derive(Debug, Clone)]
pub struct CfgNode {
    /// Variable accesses in evaluation order.
    pub steps: Vec<Step>,
    /// Short description for debug output.
    pub desc: String,
}

impl CfgNode {
    pub fn new(steps: Vec<Step>, desc: impl Into<String>) -> Self {
        CfgNode {
            steps,
            desc: desc.into(),
        }
    }
}

/// Per-function control flow graph with distinguished entry and exit nodes.
/// The entry node defines every parameter; all terminating paths lead to the
/// exit node.
pub struct Cfg {
    graph: DiGraph<CfgNode, EdgeKind>,
    entry: NodeIndex,
    exit: NodeIndex,
}

impl Cfg {
    pub fn graph(&self) -> &DiGraph<CfgNode, EdgeKind> {
        &self.graph
    }

    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn exit(&self) -> NodeIndex {
        self.exit
    }

    pub fn node(&self, id: NodeIndex) -> &CfgNode {
        &self.graph[id]
    }

    /// Export the CFG to DOT format for visualization
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph cfg {\n");
        dot.push_str("  node [shape=box, fontname=monospace];\n");
        for id in self.graph.node_indices() {
            let label = self.graph[id].desc.replace('"', "\\\"");
            dot.push_str(&format!("  n{} [label=\"{}: {}\"];\n", id.index(), id.index(), label));
        }
        for edge in self.graph.edge_references() {
            let style = match edge.weight() {
                EdgeKind::Exception => " [style=dashed, label=\"ex\"]",
                EdgeKind::True => " [label=\"T\"]",
                EdgeKind::False => " [label=\"F\"]",
                _ => "",
            };
            dot.push_str(&format!(
                "  n{} -> n{}{};\n",
                edge.source().index(),
                edge.target().index(),
                style
            ));
        }
        dot.push_str("}\n");
        dot
    }
}

// Re-export main types for convenience
pub use builder::CfgBuilder;
pub use steps::{Access, Step};
