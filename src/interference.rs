//! Interference graph construction.
//!
//! Two variables interfere when they are simultaneously live at some program
//! point, or when one is written while the other is still needed afterwards.
//! The second clause is evaluated against the node's micro-steps, so a write
//! only interferes with reads that happen *after* it within the node: a copy
//! like `y = x` reads `x` first and leaves the pair mergeable. Parameters of
//! the same function always interfere pairwise.

use crate::cfg::{steps::Access, Cfg};
use crate::liveness::LiveSets;
use crate::scope::{FunctionScope, VarId, VarKind};
use fixedbitset::FixedBitSet;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashSet;

/// Undirected graph over the variables eligible for coalescing. Escaped
/// variables and function-declaration names are not nodes at all; everything
/// else is, in appearance order.
#[derive(Debug, Default)]
pub struct InterferenceGraph {
    graph: UnGraph<VarId, ()>,
    node_of: Vec<Option<NodeIndex>>,
}

impl InterferenceGraph {
    pub fn new() -> Self {
        InterferenceGraph::default()
    }

    pub fn add_variable(&mut self, var: VarId) {
        if self.node_of.len() <= var.index() {
            self.node_of.resize(var.index() + 1, None);
        }
        if self.node_of[var.index()].is_none() {
            self.node_of[var.index()] = Some(self.graph.add_node(var));
        }
    }

    pub fn add_interference(&mut self, a: VarId, b: VarId) {
        if a == b {
            return;
        }
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return;
        };
        if !self.graph.contains_edge(na, nb) {
            self.graph.add_edge(na, nb, ());
        }
    }

    fn node(&self, var: VarId) -> Option<NodeIndex> {
        self.node_of.get(var.index()).copied().flatten()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.node(var).is_some()
    }

    /// Variables in insertion (appearance) order.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.graph.node_weights().copied()
    }

    pub fn interferes(&self, a: VarId, b: VarId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => self.graph.contains_edge(na, nb),
            _ => false,
        }
    }

    pub fn degree(&self, var: VarId) -> usize {
        match self.node(var) {
            Some(n) => self.graph.neighbors(n).count(),
            None => 0,
        }
    }

    pub fn variable_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Pairwise interference accumulator over variable ordinals.
struct BitMatrix {
    n: usize,
    bits: FixedBitSet,
}

impl BitMatrix {
    fn new(n: usize) -> Self {
        BitMatrix {
            n,
            bits: FixedBitSet::with_capacity(n * n),
        }
    }

    fn mark(&mut self, a: VarId, b: VarId) {
        if a != b {
            self.bits.insert(a.index() * self.n + b.index());
            self.bits.insert(b.index() * self.n + a.index());
        }
    }

    fn contains(&self, a: VarId, b: VarId) -> bool {
        self.bits.contains(a.index() * self.n + b.index())
    }
}

/// Build the interference graph for one function from its liveness solution.
pub fn build(
    cfg: &Cfg,
    live: &LiveSets,
    scope: &FunctionScope,
    escaped: &HashSet<VarId>,
) -> InterferenceGraph {
    let mut matrix = BitMatrix::new(scope.len());

    for node in cfg.graph().node_indices() {
        if node == cfg.exit() {
            continue;
        }

        // Simultaneously live pairs, on entry and on exit.
        mark_pairs(&mut matrix, live.live_in(node));
        let live_out = live.live_out(node);
        mark_pairs(&mut matrix, live_out);

        // Within-node crossings: a write interferes with everything still
        // live at node exit and with every later read in the same node.
        let mut writes: Vec<VarId> = Vec::new();
        for step in &cfg.node(node).steps {
            match step.access {
                Access::Read => {
                    for &w in &writes {
                        matrix.mark(w, step.var);
                    }
                }
                Access::Write => {
                    for &v in live_out {
                        matrix.mark(step.var, v);
                    }
                    writes.push(step.var);
                }
            }
        }
    }

    let eligible =
        |id: VarId| scope.var(id).kind != VarKind::FnName && !escaped.contains(&id);

    let mut graph = InterferenceGraph::new();
    for (id, _) in scope.iter() {
        if eligible(id) {
            graph.add_variable(id);
        }
    }
    for (a, _) in scope.iter() {
        if !eligible(a) {
            continue;
        }
        for (b, _) in scope.iter() {
            if b <= a || !eligible(b) {
                continue;
            }
            let both_params = scope.is_param(a) && scope.is_param(b);
            if matrix.contains(a, b) || both_params {
                graph.add_interference(a, b);
            }
        }
    }

    log::debug!(
        "interference graph: {} variables, {} edges",
        graph.variable_count(),
        graph.edge_count()
    );
    graph
}

fn mark_pairs(matrix: &mut BitMatrix, set: &HashSet<VarId>) {
    for &a in set {
        for &b in set {
            if a < b {
                matrix.mark(a, b);
            }
        }
    }
}
