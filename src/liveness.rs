//! Live variable analysis over the CFG.
//!
//! Classic backward dataflow: live-out of a node is the union of the live-in
//! sets of its successors; live-in is the node's uses-before-def plus
//! whatever survives its defs. Loop back-edges and exception edges are plain
//! edges here, so the fixed point covers them without special cases.

use crate::cfg::{steps::Access, Cfg};
use crate::error::{Error, Result};
use crate::scope::VarId;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

const MAX_ITERATIONS: usize = 1000;

/// Fixed-point live-in/live-out sets per CFG node.
#[derive(Debug, Default)]
pub struct LiveSets {
    live_in: HashMap<NodeIndex, HashSet<VarId>>,
    live_out: HashMap<NodeIndex, HashSet<VarId>>,
}

impl LiveSets {
    pub fn live_in(&self, node: NodeIndex) -> &HashSet<VarId> {
        &self.live_in[&node]
    }

    pub fn live_out(&self, node: NodeIndex) -> &HashSet<VarId> {
        &self.live_out[&node]
    }

    pub fn is_live_in(&self, node: NodeIndex, var: VarId) -> bool {
        self.live_in[&node].contains(&var)
    }

    pub fn is_live_out(&self, node: NodeIndex, var: VarId) -> bool {
        self.live_out[&node].contains(&var)
    }
}

/// Compute live variable sets for every node of `cfg`.
pub fn analyze(cfg: &Cfg) -> Result<LiveSets> {
    let mut sets = LiveSets::default();
    for node in cfg.graph().node_indices() {
        sets.live_in.insert(node, HashSet::new());
        sets.live_out.insert(node, HashSet::new());
    }

    let mut order: Vec<NodeIndex> = cfg.graph().node_indices().collect();
    order.reverse();

    let mut changed = true;
    let mut iteration = 0;
    while changed && iteration < MAX_ITERATIONS {
        changed = false;
        iteration += 1;

        for &node in &order {
            // live-out = union of successor live-ins
            let mut new_live_out = HashSet::new();
            for succ in cfg.graph().neighbors(node) {
                new_live_out.extend(sets.live_in[&succ].iter().copied());
            }
            if new_live_out != sets.live_out[&node] {
                sets.live_out.insert(node, new_live_out.clone());
                changed = true;
            }

            // live-in = (live-out - defs) ∪ uses-before-def, walking the
            // node's micro-steps backwards
            let mut live = new_live_out;
            for step in cfg.node(node).steps.iter().rev() {
                match step.access {
                    Access::Write => {
                        live.remove(&step.var);
                    }
                    Access::Read => {
                        live.insert(step.var);
                    }
                }
            }
            if live != sets.live_in[&node] {
                sets.live_in.insert(node, live);
                changed = true;
            }
        }
    }

    if iteration >= MAX_ITERATIONS && changed {
        return Err(Error::Liveness {
            message: "dataflow did not converge".to_string(),
        });
    }

    log::debug!("liveness converged after {iteration} iterations");
    Ok(sets)
}
